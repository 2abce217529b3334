use std::cmp::Reverse;
use std::collections::{HashSet, VecDeque};

use priority_queue::PriorityQueue;

use super::operator::GroundAction;
use super::planner::Model;
use super::state::State;

/// Which search drives `Model::solve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DepthFirst,
    BreadthFirst,
    AStar,
}

/// A found plan: the number of steps and one `name arg1 arg2 …` token string
/// per action, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub steps: usize,
    pub path: Vec<String>,
}

/// Search-tree node. Nodes live in an arena and point at their parent by
/// index; the tree is acyclic so reconstruction is a simple walk to the root.
struct Node {
    state: State,
    action: Option<GroundAction>,
    parent: Option<usize>,
    depth: usize,
}

fn root(model: &Model) -> Node {
    Node {
        state: model.init().clone(),
        action: None,
        parent: None,
        depth: 0,
    }
}

fn reconstruct(nodes: &[Node], goal: usize) -> Solution {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(idx) = cursor {
        let node = &nodes[idx];
        if let Some(action) = &node.action {
            path.push(action.to_string());
        }
        cursor = node.parent;
    }
    path.reverse();
    Solution {
        steps: path.len(),
        path,
    }
}

/// Depth-first search for up to `max_solutions` plans. The initial state is
/// marked visited on entry and each child before descent, so no canonical
/// state is expanded twice and the search terminates on finite spaces.
pub fn solve_dfs(model: &Model, max_solutions: usize) -> Vec<Solution> {
    let mut nodes = vec![root(model)];
    let mut visited = HashSet::new();
    visited.insert(nodes[0].state.canonical());
    let mut solutions = Vec::new();
    visit(model, &mut nodes, 0, &mut visited, max_solutions, &mut solutions);
    solutions
}

fn visit(
    model: &Model,
    nodes: &mut Vec<Node>,
    idx: usize,
    visited: &mut HashSet<String>,
    max_solutions: usize,
    solutions: &mut Vec<Solution>,
) {
    if solutions.len() >= max_solutions {
        return;
    }
    if nodes[idx].state.satisfies(model.goal()) {
        solutions.push(reconstruct(nodes, idx));
        return;
    }
    for action in model.applicable_actions(&nodes[idx].state) {
        let child = action.apply(&nodes[idx].state);
        let key = child.canonical();
        if visited.contains(&key) {
            continue;
        }
        visited.insert(key);
        let depth = nodes[idx].depth + 1;
        let child_idx = nodes.len();
        nodes.push(Node {
            state: child,
            action: Some(action),
            parent: Some(idx),
            depth,
        });
        visit(model, nodes, child_idx, visited, max_solutions, solutions);
        if solutions.len() >= max_solutions {
            return;
        }
    }
}

/// Breadth-first search: FIFO frontier, visited marked on pop, children
/// filtered against the visited set. The first solution returned has minimum
/// step count.
pub fn solve_bfs(model: &Model, max_solutions: usize) -> Vec<Solution> {
    let mut nodes = vec![root(model)];
    let mut frontier = VecDeque::from([0usize]);
    let mut visited: HashSet<String> = HashSet::new();
    let mut solutions = Vec::new();
    while let Some(idx) = frontier.pop_front() {
        if !visited.insert(nodes[idx].state.canonical()) {
            continue;
        }
        if nodes[idx].state.satisfies(model.goal()) {
            solutions.push(reconstruct(&nodes, idx));
            if solutions.len() >= max_solutions {
                break;
            }
            continue;
        }
        for action in model.applicable_actions(&nodes[idx].state) {
            let child = action.apply(&nodes[idx].state);
            if visited.contains(&child.canonical()) {
                continue;
            }
            let depth = nodes[idx].depth + 1;
            nodes.push(Node {
                state: child,
                action: Some(action),
                parent: Some(idx),
                depth,
            });
            frontier.push_back(nodes.len() - 1);
        }
    }
    solutions
}

/// A* search ordered by f = g + h, g being node depth and h the caller's
/// heuristic. Ties break on insertion order. Returns the first solution
/// found; optimal when h is admissible and consistent, which is not checked.
pub fn solve_astar(model: &Model, heuristic: &dyn Fn(&State) -> i64) -> Vec<Solution> {
    let mut nodes = vec![root(model)];
    let mut open: PriorityQueue<usize, Reverse<(i64, u64)>> = PriorityQueue::new();
    let mut sequence = 0u64;
    open.push(0, Reverse((heuristic(&nodes[0].state), sequence)));
    let mut visited: HashSet<String> = HashSet::new();
    while let Some((idx, _)) = open.pop() {
        if !visited.insert(nodes[idx].state.canonical()) {
            continue;
        }
        if nodes[idx].state.satisfies(model.goal()) {
            return vec![reconstruct(&nodes, idx)];
        }
        for action in model.applicable_actions(&nodes[idx].state) {
            let child = action.apply(&nodes[idx].state);
            if visited.contains(&child.canonical()) {
                continue;
            }
            let depth = nodes[idx].depth + 1;
            let cost = depth as i64 + heuristic(&child);
            nodes.push(Node {
                state: child,
                action: Some(action),
                parent: Some(idx),
                depth,
            });
            sequence += 1;
            open.push(nodes.len() - 1, Reverse((cost, sequence)));
        }
    }
    Vec::new()
}
