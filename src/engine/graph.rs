use std::collections::{HashMap, HashSet};

use enumset::{EnumSet, EnumSetType};
use log::debug;

use super::literal::Literal;
use super::operator::GroundAction;
use super::planner::Model;
use super::search::Solution;

/// Why a pair of nodes or literals is mutually exclusive.
#[derive(EnumSetType, Debug)]
pub enum MutexReason {
    InconsistentEffects,
    Interference,
    CompetingNeeds,
    Negation,
    InconsistentSupport,
}

/// One node of an action layer: a real ground action or a synthetic no-op
/// whose precondition and effect are the single literal it carries forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub action: GroundAction,
    pub noop: bool,
}

impl GraphNode {
    fn real(action: GroundAction) -> Self {
        GraphNode {
            action,
            noop: false,
        }
    }

    fn carrier(literal: Literal) -> Self {
        let mut args = Vec::with_capacity(literal.args.len() + 2);
        if literal.negated {
            args.push("not".to_owned());
        }
        args.push(literal.predicate.clone());
        args.extend(literal.args.iter().cloned());
        GraphNode {
            action: GroundAction {
                name: "noop".to_owned(),
                args,
                precondition: vec![literal.clone()],
                effect: vec![literal],
            },
            noop: true,
        }
    }
}

/// An action layer plus its mutex side tables. Literals surface as the
/// effects of the layer's nodes; their mutex relation is keyed by literal
/// value, the action relation by node index pair.
#[derive(Debug, Clone)]
pub struct Layer {
    pub nodes: Vec<GraphNode>,
    action_mutex: HashMap<(usize, usize), EnumSet<MutexReason>>,
    literal_mutex: HashMap<(Literal, Literal), EnumSet<MutexReason>>,
}

impl Layer {
    /// Distinct effect literals of the layer, in order of first appearance.
    pub fn literals(&self) -> Vec<Literal> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for node in &self.nodes {
            for eff in &node.action.effect {
                if seen.insert(eff.clone()) {
                    out.push(eff.clone());
                }
            }
        }
        out
    }

    /// Indices of the nodes whose effects contain `literal`.
    pub fn producers(&self, literal: &Literal) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.action.effect.contains(literal))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn actions_mutex(&self, a: usize, b: usize) -> bool {
        !self.action_mutex_reasons(a, b).is_empty()
    }

    pub fn action_mutex_reasons(&self, a: usize, b: usize) -> EnumSet<MutexReason> {
        if a == b {
            return EnumSet::empty();
        }
        let key = (a.min(b), a.max(b));
        self.action_mutex.get(&key).copied().unwrap_or_default()
    }

    pub fn literals_mutex(&self, a: &Literal, b: &Literal) -> bool {
        !self.literal_mutex_reasons(a, b).is_empty()
    }

    pub fn literal_mutex_reasons(&self, a: &Literal, b: &Literal) -> EnumSet<MutexReason> {
        if a == b {
            return EnumSet::empty();
        }
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.literal_mutex.get(&key).copied().unwrap_or_default()
    }
}

/// Knobs for `Model::graph`. `min_layers` forces expansion past a fixed
/// point, `max_layers` caps it, `skip_negative` leaves delete-effect literals
/// out of the carried sets, `skip_mutex` skips mutex computation entirely.
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    pub min_layers: usize,
    pub max_layers: Option<usize>,
    pub skip_negative: bool,
    pub skip_mutex: bool,
}

/// The layered reachability structure. `leveled` records that the last
/// expansion reached a fixed point rather than the `max_layers` cap.
#[derive(Debug, Clone)]
pub struct PlanningGraph {
    pub layers: Vec<Layer>,
    pub leveled: bool,
}

pub fn build(model: &Model, options: &GraphOptions) -> PlanningGraph {
    let mut layers = vec![make_layer(first_nodes(model), None, options.skip_mutex)];
    let mut leveled = false;
    loop {
        if let Some(max) = options.max_layers {
            if layers.len() >= max {
                break;
            }
        }
        let previous = layers.last().expect("at least the first layer exists");
        let nodes = expand(model, previous, options.skip_negative);
        let fixed = is_fixed_point(previous, &nodes);
        if fixed && layers.len() >= options.min_layers.max(1) {
            leveled = true;
            break;
        }
        let layer = make_layer(nodes, Some(previous), options.skip_mutex);
        debug!(
            "layer {}: {} nodes, {} literals",
            layers.len(),
            layer.nodes.len(),
            layer.literals().len()
        );
        layers.push(layer);
    }
    // Final literal-only layer: just the carriers for the last action layer's
    // effects.
    let previous = layers.last().expect("at least the first layer exists");
    let mut literals = previous.literals();
    if options.skip_negative {
        literals.retain(|l| !l.negated);
    }
    let carriers = literals.into_iter().map(GraphNode::carrier).collect();
    let last = make_layer(carriers, Some(previous), options.skip_mutex);
    layers.push(last);
    PlanningGraph { layers, leveled }
}

fn first_nodes(model: &Model) -> Vec<GraphNode> {
    let mut nodes: Vec<GraphNode> = model
        .init()
        .iter()
        .cloned()
        .map(GraphNode::carrier)
        .collect();
    nodes.extend(
        model
            .applicable_actions(model.init())
            .into_iter()
            .map(GraphNode::real),
    );
    nodes
}

fn expand(model: &Model, previous: &Layer, skip_negative: bool) -> Vec<GraphNode> {
    let mut literals = previous.literals();
    if skip_negative {
        literals.retain(|l| !l.negated);
    }
    let mut nodes: Vec<GraphNode> = literals.iter().cloned().map(GraphNode::carrier).collect();
    nodes.extend(
        model
            .applicable_in_literals(&literals)
            .into_iter()
            .map(GraphNode::real),
    );
    nodes
}

/// Fixed point per the levelling rule: the candidate layer adds no literal
/// and no real action beyond the previous layer's.
fn is_fixed_point(previous: &Layer, nodes: &[GraphNode]) -> bool {
    let old_literals: HashSet<Literal> = previous.literals().into_iter().collect();
    let new_literals: HashSet<Literal> = nodes
        .iter()
        .flat_map(|n| n.action.effect.iter().cloned())
        .collect();
    if !new_literals.is_subset(&old_literals) {
        return false;
    }
    let old_actions: HashSet<&GroundAction> = previous
        .nodes
        .iter()
        .filter(|n| !n.noop)
        .map(|n| &n.action)
        .collect();
    nodes
        .iter()
        .filter(|n| !n.noop)
        .all(|n| old_actions.contains(&n.action))
}

fn make_layer(nodes: Vec<GraphNode>, previous: Option<&Layer>, skip_mutex: bool) -> Layer {
    let mut layer = Layer {
        nodes,
        action_mutex: HashMap::new(),
        literal_mutex: HashMap::new(),
    };
    if !skip_mutex {
        compute_action_mutexes(&mut layer, previous);
        compute_literal_mutexes(&mut layer);
    }
    layer
}

fn add_action_mutex(layer: &mut Layer, a: usize, b: usize, reason: MutexReason) {
    let key = (a.min(b), a.max(b));
    layer.action_mutex.entry(key).or_default().insert(reason);
}

fn add_literal_mutex(layer: &mut Layer, a: &Literal, b: &Literal, reason: MutexReason) {
    let key = if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    };
    layer.literal_mutex.entry(key).or_default().insert(reason);
}

fn compute_action_mutexes(layer: &mut Layer, previous: Option<&Layer>) {
    for a in 0..layer.nodes.len() {
        for b in (a + 1)..layer.nodes.len() {
            let (na, nb) = (&layer.nodes[a], &layer.nodes[b]);
            // Inconsistent effects: two real actions with clashing effects.
            if !na.noop
                && !nb.noop
                && crossed(&na.action.effect, &nb.action.effect)
            {
                add_action_mutex(layer, a, b, MutexReason::InconsistentEffects);
            }
            // Interference: one side deletes what the other requires.
            let (na, nb) = (&layer.nodes[a], &layer.nodes[b]);
            if crossed(&na.action.effect, &nb.action.precondition)
                || crossed(&nb.action.effect, &na.action.precondition)
            {
                add_action_mutex(layer, a, b, MutexReason::Interference);
            }
            // Competing needs: preconditions mutex one layer down. This is
            // also what carries literal mutexes forward through no-ops.
            if let Some(previous) = previous {
                let (na, nb) = (&layer.nodes[a], &layer.nodes[b]);
                let competing = na.action.precondition.iter().any(|p| {
                    nb.action
                        .precondition
                        .iter()
                        .any(|q| previous.literals_mutex(p, q))
                });
                if competing {
                    add_action_mutex(layer, a, b, MutexReason::CompetingNeeds);
                }
            }
        }
    }
}

/// Some literal of `effects` is the negation of some literal of `against`.
fn crossed(effects: &[Literal], against: &[Literal]) -> bool {
    effects
        .iter()
        .any(|e| against.iter().any(|o| e.is_negation_of(o)))
}

fn compute_literal_mutexes(layer: &mut Layer) {
    let literals = layer.literals();
    for x in 0..literals.len() {
        for y in (x + 1)..literals.len() {
            let (lx, ly) = (&literals[x], &literals[y]);
            if lx.is_negation_of(ly) {
                add_literal_mutex(layer, lx, ly, MutexReason::Negation);
            }
            let px = layer.producers(lx);
            let py = layer.producers(ly);
            let all_pairs_mutex = px
                .iter()
                .all(|&p| py.iter().all(|&q| p != q && layer.actions_mutex(p, q)));
            if all_pairs_mutex {
                add_literal_mutex(layer, lx, ly, MutexReason::InconsistentSupport);
            }
        }
    }
}

/// Goal reachability at one layer: every goal literal is produced and no two
/// goal literals are mutex.
fn goal_reachable(layer: &Layer, goals: &[Literal]) -> bool {
    let literals: HashSet<Literal> = layer.literals().into_iter().collect();
    if !goals.iter().all(|g| literals.contains(g)) {
        return false;
    }
    for x in 0..goals.len() {
        for y in (x + 1)..goals.len() {
            if layer.literals_mutex(&goals[x], &goals[y]) {
                return false;
            }
        }
    }
    true
}

/// Backward extraction from `level` for `goals`: pick pairwise non-mutex
/// producers, one per goal, and recurse on the union of their preconditions.
/// Returns the non-noop actions chosen at every level, bottom layer first.
fn extract(layers: &[Layer], level: usize, goals: &[Literal]) -> Option<Vec<GroundAction>> {
    let candidates: Vec<Vec<usize>> = goals
        .iter()
        .map(|g| layers[level].producers(g))
        .collect();
    if candidates.iter().any(Vec::is_empty) {
        return None;
    }
    let mut chosen = Vec::with_capacity(goals.len());
    combine(layers, level, &candidates, &mut chosen)
}

fn combine(
    layers: &[Layer],
    level: usize,
    candidates: &[Vec<usize>],
    chosen: &mut Vec<usize>,
) -> Option<Vec<GroundAction>> {
    let layer = &layers[level];
    if chosen.len() == candidates.len() {
        let mut picks: Vec<usize> = chosen.clone();
        picks.sort_unstable();
        picks.dedup();
        let selected: Vec<GroundAction> = picks
            .iter()
            .filter(|&&i| !layer.nodes[i].noop)
            .map(|&i| layer.nodes[i].action.clone())
            .collect();
        if level == 0 {
            // Layer-0 preconditions hold in the initial state by
            // construction, so the combination stands.
            return Some(selected);
        }
        let mut subgoals: Vec<Literal> = picks
            .iter()
            .flat_map(|&i| layer.nodes[i].action.precondition.iter().cloned())
            .collect();
        subgoals.sort();
        subgoals.dedup();
        let below = &layers[level - 1];
        for x in 0..subgoals.len() {
            for y in (x + 1)..subgoals.len() {
                if below.literals_mutex(&subgoals[x], &subgoals[y]) {
                    return None;
                }
            }
        }
        let mut plan = extract(layers, level - 1, &subgoals)?;
        plan.extend(selected);
        return Some(plan);
    }
    for &candidate in &candidates[chosen.len()] {
        if chosen
            .iter()
            .any(|&c| layer.actions_mutex(c, candidate))
        {
            continue;
        }
        chosen.push(candidate);
        if let Some(plan) = combine(layers, level, candidates, chosen) {
            chosen.pop();
            return Some(plan);
        }
        chosen.pop();
    }
    None
}

/// The extend-and-extract loop: grow the graph until the goal is reachable
/// and a combination extracts, or the graph levels off, which means no plan
/// exists.
pub fn solve_graph(model: &Model) -> Vec<Solution> {
    let goals = {
        let mut goals = model.goal().to_vec();
        goals.sort();
        goals.dedup();
        goals
    };
    let mut layers = vec![make_layer(first_nodes(model), None, false)];
    loop {
        let level = layers.len() - 1;
        if goal_reachable(&layers[level], &goals) {
            if let Some(plan) = extract(&layers, level, &goals) {
                let path: Vec<String> = plan.iter().map(|action| action.to_string()).collect();
                return vec![Solution {
                    steps: path.len(),
                    path,
                }];
            }
        }
        let previous = layers.last().expect("at least the first layer exists");
        let nodes = expand(model, previous, false);
        let layer = make_layer(nodes, Some(previous), false);
        // Literals and actions reach their fixed point before the mutex
        // relations finish relaxing, so level-off here means the whole layer
        // repeats, mutex tables included.
        if layer.nodes == previous.nodes
            && layer.action_mutex == previous.action_mutex
            && layer.literal_mutex == previous.literal_mutex
        {
            debug!("planning graph levelled off after {} layers", layers.len());
            return Vec::new();
        }
        layers.push(layer);
    }
}
