use std::collections::HashSet;

use super::error::{log_sink, EngineError};
use super::graph::{self, GraphOptions, PlanningGraph};
use super::grounder::{ground_parameters, Catalogue};
use super::literal::Literal;
use super::operator::{GroundAction, Operator, Param};
use super::search::{self, Solution, Strategy};
use super::state::State;
use crate::ast;
use crate::ast::Requirement;

/// Load-time knobs. Fast grounding (the default) never binds the same object
/// to two parameters of one action.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub fast_grounding: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            fast_grounding: true,
        }
    }
}

/// A compiled domain/problem pair, ready to plan on: operators with cached
/// ground parameter tuples, the object catalogue, and the initial and goal
/// states.
#[derive(Debug, Clone)]
pub struct Model {
    pub domain_name: String,
    pub problem_name: String,
    operators: Vec<Operator>,
    catalogue: Catalogue,
    init: State,
    goal: Vec<Literal>,
}

impl Model {
    /// Compile with default options, reporting diagnostics to the log sink.
    pub fn load(domain: &ast::Domain, problem: &ast::Problem) -> Model {
        Self::load_with(domain, problem, &LoadOptions::default(), &mut log_sink)
    }

    /// Compile a parsed domain and problem. Loading never fails: schemas or
    /// objects that do not validate are reported through `sink` and simply
    /// contribute nothing.
    pub fn load_with(
        domain: &ast::Domain,
        problem: &ast::Problem,
        options: &LoadOptions,
        sink: &mut dyn FnMut(EngineError),
    ) -> Model {
        let typing = domain.requirements.contains(Requirement::Typing)
            || problem.requirements.contains(Requirement::Typing);

        let init = State::from_literals(flatten_or_report(&problem.init, "initial state", sink));
        let goal = flatten_or_report(&problem.goal, "goal", sink);

        let known_types: HashSet<String> = domain
            .types
            .iter()
            .flat_map(|group| {
                group
                    .identifiers
                    .iter()
                    .cloned()
                    .chain(group.kind.clone())
            })
            .collect();
        let catalogue = Catalogue::build(&problem.objects, &init, typing, &known_types, sink);
        if !catalogue.has_objects() {
            sink(EngineError::EmptyUniverse);
        }

        let mut operators = Vec::with_capacity(domain.actions.len());
        for action in &domain.actions {
            operators.push(compile_action(
                action,
                &catalogue,
                typing,
                options.fast_grounding,
                sink,
            ));
        }

        Model {
            domain_name: domain.name.clone(),
            problem_name: problem.name.clone(),
            operators,
            catalogue,
            init,
            goal,
        }
    }

    pub fn init(&self) -> &State {
        &self.init
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn goal(&self) -> &[Literal] {
        &self.goal
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Every ground action whose precondition holds in `state`, deduplicated,
    /// in schema-then-grounding order.
    pub fn applicable_actions(&self, state: &State) -> Vec<GroundAction> {
        let mut out = Vec::new();
        for operator in &self.operators {
            for args in operator.groundings() {
                let ground = operator.instantiate(args);
                if ground.applicable_in(state) && !out.contains(&ground) {
                    out.push(ground);
                }
            }
        }
        out
    }

    /// Applicable-actions over a literal set that may carry negative
    /// literals (planning-graph levels): one pass with negatives stripped,
    /// one with the negated positives stripped as well, results unioned.
    pub(crate) fn applicable_in_literals(&self, literals: &[Literal]) -> Vec<GroundAction> {
        let positives = State::from_literals(literals.iter().filter(|l| !l.negated).cloned());
        let mut out = self.applicable_actions(&positives);
        let negated: HashSet<Literal> = literals
            .iter()
            .filter(|l| l.negated)
            .map(Literal::as_positive)
            .collect();
        if !negated.is_empty() {
            let stripped = State::from_literals(
                positives
                    .iter()
                    .filter(|l| !negated.contains(l))
                    .cloned(),
            );
            for ground in self.applicable_actions(&stripped) {
                if !out.contains(&ground) {
                    out.push(ground);
                }
            }
        }
        out
    }

    /// Successor states of `state`, paired with the action that produced
    /// each.
    pub fn child_states(&self, state: &State) -> Vec<(GroundAction, State)> {
        self.applicable_actions(state)
            .into_iter()
            .map(|action| {
                let next = action.apply(state);
                (action, next)
            })
            .collect()
    }

    pub fn is_goal(&self, state: &State) -> bool {
        state.satisfies(&self.goal)
    }

    /// Run one of the three searches. `max_solutions` is clamped to at least
    /// one; A* without a heuristic is rejected before the search starts.
    pub fn solve(
        &self,
        strategy: Strategy,
        max_solutions: usize,
        heuristic: Option<&dyn Fn(&State) -> i64>,
    ) -> Result<Vec<Solution>, EngineError> {
        let max_solutions = max_solutions.max(1);
        match strategy {
            Strategy::DepthFirst => Ok(search::solve_dfs(self, max_solutions)),
            Strategy::BreadthFirst => Ok(search::solve_bfs(self, max_solutions)),
            Strategy::AStar => match heuristic {
                Some(heuristic) => Ok(search::solve_astar(self, heuristic)),
                None => Err(EngineError::MissingHeuristic),
            },
        }
    }

    /// Build the planning graph with mutex annotations.
    pub fn graph(&self, options: &GraphOptions) -> PlanningGraph {
        graph::build(self, options)
    }

    /// GraphPlan-style solving: extend the graph until the goal extracts or
    /// the graph levels off.
    pub fn solve_graph(&self) -> Vec<Solution> {
        graph::solve_graph(self)
    }
}

fn compile_action(
    action: &ast::Action,
    catalogue: &Catalogue,
    typing: bool,
    fast: bool,
    sink: &mut dyn FnMut(EngineError),
) -> Operator {
    let params: Vec<Param> = action
        .parameters
        .iter()
        .flat_map(|group| {
            group.identifiers.iter().map(|name| Param {
                name: name.clone(),
                kind: group.kind.clone(),
            })
        })
        .collect();

    let precondition = match &action.precondition {
        Some(expr) => flatten_or_report(expr, &action.name, sink),
        None => Vec::new(),
    };
    let effect = match &action.effect {
        Some(expr) => flatten_or_report(expr, &action.name, sink),
        None => Vec::new(),
    };

    let bound: HashSet<&str> = params.iter().map(|p| p.name.as_str()).collect();
    for literal in precondition.iter().chain(effect.iter()) {
        for arg in &literal.args {
            if !bound.contains(arg.as_str()) {
                sink(EngineError::UnknownBinding {
                    action: action.name.clone(),
                    argument: arg.clone(),
                });
            }
        }
    }

    let groundings = ground_parameters(&action.name, &params, catalogue, typing, fast, sink);
    Operator::new(action.name.clone(), params, precondition, effect, groundings)
}

/// Flatten an `and`/`not` conjunction tree into a literal vector. Anything
/// deeper than `not` over a literal is reported and dropped.
fn flatten_or_report(
    expr: &ast::Expr,
    context: &str,
    sink: &mut dyn FnMut(EngineError),
) -> Vec<Literal> {
    let mut out = Vec::new();
    if flatten(expr, false, &mut out).is_err() {
        sink(EngineError::UnsupportedFormula {
            context: context.to_owned(),
        });
        return Vec::new();
    }
    out
}

fn flatten(expr: &ast::Expr, negated: bool, out: &mut Vec<Literal>) -> Result<(), ()> {
    match expr {
        ast::Expr::Literal { name, args } => {
            out.push(Literal {
                predicate: name.clone(),
                args: args.clone(),
                negated,
            });
            Ok(())
        }
        ast::Expr::Not(inner) if !negated => flatten(inner, true, out),
        ast::Expr::And(items) if !negated => {
            for item in items {
                flatten(item, false, out)?;
            }
            Ok(())
        }
        _ => Err(()),
    }
}
