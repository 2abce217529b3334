//! A classical STRIPS planner. Feed it a parsed PDDL domain and problem
//! (`ast`), get back plans: `Model::load` grounds the action schemas against
//! the problem's objects, `Model::solve` searches the state space
//! (depth-first, breadth-first, or A* with a caller heuristic), and
//! `Model::solve_graph` runs GraphPlan-style planning-graph extraction.

pub mod ast;
pub mod engine;

pub use engine::{
    EngineError, GraphOptions, GroundAction, Literal, LoadOptions, Model, PlanningGraph, Solution,
    State, Strategy,
};
