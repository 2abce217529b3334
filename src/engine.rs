pub mod error;
pub mod graph;
pub mod grounder;
pub mod literal;
pub mod operator;
pub mod planner;
pub mod search;
pub mod state;

pub use error::EngineError;
pub use graph::{GraphOptions, Layer, MutexReason, PlanningGraph};
pub use literal::Literal;
pub use operator::GroundAction;
pub use planner::{LoadOptions, Model};
pub use search::{Solution, Strategy};
pub use state::State;
