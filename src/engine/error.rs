use log::warn;
use thiserror::Error;

/// Diagnostics the engine can raise while loading or solving. None of these
/// abort planning: a schema or object that fails validation simply stops
/// contributing, and the engine keeps going with what remains.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("action {action}: parameter ?{parameter} has no type but :typing is required")]
    UntypedParameter { action: String, parameter: String },
    #[error("object {object} has no type but :typing is required")]
    UntypedObject { object: String },
    #[error("action {action}: argument {argument} is not bound by the parameter list")]
    UnknownBinding { action: String, argument: String },
    #[error("no objects available for grounding")]
    EmptyUniverse,
    #[error("A* requires a heuristic")]
    MissingHeuristic,
    #[error("{context}: expected a conjunction of possibly-negated literals")]
    UnsupportedFormula { context: String },
}

/// Default error sink: forward diagnostics to the `log` facade.
pub fn log_sink(err: EngineError) {
    warn!("{}", err);
}
