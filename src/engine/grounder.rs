use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use super::error::EngineError;
use super::operator::Param;
use super::state::State;

/// The problem's object universe: objects indexed by declared type for typed
/// grounding, plus the flat set of names appearing in the initial state for
/// untyped grounding.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    by_type: HashMap<String, Vec<String>>,
    universe: Vec<String>,
}

impl Catalogue {
    /// Index the declared objects. Under `:typing`, an object without a type
    /// is reported and skipped, and an object of a type the domain never
    /// declares contributes nothing. The untyped universe is collected from
    /// the initial state, not the object list.
    pub fn build(
        objects: &[crate::ast::TypedList],
        init: &State,
        typing: bool,
        known_types: &HashSet<String>,
        sink: &mut dyn FnMut(EngineError),
    ) -> Self {
        let mut by_type: HashMap<String, Vec<String>> = HashMap::new();
        for group in objects {
            match &group.kind {
                Some(kind) => {
                    if typing && !known_types.contains(kind) {
                        log::debug!("objects of undeclared type {} contribute nothing", kind);
                        continue;
                    }
                    let bucket = by_type.entry(kind.clone()).or_default();
                    for name in &group.identifiers {
                        if !bucket.contains(name) {
                            bucket.push(name.clone());
                        }
                    }
                }
                None => {
                    if typing {
                        for name in &group.identifiers {
                            sink(EngineError::UntypedObject {
                                object: name.clone(),
                            });
                        }
                    }
                }
            }
        }

        let mut universe = Vec::new();
        let mut seen = HashSet::new();
        for literal in init.iter() {
            for arg in &literal.args {
                if seen.insert(arg.clone()) {
                    universe.push(arg.clone());
                }
            }
        }

        Catalogue { by_type, universe }
    }

    pub fn of_type(&self, kind: &str) -> &[String] {
        self.by_type.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn has_objects(&self) -> bool {
        !self.universe.is_empty() || self.by_type.values().any(|v| !v.is_empty())
    }
}

/// Enumerate the ground argument tuples for one schema, deduplicated and in a
/// deterministic order. Typed mode takes the Cartesian product of the
/// per-position candidate sets; untyped mode draws every position from the
/// initial-state universe. Fast mode drops tuples that bind the same object
/// twice.
pub fn ground_parameters(
    action: &str,
    params: &[Param],
    catalogue: &Catalogue,
    typing: bool,
    fast: bool,
    sink: &mut dyn FnMut(EngineError),
) -> Vec<Vec<String>> {
    if params.is_empty() {
        return vec![Vec::new()];
    }
    let tuples: Vec<Vec<String>> = if typing {
        let mut domains = Vec::with_capacity(params.len());
        for param in params {
            match &param.kind {
                Some(kind) => domains.push(catalogue.of_type(kind)),
                None => {
                    sink(EngineError::UntypedParameter {
                        action: action.to_owned(),
                        parameter: param.name.clone(),
                    });
                    return Vec::new();
                }
            }
        }
        domains
            .iter()
            .map(|d| d.iter().cloned())
            .multi_cartesian_product()
            .filter(|tuple| !fast || all_distinct(tuple))
            .collect()
    } else if fast {
        catalogue
            .universe()
            .iter()
            .cloned()
            .permutations(params.len())
            .collect()
    } else {
        (0..params.len())
            .map(|_| catalogue.universe().iter().cloned())
            .multi_cartesian_product()
            .collect()
    };

    let mut seen = HashSet::new();
    tuples
        .into_iter()
        .filter(|tuple| seen.insert(tuple.clone()))
        .collect()
}

fn all_distinct(tuple: &[String]) -> bool {
    let mut seen = HashSet::new();
    tuple.iter().all(|arg| seen.insert(arg))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::super::error::EngineError;
    use super::super::literal::Literal;
    use super::super::operator::Param;
    use super::super::state::State;
    use super::{ground_parameters, Catalogue};
    use crate::ast::TypedList;

    fn param(name: &str, kind: Option<&str>) -> Param {
        Param {
            name: name.to_owned(),
            kind: kind.map(str::to_owned),
        }
    }

    fn starcraft_catalogue() -> Catalogue {
        let objects = vec![
            TypedList {
                identifiers: vec!["scv1".to_owned(), "scv2".to_owned()],
                kind: Some("builder".to_owned()),
            },
            TypedList {
                identifiers: vec![
                    "sectorA".to_owned(),
                    "sectorB".to_owned(),
                    "mineralFieldA".to_owned(),
                    "mineralFieldB".to_owned(),
                ],
                kind: Some("area".to_owned()),
            },
        ];
        let known: HashSet<String> = ["builder", "area"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        Catalogue::build(&objects, &State::new(), true, &known, &mut |_| {})
    }

    #[test]
    fn typed_cartesian_mode() {
        let catalogue = starcraft_catalogue();
        let params = vec![
            param("w", Some("builder")),
            param("from", Some("area")),
            param("to", Some("area")),
        ];
        let tuples = ground_parameters("moveTo", &params, &catalogue, true, false, &mut |_| {});
        assert_eq!(tuples.len(), 32);
    }

    #[test]
    fn typed_no_repetition_mode() {
        let catalogue = starcraft_catalogue();
        let params = vec![
            param("w", Some("builder")),
            param("from", Some("area")),
            param("to", Some("area")),
        ];
        let tuples = ground_parameters("moveTo", &params, &catalogue, true, true, &mut |_| {});
        assert_eq!(tuples.len(), 24);
        assert!(tuples.iter().all(|t| t[1] != t[2]));
    }

    #[test]
    fn untyped_universe_comes_from_initial_state() {
        let init = State::from_literals(vec![
            Literal::positive("on", &["a", "x"]),
            Literal::positive("table", &["y"]),
        ]);
        let catalogue = Catalogue::build(&[], &init, false, &HashSet::new(), &mut |_| {});
        let universe: HashSet<&str> = catalogue.universe().iter().map(String::as_str).collect();
        assert_eq!(universe, ["a", "x", "y"].into_iter().collect());
    }

    #[test]
    fn untyped_fast_mode_permutes_without_repetition() {
        let init = State::from_literals(vec![
            Literal::positive("on", &["a", "x"]),
            Literal::positive("table", &["y"]),
        ]);
        let catalogue = Catalogue::build(&[], &init, false, &HashSet::new(), &mut |_| {});
        let params = vec![param("p", None), param("q", None)];
        let tuples = ground_parameters("swap", &params, &catalogue, false, true, &mut |_| {});
        assert_eq!(tuples.len(), 6); // 3P2
        let full = ground_parameters("swap", &params, &catalogue, false, false, &mut |_| {});
        assert_eq!(full.len(), 9); // 3^2
    }

    #[test]
    fn untyped_parameter_under_typing_skips_schema() {
        let catalogue = starcraft_catalogue();
        let params = vec![param("w", Some("builder")), param("x", None)];
        let mut reported = Vec::new();
        let tuples =
            ground_parameters("broken", &params, &catalogue, true, true, &mut |e| {
                reported.push(e)
            });
        assert!(tuples.is_empty());
        assert_eq!(
            reported,
            vec![EngineError::UntypedParameter {
                action: "broken".to_owned(),
                parameter: "x".to_owned(),
            }]
        );
    }

    #[test]
    fn untyped_object_under_typing_is_reported() {
        let objects = vec![TypedList {
            identifiers: vec!["stray".to_owned()],
            kind: None,
        }];
        let mut reported = Vec::new();
        let catalogue = Catalogue::build(&objects, &State::new(), true, &HashSet::new(), &mut |e| {
            reported.push(e)
        });
        assert_eq!(
            reported,
            vec![EngineError::UntypedObject {
                object: "stray".to_owned()
            }]
        );
        assert!(!catalogue.has_objects());
    }

    #[test]
    fn zero_parameters_ground_once() {
        let catalogue = starcraft_catalogue();
        let tuples = ground_parameters("tick", &[], &catalogue, true, true, &mut |_| {});
        assert_eq!(tuples, vec![Vec::<String>::new()]);
    }

    #[test]
    fn unknown_type_contributes_nothing() {
        let objects = vec![TypedList {
            identifiers: vec!["ghost".to_owned()],
            kind: Some("phantom".to_owned()),
        }];
        let known: HashSet<String> = ["builder"].iter().map(|s| (*s).to_owned()).collect();
        let catalogue = Catalogue::build(&objects, &State::new(), true, &known, &mut |_| {});
        assert!(catalogue.of_type("phantom").is_empty());
    }
}
