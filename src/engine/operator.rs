use std::collections::HashMap;
use std::fmt;

use super::literal::Literal;
use super::state::State;

/// A schema parameter: name plus optional declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: Option<String>,
}

/// A compiled action schema. Precondition and effect are schematic literal
/// conjunctions whose arguments are parameter names; `groundings` caches the
/// type-valid argument tuples enumerated at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub params: Vec<Param>,
    pub precondition: Vec<Literal>,
    pub effect: Vec<Literal>,
    groundings: Vec<Vec<String>>,
}

impl Operator {
    pub fn new(
        name: String,
        params: Vec<Param>,
        precondition: Vec<Literal>,
        effect: Vec<Literal>,
        groundings: Vec<Vec<String>>,
    ) -> Self {
        Operator {
            name,
            params,
            precondition,
            effect,
            groundings,
        }
    }

    pub fn groundings(&self) -> &[Vec<String>] {
        &self.groundings
    }

    /// Bind the parameter tuple and instantiate precondition and effect.
    /// Arguments that are not parameter names pass through unchanged; load
    /// already reported those as unknown bindings.
    pub fn instantiate(&self, args: &[String]) -> GroundAction {
        let binding: HashMap<&str, &str> = self
            .params
            .iter()
            .map(|p| p.name.as_str())
            .zip(args.iter().map(String::as_str))
            .collect();
        GroundAction {
            name: self.name.clone(),
            args: args.to_vec(),
            precondition: substitute(&self.precondition, &binding),
            effect: substitute(&self.effect, &binding),
        }
    }
}

fn substitute(literals: &[Literal], binding: &HashMap<&str, &str>) -> Vec<Literal> {
    literals
        .iter()
        .map(|l| Literal {
            predicate: l.predicate.clone(),
            args: l
                .args
                .iter()
                .map(|a| match binding.get(a.as_str()) {
                    Some(bound) => (*bound).to_owned(),
                    None => a.clone(),
                })
                .collect(),
            negated: l.negated,
        })
        .collect()
}

/// A schema with every parameter bound. Equality over name and argument tuple
/// identifies the action; the instantiated precondition and effect are
/// derived from those within one model, so whole-value equality agrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundAction {
    pub name: String,
    pub args: Vec<String>,
    pub precondition: Vec<Literal>,
    pub effect: Vec<Literal>,
}

impl GroundAction {
    /// Precondition matcher: every conjunct holds in `state` under the
    /// closed-world reading. Total, never fails.
    pub fn applicable_in(&self, state: &State) -> bool {
        state.satisfies(&self.precondition)
    }

    /// Successor state: add positive effects, delete targets of negative
    /// effects, walking the effect list in order. If an action both adds and
    /// deletes the same atom the last write wins.
    pub fn apply(&self, state: &State) -> State {
        let mut next = state.clone();
        for eff in &self.effect {
            if eff.negated {
                next.remove(&eff.as_positive());
            } else {
                next.insert(eff.clone());
            }
        }
        next
    }
}

impl fmt::Display for GroundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::literal::Literal;
    use super::super::state::State;
    use super::{GroundAction, Operator, Param};

    fn move_operator() -> Operator {
        Operator::new(
            "move".to_owned(),
            vec![
                Param { name: "b".to_owned(), kind: None },
                Param { name: "t1".to_owned(), kind: None },
                Param { name: "t2".to_owned(), kind: None },
            ],
            vec![
                Literal::positive("block", &["b"]),
                Literal::positive("on", &["b", "t1"]),
                Literal::negative("on", &["b", "t2"]),
            ],
            vec![
                Literal::positive("on", &["b", "t2"]),
                Literal::negative("on", &["b", "t1"]),
            ],
            vec![],
        )
    }

    #[test]
    fn instantiate_binds_parameters() {
        let op = move_operator();
        let ground = op.instantiate(&["a".to_owned(), "x".to_owned(), "y".to_owned()]);
        assert_eq!(
            ground,
            GroundAction {
                name: "move".to_owned(),
                args: vec!["a".to_owned(), "x".to_owned(), "y".to_owned()],
                precondition: vec![
                    Literal::positive("block", &["a"]),
                    Literal::positive("on", &["a", "x"]),
                    Literal::negative("on", &["a", "y"]),
                ],
                effect: vec![
                    Literal::positive("on", &["a", "y"]),
                    Literal::negative("on", &["a", "x"]),
                ],
            }
        );
        assert_eq!(ground.to_string(), "move a x y");
    }

    #[test]
    fn apply_adds_and_deletes() {
        let op = move_operator();
        let ground = op.instantiate(&["a".to_owned(), "x".to_owned(), "y".to_owned()]);
        let state = State::from_literals(vec![
            Literal::positive("block", &["a"]),
            Literal::positive("on", &["a", "x"]),
        ]);
        assert!(ground.applicable_in(&state));
        let next = ground.apply(&state);
        assert!(next.contains(&Literal::positive("on", &["a", "y"])));
        assert!(!next.contains(&Literal::positive("on", &["a", "x"])));
        assert!(next.contains(&Literal::positive("block", &["a"])));
        assert!(next.iter().all(|l| !l.negated));
    }

    #[test]
    fn apply_last_write_wins() {
        let conflicted = GroundAction {
            name: "flip".to_owned(),
            args: vec![],
            precondition: vec![],
            effect: vec![
                Literal::positive("lamp", &[]),
                Literal::negative("lamp", &[]),
            ],
        };
        let next = conflicted.apply(&State::new());
        assert!(!next.contains(&Literal::positive("lamp", &[])));
    }

    #[test]
    fn precondition_rejects_on_any_failed_conjunct() {
        let op = move_operator();
        let ground = op.instantiate(&["a".to_owned(), "x".to_owned(), "y".to_owned()]);
        // on(a y) present, so the negative conjunct fails under closed world.
        let state = State::from_literals(vec![
            Literal::positive("block", &["a"]),
            Literal::positive("on", &["a", "x"]),
            Literal::positive("on", &["a", "y"]),
        ]);
        assert!(!ground.applicable_in(&state));
    }

    #[test]
    fn unbound_arguments_pass_through() {
        let op = Operator::new(
            "drop".to_owned(),
            vec![Param { name: "i".to_owned(), kind: None }],
            vec![Literal::positive("holding", &["i"])],
            vec![Literal::positive("at", &["i", "home"])],
            vec![],
        );
        let ground = op.instantiate(&["ball".to_owned()]);
        assert_eq!(
            ground.effect,
            vec![Literal::positive("at", &["ball", "home"])]
        );
    }
}
