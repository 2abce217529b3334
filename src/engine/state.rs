use std::collections::BTreeSet;
use std::fmt;

use super::literal::Literal;

/// A world state: the set of ground positive literals that hold. Anything not
/// in the set is false (closed world). Negative literals handed to
/// `from_literals` are dropped rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct State(BTreeSet<Literal>);

impl State {
    pub fn new() -> Self {
        State(BTreeSet::new())
    }

    pub fn from_literals<I>(literals: I) -> Self
    where
        I: IntoIterator<Item = Literal>,
    {
        State(literals.into_iter().filter(|l| !l.negated).collect())
    }

    pub fn contains(&self, literal: &Literal) -> bool {
        self.0.contains(literal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, literal: Literal) {
        if !literal.negated {
            self.0.insert(literal);
        }
    }

    pub(crate) fn remove(&mut self, literal: &Literal) {
        self.0.remove(literal);
    }

    /// Closed-world conjunction test: every positive conjunct must be present
    /// and every negative conjunct's positive form absent. This is both the
    /// precondition matcher and the goal test.
    pub fn satisfies(&self, conjuncts: &[Literal]) -> bool {
        conjuncts.iter().all(|c| {
            if c.negated {
                !self.0.contains(&c.as_positive())
            } else {
                self.0.contains(c)
            }
        })
    }

    /// Canonical serialisation: `(predicate arg1 …)` tokens sorted
    /// lexicographically and joined by single spaces. Used as the visited-set
    /// key, so two states compare equal iff their canonical strings do.
    pub fn canonical(&self) -> String {
        let mut tokens: Vec<String> = self.0.iter().map(|literal| literal.to_string()).collect();
        tokens.sort();
        tokens.join(" ")
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
