use std::fmt;

/// A predicate applied to arguments, with polarity. Ground when the arguments
/// are object names; schematic when they are parameter names of the enclosing
/// action schema. State literals are always ground and positive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub predicate: String,
    pub args: Vec<String>,
    pub negated: bool,
}

impl Literal {
    pub fn positive(predicate: &str, args: &[&str]) -> Self {
        Self::new(predicate, args, false)
    }

    pub fn negative(predicate: &str, args: &[&str]) -> Self {
        Self::new(predicate, args, true)
    }

    pub fn new(predicate: &str, args: &[&str], negated: bool) -> Self {
        Literal {
            predicate: predicate.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
            negated,
        }
    }

    /// The positive literal over the same predicate and arguments.
    pub fn as_positive(&self) -> Self {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: false,
        }
    }

    /// The same atom with polarity flipped.
    pub fn negation(&self) -> Self {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: !self.negated,
        }
    }

    pub fn same_atom(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.args == other.args
    }

    pub fn is_negation_of(&self, other: &Self) -> bool {
        self.same_atom(other) && self.negated != other.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "(not ")?;
        }
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")?;
        if self.negated {
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Literal;

    #[test]
    fn display_tokens() {
        assert_eq!(Literal::positive("on", &["a", "x"]).to_string(), "(on a x)");
        assert_eq!(Literal::positive("handempty", &[]).to_string(), "(handempty)");
        assert_eq!(
            Literal::negative("on", &["a", "y"]).to_string(),
            "(not (on a y))"
        );
    }

    #[test]
    fn polarity_helpers() {
        let neg = Literal::negative("on", &["a", "x"]);
        assert_eq!(neg.as_positive(), Literal::positive("on", &["a", "x"]));
        assert_eq!(neg.negation(), Literal::positive("on", &["a", "x"]));
        assert!(neg.is_negation_of(&Literal::positive("on", &["a", "x"])));
        assert!(!neg.is_negation_of(&Literal::negative("on", &["a", "x"])));
        assert!(!neg.is_negation_of(&Literal::positive("on", &["a", "y"])));
        assert!(neg.same_atom(&Literal::positive("on", &["a", "x"])));
    }
}
