use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

/// PDDL requirement flags. The engine only interprets `Typing`; the rest are
/// carried through so a parser can hand over whatever the input declared.
#[derive(EnumSetType, Debug, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Fluents,
    Adl,
    DurativeActions,
    DerivedPredicates,
    TimedInitialLiterals,
    Preferences,
    Constraints,
}

/// A `name1 name2 … - kind` group. `kind` is `None` for untyped groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedList {
    pub identifiers: Vec<String>,
    pub kind: Option<String>,
}

/// Conjunction expression as produced by the parser: `and` over children,
/// `not` over a single child, or a (possibly schematic) literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    And(Vec<Expr>),
    Not(Box<Expr>),
    Literal { name: String, args: Vec<String> },
}

impl Expr {
    pub fn literal(name: &str, args: &[&str]) -> Self {
        Expr::Literal {
            name: name.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub variables: Vec<TypedList>,
}

/// An action schema: parameters plus precondition and effect conjunctions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<TypedList>,
    #[serde(default)]
    pub precondition: Option<Expr>,
    #[serde(default)]
    pub effect: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    #[serde(default)]
    pub requirements: EnumSet<Requirement>,
    #[serde(default)]
    pub types: Vec<TypedList>,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub requirements: EnumSet<Requirement>,
    #[serde(default)]
    pub objects: Vec<TypedList>,
    pub init: Expr,
    pub goal: Expr,
}
