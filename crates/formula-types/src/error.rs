//! Type error definitions.
//!
//! Types inside errors are already pretty-printed so messages stay stable
//! after the substitution that produced them is gone.

/// Type inference errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    /// A parse failure reified as an `Error` node
    #[error("parse error: {0}")]
    Parse(String),
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    /// Unification failure
    #[error("Type mismatch: {left} vs {right}{}", at(.node))]
    Mismatch { left: String, right: String, node: Option<String> },
    /// Function argument count disagreement without a variadic tail to absorb it
    #[error("Function expects {} ({provided} provided){}", plural("argument", .expected), at(.node))]
    Arity { expected: usize, provided: usize, node: Option<String> },
    #[error("Different arity for tuples: {left} vs {right}")]
    TupleArity { left: usize, right: usize },
    #[error("Generic type arguments mismatch: {left} vs {right}")]
    GenericArity { left: usize, right: usize },
    /// A field missing from a closed object
    #[error("Unknown field: {field}{}", at(.node))]
    UnknownField { field: String, node: Option<String> },
    /// Object unification where one closed side lacks a field of the other
    #[error("Object field mismatch: {field} missing in {side} type")]
    FieldMismatch { field: String, side: &'static str },
    /// Field or index access on something that is not an object or list
    #[error("Expected {expected} or variable, got {found}{}", at(.node))]
    FieldOnNonObject { expected: &'static str, found: String, node: Option<String> },
    /// Occurs check failure (infinite type)
    #[error("cannot construct infinite type: {var} occurs in {ty}")]
    Occurs { var: String, ty: String },
    /// Post-inference sanity check failure; indicates a bug in the engine
    #[error("internal error: non-substituted free variable in {ty}{}", at(.node))]
    Internal { ty: String, node: Option<String> },
}

fn at(node: &Option<String>) -> String {
    match node {
        Some(n) => format!(" at {n}"),
        None => String::new(),
    }
}

pub(crate) fn plural(word: &str, n: &usize) -> String {
    if *n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}
