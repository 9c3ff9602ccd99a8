//! Runtime error types for formula evaluation.

use formula_rational::RationalError;
use formula_types::TypeError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Rational(#[from] RationalError),
    /// An `Error` node reached during evaluation
    #[error("parse error: {0}")]
    Parse(String),
    #[error("Undefined variable: {0}")]
    Unbound(String),
    #[error("not a function: {0}")]
    NotFunction(String),
    #[error("{name} expects {expected} ({provided} provided)")]
    Arity { name: String, expected: String, provided: usize },
    /// A value of the wrong shape reached a library function
    #[error("{op}: unexpected {found}")]
    Unexpected { op: String, found: String },
    #[error("Unknown identifiers: {}", .0.join(", "))]
    UnknownIdentifiers(Vec<String>),
    #[error("Program: Cyclic dependencies")]
    CyclicDependency,
    /// A cell read itself while computing its value
    #[error("cyclic cell #{0}")]
    CyclicCell(usize),
    #[error("Value must be named: {0}")]
    Unnamed(String),
    #[error("json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::Json(e.to_string())
    }
}
