//! formula-runtime: evaluation of formula expressions and programs.
//!
//! - `cell`: pull-based reactive cells and the sheet that creates them
//! - `value`: runtime values and their plain snapshots
//! - `eval`: expression to cell evaluation
//! - `stdlib`: library function implementations
//! - `env`: the evaluation environment
//! - `program`: dependency-ordered evaluation of named definitions

pub mod cell;
pub mod env;
pub mod error;
pub mod eval;
pub mod program;
pub mod stdlib;
pub mod value;

pub use cell::{Cell, Sheet};
pub use env::Environment;
pub use error::EvalError;
pub use eval::{apply, evaluate};
pub use program::{PartialReduction, Program};
pub use value::{Func, NativeFn, Plain, Value};
