//! formula-types: type inference for formula expressions.
//!
//! Hindley-Milner style inference over one substitution per expression, with
//! row-polymorphic objects, variadic functions, tuples, lists and generics.
//!
//! - `types`: monotypes and labels
//! - `scheme`: substitution, schemes and the structural rewrite
//! - `unification`: the unifier
//! - `inference`: the inference engine and type environments
//! - `builtins`: standard library schemes
//! - `display`: pretty printing

pub mod builtins;
pub mod display;
pub mod error;
pub mod inference;
pub mod scheme;
pub mod types;
mod unification;

pub use builtins::{library_doc, library_scheme, LIBRARY_NAMES};
pub use display::{pp_type, pp_types};
pub use error::TypeError;
pub use inference::{infer, TypeContext, TypeEnv};
pub use scheme::{map_type, Scheme, Subst, TvGen};
pub use types::{Label, TvId, Type};
