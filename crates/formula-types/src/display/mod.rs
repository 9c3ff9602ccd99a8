//! Type display and pretty-printing functionality.
//!
//! - `pretty`: variables renamed `a`, `b`, ..., `z`, `aa`, `ab`, ... in order of appearance

mod pretty;

pub use pretty::{pp_type, pp_types, var_name};
