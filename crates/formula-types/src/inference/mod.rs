//! Type inference engine for formula expressions.
//!
//! One call to [`infer`] owns a fresh variable supply and substitution. The
//! result is generalized over all of its free variables.

pub(crate) mod context;
pub(crate) mod expr;

pub use context::{TypeContext, TypeEnv};

use formula_ast::ast::Expr;
use std::borrow::Cow;

use crate::display::pp_type;
use crate::error::TypeError;
use crate::scheme::Scheme;
use context::InferCtx;

/// Infer the type scheme of `e` in `ctx`.
#[allow(clippy::result_large_err)]
pub fn infer(ctx: &dyn TypeContext, e: &Expr) -> Result<Scheme, TypeError> {
    let mut ictx = InferCtx::new(ctx);
    let result = expr::infer_expr(&mut ictx, e)?;
    let resolved = ictx.subst.apply(&result).into_owned();
    if let Cow::Owned(_) = ictx.subst.apply(&resolved) {
        return Err(TypeError::Internal { ty: pp_type(&resolved), node: Some(e.to_string()) });
    }
    log::debug!("inferred {resolved} for {e}");
    Ok(Scheme::generalize(resolved))
}
