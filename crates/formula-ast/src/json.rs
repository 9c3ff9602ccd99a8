//! JSON encoding of expressions.
//!
//! The encoding tags each node with `type` (`app`, `const`, `var`, `lst`, `tup`,
//! `obj`, `field`, `λ`, `error`). Constant strings of the form `num/den` load as
//! numbers; [`rewrite_extensions`] turns other matching strings into extension
//! literals in place.

use crate::ast::{Constant, Expr};
use crate::ext::{recognize, ExtensionRef};

#[derive(thiserror::Error, Debug)]
pub enum AstError {
    #[error("invalid JSON AST: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_json(src: &str) -> Result<Expr, AstError> {
    Ok(serde_json::from_str(src)?)
}

/// Load and apply the extension rewrite.
pub fn from_json_with(src: &str, exts: &[ExtensionRef]) -> Result<Expr, AstError> {
    let mut e = from_json(src)?;
    rewrite_extensions(&mut e, exts);
    Ok(e)
}

pub fn to_json(e: &Expr) -> Result<String, AstError> {
    Ok(serde_json::to_string(e)?)
}

/// Replace string constants recognized by an extension, in place.
pub fn rewrite_extensions(e: &mut Expr, exts: &[ExtensionRef]) {
    if exts.is_empty() {
        return;
    }
    if let Expr::Constant { value } = e {
        if let Constant::Str(s) = value {
            if let Some(v) = recognize(exts, s) {
                *value = Constant::Extension(v);
            }
        }
        return;
    }
    e.for_each_child_mut(|c| rewrite_extensions(c, exts));
}

/// Literal expression for plain JSON data: arrays become lists, objects become objects.
pub fn from_data(v: &serde_json::Value) -> Expr {
    use serde_json::Value;
    match v {
        Value::Array(xs) => Expr::list(xs.iter().map(from_data).collect()),
        Value::Object(m) => Expr::object(m.iter().map(|(k, v)| (k.clone(), from_data(v)))),
        Value::Bool(b) => Expr::boolean(*b),
        Value::String(s) => Expr::string(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Expr::number(i),
            None => n
                .as_f64()
                .and_then(|f| formula_rational::Rational::from_float(f).ok())
                .map(|r| Expr::Constant { value: Constant::Number(r) })
                .unwrap_or_else(|| Expr::error(format!("unsupported number {n}"))),
        },
        Value::Null => Expr::error("null has no literal"),
    }
}
