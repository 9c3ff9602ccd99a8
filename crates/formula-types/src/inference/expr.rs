//! Expression type inference.
//!
//! Walks an expression once, extending the run's substitution through
//! unification. Results are returned unresolved and applied once by
//! [`super::infer`], so an object row is always reached through the variable
//! it is bound to and widening it is seen everywhere it is used.

use std::collections::BTreeMap;

use formula_ast::ast::{Constant, Expr, Selector};

use super::context::InferCtx;
use crate::display::pp_type;
use crate::error::TypeError;
use crate::types::Type;

#[allow(clippy::result_large_err)]
pub(crate) fn infer_expr(ictx: &mut InferCtx<'_>, e: &Expr) -> Result<Type, TypeError> {
    match e {
        Expr::Constant { value } => Ok(constant_type(ictx, value)),
        Expr::Variable { name } => {
            let ctx = ictx.ctx;
            if let Some(sc) = ctx.library_scheme(name) {
                return Ok(sc.instantiate(&mut ictx.tv));
            }
            if let Some(t) = ictx.local(name) {
                return Ok(t.clone());
            }
            match ctx.scheme_of(name) {
                Some(sc) => Ok(sc.instantiate(&mut ictx.tv)),
                None => Err(TypeError::UnboundVariable(name.clone())),
            }
        }
        Expr::Application { function, params } => {
            let fn_ty = infer_expr(ictx, function)?;
            let mut args = Vec::with_capacity(params.len());
            for p in params {
                args.push(infer_expr(ictx, p)?);
            }
            let ret = ictx.tv.fresh();
            ictx.subst.unify(&fn_ty, &Type::fun(args, ret.clone()), None, Some(e))?;
            Ok(ret)
        }
        Expr::List { elements } => {
            let elem = ictx.tv.fresh();
            for x in elements {
                let t = infer_expr(ictx, x)?;
                ictx.subst.unify(&t, &elem, None, Some(e))?;
            }
            Ok(Type::list(elem))
        }
        Expr::Tuple { elements } => {
            let mut ts = Vec::with_capacity(elements.len());
            for x in elements {
                ts.push(infer_expr(ictx, x)?);
            }
            Ok(Type::Tuple(ts))
        }
        Expr::Object { values } => {
            let mut fields = BTreeMap::new();
            for (k, v) in values {
                fields.insert(k.clone(), infer_expr(ictx, v)?);
            }
            Ok(Type::Object { fields, open: false })
        }
        Expr::Field { expr, selector: Selector::Name(field) } => {
            let raw = infer_expr(ictx, expr)?;
            let (origin, base) = ictx.subst.shallow(&raw);
            let base = base.clone();
            match base.peel() {
                Type::Object { fields, open: false } => match fields.get(field) {
                    Some(t) => Ok(t.clone()),
                    None => Err(TypeError::UnknownField {
                        field: field.clone(),
                        node: Some(e.to_string()),
                    }),
                },
                Type::Object { fields, open: true } if fields.contains_key(field) => {
                    Ok(fields[field].clone())
                }
                Type::Var(_) | Type::Object { .. } => {
                    let f = ictx.tv.fresh();
                    let row = Type::object([(field.clone(), f.clone())], true);
                    ictx.subst.unify(&raw, &row, origin, Some(e))?;
                    Ok(f)
                }
                other => Err(TypeError::FieldOnNonObject {
                    expected: "an object",
                    found: pp_type(&ictx.subst.apply(other)),
                    node: Some(e.to_string()),
                }),
            }
        }
        Expr::Field { expr, selector: Selector::Index(sub) } => {
            let raw = infer_expr(ictx, expr)?;
            let index = infer_expr(ictx, sub)?;
            ictx.subst.unify(&index, &Type::number(), None, Some(e))?;
            let base = ictx.subst.shallow(&raw).1.clone();
            match base.peel() {
                Type::List(elem) => Ok((**elem).clone()),
                Type::Var(_) => {
                    let f = ictx.tv.fresh();
                    ictx.subst.unify(&raw, &Type::list(f.clone()), None, Some(e))?;
                    Ok(f)
                }
                other => Err(TypeError::FieldOnNonObject {
                    expected: "a list",
                    found: pp_type(&ictx.subst.apply(other)),
                    node: Some(e.to_string()),
                }),
            }
        }
        Expr::Lambda { parameter, body } => {
            let p = ictx.tv.fresh();
            ictx.push_local(parameter, p.clone());
            let body_ty = infer_expr(ictx, body);
            ictx.pop_local();
            Ok(Type::fun(vec![p], body_ty?))
        }
        Expr::Error { value } => Err(TypeError::Parse(value.clone())),
    }
}

fn constant_type(ictx: &InferCtx<'_>, value: &Constant) -> Type {
    match value {
        Constant::Number(_) => Type::number(),
        Constant::Str(_) => Type::string(),
        Constant::Bool(_) => Type::boolean(),
        Constant::Extension(v) => {
            let name = ictx
                .ctx
                .extensions()
                .iter()
                .find(|ext| ext.is_instance(v))
                .map(|ext| ext.type_name().to_string())
                .unwrap_or_else(|| v.kind.clone());
            Type::Const(name)
        }
    }
}
