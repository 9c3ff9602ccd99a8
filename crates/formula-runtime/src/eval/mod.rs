//! Expression evaluation into cells.
//!
//! Each node becomes a cell on the environment's sheet. Applications,
//! field reads and library calls are derived cells, so they recompute when
//! a cell they read is set or redirected.

use std::rc::Rc;

use formula_ast::ast::{Constant, Expr, Selector};

use crate::cell::{Cell, Sheet};
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{Func, Value};

fn unexpected(op: &str, v: &Value) -> EvalError {
    EvalError::Unexpected { op: op.to_string(), found: v.kind().to_string() }
}

/// Apply a function value to argument cells.
///
/// A closure takes one argument; extra arguments are applied to its result
/// in turn.
pub fn apply(sheet: &Sheet, f: &Value, args: &[Cell]) -> Result<Cell, EvalError> {
    match f {
        Value::Func(Func::Native { f, .. }) => f(sheet, args),
        Value::Func(Func::Closure { param, body, env }) => {
            let (first, rest) = args.split_first().ok_or_else(|| EvalError::Arity {
                name: format!("λ{param}"),
                expected: "1 argument".into(),
                provided: 0,
            })?;
            let result = evaluate(&env.with_value(param, first.clone()), body)?;
            if rest.is_empty() {
                Ok(result)
            } else {
                apply(sheet, &result.get()?, rest)
            }
        }
        other => Err(EvalError::NotFunction(other.kind().to_string())),
    }
}

/// Evaluate `e` in `env`; the returned cell holds the value of the whole expression.
pub fn evaluate(env: &Environment, e: &Expr) -> Result<Cell, EvalError> {
    let sheet = env.sheet();
    match e {
        Expr::Constant { value } => {
            let v = match value {
                Constant::Number(r) => Value::Number(r.clone()),
                Constant::Str(s) => Value::Str(s.clone()),
                Constant::Bool(b) => Value::Bool(*b),
                Constant::Extension(x) => Value::Ext(x.clone()),
            };
            Ok(sheet.new_cell(v, "const"))
        }
        Expr::Variable { name } => env.read(name).ok_or_else(|| EvalError::Unbound(name.clone())),
        Expr::Application { function, params } => {
            let func = evaluate(env, function)?;
            let args = params.iter().map(|p| evaluate(env, p)).collect::<Result<Vec<_>, _>>()?;
            let s = sheet.clone();
            Ok(sheet.map(vec![func], "(app)", move |v| apply(&s, &v[0], &args)?.get()))
        }
        Expr::List { elements } => {
            let cells = elements.iter().map(|x| evaluate(env, x)).collect::<Result<_, _>>()?;
            Ok(sheet.new_cell(Value::List(cells), "[]"))
        }
        Expr::Tuple { elements } => {
            let cells = elements.iter().map(|x| evaluate(env, x)).collect::<Result<_, _>>()?;
            Ok(sheet.new_cell(Value::Tuple(cells), "{}"))
        }
        Expr::Object { values } => {
            let fields = values
                .iter()
                .map(|(k, x)| Ok((k.clone(), evaluate(env, x)?)))
                .collect::<Result<_, EvalError>>()?;
            Ok(sheet.new_cell(Value::Object(fields), "{:}"))
        }
        Expr::Field { expr, selector: Selector::Name(field) } => {
            let base = evaluate(env, expr)?;
            let field = field.clone();
            Ok(sheet.map(vec![base], ".", move |v| match &v[0] {
                Value::Object(fields) => fields.get(&field).map_or(Ok(Value::Null), Cell::get),
                other => Err(unexpected(&format!(".{field}"), other)),
            }))
        }
        Expr::Field { expr, selector: Selector::Index(sub) } => {
            let base = evaluate(env, expr)?;
            let index = evaluate(env, sub)?;
            Ok(sheet.map(vec![base, index], "[:]", |v| match (&v[0], &v[1]) {
                (Value::List(cells) | Value::Tuple(cells), Value::Number(r)) => {
                    if r.is_negative() || !r.is_integer() {
                        return Err(unexpected("index", &v[1]));
                    }
                    match r.to_index().and_then(|i| cells.get(i)) {
                        Some(c) => c.get(),
                        None => Ok(Value::Null),
                    }
                }
                (Value::Object(fields), Value::Str(key)) => {
                    fields.get(key).map_or(Ok(Value::Null), Cell::get)
                }
                (Value::List(_) | Value::Tuple(_) | Value::Object(_), sel) => {
                    Err(unexpected("index", sel))
                }
                (other, _) => Err(unexpected("index", other)),
            }))
        }
        Expr::Lambda { parameter, body } => {
            let closure = Func::Closure {
                param: parameter.clone(),
                body: Rc::new((**body).clone()),
                env: Box::new(env.clone()),
            };
            Ok(sheet.new_cell(Value::Func(closure), "λ"))
        }
        Expr::Error { value } => Err(EvalError::Parse(value.clone())),
    }
}
