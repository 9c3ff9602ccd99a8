//! Runtime value types for formula evaluation.
//!
//! Containers hold cells rather than values, so a list element or object
//! field can change without rebuilding its container. [`Plain`] is the
//! cell-free snapshot used for comparison, display and JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use formula_ast::ast::Expr;
use formula_ast::ext::ExtValue;
use formula_rational::Rational;
use formula_types::Type;
use num_traits::ToPrimitive;
use serde::{Serialize, Serializer};

use crate::cell::{Cell, Sheet};
use crate::env::Environment;
use crate::error::EvalError;

/// Library function: receives its argument cells and returns the result cell.
pub type NativeFn = fn(&Sheet, &[Cell]) -> Result<Cell, EvalError>;

#[derive(Clone)]
pub enum Func {
    Native { name: &'static str, f: NativeFn },
    /// A lambda together with the environment it was evaluated in.
    Closure { param: String, body: Rc<Expr>, env: Box<Environment> },
}

impl Func {
    pub fn name(&self) -> String {
        match self {
            Func::Native { name, .. } => (*name).to_string(),
            Func::Closure { param, .. } => format!("λ{param}"),
        }
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Func::Native { name, .. } => write!(f, "Native({name})"),
            Func::Closure { param, body, .. } => write!(f, "Closure({param} => {body})"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Number(Rational),
    Str(String),
    Bool(bool),
    Ext(ExtValue),
    List(Vec<Cell>),
    Tuple(Vec<Cell>),
    Object(BTreeMap<String, Cell>),
    Func(Func),
    Null,
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Ext(_) => "extension",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Object(_) => "object",
            Value::Func(_) => "function",
            Value::Null => "null",
        }
    }

    /// Snapshot with every nested cell read.
    pub fn uncellify(&self) -> Result<Plain, EvalError> {
        let all = |cells: &[Cell]| -> Result<Vec<Plain>, EvalError> {
            cells.iter().map(|c| c.get()?.uncellify()).collect()
        };
        Ok(match self {
            Value::Number(r) => Plain::Number(r.clone()),
            Value::Str(s) => Plain::Str(s.clone()),
            Value::Bool(b) => Plain::Bool(*b),
            Value::Ext(e) => Plain::Ext(e.clone()),
            Value::List(cells) => Plain::List(all(cells)?),
            Value::Tuple(cells) => Plain::Tuple(all(cells)?),
            Value::Object(fields) => Plain::Object(
                fields
                    .iter()
                    .map(|(k, c)| Ok((k.clone(), c.get()?.uncellify()?)))
                    .collect::<Result<_, EvalError>>()?,
            ),
            Value::Func(f) => Plain::Function(f.name()),
            Value::Null => Plain::Null,
        })
    }

    /// Monotype of a host-provided value; lists are typed by their first element.
    pub fn type_of(&self) -> Result<Type, EvalError> {
        Ok(match self {
            Value::Number(_) => Type::number(),
            Value::Str(_) => Type::string(),
            Value::Bool(_) => Type::boolean(),
            Value::Ext(e) => Type::Const(e.kind.clone()),
            Value::List(cells) => match cells.first() {
                Some(c) => Type::list(c.get()?.type_of()?),
                None => Type::list(Type::Any),
            },
            Value::Tuple(cells) => Type::Tuple(
                cells.iter().map(|c| c.get()?.type_of()).collect::<Result<_, _>>()?,
            ),
            Value::Object(fields) => Type::Object {
                fields: fields
                    .iter()
                    .map(|(k, c)| Ok((k.clone(), c.get()?.type_of()?)))
                    .collect::<Result<_, EvalError>>()?,
                open: false,
            },
            Value::Func(_) | Value::Null => Type::Any,
        })
    }
}

impl From<Rational> for Value {
    fn from(r: Rational) -> Self {
        Value::Number(r)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Rational::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A value with no cells left inside.
#[derive(Debug, Clone, PartialEq)]
pub enum Plain {
    Null,
    Bool(bool),
    Number(Rational),
    Str(String),
    Ext(ExtValue),
    List(Vec<Plain>),
    Tuple(Vec<Plain>),
    Object(BTreeMap<String, Plain>),
    Function(String),
}

/// JSON shape: integers as numbers, other rationals as `"num/den"` strings,
/// tuples as arrays and extension values as their raw text.
impl Serialize for Plain {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Plain::Null => s.serialize_unit(),
            Plain::Bool(b) => s.serialize_bool(*b),
            Plain::Number(r) => match r.is_integer().then(|| r.to_bigint().to_i64()).flatten() {
                Some(i) => s.serialize_i64(i),
                None => s.serialize_str(&r.to_string()),
            },
            Plain::Str(x) => s.serialize_str(x),
            Plain::Ext(e) => s.serialize_str(&e.raw),
            Plain::List(xs) | Plain::Tuple(xs) => s.collect_seq(xs),
            Plain::Object(m) => s.collect_map(m),
            Plain::Function(name) => s.serialize_str(name),
        }
    }
}

fn join(xs: &[Plain]) -> String {
    xs.iter().map(Plain::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for Plain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plain::Null => f.write_str("null"),
            Plain::Bool(b) => write!(f, "{b}"),
            Plain::Number(r) => write!(f, "{r}"),
            Plain::Str(s) => f.write_str(s),
            Plain::Ext(e) => write!(f, "{e}"),
            Plain::List(xs) => write!(f, "[{}]", join(xs)),
            Plain::Tuple(xs) => write!(f, "{{{}}}", join(xs)),
            Plain::Object(m) => {
                let items: Vec<String> = m.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Plain::Function(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Plain {
    fn from(i: i64) -> Self {
        Plain::Number(Rational::from(i))
    }
}

impl From<i32> for Plain {
    fn from(i: i32) -> Self {
        Plain::Number(Rational::from(i))
    }
}

impl From<Rational> for Plain {
    fn from(r: Rational) -> Self {
        Plain::Number(r)
    }
}

impl From<&str> for Plain {
    fn from(s: &str) -> Self {
        Plain::Str(s.to_string())
    }
}

impl From<bool> for Plain {
    fn from(b: bool) -> Self {
        Plain::Bool(b)
    }
}

impl<T: Into<Plain>> From<Vec<T>> for Plain {
    fn from(xs: Vec<T>) -> Self {
        Plain::List(xs.into_iter().map(Into::into).collect())
    }
}
