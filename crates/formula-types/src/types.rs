//! Core type representations for the formula type system.
//!
//! This module defines:
//! - `TvId`: Type variable identifier
//! - `Label`: display-only metadata attached to a type
//! - `Type`: the monotype enum
//!
//! These types form the foundation for all other modules in formula-types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NUMBER: &str = "number";
pub const STRING: &str = "string";
pub const BOOLEAN: &str = "boolean";

/// Type variable identifier.
///
/// Display format: `%t0`, `%t1`, etc. Pretty printing renames variables to `a`, `b`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TvId(pub u32);

impl std::fmt::Display for TvId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%t{}", self.0)
    }
}

/// Display metadata; never semantically significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label: Option<String>,
    pub hint: Option<String>,
}

/// Monotypes.
///
/// - `Var`: unification variable
/// - `Const`: named constant type (`number`, `string`, `boolean`, extension types)
/// - `Fun`: fixed arguments plus an optional variadic tail
/// - `List`, `Tuple`: homogeneous and positional collections
/// - `Object`: a row of fields; `open` rows accept more fields during unification
/// - `Generic`, `Conditional`: parameterized and conditional types
/// - `Any`: unifies with everything
/// - `Labeled`: a type carrying a [`Label`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Var(TvId),
    Const(String),
    Fun { args: Vec<Type>, ret: Box<Type>, variadic: Option<Box<Type>> },
    List(Box<Type>),
    Tuple(Vec<Type>),
    Object { fields: BTreeMap<String, Type>, open: bool },
    Generic { base: Box<Type>, args: Vec<Type> },
    Conditional { left: Box<Type>, right: Box<Type>, then: Box<Type>, otherwise: Box<Type> },
    Any,
    Labeled(Box<Type>, Label),
}

impl Type {
    pub fn number() -> Type {
        Type::Const(NUMBER.into())
    }

    pub fn string() -> Type {
        Type::Const(STRING.into())
    }

    pub fn boolean() -> Type {
        Type::Const(BOOLEAN.into())
    }

    pub fn fun(args: Vec<Type>, ret: Type) -> Type {
        Type::Fun { args, ret: Box::new(ret), variadic: None }
    }

    pub fn fun_variadic(args: Vec<Type>, ret: Type, variadic: Type) -> Type {
        Type::Fun { args, ret: Box::new(ret), variadic: Some(Box::new(variadic)) }
    }

    pub fn list(elem: Type) -> Type {
        Type::List(Box::new(elem))
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Type)>, open: bool) -> Type {
        Type::Object { fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(), open }
    }

    pub fn generic(base: Type, args: Vec<Type>) -> Type {
        Type::Generic { base: Box::new(base), args }
    }

    pub fn conditional(left: Type, right: Type, then: Type, otherwise: Type) -> Type {
        Type::Conditional {
            left: Box::new(left),
            right: Box::new(right),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Attach a display label.
    pub fn labeled(self, label: impl Into<String>) -> Type {
        self.with_label(Label { label: Some(label.into()), hint: None })
    }

    pub fn with_label(self, label: Label) -> Type {
        match self {
            Type::Labeled(inner, _) => Type::Labeled(inner, label),
            t => Type::Labeled(Box::new(t), label),
        }
    }

    /// The type underneath any labels.
    pub fn peel(&self) -> &Type {
        let mut t = self;
        while let Type::Labeled(inner, _) = t {
            t = inner;
        }
        t
    }

    pub fn label(&self) -> Option<&Label> {
        match self {
            Type::Labeled(_, l) => Some(l),
            _ => None,
        }
    }

    /// Copy with every label removed.
    pub fn strip_labels(&self) -> Type {
        match self {
            Type::Labeled(inner, _) => inner.strip_labels(),
            Type::Var(_) | Type::Const(_) | Type::Any => self.clone(),
            Type::Fun { args, ret, variadic } => Type::Fun {
                args: args.iter().map(Type::strip_labels).collect(),
                ret: Box::new(ret.strip_labels()),
                variadic: variadic.as_ref().map(|v| Box::new(v.strip_labels())),
            },
            Type::List(x) => Type::list(x.strip_labels()),
            Type::Tuple(xs) => Type::Tuple(xs.iter().map(Type::strip_labels).collect()),
            Type::Object { fields, open } => Type::Object {
                fields: fields.iter().map(|(k, v)| (k.clone(), v.strip_labels())).collect(),
                open: *open,
            },
            Type::Generic { base, args } => {
                Type::generic(base.strip_labels(), args.iter().map(Type::strip_labels).collect())
            }
            Type::Conditional { left, right, then, otherwise } => Type::conditional(
                left.strip_labels(),
                right.strip_labels(),
                then.strip_labels(),
                otherwise.strip_labels(),
            ),
        }
    }

    pub fn is_const(&self, name: &str) -> bool {
        matches!(self.peel(), Type::Const(n) if n == name)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::pp_type(self))
    }
}
