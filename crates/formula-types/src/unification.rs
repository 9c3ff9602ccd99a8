//! Type unification with row-polymorphic objects.
//!
//! `Subst::unify` extends the substitution in place. Both sides are resolved
//! one level at a time, so a row nested in a list, a field or an argument is
//! still reached through its own variable. Open object rows are widened
//! functionally: the merged object is rebound on that variable instead of
//! being patched inside a shared type.
//!
//! Rules, in order:
//! - equal after application: no-op
//! - `Any` on either side: no-op
//! - variables bind, with an occurs check
//! - functions, lists, tuples, objects, generics and conditionals recurse
//! - constants must share a name

use std::collections::BTreeMap;

use formula_ast::ast::Expr;

use crate::display::pp_types;
use crate::error::TypeError;
use crate::scheme::Subst;
use crate::types::{TvId, Type};

fn node_text(node: Option<&Expr>) -> Option<String> {
    node.map(|n| n.to_string())
}

fn mismatch(t1: &Type, t2: &Type, node: Option<&Expr>) -> TypeError {
    let mut names = pp_types(&[t1, t2]).into_iter();
    TypeError::Mismatch {
        left: names.next().unwrap_or_default(),
        right: names.next().unwrap_or_default(),
        node: node_text(node),
    }
}

impl Subst {
    /// Bind `v` to `t` unless `t` mentions `v`.
    #[allow(clippy::result_large_err)]
    fn bind(&mut self, v: TvId, t: Type) -> Result<(), TypeError> {
        if let Type::Var(w) = t.peel() {
            if *w == v {
                return Ok(());
            }
        }
        let resolved = self.apply(&t).into_owned();
        if resolved.occurs(v) {
            let mut names = pp_types(&[&Type::Var(v), &resolved]).into_iter();
            return Err(TypeError::Occurs {
                var: names.next().unwrap_or_default(),
                ty: names.next().unwrap_or_default(),
            });
        }
        log::trace!("bind {v} := {t}");
        self.insert(v, t);
        Ok(())
    }

    /// Unify `type1` with `type2`, extending the substitution.
    ///
    /// `origin` names the variable `type1` was resolved from. When an object
    /// row is widened, that variable is rebound to the merged object so later
    /// lookups see every field. Without an explicit origin the root variable
    /// of `type1` is used, if any.
    #[allow(clippy::result_large_err)]
    pub fn unify(
        &mut self,
        type1: &Type,
        type2: &Type,
        origin: Option<TvId>,
        node: Option<&Expr>,
    ) -> Result<(), TypeError> {
        let (r1, a) = self.shallow(type1);
        let (v2, b) = self.shallow(type2);
        let (v1, a, b) = (origin.or(r1), a.clone(), b.clone());
        let (t1, t2) = (a.peel(), b.peel());
        if t1 == t2 {
            return Ok(());
        }
        log::trace!("unify {t1} ~ {t2}");
        match (t1, t2) {
            (Type::Any, _) | (_, Type::Any) => Ok(()),
            // a variable on the other side is bound by name so both keep sharing one row
            (Type::Var(x), _) => self.bind(*x, v2.map_or_else(|| b.clone(), Type::Var)),
            (_, Type::Var(_)) => self.unify(type2, type1, None, node),
            (
                Type::Fun { args: a1, ret: r1, variadic: va1 },
                Type::Fun { args: a2, ret: r2, variadic: va2 },
            ) => {
                if a1.len() != a2.len() {
                    match (va1, va2) {
                        (Some(v), _) if a1.len() < a2.len() => {
                            for extra in &a2[a1.len()..] {
                                self.unify(v, extra, None, node)?;
                            }
                        }
                        (_, Some(v)) if a2.len() < a1.len() => {
                            for extra in &a1[a2.len()..] {
                                self.unify(v, extra, None, node)?;
                            }
                        }
                        _ => {
                            return Err(TypeError::Arity {
                                expected: a1.len(),
                                provided: a2.len(),
                                node: node_text(node),
                            })
                        }
                    }
                }
                for (x, y) in a1.iter().zip(a2.iter()) {
                    self.unify(x, y, None, node)?;
                }
                if let (Some(x), Some(y)) = (va1, va2) {
                    self.unify(x, y, None, node)?;
                }
                self.unify(r1, r2, None, node)
            }
            (Type::List(x), Type::List(y)) => self.unify(x, y, None, node),
            (Type::Tuple(xs), Type::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(TypeError::TupleArity { left: xs.len(), right: ys.len() });
                }
                for (x, y) in xs.iter().zip(ys.iter()) {
                    self.unify(x, y, None, node)?;
                }
                Ok(())
            }
            (
                Type::Object { fields: f1, open: o1 },
                Type::Object { fields: f2, open: o2 },
            ) => self.unify_objects((f1, *o1), (f2, *o2), v1, v2, node),
            (Type::Generic { base: b1, args: a1 }, Type::Generic { base: b2, args: a2 }) => {
                self.unify(b1, b2, None, node)?;
                if a1.len() != a2.len() {
                    return Err(TypeError::GenericArity { left: a1.len(), right: a2.len() });
                }
                for (x, y) in a1.iter().zip(a2.iter()) {
                    self.unify(x, y, None, node)?;
                }
                Ok(())
            }
            (
                Type::Conditional { left: l1, right: r1, then: t1, otherwise: e1 },
                Type::Conditional { left: l2, right: r2, then: t2, otherwise: e2 },
            ) => {
                self.unify(l1, l2, None, node)?;
                self.unify(r1, r2, None, node)?;
                self.unify(t1, t2, None, node)?;
                self.unify(e1, e2, None, node)
            }
            (Type::Const(x), Type::Const(y)) if x == y => Ok(()),
            _ => Err(mismatch(&self.apply(t1), &self.apply(t2), node)),
        }
    }

    #[allow(clippy::result_large_err)]
    fn unify_objects(
        &mut self,
        (f1, open1): (&BTreeMap<String, Type>, bool),
        (f2, open2): (&BTreeMap<String, Type>, bool),
        v1: Option<TvId>,
        v2: Option<TvId>,
        node: Option<&Expr>,
    ) -> Result<(), TypeError> {
        let mut merged = f1.clone();
        for (key, ty) in f1 {
            match f2.get(key) {
                Some(other) => self.unify(ty, other, None, node)?,
                None if !open2 => {
                    return Err(TypeError::FieldMismatch { field: key.clone(), side: "second" })
                }
                None => {}
            }
        }
        for (key, ty) in f2 {
            if f1.contains_key(key) {
                continue;
            }
            if !open1 {
                return Err(TypeError::FieldMismatch { field: key.clone(), side: "first" });
            }
            merged.insert(key.clone(), ty.clone());
        }
        if merged.len() == f1.len() && open1 == (open1 && open2) && v1 == v2 {
            return Ok(());
        }
        let widened = Type::Object { fields: merged, open: open1 && open2 };
        match (v1, v2) {
            (Some(x), Some(y)) if x != y => {
                self.bind(x, widened)?;
                self.bind(y, Type::Var(x))
            }
            (Some(x), _) => self.bind(x, widened),
            (None, Some(y)) => self.bind(y, widened),
            // two literal objects; nothing refers to either again
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pp_type;
    use pretty_assertions::assert_eq;

    fn var(n: u32) -> Type {
        Type::Var(TvId(n))
    }

    #[test]
    fn binds_variables_both_ways() {
        let mut s = Subst::new();
        s.unify(&var(0), &Type::number(), None, None).unwrap();
        s.unify(&Type::string(), &var(1), None, None).unwrap();
        assert_eq!(s.apply(&var(0)).into_owned(), Type::number());
        assert_eq!(s.apply(&var(1)).into_owned(), Type::string());
    }

    #[test]
    fn occurs_check() {
        let mut s = Subst::new();
        let err = s.unify(&var(0), &Type::list(var(0)), None, None).unwrap_err();
        assert!(matches!(err, TypeError::Occurs { .. }));
    }

    #[test]
    fn any_unifies_with_everything() {
        let mut s = Subst::new();
        s.unify(&Type::Any, &Type::number(), None, None).unwrap();
        s.unify(&Type::list(Type::string()), &Type::Any, None, None).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn labels_are_transparent() {
        let mut s = Subst::new();
        s.unify(&Type::number().labeled("n"), &Type::number(), None, None).unwrap();
    }

    #[test]
    fn open_rows_widen_through_the_origin_variable() {
        let mut s = Subst::new();
        s.unify(&var(0), &Type::object([("a", Type::number())], true), None, None).unwrap();
        s.unify(&var(0), &Type::object([("b", Type::string())], true), None, None).unwrap();
        assert_eq!(pp_type(&s.apply(&var(0))), "{a: number, b: string, ...}");
    }

    #[test]
    fn open_row_meets_closed_object() {
        let mut s = Subst::new();
        s.unify(&var(0), &Type::object([("a", var(1))], true), None, None).unwrap();
        let closed = Type::object([("a", Type::number()), ("b", Type::boolean())], false);
        s.unify(&var(0), &closed, None, None).unwrap();
        assert_eq!(pp_type(&s.apply(&var(0))), "{a: number, b: boolean}");
        assert_eq!(s.apply(&var(1)).into_owned(), Type::number());
    }

    #[test]
    fn closed_object_rejects_missing_field() {
        let mut s = Subst::new();
        let a = Type::object([("a", Type::number())], false);
        let b = Type::object([("a", Type::number()), ("b", Type::number())], true);
        let err = s.unify(&a, &b, None, None).unwrap_err();
        assert_eq!(err.to_string(), "Object field mismatch: b missing in first type");
        let err = s.unify(&b, &a, None, None).unwrap_err();
        assert_eq!(err.to_string(), "Object field mismatch: b missing in second type");
    }

    #[test]
    fn variadic_tail_absorbs_extra_arguments() {
        let mut s = Subst::new();
        let f = Type::fun_variadic(vec![Type::number()], Type::number(), Type::number());
        let call = Type::fun(vec![Type::number(), var(0), var(1)], var(2));
        s.unify(&f, &call, None, None).unwrap();
        assert_eq!(s.apply(&var(1)).into_owned(), Type::number());
        assert_eq!(s.apply(&var(2)).into_owned(), Type::number());
    }

    #[test]
    fn tuple_arity() {
        let mut s = Subst::new();
        let err = s
            .unify(&Type::Tuple(vec![Type::number()]), &Type::Tuple(vec![var(0), var(1)]), None, None)
            .unwrap_err();
        assert_eq!(err, TypeError::TupleArity { left: 1, right: 2 });
    }

    #[test]
    fn constant_mismatch_message() {
        let mut s = Subst::new();
        let err = s
            .unify(&Type::number(), &Type::fun(vec![Type::number()], var(4)), None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: number vs (number) -> a");
    }
}
