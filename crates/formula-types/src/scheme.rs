//! Type schemes, substitutions and the structural rewrite they are built on.
//!
//! This module provides:
//! - `map_type`: identity-preserving structural rewrite of type variables
//! - `Scheme`: polytype with universally quantified type variables
//! - `Subst`: substitution from type variables to types, chased on application
//! - `TvGen`: fresh type variable generator owned by one inference run
//! - `Type::free_vars`: read-only free variable collection

use crate::{TvId, Type};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Type variable generator: produces fresh type variables.
#[derive(Debug)]
pub struct TvGen {
    next: u32,
}

impl TvGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn fresh_id(&mut self) -> TvId {
        let id = self.next;
        self.next += 1;
        TvId(id)
    }

    pub fn fresh(&mut self) -> Type {
        Type::Var(self.fresh_id())
    }
}

impl Default for TvGen {
    fn default() -> Self {
        Self::new()
    }
}

fn map_slice<F>(xs: &[Type], f: &mut F) -> Option<Vec<Type>>
where
    F: FnMut(TvId) -> Option<Type>,
{
    let mapped: Vec<Cow<'_, Type>> = xs.iter().map(|x| map_type(x, f)).collect();
    if mapped.iter().all(|c| matches!(c, Cow::Borrowed(_))) {
        None
    } else {
        Some(mapped.into_iter().map(Cow::into_owned).collect())
    }
}

fn map_box<F>(x: &Type, f: &mut F) -> Option<Box<Type>>
where
    F: FnMut(TvId) -> Option<Type>,
{
    match map_type(x, f) {
        Cow::Borrowed(_) => None,
        Cow::Owned(t) => Some(Box::new(t)),
    }
}

/// Rewrite every type variable `v` for which `f(v)` returns a replacement.
///
/// Returns `Cow::Borrowed(t)` when nothing inside changed, so callers can
/// detect a no-op rewrite without comparing structures.
pub fn map_type<'a, F>(t: &'a Type, f: &mut F) -> Cow<'a, Type>
where
    F: FnMut(TvId) -> Option<Type>,
{
    match t {
        Type::Var(v) => match f(*v) {
            Some(r) => Cow::Owned(r),
            None => Cow::Borrowed(t),
        },
        Type::Const(_) | Type::Any => Cow::Borrowed(t),
        Type::List(x) => match map_box(x, f) {
            None => Cow::Borrowed(t),
            Some(x) => Cow::Owned(Type::List(x)),
        },
        Type::Labeled(x, l) => match map_box(x, f) {
            None => Cow::Borrowed(t),
            Some(x) => Cow::Owned(Type::Labeled(x, l.clone())),
        },
        Type::Tuple(xs) => match map_slice(xs, f) {
            None => Cow::Borrowed(t),
            Some(xs) => Cow::Owned(Type::Tuple(xs)),
        },
        Type::Fun { args, ret, variadic } => {
            let args2 = map_slice(args, f);
            let ret2 = map_box(ret, f);
            let var2 = variadic.as_ref().and_then(|v| map_box(v, f));
            if args2.is_none() && ret2.is_none() && var2.is_none() {
                return Cow::Borrowed(t);
            }
            Cow::Owned(Type::Fun {
                args: args2.unwrap_or_else(|| args.clone()),
                ret: ret2.unwrap_or_else(|| ret.clone()),
                variadic: var2.or_else(|| variadic.clone()),
            })
        }
        Type::Object { fields, open } => {
            let mut changed = false;
            let mapped: Vec<(&String, Cow<'_, Type>)> = fields
                .iter()
                .map(|(k, v)| {
                    let m = map_type(v, f);
                    changed |= matches!(m, Cow::Owned(_));
                    (k, m)
                })
                .collect();
            if !changed {
                return Cow::Borrowed(t);
            }
            Cow::Owned(Type::Object {
                fields: mapped.into_iter().map(|(k, v)| (k.clone(), v.into_owned())).collect(),
                open: *open,
            })
        }
        Type::Generic { base, args } => {
            let base2 = map_box(base, f);
            let args2 = map_slice(args, f);
            if base2.is_none() && args2.is_none() {
                return Cow::Borrowed(t);
            }
            Cow::Owned(Type::Generic {
                base: base2.unwrap_or_else(|| base.clone()),
                args: args2.unwrap_or_else(|| args.clone()),
            })
        }
        Type::Conditional { left, right, then, otherwise } => {
            let parts = [left, right, then, otherwise].map(|x| map_box(x, f));
            if parts.iter().all(Option::is_none) {
                return Cow::Borrowed(t);
            }
            let [l, r, th, ot] = parts;
            Cow::Owned(Type::Conditional {
                left: l.unwrap_or_else(|| left.clone()),
                right: r.unwrap_or_else(|| right.clone()),
                then: th.unwrap_or_else(|| then.clone()),
                otherwise: ot.unwrap_or_else(|| otherwise.clone()),
            })
        }
    }
}

fn collect_vars(t: &Type, out: &mut Vec<TvId>) {
    match t {
        Type::Var(v) => {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        Type::Const(_) | Type::Any => {}
        Type::List(x) | Type::Labeled(x, _) => collect_vars(x, out),
        Type::Tuple(xs) => xs.iter().for_each(|x| collect_vars(x, out)),
        Type::Fun { args, ret, variadic } => {
            args.iter().for_each(|x| collect_vars(x, out));
            collect_vars(ret, out);
            if let Some(v) = variadic {
                collect_vars(v, out);
            }
        }
        Type::Object { fields, .. } => fields.values().for_each(|x| collect_vars(x, out)),
        Type::Generic { base, args } => {
            collect_vars(base, out);
            args.iter().for_each(|x| collect_vars(x, out));
        }
        Type::Conditional { left, right, then, otherwise } => {
            for x in [left, right, then, otherwise] {
                collect_vars(x, out);
            }
        }
    }
}

impl Type {
    /// Free type variables in order of first appearance.
    pub fn free_vars(&self) -> Vec<TvId> {
        let mut out = Vec::new();
        collect_vars(self, &mut out);
        out
    }

    pub fn occurs(&self, v: TvId) -> bool {
        self.free_vars().contains(&v)
    }
}

/// A type scheme with universally quantified type variables.
///
/// Every variable in `vars` occurs free in `ty`; `vars = []` is monomorphic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub vars: Vec<TvId>,
    pub ty: Type,
}

impl Scheme {
    pub fn mono(ty: Type) -> Self {
        Self { vars: Vec::new(), ty }
    }

    pub fn poly(vars: Vec<TvId>, ty: Type) -> Self {
        Self { vars, ty }
    }

    /// Quantify every free variable of `ty`.
    pub fn generalize(ty: Type) -> Self {
        Self { vars: ty.free_vars(), ty }
    }

    /// Replace each quantified variable with a fresh one; free variables stay.
    pub fn instantiate(&self, tv: &mut TvGen) -> Type {
        if self.vars.is_empty() {
            return self.ty.clone();
        }
        let fresh: HashMap<TvId, Type> = self.vars.iter().map(|v| (*v, tv.fresh())).collect();
        map_type(&self.ty, &mut |v| fresh.get(&v).cloned()).into_owned()
    }

    /// Variables renumbered from `%t0` in order of appearance, labels removed.
    pub fn canonical(&self) -> Scheme {
        let order = self.ty.free_vars();
        let renaming: HashMap<TvId, TvId> =
            order.iter().enumerate().map(|(i, v)| (*v, TvId(i as u32))).collect();
        let ty = map_type(&self.ty, &mut |v| renaming.get(&v).map(|w| Type::Var(*w)));
        let mut vars: Vec<TvId> = self.vars.iter().filter_map(|v| renaming.get(v).copied()).collect();
        vars.sort();
        Scheme { vars, ty: ty.strip_labels() }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::pp_type(&self.ty))
    }
}

/// Substitution: mapping from type variables to types.
///
/// Lives for one inference run. Application chases bindings, so a variable
/// bound to another bound variable resolves all the way down.
#[derive(Default, Debug, Clone)]
pub struct Subst(pub(crate) HashMap<TvId, Type>);

impl Subst {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, v: TvId) -> Option<&Type> {
        self.0.get(&v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, v: TvId, t: Type) {
        self.0.insert(v, t);
    }

    /// Resolve every bound variable in `t`; borrowed when nothing is bound.
    pub fn apply<'a>(&self, t: &'a Type) -> Cow<'a, Type> {
        map_type(t, &mut |v| self.0.get(&v).map(|b| self.apply(b).into_owned()))
    }

    /// Follow bindings from `t` until an unbound variable or a non-variable
    /// type. Returns the last variable passed and the type reached; children
    /// of that type are left unresolved so their own variables stay visible.
    pub fn shallow<'a>(&'a self, t: &'a Type) -> (Option<TvId>, &'a Type) {
        let mut last = None;
        let mut cur = t;
        while let Type::Var(v) = cur.peel() {
            last = Some(*v);
            match self.0.get(v) {
                Some(next) => cur = next,
                None => break,
            }
        }
        (last, cur)
    }

    /// The last variable in the chain of variable-to-variable bindings starting at `t`.
    pub fn root_var(&self, t: &Type) -> Option<TvId> {
        let Type::Var(mut v) = t.peel() else { return None };
        while let Some(Type::Var(w)) = self.0.get(&v).map(Type::peel) {
            v = *w;
        }
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unchanged_rewrite_is_borrowed() {
        let t = Type::fun(vec![Type::number(), Type::Var(TvId(0))], Type::list(Type::string()));
        let s = Subst::new();
        assert!(matches!(s.apply(&t), Cow::Borrowed(_)));
        let mut s = Subst::new();
        s.insert(TvId(1), Type::boolean());
        assert!(matches!(s.apply(&t), Cow::Borrowed(_)));
        s.insert(TvId(0), Type::boolean());
        assert!(matches!(s.apply(&t), Cow::Owned(_)));
    }

    #[test]
    fn apply_chases_chains() {
        let mut s = Subst::new();
        s.insert(TvId(0), Type::Var(TvId(1)));
        s.insert(TvId(1), Type::list(Type::Var(TvId(2))));
        s.insert(TvId(2), Type::number());
        assert_eq!(s.apply(&Type::Var(TvId(0))).into_owned(), Type::list(Type::number()));
        assert_eq!(s.root_var(&Type::Var(TvId(0))), Some(TvId(1)));
        assert_eq!(s.root_var(&Type::number()), None);
    }

    #[test]
    fn shallow_stops_at_the_first_structure() {
        let mut s = Subst::new();
        s.insert(TvId(0), Type::Var(TvId(1)));
        s.insert(TvId(1), Type::list(Type::Var(TvId(2))));
        s.insert(TvId(2), Type::number());
        let (var, ty) = s.shallow(&Type::Var(TvId(0)));
        assert_eq!(var, Some(TvId(1)));
        assert_eq!(ty, &Type::list(Type::Var(TvId(2))));
        assert_eq!(s.shallow(&Type::Var(TvId(7))), (Some(TvId(7)), &Type::Var(TvId(7))));
        assert_eq!(s.shallow(&Type::string()), (None, &Type::string()));
    }

    #[test]
    fn free_vars_in_order() {
        let t = Type::fun(
            vec![Type::Var(TvId(5)), Type::object([("a", Type::Var(TvId(2)))], true)],
            Type::Var(TvId(5)),
        );
        assert_eq!(t.free_vars(), vec![TvId(5), TvId(2)]);
    }

    #[test]
    fn instantiate_only_touches_quantified_vars() {
        let sc = Scheme::poly(vec![TvId(0)], Type::fun(vec![Type::Var(TvId(0))], Type::Var(TvId(9))));
        let mut tv = TvGen::new();
        tv.fresh();
        let t = sc.instantiate(&mut tv);
        assert_eq!(t, Type::fun(vec![Type::Var(TvId(1))], Type::Var(TvId(9))));
    }

    #[test]
    fn canonical_renumbers_and_strips_labels() {
        let sc = Scheme::generalize(Type::fun(
            vec![Type::Var(TvId(7)).labeled("x")],
            Type::Var(TvId(3)),
        ));
        assert_eq!(
            sc.canonical(),
            Scheme::poly(
                vec![TvId(0), TvId(1)],
                Type::fun(vec![Type::Var(TvId(0))], Type::Var(TvId(1)))
            )
        );
    }
}
