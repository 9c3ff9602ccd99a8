//! Free-variable analysis.

use crate::ast::{Expr, Selector};
use crate::names::canonical;
use std::collections::HashSet;

impl Expr {
    /// Names referenced but not bound by an enclosing lambda, in first-occurrence order.
    ///
    /// Lambda parameters shadow case-insensitively and only within their body.
    pub fn free_variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut bound = Vec::new();
        collect(self, &mut bound, &mut seen, &mut out);
        out
    }
}

fn collect(e: &Expr, bound: &mut Vec<String>, seen: &mut HashSet<String>, out: &mut Vec<String>) {
    match e {
        Expr::Variable { name } => {
            let key = canonical(name);
            if !bound.contains(&key) && seen.insert(name.clone()) {
                out.push(name.clone());
            }
        }
        Expr::Lambda { parameter, body } => {
            bound.push(canonical(parameter));
            collect(body, bound, seen, out);
            bound.pop();
        }
        Expr::Application { function, params } => {
            collect(function, bound, seen, out);
            for p in params {
                collect(p, bound, seen, out);
            }
        }
        Expr::List { elements } | Expr::Tuple { elements } => {
            for x in elements {
                collect(x, bound, seen, out);
            }
        }
        Expr::Object { values } => {
            for v in values.values() {
                collect(v, bound, seen, out);
            }
        }
        Expr::Field { expr, selector } => {
            collect(expr, bound, seen, out);
            if let Selector::Index(sub) = selector {
                collect(sub, bound, seen, out);
            }
        }
        Expr::Constant { .. } | Expr::Error { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Expr;
    use pretty_assertions::assert_eq;

    #[test]
    fn lambda_parameters_are_scoped_to_their_body() {
        // (x => x + y)(x)
        let e = Expr::app(
            Expr::lambda("x", Expr::call("+", vec![Expr::var("x"), Expr::var("y")])),
            vec![Expr::var("x")],
        );
        assert_eq!(e.free_variables(), vec!["+", "y", "x"]);
    }

    #[test]
    fn shadowing_ignores_case() {
        let e = Expr::lambda("X", Expr::field(Expr::var("x"), "foo"));
        assert!(e.free_variables().is_empty());
    }

    #[test]
    fn duplicates_are_reported_once() {
        let e = Expr::list(vec![Expr::var("a"), Expr::index(Expr::var("b"), Expr::var("a"))]);
        assert_eq!(e.free_variables(), vec!["a", "b"]);
    }
}
