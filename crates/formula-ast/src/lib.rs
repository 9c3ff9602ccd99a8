//! formula-ast: expression tree shared by the parser, the type checker and the evaluator.
//!
//! - `span`: byte ranges into source text
//! - `ast`: `Expr`, `Constant`, `Selector` and convenience constructors
//! - `pretty`: infix rendering of expressions
//! - `deps`: free-variable analysis
//! - `names`: the case-insensitive name table used by environments and programs
//! - `ext`: pluggable extension constants
//! - `json`: JSON AST loading and the legacy extension rewrite

pub mod deps;
pub mod ext;
pub mod json;
pub mod names;

pub mod span {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub struct Span {
        pub offset: usize,
        pub len: usize,
    }
    impl Span {
        pub fn new(offset: usize, len: usize) -> Self {
            Self { offset, len }
        }
    }
}

pub mod ast {
    use crate::ext::ExtValue;
    use formula_rational::Rational;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    /// Literal payload of a constant node.
    ///
    /// Deserialization tries the variants in order, so JSON numbers and
    /// `"num/den"` strings become numbers while other strings stay strings.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(untagged)]
    pub enum Constant {
        Number(Rational),
        Bool(bool),
        Str(String),
        Extension(ExtValue),
    }

    /// Field access selector: `.name` or `[expr]`.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum Selector {
        #[serde(rename = "field")]
        Name(String),
        #[serde(rename = "sub")]
        Index(Box<Expr>),
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(tag = "type")]
    pub enum Expr {
        #[serde(rename = "app")]
        Application { function: Box<Expr>, params: Vec<Expr> },
        #[serde(rename = "const")]
        Constant { value: Constant },
        #[serde(rename = "var")]
        Variable { name: String },
        #[serde(rename = "lst")]
        List { elements: Vec<Expr> },
        #[serde(rename = "tup")]
        Tuple { elements: Vec<Expr> },
        #[serde(rename = "obj")]
        Object { values: BTreeMap<String, Expr> },
        #[serde(rename = "field")]
        Field {
            expr: Box<Expr>,
            #[serde(flatten)]
            selector: Selector,
        },
        #[serde(rename = "λ")]
        Lambda { parameter: String, body: Box<Expr> },
        /// Parse failure reified as a node; fatal when evaluated.
        #[serde(rename = "error")]
        Error { value: String },
    }

    impl Expr {
        pub fn number(r: impl Into<Rational>) -> Self {
            Expr::Constant { value: Constant::Number(r.into()) }
        }

        pub fn string(s: impl Into<String>) -> Self {
            Expr::Constant { value: Constant::Str(s.into()) }
        }

        pub fn boolean(b: bool) -> Self {
            Expr::Constant { value: Constant::Bool(b) }
        }

        pub fn var(name: impl Into<String>) -> Self {
            Expr::Variable { name: name.into() }
        }

        pub fn app(function: Expr, params: Vec<Expr>) -> Self {
            Expr::Application { function: Box::new(function), params }
        }

        /// Application of a named function, e.g. an operator.
        pub fn call(name: &str, params: Vec<Expr>) -> Self {
            Expr::app(Expr::var(name), params)
        }

        pub fn list(elements: Vec<Expr>) -> Self {
            Expr::List { elements }
        }

        pub fn tuple(elements: Vec<Expr>) -> Self {
            Expr::Tuple { elements }
        }

        pub fn object<K: Into<String>>(values: impl IntoIterator<Item = (K, Expr)>) -> Self {
            Expr::Object { values: values.into_iter().map(|(k, v)| (k.into(), v)).collect() }
        }

        pub fn field(expr: Expr, name: impl Into<String>) -> Self {
            Expr::Field { expr: Box::new(expr), selector: Selector::Name(name.into()) }
        }

        pub fn index(expr: Expr, sub: Expr) -> Self {
            Expr::Field { expr: Box::new(expr), selector: Selector::Index(Box::new(sub)) }
        }

        pub fn lambda(parameter: impl Into<String>, body: Expr) -> Self {
            Expr::Lambda { parameter: parameter.into(), body: Box::new(body) }
        }

        /// Curried lambda: `(a, b) => body` becomes `a => b => body`.
        pub fn lambda_multi(parameters: &[String], body: Expr) -> Self {
            parameters.iter().rev().fold(body, |acc, p| Expr::lambda(p.clone(), acc))
        }

        pub fn error(message: impl Into<String>) -> Self {
            Expr::Error { value: message.into() }
        }

        /// Node kind name, as used in the JSON encoding.
        pub fn kind_name(&self) -> &'static str {
            match self {
                Expr::Application { .. } => "app",
                Expr::Constant { .. } => "const",
                Expr::Variable { .. } => "var",
                Expr::List { .. } => "lst",
                Expr::Tuple { .. } => "tup",
                Expr::Object { .. } => "obj",
                Expr::Field { .. } => "field",
                Expr::Lambda { .. } => "λ",
                Expr::Error { .. } => "error",
            }
        }

        /// Visit direct children mutably.
        pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
            match self {
                Expr::Application { function, params } => {
                    f(function);
                    params.iter_mut().for_each(f);
                }
                Expr::List { elements } | Expr::Tuple { elements } => {
                    elements.iter_mut().for_each(f)
                }
                Expr::Object { values } => values.values_mut().for_each(f),
                Expr::Field { expr, selector } => {
                    f(expr);
                    if let Selector::Index(sub) = selector {
                        f(sub);
                    }
                }
                Expr::Lambda { body, .. } => f(body),
                Expr::Constant { .. } | Expr::Variable { .. } | Expr::Error { .. } => {}
            }
        }
    }

    impl std::fmt::Display for Expr {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&crate::pretty::print_expr(self))
        }
    }
}

pub mod pretty {
    use crate::ast::*;

    const PREC_LAMBDA: u8 = 0;
    const PREC_COND: u8 = 1;
    const PREC_DIV: u8 = 7;
    const PREC_PREFIX: u8 = 9;
    const PREC_POSTFIX: u8 = 10;

    /// Binding power and right-associativity of a binary operator.
    pub fn binary_precedence(op: &str) -> Option<(u8, bool)> {
        Some(match op {
            "||" => (2, false),
            "&&" => (3, false),
            "==" | "!=" => (4, false),
            "<" | "<=" | ">" | ">=" => (5, false),
            "+" | "-" => (6, false),
            "*" | "/" => (PREC_DIV, false),
            "^" => (8, true),
            _ => return None,
        })
    }

    fn is_identifier(s: &str) -> bool {
        let mut cs = s.chars();
        match cs.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
            _ => return false,
        }
        cs.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn wrap(s: String, inner: u8, outer: u8) -> String {
        if inner < outer {
            format!("({s})")
        } else {
            s
        }
    }

    fn print_constant(c: &Constant, outer: u8) -> String {
        match c {
            Constant::Number(r) => {
                // `n/d` reads back as a division, `-n` as a prefix literal
                let inner = if !r.is_integer() {
                    PREC_DIV
                } else if r.is_negative() {
                    PREC_PREFIX - 1
                } else {
                    PREC_POSTFIX
                };
                wrap(r.to_string(), inner, outer)
            }
            Constant::Bool(b) => format!("{b}"),
            Constant::Str(s) => format!("\"{}\"", s.escape_default()),
            Constant::Extension(v) => v.raw.clone(),
        }
    }

    fn join(xs: &[Expr]) -> String {
        xs.iter().map(print_expr).collect::<Vec<_>>().join(", ")
    }

    fn print_prec(e: &Expr, outer: u8) -> String {
        match e {
            Expr::Constant { value } => print_constant(value, outer),
            Expr::Variable { name } => name.clone(),
            Expr::List { elements } => format!("[{}]", join(elements)),
            Expr::Tuple { elements } => format!("{{{}}}", join(elements)),
            Expr::Object { values } => {
                let inner = values
                    .iter()
                    .map(|(k, v)| {
                        let key = if is_identifier(k) {
                            k.clone()
                        } else {
                            format!("\"{}\"", k.escape_default())
                        };
                        format!("{}: {}", key, print_expr(v))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{inner}}}")
            }
            Expr::Field { expr, selector } => {
                let base = print_prec(expr, PREC_POSTFIX);
                match selector {
                    Selector::Name(n) => format!("{base}.{n}"),
                    Selector::Index(sub) => format!("{base}[{}]", print_expr(sub)),
                }
            }
            Expr::Lambda { parameter, body } => {
                wrap(format!("{parameter} => {}", print_prec(body, PREC_LAMBDA)), PREC_LAMBDA, outer)
            }
            Expr::Error { value } => format!("<error: {value}>"),
            Expr::Application { function, params } => {
                if let Expr::Variable { name } = function.as_ref() {
                    match (binary_precedence(name), params.as_slice()) {
                        (Some((p, right)), [l, r]) => {
                            let (lp, rp) = if right { (p + 1, p) } else { (p, p + 1) };
                            let s = format!("{} {name} {}", print_prec(l, lp), print_prec(r, rp));
                            return wrap(s, p, outer);
                        }
                        (_, [x]) if name == "-" || name == "!" => {
                            let s = format!("{name}{}", print_prec(x, PREC_PREFIX));
                            return wrap(s, PREC_PREFIX, outer);
                        }
                        (_, [c, a, b]) if name.eq_ignore_ascii_case("if") => {
                            let s = format!(
                                "{} ? {} : {}",
                                print_prec(c, PREC_COND + 1),
                                print_prec(a, PREC_COND),
                                print_prec(b, PREC_COND)
                            );
                            return wrap(s, PREC_COND, outer);
                        }
                        _ => {}
                    }
                }
                format!("{}({})", print_prec(function, PREC_POSTFIX), join(params))
            }
        }
    }

    /// Infix rendering that parses back to an equivalent expression.
    pub fn print_expr(e: &Expr) -> String {
        print_prec(e, PREC_LAMBDA)
    }
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_infix_with_minimal_parentheses() {
        let e = Expr::call(
            "*",
            vec![Expr::call("+", vec![Expr::var("a"), Expr::number(1)]), Expr::var("b")],
        );
        assert_eq!(e.to_string(), "(a + 1) * b");
        let e = Expr::call("^", vec![Expr::var("a"), Expr::call("^", vec![Expr::var("b"), Expr::var("c")])]);
        assert_eq!(e.to_string(), "a ^ b ^ c");
        let e = Expr::call("-", vec![Expr::var("a"), Expr::call("-", vec![Expr::var("b"), Expr::var("c")])]);
        assert_eq!(e.to_string(), "a - (b - c)");
    }

    #[test]
    fn prints_structures() {
        let e = Expr::object([
            ("a", Expr::list(vec![Expr::number(1), Expr::string("x")])),
            ("b", Expr::tuple(vec![Expr::boolean(true), Expr::number(-2)])),
        ]);
        assert_eq!(e.to_string(), "{a: [1, \"x\"], b: {true, -2}}");
        let e = Expr::lambda("x", Expr::field(Expr::var("x"), "foo"));
        assert_eq!(e.to_string(), "x => x.foo");
        let e = Expr::app(Expr::var("f"), vec![Expr::index(Expr::var("l"), Expr::number(0))]);
        assert_eq!(e.to_string(), "f(l[0])");
    }

    #[test]
    fn prints_conditionals_and_prefix() {
        let e = Expr::call("if", vec![Expr::var("c"), Expr::number(1), Expr::number(2)]);
        assert_eq!(e.to_string(), "c ? 1 : 2");
        let e = Expr::call("!", vec![Expr::call("&&", vec![Expr::var("a"), Expr::var("b")])]);
        assert_eq!(e.to_string(), "!(a && b)");
    }

    #[test]
    fn curried_lambda() {
        let e = Expr::lambda_multi(&["x".into(), "y".into()], Expr::var("y"));
        assert_eq!(e, Expr::lambda("x", Expr::lambda("y", Expr::var("y"))));
    }
}
