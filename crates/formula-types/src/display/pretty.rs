//! Pretty printing for types with variable renaming.
//!
//! Formats:
//! - functions `(a, b) -> r`, variadic tails `(a, ...b) -> r`
//! - lists `[t]`, tuples `{a, b}`
//! - objects `{k: t}`, open objects `{k: t, ...}`
//! - generics `G<a>`, conditionals `l extends r ? t : f`

use std::collections::HashMap;

use crate::types::{TvId, Type};

/// Display name of the `n`-th type variable: `a`..`z`, then `aa`, `ab`, ...
pub fn var_name(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Pretty-print a type with alphabetic variable renaming.
pub fn pp_type(t: &Type) -> String {
    Printer::default().print(t)
}

/// Pretty-print several types sharing one renaming, so equal variables print equally.
pub fn pp_types(ts: &[&Type]) -> Vec<String> {
    let mut p = Printer::default();
    ts.iter().map(|t| p.print(t)).collect()
}

#[derive(Default)]
struct Printer {
    names: HashMap<TvId, String>,
}

impl Printer {
    fn name(&mut self, tv: TvId) -> String {
        let next = self.names.len();
        self.names.entry(tv).or_insert_with(|| var_name(next)).clone()
    }

    fn join(&mut self, ts: &[Type]) -> Vec<String> {
        ts.iter().map(|t| self.print(t)).collect()
    }

    fn print(&mut self, t: &Type) -> String {
        match t {
            Type::Var(tv) => self.name(*tv),
            Type::Const(n) => n.clone(),
            Type::Any => "any".into(),
            Type::Labeled(inner, _) => self.print(inner),
            Type::List(x) => format!("[{}]", self.print(x)),
            Type::Tuple(xs) => format!("{{{}}}", self.join(xs).join(", ")),
            Type::Fun { args, ret, variadic } => {
                let mut items = self.join(args);
                if let Some(v) = variadic {
                    items.push(format!("...{}", self.print(v)));
                }
                format!("({}) -> {}", items.join(", "), self.print(ret))
            }
            Type::Object { fields, open } => {
                let mut items: Vec<String> =
                    fields.iter().map(|(k, v)| format!("{}: {}", k, self.print(v))).collect();
                if *open {
                    items.push("...".into());
                }
                format!("{{{}}}", items.join(", "))
            }
            Type::Generic { base, args } => {
                let b = self.print(base);
                format!("{}<{}>", b, self.join(args).join(", "))
            }
            Type::Conditional { left, right, then, otherwise } => format!(
                "{} extends {} ? {} : {}",
                self.print(left),
                self.print(right),
                self.print(then),
                self.print(otherwise)
            ),
        }
    }
}
