//! Type schemes of the standard library.
//!
//! Every library name is looked up before any environment binding, so these
//! schemes cannot be shadowed by definitions. Quantified variables are
//! numbered from `%t0` and replaced on instantiation.

use crate::scheme::Scheme;
use crate::types::{TvId, Type};

/// Names with a library scheme, operators first.
pub const LIBRARY_NAMES: &[&str] = &[
    "+", "-", "*", "/", "^", "<", "<=", ">", ">=", "==", "!=", "&&", "||", "!", "if", "$min",
    "$max", "$first", "$last", "$concat", "$filter", "$map", "$find", "$findi", "$length",
    "$floor", "$json", "$hex", "$pi",
];

fn alpha() -> Type {
    Type::Var(TvId(0))
}

fn beta() -> Type {
    Type::Var(TvId(1))
}

fn predicate(label: &str) -> Type {
    Type::fun(vec![alpha()], Type::boolean()).labeled(label)
}

fn value_list() -> Type {
    Type::list(alpha()).labeled("value list")
}

/// Scheme of a library name; `None` when `name` is not part of the library.
pub fn library_scheme(name: &str) -> Option<Scheme> {
    let arith = || Type::fun(vec![Type::number(), Type::number()], Type::number());
    let numbers = || Type::fun_variadic(vec![Type::number()], Type::number(), Type::number());
    let logic = || Type::fun(vec![Type::boolean(), Type::boolean()], Type::boolean());
    let sc = match name {
        "+" | "*" | "/" | "^" => Scheme::mono(arith()),
        // variadic so the prefix form `-x` types as well
        "-" | "$min" | "$max" => Scheme::mono(numbers()),
        "<" | "<=" | ">" | ">=" | "==" | "!=" => {
            Scheme::poly(vec![TvId(0)], Type::fun(vec![alpha(), alpha()], Type::boolean()))
        }
        "&&" | "||" => Scheme::mono(logic()),
        "!" => Scheme::mono(Type::fun(vec![Type::boolean()], Type::boolean())),
        "if" => Scheme::poly(
            vec![TvId(0)],
            Type::fun(vec![Type::boolean(), alpha(), alpha()], alpha()),
        ),
        "$first" | "$last" => Scheme::mono(Type::fun(vec![Type::list(Type::Any)], Type::Any)),
        "$concat" => Scheme::mono(Type::fun_variadic(vec![], Type::string(), Type::Any)),
        "$filter" => Scheme::poly(
            vec![TvId(0)],
            Type::fun(
                vec![predicate("filter function"), value_list()],
                Type::list(alpha()).labeled("filtered items"),
            ),
        ),
        "$map" => Scheme::poly(
            vec![TvId(0), TvId(1)],
            Type::fun(
                vec![Type::fun(vec![alpha()], beta()).labeled("map function"), value_list()],
                Type::list(beta()).labeled("mapped items"),
            ),
        ),
        "$find" => Scheme::poly(
            vec![TvId(0)],
            Type::fun(
                vec![predicate("find function, returns true if an element matches"), value_list()],
                alpha(),
            ),
        ),
        "$findi" => Scheme::poly(
            vec![TvId(0)],
            Type::fun(
                vec![predicate("find function, returns true if an element matches"), value_list()],
                Type::number(),
            ),
        ),
        "$length" => Scheme::poly(vec![TvId(0)], Type::fun(vec![alpha()], Type::number())),
        "$floor" => Scheme::mono(Type::fun(vec![Type::number()], Type::number())),
        "$json" => Scheme::mono(Type::fun(vec![Type::Any], Type::string())),
        "$hex" => Scheme::mono(Type::fun(vec![Type::string()], Type::string())),
        "$pi" => Scheme::mono(Type::number()),
        _ => return None,
    };
    Some(sc)
}

/// One-line documentation of a library name.
pub fn library_doc(name: &str) -> Option<&'static str> {
    Some(match name {
        "+" => "Addition",
        "-" => "Subtraction, or negation with one argument",
        "*" => "Multiplication",
        "/" => "Division",
        "^" => "Exponentiation",
        "<" | "<=" | ">" | ">=" => "Ordering comparison",
        "==" => "Equality",
        "!=" => "Inequality",
        "&&" => "Logical and",
        "||" => "Logical or",
        "!" => "Logical not",
        "if" => "Conditional expression, evaluates only the selected branch",
        "$min" => "Smallest of the arguments",
        "$max" => "Largest of the arguments",
        "$first" => "First element of a list",
        "$last" => "Last element of a list",
        "$concat" => "Concatenates the text of all arguments",
        "$filter" => "Returns the elements matching the filter function",
        "$map" => "Returns a mapped array",
        "$find" => "Returns the first element matching the find function",
        "$findi" => "Returns the index of the first matching element, or -1",
        "$length" => "Number of elements of a list or object",
        "$floor" => "Rounds down to an integer",
        "$json" => "JSON text of a value",
        "$hex" => "Hexadecimal encoding of a string",
        "$pi" => "Approximation of pi",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_name_has_scheme_and_doc() {
        for name in LIBRARY_NAMES {
            assert!(library_scheme(name).is_some(), "{name}");
            assert!(library_doc(name).is_some(), "{name}");
        }
        assert_eq!(library_scheme("$nope"), None);
    }

    #[test]
    fn quantified_vars_occur_in_type() {
        for name in LIBRARY_NAMES {
            let Some(sc) = library_scheme(name) else { continue };
            let free = sc.ty.free_vars();
            assert!(sc.vars.iter().all(|v| free.contains(v)), "{name}");
        }
    }

    #[test]
    fn printed_schemes() {
        let show = |n: &str| library_scheme(n).map(|s| s.to_string()).unwrap_or_default();
        assert_eq!(show("$map"), "((a) -> b, [a]) -> [b]");
        assert_eq!(show("if"), "(boolean, a, a) -> a");
        assert_eq!(show("$max"), "(number, ...number) -> number");
        assert_eq!(show("$concat"), "(...any) -> string");
    }
}
