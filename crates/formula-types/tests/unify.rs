use formula_types::{pp_type, Subst, TvId, Type, TypeError};
use pretty_assertions::assert_eq;

fn var(n: u32) -> Type {
    Type::Var(TvId(n))
}

#[test]
fn open_objects_merge_both_fields() {
    let mut s = Subst::new();
    let a = Type::object([("a", Type::number())], true);
    let b = Type::object([("b", Type::string())], true);
    s.unify(&var(0), &a, None, None).unwrap();
    s.unify(&var(1), &b, None, None).unwrap();
    s.unify(&var(0), &var(1), None, None).unwrap();
    let merged = "{a: number, b: string, ...}";
    assert_eq!(pp_type(&s.apply(&var(0))), merged);
    assert_eq!(pp_type(&s.apply(&var(1))), merged);
}

#[test]
fn function_arity_without_variadic_fails() {
    let mut s = Subst::new();
    let f = Type::fun(vec![Type::number(), Type::number()], Type::number());
    let g = Type::fun(vec![Type::number()], Type::number());
    let err = s.unify(&f, &g, None, None).unwrap_err();
    assert_eq!(err, TypeError::Arity { expected: 2, provided: 1, node: None });
}

#[test]
fn generics_unify_pairwise() {
    let mut s = Subst::new();
    let a = Type::generic(Type::Const("Map".into()), vec![Type::number(), var(0)]);
    let b = Type::generic(Type::Const("Map".into()), vec![Type::number(), Type::string()]);
    s.unify(&a, &b, None, None).unwrap();
    assert_eq!(s.apply(&var(0)).into_owned(), Type::string());

    let c = Type::generic(Type::Const("Map".into()), vec![Type::number()]);
    let err = s.unify(&a, &c, None, None).unwrap_err();
    assert_eq!(err, TypeError::GenericArity { left: 2, right: 1 });
}

#[test]
fn conditionals_unify_every_part() {
    let mut s = Subst::new();
    let a = Type::conditional(var(0), Type::number(), var(1), Type::boolean());
    let b = Type::conditional(Type::string(), Type::number(), Type::list(var(2)), var(3));
    s.unify(&a, &b, None, None).unwrap();
    assert_eq!(pp_type(&s.apply(&a)), "string extends number ? [a] : boolean");
}

#[test]
fn tuples_unify_by_position() {
    let mut s = Subst::new();
    let a = Type::Tuple(vec![var(0), Type::string()]);
    let b = Type::Tuple(vec![Type::number(), var(1)]);
    s.unify(&a, &b, None, None).unwrap();
    assert_eq!(pp_type(&s.apply(&a)), "{number, string}");
    let c = Type::Tuple(vec![Type::string(), Type::string()]);
    assert!(matches!(s.unify(&a, &c, None, None), Err(TypeError::Mismatch { .. })));
}

#[test]
fn lists_and_constants() {
    let mut s = Subst::new();
    s.unify(&Type::list(var(0)), &Type::list(Type::boolean()), None, None).unwrap();
    assert_eq!(s.apply(&var(0)).into_owned(), Type::boolean());
    let err = s.unify(&Type::number(), &Type::string(), None, None).unwrap_err();
    assert_eq!(err.to_string(), "Type mismatch: number vs string");
}
