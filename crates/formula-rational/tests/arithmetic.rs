use formula_rational::{float_to_rational, CompareOp, Rational, RationalError};
use pretty_assertions::assert_eq;

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

fn samples() -> Vec<Rational> {
    ["0", "1", "-1", "1/2", "-3/4", "22/7", "-100/3", "6/4", "123456789012345678901234567890/7"]
        .iter()
        .map(|s| r(s))
        .collect()
}

#[test]
fn reduce_preserves_value_and_string_round_trips() {
    for x in samples() {
        assert!(x.simplify().compare(CompareOp::Eq, &x), "{x}");
        let back: Rational = x.to_fraction_string().parse().unwrap();
        assert_eq!(back, x);
        let printed: Rational = x.to_string().parse().unwrap();
        assert_eq!(printed, x);
    }
}

#[test]
fn field_laws() {
    for a in samples() {
        for b in samples() {
            assert_eq!(a.add(&b).subtract(&b), a, "({a} + {b}) - {b}");
            if !b.is_zero() {
                assert_eq!(a.multiply(&b).divide(&b).unwrap(), a, "({a} * {b}) / {b}");
            }
        }
    }
}

#[test]
fn operators_match_methods() {
    let a = r("1/3");
    let b = r("-1/6");
    assert_eq!(&a + &b, r("1/6"));
    assert_eq!(&a - &b, r("1/2"));
    assert_eq!(&a * &b, r("-1/18"));
    assert_eq!(-&a, r("-1/3"));
}

#[test]
fn division_by_zero_fails() {
    assert_eq!(r("1").divide(&r("0")).unwrap_err(), RationalError::DivisionByZero);
}

#[test]
fn compare_operators() {
    let a = r("1/2");
    let b = r("2/3");
    assert!(a.compare(CompareOp::Lt, &b));
    assert!(a.compare(CompareOp::Le, &b));
    assert!(!a.compare(CompareOp::Gt, &b));
    assert!(r("-1/2").compare(CompareOp::Lt, &r("-1/3")));
    assert!(r("2/4").compare(CompareOp::Eq, &a));
    assert!(a.compare(CompareOp::Ne, &b));
    assert!(b.compare(CompareOp::Ge, &a));
    let op: CompareOp = "<=".parse().unwrap();
    assert_eq!(op, CompareOp::Le);
    assert_eq!(
        "<>".parse::<CompareOp>().unwrap_err(),
        RationalError::InvalidOperator("<>".into())
    );
}

#[test]
fn min_and_max_are_variadic() {
    let xs = [r("3"), r("-2"), r("1/2")];
    assert_eq!(Rational::min(&r("1"), &xs), r("-2"));
    assert_eq!(Rational::max(&r("1"), &xs), r("3"));
    assert_eq!(Rational::min(&r("5"), &[]), r("5"));
}

#[test]
fn power_rules() {
    for x in samples() {
        assert_eq!(x.power(&r("0")).unwrap().to_fraction_string(), "1/1");
    }
    assert_eq!(r("2").power(&r("10")).unwrap(), r("1024"));
    assert_eq!(r("-2/3").power(&r("3")).unwrap(), r("-8/27"));
    assert_eq!(r("-2/3").power(&r("2")).unwrap(), r("4/9"));
    assert_eq!(r("4/9").power(&r("1/2")).unwrap(), r("2/3"));
    assert_eq!(r("4").power(&r("3/2")).unwrap(), r("8"));
    assert_eq!(r("8").power(&r("2/6")).unwrap(), r("2"));
    assert_eq!(r("2").power(&r("-1")).unwrap_err(), RationalError::NegativeExponent);
    assert_eq!(r("-4").power(&r("1/2")).unwrap_err(), RationalError::NegativeRoot);
    assert!(matches!(
        r("2").power(&r("1/2")).unwrap_err(),
        RationalError::NonIntegerRoot { degree: 2, .. }
    ));
}

#[test]
fn oversized_powers_are_refused() {
    assert!(matches!(
        r("2").power(&r("4000000000")).unwrap_err(),
        RationalError::ExponentTooLarge(_)
    ));
    assert!(matches!(
        r("1/3").power(&r("100000000")).unwrap_err(),
        RationalError::ExponentTooLarge(_)
    ));
    assert!(matches!(
        r("4").power(&r("1/4294967295")).unwrap_err(),
        RationalError::ExponentTooLarge(_)
    ));
    assert_eq!(r("1").power(&r("4000000000")).unwrap(), r("1"));
    assert_eq!(r("-1").power(&r("4000000001")).unwrap(), r("-1"));
    assert_eq!(r("0").power(&r("4000000000")).unwrap(), r("0"));
    assert_eq!(r("2").power(&r("100")).unwrap().to_string(), "1267650600228229401496703205376");
}

#[test]
fn roots_of_any_degree_terminate() {
    assert_eq!(r("8").power(&r("1/3")).unwrap(), r("2"));
    assert_eq!(r("1").power(&r("1/1000")).unwrap(), r("1"));
    assert!(matches!(
        r("7").power(&r("1/3")).unwrap_err(),
        RationalError::NonIntegerRoot { degree: 3, .. }
    ));
    assert!(matches!(
        r("4").power(&r("1/1000")).unwrap_err(),
        RationalError::NonIntegerRoot { degree: 1000, .. }
    ));
}

#[test]
fn parses_all_literal_forms() {
    assert_eq!(r("42"), Rational::from(42));
    assert_eq!(r("-42"), Rational::from(-42));
    assert_eq!(r("0x1234"), Rational::from(4660));
    assert_eq!(r("-3/6"), r("-1/2"));
    assert_eq!(r("0.5"), r("1/2"));
    assert!(matches!("abc".parse::<Rational>(), Err(RationalError::Parse(_))));
    assert!(matches!("1/x".parse::<Rational>(), Err(RationalError::Parse(_))));
}

#[test]
fn reciprocals_convert_exactly() {
    for i in 1..10000i64 {
        let q = Rational::from_float(1.0 / i as f64).unwrap();
        assert_eq!(q.numerator().to_string(), "1", "1/{i}");
        assert_eq!(q.denominator().to_string(), i.to_string(), "1/{i}");
    }
}

#[test]
fn powers_of_two_convert_exactly() {
    for k in 0..20 {
        let q = Rational::from_float(1.0 / f64::powi(2.0, k)).unwrap();
        assert_eq!(q, r("1").divide(&r("2").power(&Rational::from(k as i64)).unwrap()).unwrap());
    }
}

#[test]
fn irrational_approximations() {
    let pi = float_to_rational(std::f64::consts::PI, 1_000_000);
    assert_eq!(pi.to_string(), "4272943/1360120");
    let near = float_to_rational(1000.000000000001, 1_000_000);
    assert_eq!(near.to_string(), "977343669134001/977343669134");
    assert!(Rational::from_float(f64::NAN).is_err());
}

#[test]
fn conversions() {
    assert_eq!(r("-7/2").to_bigint().to_string(), "-3");
    assert_eq!(r("-7/2").to_f64(), -3.5);
    assert_eq!(r("3").to_index(), Some(3));
    assert_eq!(r("-3").to_index(), None);
    assert_eq!(r("1/2").to_index(), None);
}

#[test]
fn serde_uses_fraction_strings() {
    let json = serde_json::to_string(&r("-6/4")).unwrap();
    assert_eq!(json, "\"-3/2\"");
    let back: Rational = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r("-3/2"));
    let from_number: Rational = serde_json::from_str("12").unwrap();
    assert_eq!(from_number, r("12"));
    assert!(serde_json::from_str::<Rational>("\"hello\"").is_err());
}
