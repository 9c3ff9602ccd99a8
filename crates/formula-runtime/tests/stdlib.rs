use formula_runtime::{Environment, EvalError, Plain};
use pretty_assertions::assert_eq;

fn eval(src: &str) -> Result<Plain, EvalError> {
    Environment::new().evaluate_str_value(src)
}

fn show(src: &str) -> String {
    match eval(src) {
        Ok(v) => v.to_string(),
        Err(e) => format!("error: {e}"),
    }
}

#[test]
fn arithmetic_is_exact() {
    assert_eq!(eval("1 + 2 * 3"), Ok(Plain::from(7)));
    assert_eq!(eval("2 ^ 10"), Ok(Plain::from(1024)));
    assert_eq!(show("7 / 2"), "7/2");
    assert_eq!(show("1/3 + 1/6"), "1/2");
    assert_eq!(eval("-(1 + 2)"), Ok(Plain::from(-3)));
    assert_eq!(eval("10 - 4"), Ok(Plain::from(6)));
}

#[test]
fn division_by_zero() {
    assert!(matches!(eval("1 / 0"), Err(EvalError::Rational(_))));
}

#[test]
fn comparisons() {
    assert_eq!(eval("1 < 2"), Ok(Plain::from(true)));
    assert_eq!(eval("1/3 > 1/4"), Ok(Plain::from(true)));
    assert_eq!(eval("2 <= 2"), Ok(Plain::from(true)));
    assert_eq!(eval("2 >= 3"), Ok(Plain::from(false)));
    assert_eq!(eval("\"a\" < \"b\""), Ok(Plain::from(true)));
    assert_eq!(eval("false < true"), Ok(Plain::from(true)));
}

#[test]
fn equality_is_structural() {
    assert_eq!(eval("[1, {2, \"x\"}] == [1, {2, \"x\"}]"), Ok(Plain::from(true)));
    assert_eq!(eval("{a: 1} == {a: 2}"), Ok(Plain::from(false)));
    assert_eq!(eval("2/4 == 1/2"), Ok(Plain::from(true)));
    assert_eq!(eval("1 != 1"), Ok(Plain::from(false)));
}

#[test]
fn logic_reads_only_what_it_needs() {
    assert_eq!(eval("true && false"), Ok(Plain::from(false)));
    assert_eq!(eval("false && 1 / 0 == 1"), Ok(Plain::from(false)));
    assert_eq!(eval("true || 1 / 0 == 1"), Ok(Plain::from(true)));
    assert_eq!(eval("!true"), Ok(Plain::from(false)));
    assert_eq!(eval("1 > 2 ? 1 / 0 : 5"), Ok(Plain::from(5)));
    assert_eq!(eval("IF(true, 1, 2)"), Ok(Plain::from(1)));
}

#[test]
fn extremes() {
    assert_eq!(eval("$min(3, 1, 2)"), Ok(Plain::from(1)));
    assert_eq!(eval("$max(3, 1/2, 2)"), Ok(Plain::from(3)));
    assert_eq!(eval("$max(-1)"), Ok(Plain::from(-1)));
    assert_eq!(show("$min()"), "error: $min expects at least 1 argument (0 provided)");
}

#[test]
fn first_and_last_descend_into_nested_lists() {
    assert_eq!(eval("$first([[1, 2], 3])"), Ok(Plain::from(1)));
    assert_eq!(eval("$last([1, [2, 3]])"), Ok(Plain::from(3)));
    assert_eq!(eval("$first([])"), Ok(Plain::Null));
}

#[test]
fn concat_renders_values() {
    assert_eq!(eval("$concat(\"a\", 1, true)"), Ok(Plain::from("a1true")));
    assert_eq!(eval("$concat(\"x\", [1, 1/2])"), Ok(Plain::from("x[1, 1/2]")));
    assert_eq!(eval("$concat()"), Ok(Plain::from("")));
}

#[test]
fn higher_order() {
    assert_eq!(eval("$filter(x => x > 1, [1, 2, 3])"), Ok(Plain::from(vec![2, 3])));
    assert_eq!(eval("$map(x => x * 2, [1, 2])"), Ok(Plain::from(vec![2, 4])));
    assert_eq!(eval("$MAP(x => x, [])"), Ok(Plain::List(vec![])));
    assert_eq!(eval("$find(x => x > 1, [1, 2, 3])"), Ok(Plain::from(2)));
    assert_eq!(eval("$find(x => x > 5, [1, 2])"), Ok(Plain::Null));
    assert_eq!(eval("$findi(x => x > 1, [1, 2, 3])"), Ok(Plain::from(1)));
    assert_eq!(eval("$findi(x => x > 5, [1, 2])"), Ok(Plain::from(-1)));
    assert_eq!(eval("$map(o => o.a, [{a: 1}, {a: 2}])"), Ok(Plain::from(vec![1, 2])));
}

#[test]
fn predicates_must_return_booleans() {
    assert!(matches!(eval("$filter(x => x, [1])"), Err(EvalError::Unexpected { .. })));
}

#[test]
fn length_of_anything() {
    assert_eq!(eval("$length([1, 2, 3])"), Ok(Plain::from(3)));
    assert_eq!(eval("$length({1, 2})"), Ok(Plain::from(2)));
    assert_eq!(eval("$length({a: 1, b: 2})"), Ok(Plain::from(2)));
    assert_eq!(eval("$length(\"abc\")"), Ok(Plain::from(1)));
}

#[test]
fn floor_rounds_down() {
    assert_eq!(eval("$floor(7/2)"), Ok(Plain::from(3)));
    assert_eq!(eval("$floor(-7/2)"), Ok(Plain::from(-4)));
    assert_eq!(eval("$floor($pi)"), Ok(Plain::from(3)));
}

#[test]
fn json_and_hex() {
    assert_eq!(
        eval("$json({a: [1, 1/2], b: \"s\"})"),
        Ok(Plain::from(r#"{"a":[1,"1/2"],"b":"s"}"#))
    );
    assert_eq!(eval("$hex(\"AB\")"), Ok(Plain::from("0x4142")));
    assert!(matches!(eval("$hex(1)"), Err(EvalError::Unexpected { .. })));
}

#[test]
fn arity_is_checked() {
    assert_eq!(show("$floor(1, 2)"), "error: $floor expects 1 argument (2 provided)");
}
