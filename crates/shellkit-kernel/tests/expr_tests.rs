//! End-to-end expression engine tests: text in, value out.

use rstest::rstest;
use shellkit_kernel::{evaluate, parse, ExprError, Value, VarStore};

fn eval(text: &str) -> Result<Value, ExprError> {
    let vars = VarStore::new();
    evaluate(&parse(text)?, &vars)
}

#[rstest]
#[case("2+3*4", Value::Int(14))]
#[case("(2+3)*4", Value::Int(20))]
#[case("2**3**2", Value::Int(512))]
#[case("10//3", Value::Int(3))]
#[case("10%3", Value::Int(1))]
#[case("10/4", Value::Float(2.5))]
#[case("100-50-25", Value::Int(25))]
#[case("-3**2", Value::Int(-9))]
#[case("2*-3", Value::Int(-6))]
#[case("1.5+1.5", Value::Float(3.0))]
#[case("2+1.5", Value::Float(3.5))]
fn arithmetic(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(eval(text), Ok(expected));
}

#[rstest]
#[case("not True or False", Value::Bool(false))]
#[case("not (True or False)", Value::Bool(false))]
#[case("True or False and False", Value::Bool(true))]
#[case("not False and True", Value::Bool(true))]
#[case("1 < 2 and 2 < 3", Value::Bool(true))]
#[case("1 == 1 and 2 != 3", Value::Bool(true))]
fn boolean_logic(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(eval(text), Ok(expected));
}

#[rstest]
#[case("1 <= 1", true)]
#[case("2 > 2", false)]
#[case("2 >= 2", true)]
#[case("\"abc\" == \"abc\"", true)]
#[case("\"abc\" < \"abd\"", true)]
#[case("1 == 1.0", true)]
#[case("True == 1", true)]
#[case("1 == \"1\"", false)]
fn comparisons(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(eval(text), Ok(Value::Bool(expected)));
}

#[rstest]
#[case("2+")]
#[case("(1+2")]
#[case("1 2")]
#[case("* 3")]
#[case("")]
#[case("1 @ 2")]
fn syntax_errors(#[case] text: &str) {
    assert!(matches!(eval(text), Err(ExprError::Syntax(_))));
}

#[test]
fn undefined_variable() {
    assert_eq!(
        eval("$missing + 1"),
        Err(ExprError::UndefinedVariable("missing".into()))
    );
}

#[test]
fn unbalanced_brace_reference() {
    assert_eq!(eval("${oops"), Err(ExprError::Unbalanced("oops".into())));
}

#[test]
fn interpolation_splices_values_in_place() {
    let mut vars = VarStore::new();
    vars.set("who", Value::Str("world".into()));
    vars.set("n", Value::Int(3));
    let ast = parse(r#""hello $who, take ${n}!""#).unwrap();
    assert_eq!(
        evaluate(&ast, &vars),
        Ok(Value::Str("hello world, take 3!".into()))
    );
}

#[test]
fn escaped_reference_stays_literal() {
    let mut vars = VarStore::new();
    vars.set("x", Value::Int(5));
    let ast = parse(r#""val=\$x but $x""#).unwrap();
    assert_eq!(evaluate(&ast, &vars), Ok(Value::Str("val=$x but 5".into())));
}

#[test]
fn single_quoted_strings_interpolate_too() {
    let mut vars = VarStore::new();
    vars.set("x", Value::Int(5));
    let ast = parse("'x is $x'").unwrap();
    assert_eq!(evaluate(&ast, &vars), Ok(Value::Str("x is 5".into())));
}

#[test]
fn short_circuit_never_touches_the_other_side() {
    let vars = VarStore::new();
    // $boom is undefined; evaluation would fail if reached.
    let or = parse("1 or $boom").unwrap();
    assert_eq!(evaluate(&or, &vars), Ok(Value::Int(1)));
    let and = parse("0 and $boom").unwrap();
    assert_eq!(evaluate(&and, &vars), Ok(Value::Int(0)));
}

#[test]
fn and_or_yield_the_deciding_operand() {
    let vars = VarStore::new();
    let ast = parse(r#""" or "fallback""#).unwrap();
    assert_eq!(evaluate(&ast, &vars), Ok(Value::Str("fallback".into())));
}

#[test]
fn division_and_modulo_by_zero() {
    assert_eq!(eval("5/0"), Err(ExprError::DivisionByZero));
    assert_eq!(eval("5//0"), Err(ExprError::DivisionByZero));
    assert_eq!(eval("5%0"), Err(ExprError::DivisionByZero));
    assert_eq!(eval("5/0.0"), Err(ExprError::DivisionByZero));
}

#[test]
fn float_display_keeps_a_decimal_point() {
    assert_eq!(eval("4/2").unwrap().to_string(), "2.0");
    assert_eq!(eval("5/2").unwrap().to_string(), "2.5");
}
