//! Expression evaluation.
//!
//! The evaluator reduces an AST to a `Value`, resolving variable
//! references through the `VarStore` and expanding `$name`/`${name}`
//! references embedded in string literals.
//!
//! Coercion rules live here, one closed match per operator: integers
//! promote to floats on mixed operands, booleans coerce to integers in
//! arithmetic and ordering, `+` concatenates two strings. `/` is true
//! division (always a float), `//` floor division, `%` floor modulo
//! with the result taking the divisor's sign. `and`/`or` short-circuit
//! and return the deciding operand; the unevaluated branch is never
//! touched.

use std::cmp::Ordering;

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::value::Value;
use crate::vars::VarStore;

/// Evaluate an AST against the variable store.
pub fn evaluate(expr: &Expr, vars: &VarStore) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(Value::Str(s)) => Ok(Value::Str(interpolate(s, vars)?)),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => resolve(vars, name),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, vars)?;
            eval_unary(*op, value)
        }
        Expr::NAry { op, operands } => eval_nary(*op, operands, vars),
    }
}

/// Expand `$name` / `${name}` references inside a quoted-string
/// literal.
///
/// Each reference is independently resolved and stringified, then
/// spliced back at its position; surrounding literal text is kept. A
/// backslash immediately before `$` suppresses that substitution and
/// becomes a literal `$`. A `${name` with no closing brace fails with
/// `Unbalanced`.
pub fn interpolate(raw: &str, vars: &VarStore) -> Result<String, ExprError> {
    if !raw.contains('$') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                out.push('$');
            }
            '$' => match chars.peek() {
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    while let Some(&c2) = chars.peek() {
                        if c2 == '}' {
                            break;
                        }
                        name.push(c2);
                        chars.next();
                    }
                    if chars.next().is_none() {
                        return Err(ExprError::Unbalanced(name));
                    }
                    out.push_str(&resolve(vars, &name)?.to_string());
                }
                Some(&c2) if c2.is_ascii_alphabetic() || c2 == '_' => {
                    let mut name = String::new();
                    while let Some(&c2) = chars.peek() {
                        if c2.is_ascii_alphanumeric() || c2 == '_' {
                            name.push(c2);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push_str(&resolve(vars, &name)?.to_string());
                }
                // A lone `$` (end of string, `$ `, `$1`) stays literal.
                _ => out.push('$'),
            },
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn resolve(vars: &VarStore, name: &str) -> Result<Value, ExprError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ExprError::UndefinedVariable(name.to_string()))
}

fn eval_unary(op: UnaryOp, value: Value) -> Result<Value, ExprError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value {
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or(ExprError::Overflow("-")),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Bool(b) => Ok(Value::Int(-(b as i64))),
            Value::Str(_) => Err(ExprError::TypeMismatch {
                op: "-",
                lhs: "str",
                rhs: "str",
            }),
        },
    }
}

fn eval_nary(op: BinOp, operands: &[Expr], vars: &VarStore) -> Result<Value, ExprError> {
    debug_assert!(operands.len() >= 2, "NAry node needs at least 2 operands");
    match op {
        // and/or short-circuit: stop at the first deciding operand and
        // return it, leaving the rest unevaluated.
        BinOp::And => {
            let mut value = evaluate(&operands[0], vars)?;
            for operand in &operands[1..] {
                if !value.is_truthy() {
                    return Ok(value);
                }
                value = evaluate(operand, vars)?;
            }
            Ok(value)
        }
        BinOp::Or => {
            let mut value = evaluate(&operands[0], vars)?;
            for operand in &operands[1..] {
                if value.is_truthy() {
                    return Ok(value);
                }
                value = evaluate(operand, vars)?;
            }
            Ok(value)
        }
        // Right-associative: fold from the last operand leftward.
        op if op.is_right_assoc() => {
            let mut value = evaluate(&operands[operands.len() - 1], vars)?;
            for operand in operands[..operands.len() - 1].iter().rev() {
                let lhs = evaluate(operand, vars)?;
                value = apply_binop(op, lhs, value)?;
            }
            Ok(value)
        }
        // Left-associative: fold from the first operand rightward.
        op => {
            let mut value = evaluate(&operands[0], vars)?;
            for operand in &operands[1..] {
                let rhs = evaluate(operand, vars)?;
                value = apply_binop(op, value, rhs)?;
            }
            Ok(value)
        }
    }
}

/// Numeric view of a value: booleans count as 0/1, strings don't
/// coerce.
enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Bool(b) => Some(Num::Int(*b as i64)),
        Value::Str(_) => None,
    }
}

/// Floor division, rounding toward negative infinity.
fn floor_div(a: i64, b: i64) -> Result<i64, ExprError> {
    if b == 0 {
        return Err(ExprError::DivisionByZero);
    }
    let q = a.checked_div(b).ok_or(ExprError::Overflow("//"))?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Modulo with the result taking the divisor's sign.
fn floor_mod(a: i64, b: i64) -> Result<i64, ExprError> {
    let q = floor_div(a, b)?;
    Ok(a - q * b)
}

fn apply_binop(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
    let mismatch = |op: &'static str, lhs: &Value, rhs: &Value| ExprError::TypeMismatch {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    };
    match op {
        BinOp::Add => match (&lhs, &rhs) {
            (Value::Str(a), Value::Str(b)) => {
                let mut out = a.clone();
                out.push_str(b);
                Ok(Value::Str(out))
            }
            _ => match (as_num(&lhs), as_num(&rhs)) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => a
                    .checked_add(b)
                    .map(Value::Int)
                    .ok_or(ExprError::Overflow("+")),
                (Some(a), Some(b)) => Ok(Value::Float(to_f64(a) + to_f64(b))),
                _ => Err(mismatch("+", &lhs, &rhs)),
            },
        },
        BinOp::Sub => match (as_num(&lhs), as_num(&rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or(ExprError::Overflow("-")),
            (Some(a), Some(b)) => Ok(Value::Float(to_f64(a) - to_f64(b))),
            _ => Err(mismatch("-", &lhs, &rhs)),
        },
        BinOp::Mul => match (as_num(&lhs), as_num(&rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or(ExprError::Overflow("*")),
            (Some(a), Some(b)) => Ok(Value::Float(to_f64(a) * to_f64(b))),
            _ => Err(mismatch("*", &lhs, &rhs)),
        },
        // True division always produces a float.
        BinOp::Div => match (as_num(&lhs), as_num(&rhs)) {
            (Some(a), Some(b)) => {
                let b = to_f64(b);
                if b == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(Value::Float(to_f64(a) / b))
            }
            _ => Err(mismatch("/", &lhs, &rhs)),
        },
        BinOp::FloorDiv => match (as_num(&lhs), as_num(&rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => floor_div(a, b).map(Value::Int),
            (Some(a), Some(b)) => {
                let b = to_f64(b);
                if b == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(Value::Float((to_f64(a) / b).floor()))
            }
            _ => Err(mismatch("//", &lhs, &rhs)),
        },
        BinOp::Mod => match (as_num(&lhs), as_num(&rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => floor_mod(a, b).map(Value::Int),
            (Some(a), Some(b)) => {
                let (a, b) = (to_f64(a), to_f64(b));
                if b == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(Value::Float(a - (a / b).floor() * b))
            }
            _ => Err(mismatch("%", &lhs, &rhs)),
        },
        BinOp::Pow => match (as_num(&lhs), as_num(&rhs)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                if b >= 0 {
                    let exp = u32::try_from(b).map_err(|_| ExprError::Overflow("**"))?;
                    a.checked_pow(exp)
                        .map(Value::Int)
                        .ok_or(ExprError::Overflow("**"))
                } else {
                    // Negative exponent goes to float.
                    Ok(Value::Float((a as f64).powf(b as f64)))
                }
            }
            (Some(a), Some(b)) => Ok(Value::Float(to_f64(a).powf(to_f64(b)))),
            _ => Err(mismatch("**", &lhs, &rhs)),
        },
        BinOp::Gt => compare(&lhs, &rhs, ">").map(|o| Value::Bool(o == Ordering::Greater)),
        BinOp::Ge => compare(&lhs, &rhs, ">=").map(|o| Value::Bool(o != Ordering::Less)),
        BinOp::Lt => compare(&lhs, &rhs, "<").map(|o| Value::Bool(o == Ordering::Less)),
        BinOp::Le => compare(&lhs, &rhs, "<=").map(|o| Value::Bool(o != Ordering::Greater)),
        BinOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        // and/or never reach the fold; eval_nary short-circuits them.
        BinOp::And | BinOp::Or => unreachable!("logical operators are short-circuited"),
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

/// Ordering comparison. Numbers (and booleans) compare numerically,
/// strings compare lexicographically; ordering across the two families
/// is a type error.
fn compare(lhs: &Value, rhs: &Value, op: &'static str) -> Result<Ordering, ExprError> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => match (as_num(lhs), as_num(rhs)) {
            (Some(a), Some(b)) => to_f64(a)
                .partial_cmp(&to_f64(b))
                .ok_or(ExprError::TypeMismatch {
                    op,
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                }),
            _ => Err(ExprError::TypeMismatch {
                op,
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            }),
        },
    }
}

/// Equality: numbers compare numerically across int/float/bool,
/// strings compare as strings, anything across the two families is
/// simply unequal.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => match (as_num(lhs), as_num(rhs)) {
            (Some(a), Some(b)) => to_f64(a) == to_f64(b),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval(text: &str) -> Value {
        let vars = VarStore::new();
        evaluate(&parse(text).expect("parse should succeed"), &vars)
            .expect("evaluate should succeed")
    }

    fn eval_with(text: &str, vars: &VarStore) -> Result<Value, ExprError> {
        evaluate(&parse(text)?, vars)
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("2+3*4"), Value::Int(14));
        assert_eq!(eval("2**3**2"), Value::Int(512));
        assert_eq!(eval("10//3"), Value::Int(3));
        assert_eq!(eval("10%3"), Value::Int(1));
        assert_eq!(eval("100-50-25"), Value::Int(25));
    }

    #[test]
    fn true_division_is_float() {
        assert_eq!(eval("10/2"), Value::Float(5.0));
        assert_eq!(eval("7/2"), Value::Float(3.5));
    }

    #[test]
    fn floor_semantics_on_negatives() {
        assert_eq!(eval("-7//3"), Value::Int(-3));
        assert_eq!(eval("-7%3"), Value::Int(2));
        assert_eq!(eval("7%-3"), Value::Int(-2));
    }

    #[test]
    fn division_by_zero_errors() {
        let vars = VarStore::new();
        assert_eq!(eval_with("1/0", &vars), Err(ExprError::DivisionByZero));
        assert_eq!(eval_with("1//0", &vars), Err(ExprError::DivisionByZero));
        assert_eq!(eval_with("1%0", &vars), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn boolean_precedence() {
        // not > and > or
        assert_eq!(eval("not True or False"), Value::Bool(false));
        assert_eq!(eval("True or False and False"), Value::Bool(true));
    }

    #[test]
    fn and_or_return_deciding_operand() {
        assert_eq!(eval("0 or 7"), Value::Int(7));
        assert_eq!(eval("3 and 7"), Value::Int(7));
        assert_eq!(eval("0 and 7"), Value::Int(0));
    }

    #[test]
    fn short_circuit_skips_unevaluated_branch() {
        // $missing would fail, but the left side already decides.
        let vars = VarStore::new();
        assert_eq!(eval_with("True or $missing", &vars), Ok(Value::Bool(true)));
        assert_eq!(
            eval_with("False and $missing", &vars),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn variable_resolution_prefers_builtin() {
        let mut vars = VarStore::new();
        vars.define_builtin("x", Value::Int(1));
        assert_eq!(eval_with("$x", &vars), Ok(Value::Int(1)));
    }

    #[test]
    fn undefined_variable_errors() {
        let vars = VarStore::new();
        assert_eq!(
            eval_with("$ghost", &vars),
            Err(ExprError::UndefinedVariable("ghost".into()))
        );
    }

    #[test]
    fn string_interpolation() {
        let mut vars = VarStore::new();
        vars.set("x", Value::Int(5));
        assert_eq!(
            eval_with(r#""val=$x""#, &vars),
            Ok(Value::Str("val=5".into()))
        );
        assert_eq!(
            eval_with(r#""val=${x}!""#, &vars),
            Ok(Value::Str("val=5!".into()))
        );
    }

    #[test]
    fn escaped_dollar_suppresses_substitution() {
        let vars = VarStore::new();
        assert_eq!(
            eval_with(r#""val=\$x""#, &vars),
            Ok(Value::Str("val=$x".into()))
        );
    }

    #[test]
    fn interpolation_unbalanced_brace() {
        let mut vars = VarStore::new();
        vars.set("x", Value::Int(5));
        assert_eq!(
            eval_with(r#""val=${x""#, &vars),
            Err(ExprError::Unbalanced("x".into()))
        );
    }

    #[test]
    fn interpolation_undefined_variable() {
        let vars = VarStore::new();
        assert_eq!(
            eval_with(r#""val=$nope""#, &vars),
            Err(ExprError::UndefinedVariable("nope".into()))
        );
    }

    #[test]
    fn plain_string_passes_through() {
        let vars = VarStore::new();
        assert_eq!(
            eval_with(r#""no refs here""#, &vars),
            Ok(Value::Str("no refs here".into()))
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval(r#""foo"+"bar""#), Value::Str("foobar".into()));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("1 < 2"), Value::Bool(true));
        assert_eq!(eval("2.5 >= 2"), Value::Bool(true));
        assert_eq!(eval(r#""abc" < "abd""#), Value::Bool(true));
        assert_eq!(eval("1 == 1.0"), Value::Bool(true));
        assert_eq!(eval(r#"1 == "1""#), Value::Bool(false));
        assert_eq!(eval(r#"1 != "1""#), Value::Bool(true));
    }

    #[test]
    fn ordering_across_types_is_error() {
        let vars = VarStore::new();
        assert!(matches!(
            eval_with(r#"1 < "2""#, &vars),
            Err(ExprError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unary_minus_and_bool_coercion() {
        assert_eq!(eval("-5"), Value::Int(-5));
        assert_eq!(eval("--5"), Value::Int(5));
        assert_eq!(eval("-2**2"), Value::Int(-4));
        assert_eq!(eval("True + 1"), Value::Int(2));
    }

    #[test]
    fn pow_negative_exponent_is_float() {
        assert_eq!(eval("2**-1"), Value::Float(0.5));
    }

    #[test]
    fn int_overflow_reported() {
        let vars = VarStore::new();
        assert_eq!(
            eval_with("9223372036854775807+1", &vars),
            Err(ExprError::Overflow("+"))
        );
    }
}
