//! Parser for the expression language.
//!
//! A recursive descent parser with one function per precedence level,
//! producing the flattened n-ary AST described in `ast`. Precedence,
//! highest to lowest:
//!
//! ```text
//! **                      right
//! - (prefix)              right
//! * / // %                left
//! + -                     left
//! > >= < <= == !=         left, non-chaining
//! not (prefix)            right
//! and                     left
//! or                      left
//! ```
//!
//! Runs of one operator flatten into a single `NAry` node; when the
//! operator changes within a level (`a+b-c`), the run so far becomes
//! the first operand of a fresh node, preserving left associativity.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::lexer::{tokenize, LexError, Spanned, Token};
use crate::value::Value;

/// Parse expression text into an AST.
pub fn parse(text: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(text).map_err(|err| match err.token {
        LexError::UnterminatedVarRef(name) => ExprError::Unbalanced(name),
        other => ExprError::Syntax(format!("{other} at column {}", err.span.start)),
    })?;
    if tokens.is_empty() {
        return Err(ExprError::Syntax("empty expression".into()));
    }
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    tracing::debug!(?expr, "parsed expression");
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned<Token>> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_end(&self) -> Result<(), ExprError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(t) => Err(ExprError::Syntax(format!(
                "trailing input at column {}",
                t.span.start
            ))),
        }
    }

    /// Parse a left-associative level: a chain of `next`-level operands
    /// joined by operators that `match_op` recognizes.
    fn parse_left_chain(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, ExprError>,
        match_op: fn(&Token) -> Option<BinOp>,
    ) -> Result<Expr, ExprError> {
        let first = next(self)?;
        let mut cur_op = match self.peek().and_then(match_op) {
            Some(op) => op,
            None => return Ok(first),
        };
        self.advance();
        let mut operands = vec![first, next(self)?];
        while let Some(op) = self.peek().and_then(match_op) {
            self.advance();
            let rhs = next(self)?;
            if op == cur_op {
                operands.push(rhs);
            } else {
                // Operator changed within the level: the run so far
                // becomes the left operand of the new run.
                let lhs = Expr::nary(cur_op, operands);
                cur_op = op;
                operands = vec![lhs, rhs];
            }
        }
        Ok(Expr::nary(cur_op, operands))
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        self.parse_left_chain(Self::parse_and, |t| match t {
            Token::Or => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        self.parse_left_chain(Self::parse_not, |t| match t {
            Token::And => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, ExprError> {
        self.parse_left_chain(Self::parse_add, |t| match t {
            Token::Gt => Some(BinOp::Gt),
            Token::GtEq => Some(BinOp::Ge),
            Token::Lt => Some(BinOp::Lt),
            Token::LtEq => Some(BinOp::Le),
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn parse_add(&mut self) -> Result<Expr, ExprError> {
        self.parse_left_chain(Self::parse_mul, |t| match t {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_mul(&mut self) -> Result<Expr, ExprError> {
        self.parse_left_chain(Self::parse_neg, |t| match t {
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::SlashSlash => Some(BinOp::FloorDiv),
            Token::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Prefix `-`. Binds tighter than `*` but looser than `**`, so
    /// `-2**2` is `-(2**2)`.
    fn parse_neg(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.advance();
            let operand = self.parse_neg()?;
            return Ok(Expr::unary(UnaryOp::Neg, operand));
        }
        self.parse_pow()
    }

    /// `**`, right-associative. The right side re-enters `parse_neg`
    /// so `2**-3` works and `2**3**2` folds from the right; a run of
    /// `**` flattens into one node.
    fn parse_pow(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_atom()?;
        if !matches!(self.peek(), Some(Token::Pow)) {
            return Ok(base);
        }
        self.advance();
        let rest = self.parse_neg()?;
        let operands = match rest {
            Expr::NAry {
                op: BinOp::Pow,
                operands: mut rest_ops,
            } => {
                let mut ops = Vec::with_capacity(rest_ops.len() + 1);
                ops.push(base);
                ops.append(&mut rest_ops);
                ops
            }
            other => vec![base, other],
        };
        Ok(Expr::nary(BinOp::Pow, operands))
    }

    fn parse_atom(&mut self) -> Result<Expr, ExprError> {
        let Some(spanned) = self.advance() else {
            return Err(ExprError::Syntax("unexpected end of expression".into()));
        };
        match spanned.token {
            Token::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            Token::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Var(name) => Ok(Expr::Var(name)),
            Token::LParen => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    _ => Err(ExprError::Syntax(format!(
                        "expected ')' for '(' at column {}",
                        spanned.span.start
                    ))),
                }
            }
            other => Err(ExprError::Syntax(format!(
                "unexpected {:?} at column {}",
                other, spanned.span.start
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_same_operator_runs() {
        let expr = parse("1+2+3").expect("parse should succeed");
        match expr {
            Expr::NAry { op, operands } => {
                assert_eq!(op, BinOp::Add);
                assert_eq!(operands.len(), 3);
            }
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn mixed_operators_nest_left() {
        // a+b-c must evaluate as (a+b)-c
        let expr = parse("1+2-3").expect("parse should succeed");
        match expr {
            Expr::NAry { op, operands } => {
                assert_eq!(op, BinOp::Sub);
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    &operands[0],
                    Expr::NAry {
                        op: BinOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn power_flattens_right() {
        let expr = parse("2**3**2").expect("parse should succeed");
        match expr {
            Expr::NAry { op, operands } => {
                assert_eq!(op, BinOp::Pow);
                assert_eq!(operands.len(), 3);
            }
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn precedence_mul_over_add() {
        let expr = parse("2+3*4").expect("parse should succeed");
        match expr {
            Expr::NAry { op, operands } => {
                assert_eq!(op, BinOp::Add);
                assert!(matches!(
                    &operands[1],
                    Expr::NAry {
                        op: BinOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn not_binds_tighter_than_and_or() {
        // not True or False => (not True) or False
        let expr = parse("not True or False").expect("parse should succeed");
        match expr {
            Expr::NAry { op, operands } => {
                assert_eq!(op, BinOp::Or);
                assert!(matches!(&operands[0], Expr::Unary { op: UnaryOp::Not, .. }));
            }
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_below_pow() {
        // -2**2 => -(2**2)
        let expr = parse("-2**2").expect("parse should succeed");
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn parenthesized_grouping() {
        let expr = parse("(1+2)*3").expect("parse should succeed");
        match expr {
            Expr::NAry { op, .. } => assert_eq!(op, BinOp::Mul),
            other => panic!("expected NAry, got {other:?}"),
        }
    }

    #[test]
    fn trailing_input_is_syntax_error() {
        assert!(matches!(parse("1 2"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn unbalanced_paren_is_syntax_error() {
        assert!(matches!(parse("(1+2"), Err(ExprError::Syntax(_))));
    }

    #[test]
    fn unterminated_braced_var_is_unbalanced() {
        assert_eq!(parse("${x"), Err(ExprError::Unbalanced("x".into())));
    }

    #[test]
    fn empty_input_is_syntax_error() {
        assert!(matches!(parse("   "), Err(ExprError::Syntax(_))));
    }
}
