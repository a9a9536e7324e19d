//! AST types for the expression language.

use crate::value::Value;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-x`).
    Neg,
    /// Logical negation (`not x`).
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }
}

/// Binary operators, one closed enum matched exhaustively.
///
/// Adding or removing an operator is a compile-time-checked change;
/// there is no name-keyed dispatch table to fall out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Pow,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Add,
    Sub,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Pow => "**",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    /// Only `**` folds from the right.
    pub fn is_right_assoc(&self) -> bool {
        matches!(self, BinOp::Pow)
    }
}

/// A parsed expression.
///
/// `NAry` holds a flattened run of one operator over two or more
/// operands, so chains like `a+b+c` stay shallow. Mixed operators of
/// the same precedence nest left (`a+b-c` is `(a+b)-c`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal. String literals may still contain embedded `$name`
    /// references; those are resolved at evaluation time.
    Literal(Value),
    /// An unresolved variable lookup key (the name, sigil stripped).
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    NAry {
        op: BinOp,
        operands: Vec<Expr>,
    },
}

impl Expr {
    /// Convenience constructor used by the parser and tests.
    pub fn nary(op: BinOp, operands: Vec<Expr>) -> Self {
        debug_assert!(operands.len() >= 2, "NAry node needs at least 2 operands");
        Expr::NAry { op, operands }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}
