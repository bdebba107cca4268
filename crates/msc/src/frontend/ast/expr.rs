//! Expression and condition AST nodes

use super::Ident;
use crate::common::{Position, Span};
use std::fmt;

/// Arithmetic expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub pos: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span, pos: Position) -> Self {
        Self { kind, span, pos }
    }

    /// Literal zero divisor (`0` or `0.0`), as written in the source
    pub fn is_zero_literal(&self) -> bool {
        match &self.kind {
            ExprKind::IntLiteral(text) => text == "0",
            ExprKind::FloatLiteral(text) => text == "0.0",
            _ => false,
        }
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Bare identifier: x
    Identifier(String),

    /// Integer literal, kept as source text: 42
    IntLiteral(String),

    /// Float literal, kept as source text: 3.14
    FloatLiteral(String),

    /// Array element: arr[i + 1]
    Index {
        array: Ident,
        index: Box<Expr>,
    },

    /// Parenthesized expression: (a + b)
    Paren(Box<Expr>),

    /// Unary minus: -x
    Negate(Box<Expr>),

    /// Binary arithmetic: a * b, a - b
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn is_multiplicative(self) -> bool {
        matches!(self, BinaryOp::Mul | BinaryOp::Div)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
        }
    }
}

/// Boolean condition node (only valid in `if`/`while` positions)
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub kind: CondKind,
    pub span: Span,
    pub pos: Position,
}

impl Cond {
    pub fn new(kind: CondKind, span: Span, pos: Position) -> Self {
        Self { kind, span, pos }
    }
}

/// Condition kinds
#[derive(Debug, Clone, PartialEq)]
pub enum CondKind {
    /// Comparison: a < b
    Compare {
        op: CompareOp,
        /// Position of the operator token
        op_pos: Position,
        left: Expr,
        right: Expr,
    },

    /// Conjunction: c1 AND c2
    And(Box<Cond>, Box<Cond>),

    /// Disjunction: c1 OR c2
    Or(Box<Cond>, Box<Cond>),

    /// Negation: !c
    Not(Box<Cond>),

    /// Parenthesized condition: (c)
    Paren(Box<Cond>),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Select the operator from its source lexeme
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            "<=" => Some(CompareOp::Le),
            ">=" => Some(CompareOp::Ge),
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            _ => None,
        }
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}
