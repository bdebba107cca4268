//! Abstract Syntax Tree definitions
//!
//! One variant per node kind; every node carries its byte span and its
//! line/column position so the passes can report diagnostics.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::common::{Position, Span};
use std::fmt;

/// A complete MiniSoft program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

/// An identifier occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub pos: Position,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span, pos: Position) -> Self {
        Self {
            name: name.into(),
            span,
            pos,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declared scalar type: `Int` or `Float`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "Int"),
            DataType::Float => write!(f, "Float"),
        }
    }
}
