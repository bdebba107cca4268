//! Statement and declaration AST nodes

use super::{Cond, DataType, Expr, Ident};
use crate::common::{Position, Span};

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub pos: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, pos: Position) -> Self {
        Self { kind, span, pos }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Scalar variable: let x: Int;
    VarDecl(VarDecl),

    /// Array variable: let a: [Float; 10];
    ArrayDecl(ArrayDecl),

    /// Constant: @define Const pi: Float = 3.14;
    ConstDecl(ConstDecl),

    /// Assignment: x := expr;
    Assign {
        target: Ident,
        value: Expr,
    },

    /// if (cond) then { ... } else { ... }
    If {
        condition: Cond,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    /// do { ... } while (cond);
    DoWhile {
        body: Vec<Stmt>,
        condition: Cond,
    },

    /// for i from a to b step c { ... }
    For {
        var: Ident,
        from: Expr,
        to: Expr,
        step: Expr,
        body: Vec<Stmt>,
    },

    /// input(x);
    Input(Ident),

    /// output("text", x, y); or output(x);
    Output(OutputArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDecl {
    pub name: Ident,
    pub element: DataType,
    /// Declared size as written in the source
    pub size: String,
    pub size_pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: Ident,
    pub ty: DataType,
    /// Position of the data type keyword
    pub ty_pos: Position,
    pub value: Expr,
}

/// Operands of an `output` statement
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArgs {
    /// String literal including its quotes, when present
    pub text: Option<String>,
    pub idents: Vec<Ident>,
}
