//! Semantic diagnostics and the append-only collector the passes write into

use std::fmt;
use super::{Position, Span};

/// Category of a reported problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    UndeclaredIdentifier,
    DuplicateDeclaration,
    InvalidIdentifier,
    TypeMismatch,
    ArrayBounds,
    ConstantModification,
    DivisionByZero,
}

impl DiagnosticKind {
    /// Short stable code, used by the terminal renderer
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "E0001",
            DiagnosticKind::Syntax => "E0002",
            DiagnosticKind::UndeclaredIdentifier => "E0101",
            DiagnosticKind::DuplicateDeclaration => "E0102",
            DiagnosticKind::InvalidIdentifier => "E0103",
            DiagnosticKind::TypeMismatch => "E0104",
            DiagnosticKind::ArrayBounds => "E0105",
            DiagnosticKind::ConstantModification => "E0106",
            DiagnosticKind::DivisionByZero => "E0107",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "lexical error",
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::UndeclaredIdentifier => "undeclared identifier",
            DiagnosticKind::DuplicateDeclaration => "duplicate declaration",
            DiagnosticKind::InvalidIdentifier => "invalid identifier name",
            DiagnosticKind::TypeMismatch => "type mismatch",
            DiagnosticKind::ArrayBounds => "invalid array bounds",
            DiagnosticKind::ConstantModification => "constant modification",
            DiagnosticKind::DivisionByZero => "division by zero",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DiagnosticKind::Lexical => "LEXICAL",
            DiagnosticKind::Syntax => "SYNTAX",
            DiagnosticKind::UndeclaredIdentifier => "UNDECLARED_IDENTIFIER",
            DiagnosticKind::DuplicateDeclaration => "DUPLICATE_DECLARATION",
            DiagnosticKind::InvalidIdentifier => "INVALID_IDENTIFIER",
            DiagnosticKind::TypeMismatch => "TYPE_MISMATCH",
            DiagnosticKind::ArrayBounds => "ARRAY_BOUNDS",
            DiagnosticKind::ConstantModification => "CONSTANT_MODIFICATION",
            DiagnosticKind::DivisionByZero => "DIVISION_BY_ZERO",
        };
        f.write_str(tag)
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Source text of the offending entity (identifier, operator, ...)
    pub entity: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        message: impl Into<String>,
        position: Position,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            line: position.line,
            column: position.column,
            entity: entity.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] at line {}:{} - {}: {}",
            self.kind, self.line, self.column, self.entity, self.message
        )
    }
}

/// Append-only diagnostic collector
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(%diagnostic, "diagnostic recorded");
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Number of diagnostics of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
