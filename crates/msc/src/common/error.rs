//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic as Report, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;
use super::{Diagnostic, DiagnosticKind, Position, Span};

/// Fatal compile error. Ordinary semantic violations are [`Diagnostic`]s instead.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {position}: {message}")]
    Lexer { message: String, span: Span, position: Position },

    #[error("Parser error at {position}: {message}")]
    Parser { message: String, span: Span, position: Position },

    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span, position: Position) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
            position,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, position: Position) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            position,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Convert a lexer/parser failure into a collectable diagnostic
    pub fn to_diagnostic(&self, source: &str) -> Option<Diagnostic> {
        let (kind, message, span, position) = match self {
            CompileError::Lexer { message, span, position } => {
                (DiagnosticKind::Lexical, message, *span, *position)
            }
            CompileError::Parser { message, span, position } => {
                (DiagnosticKind::Syntax, message, *span, *position)
            }
            CompileError::Precondition { .. } | CompileError::Io(_) => return None,
        };
        let entity = source.get(span.start..span.end).unwrap_or_default();
        Some(Diagnostic::new(kind, message.clone(), position, entity).with_span(span))
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(color: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(color),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let report = match error {
            CompileError::Lexer { message, span, .. } => Report::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Parser { message, span, .. } => Report::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Precondition { message } => {
                Report::error().with_message(format!("Precondition violated: {message}"))
            }

            CompileError::Io(err) => Report::error().with_message(format!("IO error: {err}")),
        };

        self.emit(&report);
    }

    /// Render a semantic diagnostic with its source snippet
    pub fn report_diagnostic(&self, file_id: usize, diagnostic: &Diagnostic) {
        let mut report = Report::error()
            .with_code(diagnostic.kind.code())
            .with_message(diagnostic.kind.title());
        report = match diagnostic.span {
            Some(span) => report.with_labels(vec![
                Label::primary(file_id, span.start..span.end).with_message(&diagnostic.message),
            ]),
            None => report.with_notes(vec![format!(
                "at line {}:{}: {}",
                diagnostic.line, diagnostic.column, diagnostic.message
            )]),
        };

        self.emit(&report);
    }

    fn emit(&self, report: &Report<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, report);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
