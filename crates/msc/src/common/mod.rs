//! Common infrastructure shared across the passes

mod diagnostics;
mod error;
mod span;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use span::{LineIndex, Position, Span};
