//! MiniSoft Compiler - semantic analysis and intermediate code generation
//!
//! This library takes MiniSoft source text through a scoped, type-checked
//! symbol table down to a linear list of quadruples.
//!
//! ## Architecture
//!
//! The compiler is organized into:
//! - **Frontend** (`frontend/`): Lexing and parsing into a typed AST
//! - **Sema** (`sema/`): Scope stack, symbol table and type checker
//! - **IR** (`ir/`): Quadruples and the code generator that lowers the AST
//! - **Common** (`common/`): Shared infrastructure (errors, diagnostics, spans)
//! - **Driver** (`driver/`): Pipeline configuration and orchestration

pub mod common;
pub mod frontend;
pub mod sema;
pub mod ir;
pub mod driver;

// Re-exports for convenience
pub use common::{
    CompileError, CompileResult, Diagnostic, DiagnosticKind, DiagnosticReporter, Diagnostics,
    Position, Span,
};
pub use driver::{Compilation, CompilerConfig, Pipeline};
pub use ir::{CodeGenerator, IrProgram, Op, Operand, Quadruple};
pub use sema::{SemanticAnalyzer, Symbol, SymbolTable, Type};
