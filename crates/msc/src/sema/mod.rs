//! Semantic analysis module
//!
//! Resolves names against a stack of scopes and type checks every
//! statement, recording problems as diagnostics.

mod analyzer;
mod scope;
mod types;

pub use analyzer::SemanticAnalyzer;
pub use scope::{DeclaredSymbol, Symbol, SymbolTable};
pub use types::{validate_identifier, NameError, Type, MAX_IDENTIFIER_LEN};
