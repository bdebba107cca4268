//! MiniSoft frontend: lexer, AST, and parser

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::Program;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
