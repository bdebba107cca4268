//! Parser module

mod parser;

pub use parser::Parser;
