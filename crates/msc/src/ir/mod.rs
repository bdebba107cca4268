//! Intermediate Representation module
//!
//! Three-address quadruples with explicit labels and jumps.

mod builder;
mod quad;

pub use builder::CodeGenerator;
pub use quad::*;
