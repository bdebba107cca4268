//! Symbol table and scope management

use std::collections::HashMap;
use std::fmt;

use super::types::Type;
use crate::common::Position;

/// A declared name
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub is_constant: bool,
    /// Present iff `ty` is an array type
    pub array_size: Option<usize>,
    pub declared_at: Position,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, ty: Type, declared_at: Position) -> Self {
        Self {
            name: name.into(),
            ty,
            is_constant: false,
            array_size: None,
            declared_at,
        }
    }

    pub fn constant(name: impl Into<String>, ty: Type, declared_at: Position) -> Self {
        Self {
            is_constant: true,
            ..Self::variable(name, ty, declared_at)
        }
    }

    pub fn array(name: impl Into<String>, ty: Type, size: usize, declared_at: Position) -> Self {
        Self {
            array_size: Some(size),
            ..Self::variable(name, ty, declared_at)
        }
    }

    /// Human-readable kind used by the table dump
    pub fn kind(&self) -> &'static str {
        if self.is_constant {
            "constant"
        } else if self.array_size.is_some() {
            "array"
        } else {
            "variable"
        }
    }
}

/// One entry of the declaration log
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredSymbol {
    pub symbol: Symbol,
    /// Frame depth at declaration time, 0 for the global frame
    pub depth: usize,
}

/// Stack of name-to-symbol frames.
///
/// The global frame is created with the table and is never removed. Every
/// successful declaration is also appended to a log that survives frame
/// pops, which is what the table dump prints.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    frames: Vec<HashMap<String, Symbol>>,
    declared: Vec<DeclaredSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            declared: Vec::new(),
        }
    }

    /// Push an empty frame
    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
        tracing::trace!(depth = self.depth(), "enter scope");
    }

    /// Pop the innermost frame; the global frame stays
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            tracing::trace!(depth = self.depth(), "exit scope");
        }
    }

    /// Current frame depth, 0 at global scope
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Insert into the innermost frame. Shadowing outer frames is allowed.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), String> {
        let depth = self.depth();
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| String::from("no active scope"))?;

        if frame.contains_key(&symbol.name) {
            return Err(format!("symbol '{}' already declared in this scope", symbol.name));
        }

        tracing::trace!(name = %symbol.name, ty = %symbol.ty, depth, "declare");
        self.declared.push(DeclaredSymbol { symbol: symbol.clone(), depth });
        frame.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Innermost visible symbol named `name`
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Symbol named `name` in the innermost frame only
    pub fn lookup_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.frames.last().and_then(|frame| frame.get(name))
    }

    /// Every symbol ever declared, in declaration order
    pub fn symbols(&self) -> &[DeclaredSymbol] {
        &self.declared
    }

    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16}{:<12}{:<10}{:<7}{:<10}{}",
            "NAME", "TYPE", "KIND", "DEPTH", "LINE:COL", "SIZE"
        )?;
        for entry in &self.declared {
            let sym = &entry.symbol;
            let size = sym.array_size.map(|n| format!("size={}", n)).unwrap_or_default();
            let row = format!(
                "{:<16}{:<12}{:<10}{:<7}{:<10}{}",
                sym.name,
                sym.ty.to_string(),
                sym.kind(),
                entry.depth,
                sym.declared_at.to_string(),
                size
            );
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}
