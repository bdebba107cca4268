//! Quadruple definitions

use std::fmt;

use crate::frontend::ast::{BinaryOp, CompareOp};

/// A generator-allocated temporary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub u32);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A jump target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Quadruple operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Literal source text (numbers and quoted strings)
    Literal(String),
    /// A user variable
    Var(String),
    Temp(Temp),
    Label(Label),
}

impl Operand {
    pub fn literal(text: impl Into<String>) -> Self {
        Operand::Literal(text.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Operand::Var(name.into())
    }

    pub fn as_label(&self) -> Option<Label> {
        match self {
            Operand::Label(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(text) | Operand::Var(text) => f.write_str(text),
            Operand::Temp(t) => write!(f, "{}", t),
            Operand::Label(l) => write!(f, "{}", l),
        }
    }
}

impl From<Temp> for Operand {
    fn from(t: Temp) -> Self {
        Operand::Temp(t)
    }
}

impl From<Label> for Operand {
    fn from(l: Label) -> Self {
        Operand::Label(l)
    }
}

/// Quadruple operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Jump,
    JumpIfZero,
    JumpIfTrue,
    Label,
    Input,
    Output,
    ArrayRead,
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Assign => "=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "!",
            Op::Jump => "JMP",
            Op::JumpIfZero => "JZ",
            Op::JumpIfTrue => "JNZ",
            Op::Label => "LABEL",
            Op::Input => "INPUT",
            Op::Output => "OUTPUT",
            Op::ArrayRead => "[]",
        }
    }

    /// Whether the result slot names a jump target
    pub fn is_jump(self) -> bool {
        matches!(self, Op::Jump | Op::JumpIfZero | Op::JumpIfTrue)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl From<BinaryOp> for Op {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Op::Add,
            BinaryOp::Sub => Op::Sub,
            BinaryOp::Mul => Op::Mul,
            BinaryOp::Div => Op::Div,
        }
    }
}

impl From<CompareOp> for Op {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Lt => Op::Lt,
            CompareOp::Gt => Op::Gt,
            CompareOp::Le => Op::Le,
            CompareOp::Ge => Op::Ge,
            CompareOp::Eq => Op::Eq,
            CompareOp::Ne => Op::Ne,
        }
    }
}

/// One three-address instruction: `(op, arg1, arg2, result)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quadruple {
    pub op: Op,
    pub arg1: Option<Operand>,
    pub arg2: Option<Operand>,
    pub result: Option<Operand>,
}

impl Quadruple {
    pub fn new(
        op: Op,
        arg1: Option<Operand>,
        arg2: Option<Operand>,
        result: Option<Operand>,
    ) -> Self {
        Self { op, arg1, arg2, result }
    }

    pub fn label(label: Label) -> Self {
        Self::new(Op::Label, None, None, Some(label.into()))
    }

    pub fn jump(label: Label) -> Self {
        Self::new(Op::Jump, None, None, Some(label.into()))
    }

    /// Conditional jump on `cond`; `op` is `JumpIfZero` or `JumpIfTrue`
    pub fn branch(op: Op, cond: Operand, label: Label) -> Self {
        Self::new(op, Some(cond), None, Some(label.into()))
    }

    pub fn assign(value: Operand, target: Operand) -> Self {
        Self::new(Op::Assign, Some(value), None, Some(target))
    }

    /// Label defined by a `LABEL` quadruple
    pub fn defined_label(&self) -> Option<Label> {
        match self.op {
            Op::Label => self.result.as_ref().and_then(Operand::as_label),
            _ => None,
        }
    }

    /// Label targeted by a jump quadruple
    pub fn jump_target(&self) -> Option<Label> {
        if self.op.is_jump() {
            self.result.as_ref().and_then(Operand::as_label)
        } else {
            None
        }
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn slot(operand: &Option<Operand>) -> String {
            operand.as_ref().map_or_else(|| "_".to_string(), ToString::to_string)
        }
        write!(
            f,
            "({}, {}, {}, {})",
            self.op,
            slot(&self.arg1),
            slot(&self.arg2),
            slot(&self.result)
        )
    }
}

/// Ordered, append-only quadruple sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrProgram {
    quads: Vec<Quadruple>,
}

impl IrProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, quad: Quadruple) {
        self.quads.push(quad);
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quadruple> {
        self.quads.iter()
    }

    pub fn as_slice(&self) -> &[Quadruple] {
        &self.quads
    }

    pub fn get(&self, index: usize) -> Option<&Quadruple> {
        self.quads.get(index)
    }

    /// Labels introduced by `LABEL` quadruples, in listing order
    pub fn defined_labels(&self) -> Vec<Label> {
        self.quads.iter().filter_map(Quadruple::defined_label).collect()
    }

    /// Labels referenced by jumps, in listing order (may repeat)
    pub fn jump_targets(&self) -> Vec<Label> {
        self.quads.iter().filter_map(Quadruple::jump_target).collect()
    }
}

impl<'a> IntoIterator for &'a IrProgram {
    type Item = &'a Quadruple;
    type IntoIter = std::slice::Iter<'a, Quadruple>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, quad) in self.quads.iter().enumerate() {
            writeln!(f, "{}: {}", index, quad)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quadruple_display() {
        let quad = Quadruple::new(
            Op::Add,
            Some(Operand::var("a")),
            Some(Operand::literal("1")),
            Some(Temp(0).into()),
        );
        assert_eq!(quad.to_string(), "(+, a, 1, t0)");
        assert_eq!(Quadruple::jump(Label(3)).to_string(), "(JMP, _, _, L3)");
    }

    #[test]
    fn test_label_queries() {
        let mut program = IrProgram::new();
        program.push(Quadruple::label(Label(0)));
        program.push(Quadruple::branch(Op::JumpIfTrue, Temp(1).into(), Label(0)));
        program.push(Quadruple::jump(Label(0)));
        program.push(Quadruple::label(Label(1)));

        assert_eq!(program.defined_labels(), vec![Label(0), Label(1)]);
        assert_eq!(program.jump_targets(), vec![Label(0), Label(0)]);
        assert_eq!(program.get(1).map(|q| q.op), Some(Op::JumpIfTrue));
        assert_eq!(program.get(4), None);
    }

    #[test]
    fn test_program_listing() {
        let mut program = IrProgram::new();
        program.push(Quadruple::new(Op::Input, None, None, Some(Operand::var("x"))));
        program.push(Quadruple::new(Op::Output, Some(Operand::literal("\"hi\"")), None, None));

        assert_eq!(program.to_string(), "0: (INPUT, _, _, x)\n1: (OUTPUT, \"hi\", _, _)\n");
    }
}
