//! Compilation driver and pipeline orchestration

use std::fmt::Write as _;

use tracing::{debug, info, warn};

use crate::common::{CompileError, CompileResult, Diagnostics};
use crate::frontend::ast::Program;
use crate::frontend::{Lexer, Parser, Token};
use crate::ir::{CodeGenerator, IrProgram};
use crate::sema::{SemanticAnalyzer, SymbolTable};

/// Pipeline options
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
    pub dump_ir: bool,
    pub verbose: bool,
}

/// Outcome of one pipeline run
#[derive(Debug, Default)]
pub struct Compilation {
    pub diagnostics: Diagnostics,
    /// Present once semantic analysis ran, even when it reported problems
    pub symbols: Option<SymbolTable>,
    /// Present only for programs without diagnostics
    pub ir: Option<IrProgram>,
    pub token_dump: Option<String>,
    pub ast_dump: Option<String>,
}

impl Compilation {
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors() && self.ir.is_some()
    }

    pub fn symbol_dump(&self) -> Option<String> {
        self.symbols.as_ref().map(SymbolTable::dump)
    }

    pub fn ir_listing(&self) -> Option<String> {
        self.ir.as_ref().map(ToString::to_string)
    }
}

/// lex -> parse -> analyze -> generate
pub struct Pipeline {
    config: CompilerConfig,
}

impl Pipeline {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run every phase over `source`.
    ///
    /// Lexical, syntax and semantic problems end up in the returned
    /// diagnostics. Code generation only runs when none were recorded.
    pub fn compile(&self, source: &str) -> CompileResult<Compilation> {
        let mut compilation = Compilation::default();

        self.phase("Lexing...");
        let tokens = match Lexer::new(source).tokenize_all() {
            Ok(tokens) => tokens,
            Err(err) => {
                record(err, source, &mut compilation.diagnostics)?;
                return Ok(compilation);
            }
        };
        debug!(tokens = tokens.len(), "lexing finished");
        if self.config.dump_tokens {
            compilation.token_dump = Some(dump_tokens(&tokens));
        }

        self.phase("Parsing...");
        let program = match Parser::from_tokens(tokens).parse() {
            Ok(program) => program,
            Err(err) => {
                record(err, source, &mut compilation.diagnostics)?;
                return Ok(compilation);
            }
        };
        debug!(statements = program.statements.len(), "parsing finished");
        if self.config.dump_ast {
            compilation.ast_dump = Some(format!("{:#?}", program));
        }

        self.phase("Analyzing...");
        let symbols = SemanticAnalyzer::new(&mut compilation.diagnostics).analyze(&program);
        compilation.symbols = Some(symbols);

        self.phase("Generating IR...");
        compilation.ir = match self.generate(&program, &compilation.diagnostics) {
            Ok(ir) => Some(ir),
            Err(err) => {
                warn!(%err, "code generation skipped");
                None
            }
        };

        Ok(compilation)
    }

    /// Parse without analysis
    pub fn parse(&self, source: &str) -> CompileResult<Program> {
        Parser::new(source)?.parse()
    }

    /// Lower `program`, refusing when any diagnostic has been recorded
    pub fn generate(&self, program: &Program, diagnostics: &Diagnostics) -> CompileResult<IrProgram> {
        if diagnostics.has_errors() {
            return Err(CompileError::precondition(format!(
                "code generation requires an error-free program ({} diagnostic(s) recorded)",
                diagnostics.len()
            )));
        }
        Ok(CodeGenerator::new().generate(program))
    }

    fn phase(&self, name: &str) {
        if self.config.verbose {
            info!("{}", name);
        } else {
            debug!("{}", name);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

/// Turn a lexer/parser failure into a diagnostic; anything else is fatal
fn record(err: CompileError, source: &str, diagnostics: &mut Diagnostics) -> CompileResult<()> {
    match err.to_diagnostic(source) {
        Some(diagnostic) => {
            diagnostics.push(diagnostic);
            Ok(())
        }
        None => Err(err),
    }
}

fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let _ = writeln!(out, "{:>4}:{:<4} {:?}", token.pos.line, token.pos.column, token.kind);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DiagnosticKind;
    use crate::ir::Op;
    use pretty_assertions::assert_eq;

    fn compile(source: &str) -> Compilation {
        Pipeline::default().compile(source).unwrap()
    }

    fn kinds(compilation: &Compilation) -> Vec<DiagnosticKind> {
        compilation.diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_successful_compilation() {
        let compilation = compile(
            r#"
            let n: Int;
            let total: Float;
            let data: [Float; 5];
            input(n);
            total := 0;
            for n from 0 to 4 step 1 {
                total := total + data[n];
            }
            output("total:", total);
            "#,
        );
        assert!(compilation.is_success(), "{:?}", kinds(&compilation));
        assert_eq!(compilation.symbols.as_ref().map(|s| s.symbols().len()), Some(3));
        assert!(compilation.ir.as_ref().is_some_and(|ir| !ir.is_empty()));
    }

    #[test]
    fn test_lexical_error_becomes_diagnostic() {
        let compilation = compile("let x: Int;\nx := 3 # 4;");
        assert_eq!(kinds(&compilation), vec![DiagnosticKind::Lexical]);

        let d = &compilation.diagnostics.as_slice()[0];
        assert_eq!((d.line, d.column), (2, 8));
        assert_eq!(d.entity, "#");
        assert!(compilation.symbols.is_none());
        assert!(compilation.ir.is_none());
    }

    #[test]
    fn test_syntax_error_becomes_diagnostic() {
        let compilation = compile("let x: Int;\nx := ;");
        assert_eq!(kinds(&compilation), vec![DiagnosticKind::Syntax]);
        assert_eq!(compilation.diagnostics.as_slice()[0].entity, ";");
        assert!(compilation.ir.is_none());
    }

    #[test]
    fn test_semantic_errors_block_generation() {
        let compilation = compile("let x: Int;\nx := 1.5;\ny := x / 0;");
        assert_eq!(
            kinds(&compilation),
            vec![DiagnosticKind::TypeMismatch, DiagnosticKind::UndeclaredIdentifier]
        );
        assert!(compilation.symbols.is_some());
        assert!(compilation.ir.is_none());
        assert!(!compilation.is_success());
    }

    #[test]
    fn test_generate_refuses_programs_with_diagnostics() {
        let pipeline = Pipeline::default();
        let program = pipeline.parse("x := 1;").unwrap();

        let mut diagnostics = Diagnostics::new();
        let table = SemanticAnalyzer::new(&mut diagnostics).analyze(&program);
        assert!(table.symbols().is_empty());

        let err = pipeline.generate(&program, &diagnostics).unwrap_err();
        assert!(matches!(err, CompileError::Precondition { .. }));
    }

    #[test]
    fn test_dumps_follow_config() {
        let config = CompilerConfig {
            dump_tokens: true,
            dump_ast: true,
            ..CompilerConfig::default()
        };
        let compilation = Pipeline::new(config).compile("let x: Int;").unwrap();

        let tokens = compilation.token_dump.unwrap_or_default();
        assert!(tokens.contains("Let"), "{tokens}");
        assert!(tokens.contains("Eof"), "{tokens}");
        assert!(compilation.ast_dump.is_some_and(|ast| ast.contains("VarDecl")));

        let plain = compile("let x: Int;");
        assert!(plain.token_dump.is_none());
        assert!(plain.ast_dump.is_none());
    }

    #[test]
    fn test_for_loop_body_sits_between_test_and_increment() {
        let compilation = compile("let i: Int; for i from 1 to 3 step 1 { output(i); }");
        let ir = compilation.ir.unwrap();
        let ops: Vec<Op> = ir.iter().map(|q| q.op).collect();

        let init = ir
            .iter()
            .filter(|q| q.op == Op::Assign && q.result.as_ref().is_some_and(|r| r.to_string() == "i"))
            .filter(|q| q.arg1.as_ref().is_some_and(|a| a.to_string() == "1"))
            .count();
        assert_eq!(init, 1);
        assert_eq!(ops.iter().filter(|op| **op == Op::Le).count(), 1);

        let test = ops.iter().position(|op| *op == Op::JumpIfZero).unwrap();
        let output = ops.iter().position(|op| *op == Op::Output).unwrap();
        let increment = ops.iter().position(|op| *op == Op::Add).unwrap();
        assert!(test < output && output < increment);
    }

    #[test]
    fn test_listing_and_symbol_dump() {
        let compilation = compile("let a: Int;\nlet b: Int;\nif (a > b) then { output(\"gt\"); } else { output(\"le\"); }");
        let expected = "\
0: (>, a, b, t0)
1: (JZ, t0, _, L0)
2: (OUTPUT, \"gt\", _, _)
3: (JMP, _, _, L1)
4: (LABEL, _, _, L0)
5: (OUTPUT, \"le\", _, _)
6: (LABEL, _, _, L1)
";
        assert_eq!(compilation.ir_listing().unwrap_or_default(), expected);

        let dump = compilation.symbol_dump().unwrap_or_default();
        assert!(dump.lines().nth(1).is_some_and(|row| row.starts_with("a ")));
        assert!(dump.contains("2:5"));
    }
}
