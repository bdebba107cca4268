//! Semantic analyzer - scope resolution and type checking

use tracing::debug;

use super::scope::{Symbol, SymbolTable};
use super::types::{validate_identifier, Type};
use crate::common::{Diagnostic, DiagnosticKind, Diagnostics, Position, Span};
use crate::frontend::ast::*;

/// Single-pass semantic checker.
///
/// Every failed check records one diagnostic and substitutes a safe default
/// (`Int`, or an unregistered symbol) so the rest of the program is still
/// analyzed.
pub struct SemanticAnalyzer<'d> {
    table: SymbolTable,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> SemanticAnalyzer<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            table: SymbolTable::new(),
            diagnostics,
        }
    }

    /// Analyze a whole program and hand back the populated symbol table
    pub fn analyze(mut self, program: &Program) -> SymbolTable {
        let before = self.diagnostics.len();
        debug!(statements = program.statements.len(), "semantic analysis started");

        for stmt in &program.statements {
            self.check_stmt(stmt);
        }

        debug!(
            symbols = self.table.symbols().len(),
            diagnostics = self.diagnostics.len() - before,
            "semantic analysis finished"
        );
        self.table
    }

    fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        pos: Position,
        entity: impl Into<String>,
        span: Span,
    ) {
        self.diagnostics
            .push(Diagnostic::new(kind, message, pos, entity).with_span(span));
    }

    fn report_undeclared(&mut self, ident: &Ident) {
        self.report(
            DiagnosticKind::UndeclaredIdentifier,
            format!("'{}' is not declared", ident.name),
            ident.pos,
            &ident.name,
            ident.span,
        );
    }

    /// Run `f` inside a fresh frame; the frame is popped on every path out of `f`
    fn in_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.table.enter_scope();
        let result = f(self);
        self.table.exit_scope();
        result
    }

    fn check_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Naming rule, then uniqueness in the innermost frame
    fn can_declare(&mut self, name: &Ident) -> bool {
        if let Err(reason) = validate_identifier(&name.name) {
            self.report(
                DiagnosticKind::InvalidIdentifier,
                reason.to_string(),
                name.pos,
                &name.name,
                name.span,
            );
            return false;
        }

        if let Some(existing) = self.table.lookup_current_scope(&name.name) {
            let first = existing.declared_at;
            self.report(
                DiagnosticKind::DuplicateDeclaration,
                format!("'{}' is already declared in this scope at {}", name.name, first),
                name.pos,
                &name.name,
                name.span,
            );
            return false;
        }

        true
    }

    fn register(&mut self, name: &Ident, symbol: Symbol) {
        if let Err(message) = self.table.declare(symbol) {
            self.report(
                DiagnosticKind::DuplicateDeclaration,
                message,
                name.pos,
                &name.name,
                name.span,
            );
        }
    }

    fn check_var_decl(&mut self, decl: &VarDecl) {
        if self.can_declare(&decl.name) {
            let symbol = Symbol::variable(&decl.name.name, decl.ty.into(), decl.name.pos);
            self.register(&decl.name, symbol);
        }
    }

    fn check_array_decl(&mut self, decl: &ArrayDecl) {
        if !self.can_declare(&decl.name) {
            return;
        }

        let size = match decl.size.parse::<i64>() {
            Ok(n) if n > 0 => usize::try_from(n).ok(),
            _ => None,
        };
        let Some(size) = size else {
            self.report(
                DiagnosticKind::ArrayBounds,
                format!("array size of '{}' must be a positive integer", decl.name.name),
                decl.size_pos,
                &decl.size,
                decl.name.span,
            );
            return;
        };

        let symbol = Symbol::array(
            &decl.name.name,
            Type::array_of(decl.element),
            size,
            decl.name.pos,
        );
        self.register(&decl.name, symbol);
    }

    fn check_const_decl(&mut self, decl: &ConstDecl) {
        let declared = Type::from(decl.ty);
        let value = self.check_expr(&decl.value);
        if !declared.accepts(value) {
            self.report(
                DiagnosticKind::TypeMismatch,
                format!(
                    "constant '{}' is declared {} but initialized with {}",
                    decl.name.name, declared, value
                ),
                decl.ty_pos,
                &decl.name.name,
                decl.value.span,
            );
        }

        if self.can_declare(&decl.name) {
            let symbol = Symbol::constant(&decl.name.name, declared, decl.name.pos);
            self.register(&decl.name, symbol);
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => self.check_var_decl(decl),
            StmtKind::ArrayDecl(decl) => self.check_array_decl(decl),
            StmtKind::ConstDecl(decl) => self.check_const_decl(decl),
            StmtKind::Assign { target, value } => self.check_assign(target, value),
            StmtKind::If { condition, then_branch, else_branch } => {
                self.check_cond(condition);
                self.in_scope(|a| a.check_block(then_branch));
                if let Some(else_branch) = else_branch {
                    self.in_scope(|a| a.check_block(else_branch));
                }
            }
            StmtKind::DoWhile { body, condition } => {
                self.in_scope(|a| {
                    a.check_block(body);
                    a.check_cond(condition);
                });
            }
            StmtKind::For { var, from, to, step, body } => {
                self.in_scope(|a| {
                    a.check_loop_variable(var);
                    for bound in [from, to, step] {
                        let ty = a.check_expr(bound);
                        if !ty.is_numeric() {
                            a.report(
                                DiagnosticKind::TypeMismatch,
                                format!("loop bound must be numeric, found {}", ty),
                                bound.pos,
                                &var.name,
                                bound.span,
                            );
                        }
                    }
                    a.check_block(body);
                });
            }
            StmtKind::Input(target) => {
                let Some(is_constant) = self.table.lookup(&target.name).map(|s| s.is_constant)
                else {
                    self.report_undeclared(target);
                    return;
                };
                if is_constant {
                    self.report(
                        DiagnosticKind::ConstantModification,
                        format!("cannot read input into constant '{}'", target.name),
                        target.pos,
                        &target.name,
                        target.span,
                    );
                }
            }
            StmtKind::Output(args) => {
                for ident in &args.idents {
                    if self.table.lookup(&ident.name).is_none() {
                        self.report_undeclared(ident);
                    }
                }
            }
        }
    }

    fn check_assign(&mut self, target: &Ident, value: &Expr) {
        let Some(symbol) = self.table.lookup(&target.name) else {
            self.report_undeclared(target);
            return;
        };
        let (target_ty, is_constant) = (symbol.ty, symbol.is_constant);

        if is_constant {
            self.report(
                DiagnosticKind::ConstantModification,
                format!("cannot assign to constant '{}'", target.name),
                target.pos,
                &target.name,
                target.span,
            );
        }

        let value_ty = self.check_expr(value);
        if !target_ty.accepts(value_ty) {
            self.report(
                DiagnosticKind::TypeMismatch,
                format!("cannot assign {} to '{}' of type {}", value_ty, target.name, target_ty),
                target.pos,
                &target.name,
                value.span,
            );
        }
    }

    fn check_loop_variable(&mut self, var: &Ident) {
        let Some(symbol) = self.table.lookup(&var.name) else {
            self.report_undeclared(var);
            return;
        };
        let (ty, is_constant) = (symbol.ty, symbol.is_constant);

        if is_constant {
            self.report(
                DiagnosticKind::ConstantModification,
                format!("constant '{}' cannot be a loop variable", var.name),
                var.pos,
                &var.name,
                var.span,
            );
        }
        if ty != Type::Int {
            self.report(
                DiagnosticKind::TypeMismatch,
                format!("loop variable must be Int, found {}", ty),
                var.pos,
                &var.name,
                var.span,
            );
        }
    }

    // =========================================================================
    // Expressions and conditions
    // =========================================================================

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Type::Int,
            ExprKind::FloatLiteral(_) => Type::Float,
            ExprKind::Identifier(name) => {
                let Some(ty) = self.table.lookup(name).map(|s| s.ty) else {
                    self.report(
                        DiagnosticKind::UndeclaredIdentifier,
                        format!("'{}' is not declared", name),
                        expr.pos,
                        name,
                        expr.span,
                    );
                    return Type::Int;
                };
                if ty.is_array() {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        format!("array '{}' cannot be used without an index", name),
                        expr.pos,
                        name,
                        expr.span,
                    );
                    return Type::Int;
                }
                ty
            }
            ExprKind::Index { array, index } => {
                let Some(ty) = self.table.lookup(&array.name).map(|s| s.ty) else {
                    self.report_undeclared(array);
                    return Type::Int;
                };
                let Some(element) = ty.element_type() else {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        format!("'{}' is not an array", array.name),
                        array.pos,
                        &array.name,
                        array.span,
                    );
                    return Type::Int;
                };

                let index_ty = self.check_expr(index);
                if index_ty != Type::Int {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        format!("array index must be Int, found {}", index_ty),
                        index.pos,
                        &array.name,
                        index.span,
                    );
                }
                element
            }
            ExprKind::Paren(inner) => self.check_expr(inner),
            ExprKind::Negate(inner) => {
                let ty = self.check_expr(inner);
                if ty.is_numeric() {
                    ty
                } else {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        format!("cannot negate a value of type {}", ty),
                        expr.pos,
                        "-",
                        expr.span,
                    );
                    Type::Int
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);

                let mut numeric = true;
                for (operand, ty) in [(left, left_ty), (right, right_ty)] {
                    if !ty.is_numeric() {
                        numeric = false;
                        self.report(
                            DiagnosticKind::TypeMismatch,
                            format!("operand of '{}' must be numeric, found {}", op, ty),
                            operand.pos,
                            op.to_string(),
                            operand.span,
                        );
                    }
                }

                // Literal divisors only; no constant folding
                if *op == BinaryOp::Div && right.is_zero_literal() {
                    self.report(
                        DiagnosticKind::DivisionByZero,
                        "division by a literal zero",
                        right.pos,
                        "/",
                        right.span,
                    );
                }

                if numeric {
                    Type::arithmetic_result(left_ty, right_ty)
                } else {
                    Type::Int
                }
            }
        }
    }

    /// Conditions always synthesize `Int`
    fn check_cond(&mut self, cond: &Cond) -> Type {
        match &cond.kind {
            CondKind::Compare { op, op_pos, left, right } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                if !left_ty.is_comparable_with(right_ty) {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        format!("cannot compare {} with {}", left_ty, right_ty),
                        *op_pos,
                        op.lexeme(),
                        cond.span,
                    );
                }
            }
            CondKind::And(left, right) | CondKind::Or(left, right) => {
                self.check_cond(left);
                self.check_cond(right);
            }
            CondKind::Not(inner) | CondKind::Paren(inner) => {
                self.check_cond(inner);
            }
        }
        Type::Int
    }
}
