//! Recursive descent parser for MiniSoft

use crate::common::{CompileError, CompileResult, Position, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for MiniSoft
///
/// Works over the fully tokenized source so that the condition grammar can
/// backtrack between `( condition )` and a comparison whose left operand is
/// parenthesized.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    prev_span: Span,
}

impl Parser {
    /// Create a new parser for the given source
    pub fn new(source: &str) -> CompileResult<Self> {
        let tokens = Lexer::new(source).tokenize_all()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Create a parser over already lexed tokens. The list must end with `Eof`.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            let pos = tokens.last().map_or_else(Position::default, |t| t.pos);
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end), pos));
        }
        Self {
            tokens,
            pos: 0,
            prev_span: Span::default(),
        }
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut statements = Vec::new();

        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program::new(statements))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        self.prev_span = token.span;
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {}, found {}", kind, self.current().kind)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        let token = self.current();
        CompileError::parser(message, token.span, token.pos)
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span)
    }

    fn parse_ident(&mut self) -> CompileResult<Ident> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Ident::new(name, token.span, token.pos))
            }
            other => Err(self.error(format!("expected identifier, found {}", other))),
        }
    }

    fn parse_data_type(&mut self) -> CompileResult<DataType> {
        if self.match_token(&TokenKind::Int) {
            Ok(DataType::Int)
        } else if self.match_token(&TokenKind::Float) {
            Ok(DataType::Float)
        } else {
            Err(self.error(format!("expected 'Int' or 'Float', found {}", self.current().kind)))
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let start = self.current().clone();

        let kind = match &start.kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Define => self.parse_const_decl()?,
            TokenKind::Identifier(_) => self.parse_assignment()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::Do => self.parse_do_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Input => self.parse_input()?,
            TokenKind::Output => self.parse_output()?,
            other => return Err(self.error(format!("expected statement, found {}", other))),
        };

        Ok(Stmt::new(kind, self.span_from(start.span), start.pos))
    }

    /// `let x: Int;` or `let a: [Int; 10];`
    fn parse_let(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::Let)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;

        if self.match_token(&TokenKind::LBracket) {
            let element = self.parse_data_type()?;
            self.expect(TokenKind::Semi)?;
            let size_token = self.current().clone();
            let size = match size_token.kind {
                TokenKind::IntLiteral(text) => {
                    self.advance();
                    text
                }
                other => {
                    return Err(self.error(format!("expected array size, found {}", other)));
                }
            };
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::Semi)?;
            return Ok(StmtKind::ArrayDecl(ArrayDecl {
                name,
                element,
                size,
                size_pos: size_token.pos,
            }));
        }

        let ty = self.parse_data_type()?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::VarDecl(VarDecl { name, ty }))
    }

    /// `@define Const pi: Float = 3.14;`
    fn parse_const_decl(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::Define)?;
        self.expect(TokenKind::Const)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty_pos = self.current().pos;
        let ty = self.parse_data_type()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::ConstDecl(ConstDecl { name, ty, ty_pos, value }))
    }

    fn parse_assignment(&mut self) -> CompileResult<StmtKind> {
        let target = self.parse_ident()?;
        self.expect(TokenKind::ColonEq)?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::Assign { target, value })
    }

    fn parse_block(&mut self) -> CompileResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(statements)
    }

    fn parse_if(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(StmtKind::If { condition, then_branch, else_branch })
    }

    fn parse_do_while(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::Do)?;
        let body = self.parse_block()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::DoWhile { body, condition })
    }

    fn parse_for(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::For)?;
        let var = self.parse_ident()?;
        self.expect(TokenKind::From)?;
        let from = self.parse_expression()?;
        self.expect(TokenKind::To)?;
        let to = self.parse_expression()?;
        self.expect(TokenKind::Step)?;
        let step = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(StmtKind::For { var, from, to, step, body })
    }

    fn parse_input(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::Input)?;
        self.expect(TokenKind::LParen)?;
        let target = self.parse_ident()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::Input(target))
    }

    /// `output("text", a, b);` or `output(a);`
    fn parse_output(&mut self) -> CompileResult<StmtKind> {
        self.expect(TokenKind::Output)?;
        self.expect(TokenKind::LParen)?;

        let args = if let TokenKind::StringLiteral(text) = self.current().kind.clone() {
            self.advance();
            let mut idents = Vec::new();
            while self.match_token(&TokenKind::Comma) {
                idents.push(self.parse_ident()?);
            }
            OutputArgs { text: Some(text), idents }
        } else {
            OutputArgs { text: None, idents: vec![self.parse_ident()?] }
        };

        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(StmtKind::Output(args))
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// OR binds loosest, AND tighter; both are left-associative.
    fn parse_condition(&mut self) -> CompileResult<Cond> {
        let mut left = self.parse_and_condition()?;
        while self.match_token(&TokenKind::Or) {
            let right = self.parse_and_condition()?;
            let span = left.span.merge(right.span);
            let pos = left.pos;
            left = Cond::new(CondKind::Or(Box::new(left), Box::new(right)), span, pos);
        }
        Ok(left)
    }

    fn parse_and_condition(&mut self) -> CompileResult<Cond> {
        let mut left = self.parse_condition_atom()?;
        while self.match_token(&TokenKind::And) {
            let right = self.parse_condition_atom()?;
            let span = left.span.merge(right.span);
            let pos = left.pos;
            left = Cond::new(CondKind::And(Box::new(left), Box::new(right)), span, pos);
        }
        Ok(left)
    }

    fn parse_condition_atom(&mut self) -> CompileResult<Cond> {
        let start = self.current().clone();

        // `!` negates everything to its right, including AND/OR chains
        if self.match_token(&TokenKind::Bang) {
            let inner = self.parse_condition()?;
            let span = self.span_from(start.span);
            return Ok(Cond::new(CondKind::Not(Box::new(inner)), span, start.pos));
        }

        if self.check(&TokenKind::LParen) {
            let saved = (self.pos, self.prev_span);
            match self.parse_paren_condition() {
                Ok(cond) => return Ok(cond),
                Err(_) => (self.pos, self.prev_span) = saved,
            }
        }

        self.parse_comparison()
    }

    fn parse_paren_condition(&mut self) -> CompileResult<Cond> {
        let start = self.expect(TokenKind::LParen)?;
        let inner = self.parse_condition()?;
        self.expect(TokenKind::RParen)?;
        let span = self.span_from(start.span);
        Ok(Cond::new(CondKind::Paren(Box::new(inner)), span, start.pos))
    }

    fn parse_comparison(&mut self) -> CompileResult<Cond> {
        let left = self.parse_expression()?;

        let op_token = self.current().clone();
        let op = op_token
            .kind
            .lexeme()
            .filter(|_| op_token.kind.is_comparison_op())
            .and_then(CompareOp::from_lexeme)
            .ok_or_else(|| {
                self.error(format!("expected comparison operator, found {}", op_token.kind))
            })?;
        self.advance();

        let right = self.parse_expression()?;
        let span = left.span.merge(right.span);
        let pos = left.pos;
        Ok(Cond::new(
            CondKind::Compare { op, op_pos: op_token.pos, left, right },
            span,
            pos,
        ))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
        Ok(left)
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        let pos = left.pos;
        Expr::new(
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            span,
            pos,
        )
    }

    /// Unary minus binds tighter than any binary operator
    fn parse_unary(&mut self) -> CompileResult<Expr> {
        let start = self.current().clone();
        if self.match_token(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            let span = self.span_from(start.span);
            return Ok(Expr::new(ExprKind::Negate(Box::new(operand)), span, start.pos));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> CompileResult<Expr> {
        let start = self.current().clone();

        let kind = match start.kind {
            TokenKind::IntLiteral(text) => {
                self.advance();
                ExprKind::IntLiteral(text)
            }
            TokenKind::FloatLiteral(text) => {
                self.advance();
                ExprKind::FloatLiteral(text)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.match_token(&TokenKind::LBracket) {
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    ExprKind::Index {
                        array: Ident::new(name, start.span, start.pos),
                        index: Box::new(index),
                    }
                } else {
                    ExprKind::Identifier(name)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            other => return Err(self.error(format!("expected expression, found {}", other))),
        };

        Ok(Expr::new(kind, self.span_from(start.span), start.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn parse_single_expr(source: &str) -> Expr {
        let program = parse(&format!("x := {};", source));
        match program.statements.into_iter().next().unwrap().kind {
            StmtKind::Assign { value, .. } => value,
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    fn parse_single_cond(source: &str) -> Cond {
        let program = parse(&format!("if ({}) then {{ }}", source));
        match program.statements.into_iter().next().unwrap().kind {
            StmtKind::If { condition, .. } => condition,
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_declarations() {
        let program = parse(
            "let x: Int;\nlet arr: [Float; 10];\n@define Const pi: Float = 3.14;",
        );
        assert_eq!(program.statements.len(), 3);

        match &program.statements[0].kind {
            StmtKind::VarDecl(v) => {
                assert_eq!(v.name.name, "x");
                assert_eq!(v.ty, DataType::Int);
            }
            other => panic!("expected variable declaration, got {:?}", other),
        }
        match &program.statements[1].kind {
            StmtKind::ArrayDecl(a) => {
                assert_eq!(a.name.name, "arr");
                assert_eq!(a.element, DataType::Float);
                assert_eq!(a.size, "10");
                assert_eq!(a.size_pos, Position::new(2, 18));
            }
            other => panic!("expected array declaration, got {:?}", other),
        }
        match &program.statements[2].kind {
            StmtKind::ConstDecl(c) => {
                assert_eq!(c.name.name, "pi");
                assert_eq!(c.ty, DataType::Float);
                assert_eq!(c.ty_pos, Position::new(3, 19));
                assert!(matches!(&c.value.kind, ExprKind::FloatLiteral(t) if t == "3.14"));
            }
            other => panic!("expected constant declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let expr = parse_single_expr("1 + 2 * 3");
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Add, left, right } => {
                assert!(matches!(left.kind, ExprKind::IntLiteral(ref t) if t == "1"));
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        let expr = parse_single_expr("8 - 4 - 2");
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Sub, left, right } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
                assert!(matches!(right.kind, ExprKind::IntLiteral(ref t) if t == "2"));
            }
            other => panic!("expected subtraction at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_negation_binds_tightest() {
        let expr = parse_single_expr("-a * b");
        match expr.kind {
            ExprKind::Binary { op: BinaryOp::Mul, left, .. } => {
                assert!(matches!(left.kind, ExprKind::Negate(_)));
            }
            other => panic!("expected multiplication at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_array_access_and_parens() {
        let expr = parse_single_expr("(arr[i + 1])");
        match expr.kind {
            ExprKind::Paren(inner) => match inner.kind {
                ExprKind::Index { array, index } => {
                    assert_eq!(array.name, "arr");
                    assert!(matches!(index.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
                }
                other => panic!("expected index expression, got {:?}", other),
            },
            other => panic!("expected parenthesized expression, got {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let cond = parse_single_cond("a < b OR c < d AND e < f");
        match cond.kind {
            CondKind::Or(left, right) => {
                assert!(matches!(left.kind, CondKind::Compare { op: CompareOp::Lt, .. }));
                assert!(matches!(right.kind, CondKind::And(_, _)));
            }
            other => panic!("expected OR at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_not_negates_rest_of_condition() {
        let cond = parse_single_cond("!a < b AND c < d");
        match cond.kind {
            CondKind::Not(inner) => assert!(matches!(inner.kind, CondKind::And(_, _))),
            other => panic!("expected NOT at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_condition_and_parenthesized_operand() {
        let cond = parse_single_cond("(a > b) AND (x + 1) <= y");
        match cond.kind {
            CondKind::And(left, right) => {
                assert!(matches!(left.kind, CondKind::Paren(_)));
                match right.kind {
                    CondKind::Compare { op, left, .. } => {
                        assert_eq!(op, CompareOp::Le);
                        assert!(matches!(left.kind, ExprKind::Paren(_)));
                    }
                    other => panic!("expected comparison, got {:?}", other),
                }
            }
            other => panic!("expected AND at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_control_flow() {
        let program = parse(
            r#"
            if (a > b) then { output("gt"); } else { output("le"); }
            do { x := x + 1; } while (x < 10);
            for i from 1 to 3 step 1 { output(i); }
            input(x);
            "#,
        );
        assert_eq!(program.statements.len(), 4);

        match &program.statements[0].kind {
            StmtKind::If { then_branch, else_branch, .. } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected if statement, got {:?}", other),
        }
        assert!(matches!(&program.statements[1].kind, StmtKind::DoWhile { body, .. } if body.len() == 1));
        match &program.statements[2].kind {
            StmtKind::For { var, body, .. } => {
                assert_eq!(var.name, "i");
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected for loop, got {:?}", other),
        }
        assert!(matches!(&program.statements[3].kind, StmtKind::Input(id) if id.name == "x"));
    }

    #[test]
    fn test_parse_output_forms() {
        let program = parse(r#"output("Values:", x, y); output(z);"#);

        match &program.statements[0].kind {
            StmtKind::Output(args) => {
                assert_eq!(args.text.as_deref(), Some("\"Values:\""));
                let names: Vec<_> = args.idents.iter().map(|i| i.name.as_str()).collect();
                assert_eq!(names, vec!["x", "y"]);
            }
            other => panic!("expected output statement, got {:?}", other),
        }
        match &program.statements[1].kind {
            StmtKind::Output(args) => {
                assert!(args.text.is_none());
                assert_eq!(args.idents.len(), 1);
            }
            other => panic!("expected output statement, got {:?}", other),
        }
    }

    #[test]
    fn test_statement_positions() {
        let program = parse("let x: Int;\n  x := 5;");
        assert_eq!(program.statements[1].pos, Position::new(2, 3));
        assert_eq!(program.statements[1].span, Span::new(14, 21));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = Parser::new("let x: Int\nx := 1;").unwrap().parse().unwrap_err();
        match err {
            CompileError::Parser { message, position, .. } => {
                assert!(message.contains("expected ';'"), "{message}");
                assert_eq!(position, Position::new(2, 1));
            }
            other => panic!("expected parser error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_comparison_operator() {
        let err = Parser::new("if (a) then { }").unwrap().parse().unwrap_err();
        assert!(matches!(err, CompileError::Parser { ref message, .. } if message.contains("comparison")));
    }
}
