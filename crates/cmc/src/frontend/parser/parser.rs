//! Recursive descent parser for C-minus

use crate::common::{CompileError, CompileResult, LineIndex};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for C-minus
///
/// Builds the arena tree directly: declarations are a `Type` node owning an
/// identifier, function parameters and bodies hang off the function's
/// identifier node, and statement lists are sibling chains.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    lines: LineIndex,
    ast: Ast,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            lines: LineIndex::new(source),
            ast: Ast::new(),
        })
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Ast> {
        let mut declarations = Vec::new();

        while !self.at_end() {
            declarations.push(self.parse_declaration(true)?);
        }

        let root = self.ast.link_siblings(&declarations);
        self.ast.set_root(root);
        Ok(std::mem::take(&mut self.ast))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::parser(
            format!("expected {}, found {}", expected, self.current.kind),
            self.current.span,
        )
    }

    /// Line of the current token
    fn line(&self) -> u32 {
        self.lines.line_of(self.current.span.start)
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, u32)> {
        let line = self.line();
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok((name, line))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_type(&mut self) -> CompileResult<(TypeName, u32)> {
        let line = self.line();
        let ty = match self.current.kind {
            TokenKind::Int => TypeName::Int,
            TokenKind::Void => TypeName::Void,
            _ => return Err(self.unexpected("type specifier")),
        };
        self.advance()?;
        Ok((ty, line))
    }

    fn ident(&mut self, kind: IdentKind, name: String, line: u32) -> NodeId {
        self.ast.alloc(NodeKind::Ident { kind, name }, line)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `type ID ;` | `type ID [ NUM ] ;` | `type ID ( params ) compound`
    fn parse_declaration(&mut self, top_level: bool) -> CompileResult<NodeId> {
        let (ty, ty_line) = self.parse_type()?;
        let (name, name_line) = self.expect_identifier()?;
        let type_node = self.ast.alloc(NodeKind::Type(ty), ty_line);

        let decl = match self.current.kind {
            TokenKind::Semi => {
                self.advance()?;
                self.ident(IdentKind::Variable, name, name_line)
            }
            TokenKind::LBracket => {
                self.advance()?;
                let size = self.parse_number()?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Semi)?;
                let array = self.ident(IdentKind::Array, name, name_line);
                self.ast.set_child(array, 0, Some(size));
                array
            }
            TokenKind::LParen if top_level => self.parse_function_rest(name, name_line)?,
            TokenKind::LParen => {
                return Err(CompileError::parser(
                    format!("function '{}' must be declared at the top level", name),
                    self.current.span,
                ));
            }
            _ => return Err(self.unexpected("';', '[' or '('")),
        };

        self.ast.set_child(type_node, 0, Some(decl));
        Ok(type_node)
    }

    fn parse_function_rest(&mut self, name: String, line: u32) -> CompileResult<NodeId> {
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_compound()?;

        let func = self.ident(IdentKind::Function, name, line);
        self.ast.set_child(func, 0, params);
        self.ast.set_child(func, 1, body);
        Ok(func)
    }

    /// `void` | `param (, param)*`; an empty list is accepted as well
    fn parse_params(&mut self) -> CompileResult<Option<NodeId>> {
        if self.check(&TokenKind::RParen) {
            return Ok(None);
        }

        let mut params = Vec::new();
        loop {
            let (ty, ty_line) = self.parse_type()?;
            if params.is_empty() && ty == TypeName::Void && self.check(&TokenKind::RParen) {
                return Ok(None);
            }

            let (name, name_line) = self.expect_identifier()?;
            let kind = if self.match_token(&TokenKind::LBracket)? {
                self.expect(TokenKind::RBracket)?;
                IdentKind::Array
            } else {
                IdentKind::Variable
            };

            let type_node = self.ast.alloc(NodeKind::Type(ty), ty_line);
            let param = self.ident(kind, name, name_line);
            self.ast.set_child(type_node, 0, Some(param));
            params.push(type_node);

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        Ok(self.ast.link_siblings(&params))
    }

    /// `{ local-declaration* statement* }` as one sibling chain
    fn parse_compound(&mut self) -> CompileResult<Option<NodeId>> {
        self.expect(TokenKind::LBrace)?;

        let mut items = Vec::new();
        while self.current.kind.is_type_specifier() {
            items.push(self.parse_declaration(false)?);
        }

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let stmt = self.parse_statement()?;
            // Nested blocks share the enclosing list
            items.extend(self.ast.siblings(stmt).collect::<Vec<_>>());
        }

        self.expect(TokenKind::RBrace)?;
        Ok(self.ast.link_siblings(&items))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<Option<NodeId>> {
        match self.current.kind {
            TokenKind::Semi => {
                self.advance()?;
                Ok(None)
            }
            TokenKind::LBrace => self.parse_compound(),
            TokenKind::If => self.parse_if_statement().map(Some),
            TokenKind::While => self.parse_while_statement().map(Some),
            TokenKind::Return => self.parse_return_statement().map(Some),
            TokenKind::Int | TokenKind::Void => Err(CompileError::parser(
                "declarations must precede statements in a block",
                self.current.span,
            )),
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semi)?;
                Ok(Some(expr))
            }
        }
    }

    fn parse_if_statement(&mut self) -> CompileResult<NodeId> {
        let line = self.line();
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.match_token(&TokenKind::Else)? {
            self.parse_statement()?
        } else {
            None
        };

        let node = self.ast.alloc(NodeKind::Stmt(StmtKind::If), line);
        self.ast.set_child(node, 0, Some(condition));
        self.ast.set_child(node, 1, then_branch);
        self.ast.set_child(node, 2, else_branch);
        Ok(node)
    }

    fn parse_while_statement(&mut self) -> CompileResult<NodeId> {
        let line = self.line();
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;

        let node = self.ast.alloc(NodeKind::Stmt(StmtKind::While), line);
        self.ast.set_child(node, 0, Some(condition));
        self.ast.set_child(node, 1, body);
        Ok(node)
    }

    fn parse_return_statement(&mut self) -> CompileResult<NodeId> {
        let line = self.line();
        self.expect(TokenKind::Return)?;
        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi)?;

        let node = self.ast.alloc(NodeKind::Expr(ExprKind::Return), line);
        self.ast.set_child(node, 0, value);
        Ok(node)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// `var = expression` | `simple-expression`
    fn parse_expression(&mut self) -> CompileResult<NodeId> {
        let start = self.current.span;
        let left = self.parse_simple_expression()?;

        if !self.check(&TokenKind::Eq) {
            return Ok(left);
        }

        let is_lvalue = matches!(
            self.ast.node(left).kind,
            NodeKind::Ident { kind: IdentKind::Variable | IdentKind::Array, .. }
        );
        if !is_lvalue {
            return Err(CompileError::parser(
                "left side of assignment must be a variable",
                start.merge(self.current.span),
            ));
        }

        self.advance()?;
        let value = self.parse_expression()?;
        let line = self.ast.node(left).line;
        let assign = self.ast.alloc(NodeKind::Stmt(StmtKind::Assign), line);
        self.ast.set_child(assign, 0, Some(left));
        self.ast.set_child(assign, 1, Some(value));
        Ok(assign)
    }

    fn parse_simple_expression(&mut self) -> CompileResult<NodeId> {
        let left = self.parse_additive()?;
        if !self.current.kind.is_relational() {
            return Ok(left);
        }

        let line = self.line();
        let op = match self.advance()?.kind {
            TokenKind::Lt => Operator::Lt,
            TokenKind::LtEq => Operator::LtEq,
            TokenKind::Gt => Operator::Gt,
            TokenKind::GtEq => Operator::GtEq,
            TokenKind::EqEq => Operator::Eq,
            _ => Operator::NotEq,
        };
        let right = self.parse_additive()?;
        Ok(self.binary(op, left, right, line))
    }

    fn parse_additive(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Sub,
                _ => return Ok(left),
            };
            let line = self.line();
            self.advance()?;
            let right = self.parse_term()?;
            left = self.binary(op, left, right, line);
        }
    }

    fn parse_term(&mut self) -> CompileResult<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => Operator::Mul,
                TokenKind::Slash => Operator::Div,
                _ => return Ok(left),
            };
            let line = self.line();
            self.advance()?;
            let right = self.parse_unary()?;
            left = self.binary(op, left, right, line);
        }
    }

    fn parse_unary(&mut self) -> CompileResult<NodeId> {
        if !self.check(&TokenKind::Minus) {
            return self.parse_factor();
        }

        let line = self.line();
        self.advance()?;
        let operand = self.parse_unary()?;
        let node = self.ast.alloc(NodeKind::Expr(ExprKind::Operator(Operator::Neg)), line);
        self.ast.set_child(node, 0, Some(operand));
        Ok(node)
    }

    fn binary(&mut self, op: Operator, left: NodeId, right: NodeId, line: u32) -> NodeId {
        let node = self.ast.alloc(NodeKind::Expr(ExprKind::Operator(op)), line);
        self.ast.set_child(node, 0, Some(left));
        self.ast.set_child(node, 1, Some(right));
        node
    }

    fn parse_factor(&mut self) -> CompileResult<NodeId> {
        match self.current.kind {
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Number(_) => self.parse_number(),
            TokenKind::Identifier(_) => {
                let (name, line) = self.expect_identifier()?;
                if self.match_token(&TokenKind::LParen)? {
                    let args = self.parse_arguments()?;
                    self.expect(TokenKind::RParen)?;
                    let call = self.ast.alloc(NodeKind::Expr(ExprKind::Call(name)), line);
                    self.ast.set_child(call, 0, args);
                    Ok(call)
                } else if self.match_token(&TokenKind::LBracket)? {
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket)?;
                    let array = self.ident(IdentKind::Array, name, line);
                    self.ast.set_child(array, 0, Some(index));
                    Ok(array)
                } else {
                    Ok(self.ident(IdentKind::Variable, name, line))
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_arguments(&mut self) -> CompileResult<Option<NodeId>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        Ok(self.ast.link_siblings(&args))
    }

    fn parse_number(&mut self) -> CompileResult<NodeId> {
        let line = self.line();
        let token = self.advance()?;
        match token.kind {
            TokenKind::Number(text) => {
                let value: i64 = text.parse().map_err(|_| {
                    CompileError::parser(format!("integer literal '{}' is too large", text), token.span)
                })?;
                Ok(self.ast.alloc(NodeKind::Expr(ExprKind::Constant(value)), line))
            }
            other => Err(CompileError::parser(
                format!("expected number, found {}", other),
                token.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Ast {
        let mut parser = Parser::new(source).unwrap();
        parser.parse().unwrap()
    }

    fn kind(ast: &Ast, id: Option<NodeId>) -> &NodeKind {
        &ast.node(id.unwrap()).kind
    }

    #[test]
    fn test_parse_function_shape() {
        let source = "int main(void)\n{\n  int x;\n  x = 1;\n}\n";
        let ast = parse(source);

        let ty = ast.root().unwrap();
        assert_eq!(ast.node(ty).kind, NodeKind::Type(TypeName::Int));
        assert!(ast.node(ty).sibling.is_none());

        let func = ast.node(ty).child(0).unwrap();
        assert!(matches!(
            &ast.node(func).kind,
            NodeKind::Ident { kind: IdentKind::Function, name } if name == "main"
        ));
        assert!(ast.is_declaration_site(func));
        assert_eq!(ast.node(func).line, 1);
        assert!(ast.node(func).child(0).is_none(), "void parameter list");

        let body: Vec<NodeId> = ast.siblings(ast.node(func).child(1)).collect();
        assert_eq!(body.len(), 2);
        assert_eq!(ast.node(body[0]).kind, NodeKind::Type(TypeName::Int));
        assert_eq!(ast.node(body[0]).line, 3);
        assert_eq!(ast.node(body[1]).kind, NodeKind::Stmt(StmtKind::Assign));
        assert_eq!(ast.node(body[1]).line, 4);
        assert_eq!(ast.node(body[1]).parent, Some(func));
    }

    #[test]
    fn test_parse_variable_and_array_declarations() {
        let ast = parse("int x;\nint a[10];");
        let decls: Vec<NodeId> = ast.siblings(ast.root()).collect();
        assert_eq!(decls.len(), 2);

        let x = ast.node(decls[0]).child(0);
        assert!(matches!(kind(&ast, x), NodeKind::Ident { kind: IdentKind::Variable, .. }));

        let a = ast.node(decls[1]).child(0);
        assert!(matches!(kind(&ast, a), NodeKind::Ident { kind: IdentKind::Array, .. }));
        assert_eq!(ast.node(a.unwrap()).line, 2);
        let size = ast.node(a.unwrap()).child(0);
        assert_eq!(kind(&ast, size), &NodeKind::Expr(ExprKind::Constant(10)));
    }

    #[test]
    fn test_parse_params() {
        let ast = parse("void f(int a, int b[]) { }");
        let func = ast.node(ast.root().unwrap()).child(0).unwrap();
        let params: Vec<NodeId> = ast.siblings(ast.node(func).child(0)).collect();
        assert_eq!(params.len(), 2);
        assert_eq!(ast.node(params[0]).parent, Some(func));

        let b = ast.node(params[1]).child(0);
        assert!(matches!(
            kind(&ast, b),
            NodeKind::Ident { kind: IdentKind::Array, name } if name == "b"
        ));
        assert!(ast.is_declaration_site(b.unwrap()));
        assert!(ast.node(func).child(1).is_none(), "empty body");
    }

    #[test]
    fn test_parse_call_and_index() {
        let ast = parse("void f(void) { output(a[i + 1], input()); }");
        let func = ast.node(ast.root().unwrap()).child(0).unwrap();
        let call = ast.node(func).child(1).unwrap();
        assert_eq!(ast.node(call).kind, NodeKind::Expr(ExprKind::Call("output".to_string())));

        let args: Vec<NodeId> = ast.siblings(ast.node(call).child(0)).collect();
        assert_eq!(args.len(), 2);
        assert!(matches!(
            &ast.node(args[0]).kind,
            NodeKind::Ident { kind: IdentKind::Array, name } if name == "a"
        ));
        assert_eq!(ast.node(args[0]).parent, Some(call));
        let index = ast.node(args[0]).child(0);
        assert_eq!(kind(&ast, index), &NodeKind::Expr(ExprKind::Operator(Operator::Add)));
        assert_eq!(ast.node(args[1]).kind, NodeKind::Expr(ExprKind::Call("input".to_string())));
    }

    #[test]
    fn test_parse_precedence() {
        let ast = parse("void f(void) { x = 1 + 2 * 3 < -4; }");
        let func = ast.node(ast.root().unwrap()).child(0).unwrap();
        let assign = ast.node(func).child(1).unwrap();
        let value = ast.node(assign).child(1);
        assert_eq!(kind(&ast, value), &NodeKind::Expr(ExprKind::Operator(Operator::Lt)));

        let sum = ast.node(value.unwrap()).child(0);
        assert_eq!(kind(&ast, sum), &NodeKind::Expr(ExprKind::Operator(Operator::Add)));
        let product = ast.node(sum.unwrap()).child(1);
        assert_eq!(kind(&ast, product), &NodeKind::Expr(ExprKind::Operator(Operator::Mul)));
        let neg = ast.node(value.unwrap()).child(1);
        assert_eq!(kind(&ast, neg), &NodeKind::Expr(ExprKind::Operator(Operator::Neg)));
    }

    #[test]
    fn test_parse_if_while_return() {
        let source = "int f(int x) {\n if (x) { x = 1; x = 2; } else return 0;\n while (x > 0) x = x - 1;\n return x;\n}";
        let ast = parse(source);
        let func = ast.node(ast.root().unwrap()).child(0).unwrap();
        let body: Vec<NodeId> = ast.siblings(ast.node(func).child(1)).collect();
        assert_eq!(body.len(), 3);

        let if_node = ast.node(body[0]);
        assert_eq!(if_node.kind, NodeKind::Stmt(StmtKind::If));
        assert_eq!(ast.siblings(if_node.child(1)).count(), 2);
        assert_eq!(kind(&ast, if_node.child(2)), &NodeKind::Expr(ExprKind::Return));

        assert_eq!(ast.node(body[1]).kind, NodeKind::Stmt(StmtKind::While));
        assert_eq!(ast.node(body[1]).line, 3);
        assert_eq!(ast.node(body[2]).kind, NodeKind::Expr(ExprKind::Return));
        assert!(ast.node(body[2]).child(0).is_some());
    }

    #[test]
    fn test_nested_block_is_flattened() {
        let ast = parse("void f(void) { { x = 1; } y = 2; }");
        let func = ast.node(ast.root().unwrap()).child(0).unwrap();
        assert_eq!(ast.siblings(ast.node(func).child(1)).count(), 2);
    }

    #[test]
    fn test_parse_errors() {
        for source in [
            "int f(void) { int g(void) { } }",
            "int x",
            "int f(void) { 1 = x; }",
            "int f(void) { x = 1; int y; }",
            "float x;",
            "int f(void) { x = ; }",
        ] {
            let mut parser = Parser::new(source).unwrap();
            assert!(
                matches!(parser.parse(), Err(CompileError::Parser { .. })),
                "expected a syntax error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_empty_program() {
        let ast = parse("/* nothing */");
        assert!(ast.root().is_none());
    }
}
