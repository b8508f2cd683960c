pub mod ast;

use crate::diagnostics::CompileError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        let mut i = self.pos;
        while i < self.tokens.len() {
            if matches!(self.tokens[i].node, Token::Newline) {
                i += 1;
            } else {
                return Some(&self.tokens[i]);
            }
        }
        None
    }

    fn peek_raw(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    fn skip_newlines(&mut self) {
        while self.pos < self.tokens.len() && matches!(self.tokens[self.pos].node, Token::Newline) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Spanned<Token>, CompileError> {
        self.skip_newlines();
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(tok.clone())
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CompileError> {
        self.skip_newlines();
        match self.tokens.get(self.pos) {
            Some(tok) => match &tok.node {
                Token::Ident(name) => {
                    let name = name.clone();
                    let span = tok.span;
                    self.pos += 1;
                    Ok(Spanned::new(name, span))
                }
                _ => Err(CompileError::syntax(
                    format!("expected identifier, found {}", tok.node),
                    tok.span,
                )),
            },
            None => Err(CompileError::syntax("expected identifier, found end of file", self.eof_span())),
        }
    }

    fn eof_span(&self) -> Span {
        match self.tokens.last() {
            Some(last) => Span::new(last.span.end, last.span.end),
            None => Span::dummy(),
        }
    }

    fn at_statement_boundary(&self) -> bool {
        match self.peek_raw() {
            None => true,
            Some(tok) => matches!(tok.node, Token::Newline),
        }
    }

    fn consume_statement_end(&mut self) {
        if let Some(tok) = self.peek_raw() {
            if matches!(tok.node, Token::Newline) {
                self.advance();
            }
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut items = Vec::new();
        self.skip_newlines();
        while self.peek().is_some() {
            items.push(self.parse_top_level()?);
            self.skip_newlines();
        }
        Ok(Program { items })
    }

    fn parse_top_level(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let mut attrs = Vec::new();
        while self.peek().is_some() && matches!(self.peek().unwrap().node, Token::At) {
            attrs.push(self.parse_attr()?);
            self.skip_newlines();
        }

        let tok = self
            .peek()
            .ok_or_else(|| CompileError::syntax("expected a declaration", self.eof_span()))?;

        match &tok.node {
            Token::Guarantee => self.parse_guarantee(),
            Token::TypeGroup => self.parse_typegroup(),
            Token::Register => self.parse_register(),
            Token::Impl => self.parse_impl(),
            Token::Sig => self.parse_sig(attrs),
            Token::Func => self.parse_func(attrs),
            Token::Let => self.parse_var(false),
            Token::Var => self.parse_var(true),
            Token::Try => self.parse_try(),
            Token::Catch => self.parse_catch(),
            Token::Ident(_) => self.parse_assign_or_expr_stmt(),
            _ => Err(CompileError::syntax(
                format!("unexpected token {} at top level", tok.node),
                tok.span,
            )),
        }
    }

    fn parse_attr(&mut self) -> Result<String, CompileError> {
        self.expect(&Token::At)?;
        let lit = self.expect_ident()?;
        if lit.node != "attr" {
            return Err(CompileError::syntax(format!("expected 'attr', found '{}'", lit.node), lit.span));
        }
        self.expect(&Token::Dot)?;
        Ok(self.expect_ident()?.node)
    }

    fn parse_type_ref(&mut self) -> Result<TypeRef, CompileError> {
        Ok(TypeRef::new(self.expect_ident()?.node))
    }

    fn parse_dotted(&mut self) -> Result<Spanned<String>, CompileError> {
        let first = self.expect_ident()?;
        let start = first.span.start;
        let mut name = first.node;
        let mut end = first.span.end;
        while self.peek_raw().is_some() && matches!(self.peek_raw().unwrap().node, Token::Dot) {
            self.advance();
            let part = self.expect_ident()?;
            name.push('.');
            name.push_str(&part.node);
            end = part.span.end;
        }
        Ok(Spanned::new(name, Span::new(start, end)))
    }

    fn parse_guarantee(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Guarantee)?;
        let start = kw.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        self.skip_newlines();
        let mut methods = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RBrace) {
            methods.push(self.parse_method_sig()?);
            self.skip_newlines();
        }
        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;
        Ok(Spanned::new(TopLevel::Guarantee(GuaranteeDecl { name, methods }), Span::new(start, end)))
    }

    fn parse_method_sig(&mut self) -> Result<MethodSig, CompileError> {
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            params.push(self.parse_type_ref()?);
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::Arrow)?;
        let ret = self.parse_type_ref()?;
        Ok(MethodSig { name, params, ret })
    }

    fn parse_typegroup(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::TypeGroup)?;
        let start = kw.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        self.skip_newlines();
        let mut members = vec![self.expect_ident()?];
        self.skip_newlines();
        while self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Pipe) {
            self.advance();
            self.skip_newlines();
            members.push(self.expect_ident()?);
            self.skip_newlines();
        }
        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;
        Ok(Spanned::new(TopLevel::TypeGroup(TypeGroupDecl { name, members }), Span::new(start, end)))
    }

    fn parse_register(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Register)?;
        let start = kw.span.start;
        let ty = self.expect_ident()?;
        self.expect(&Token::Guarantees)?;
        let guarantee = self.expect_ident()?;
        let end = guarantee.span.end;
        Ok(Spanned::new(TopLevel::Register(RegisterDecl { ty, guarantee }), Span::new(start, end)))
    }

    fn parse_impl(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Impl)?;
        let start = kw.span.start;
        let ty = self.expect_ident()?;
        let guarantee = self.expect_ident()?;
        let method = self.expect_ident()?;
        self.expect(&Token::Builtin)?;
        let builtin = self.parse_dotted()?;
        let end = builtin.span.end;
        Ok(Spanned::new(TopLevel::Impl(ImplDecl { ty, guarantee, method, builtin }), Span::new(start, end)))
    }

    fn parse_sig(&mut self, attrs: Vec<String>) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Sig)?;
        let start = kw.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            params.push(self.parse_type_ref()?);
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::Arrow)?;
        let ret = self.parse_type_ref()?;
        self.expect(&Token::LBrace)?;
        self.skip_newlines();

        let mut requires = Vec::new();
        let mut failures: Vec<Spanned<String>> = Vec::new();
        let mut saw_never = false;
        let mut builtin = None;
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RBrace) {
            let tok = self.peek().unwrap();
            match &tok.node {
                Token::Require => requires.push(self.parse_require()?),
                Token::Failure => {
                    let tok_span = tok.span;
                    let (is_never, line) = self.parse_failure_line()?;
                    if is_never {
                        if saw_never || !failures.is_empty() {
                            let span = line.map_or(tok_span, |l| l.span);
                            return Err(CompileError::syntax("'Never' may not be combined with other failure names", span));
                        }
                        saw_never = true;
                    } else {
                        let line = line.expect("non-Never failure line always carries a name");
                        if saw_never {
                            return Err(CompileError::syntax(
                                "'Never' may not be combined with other failure names",
                                line.span,
                            ));
                        }
                        if failures.iter().any(|f| f.node == line.node) {
                            return Err(CompileError::syntax(format!("duplicate failure name '{}'", line.node), line.span));
                        }
                        failures.push(line);
                    }
                }
                Token::Builtin => {
                    self.advance();
                    builtin = Some(self.parse_dotted()?.node);
                }
                _ => {
                    return Err(CompileError::syntax(
                        format!("expected 'require', 'failure', or 'builtin', found {}", tok.node),
                        tok.span,
                    ));
                }
            }
            self.skip_newlines();
        }
        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;
        Ok(Spanned::new(
            TopLevel::Sig(SigDecl { name, params, ret, requires, failures, attrs, builtin }),
            Span::new(start, end),
        ))
    }

    fn parse_require(&mut self) -> Result<RequireClause, CompileError> {
        self.expect(&Token::Require)?;
        let type_var = self.expect_ident()?;
        let tok = self
            .peek()
            .ok_or_else(|| CompileError::syntax("expected 'in' or 'guarantees'", self.eof_span()))?;
        match &tok.node {
            Token::In => {
                self.advance();
                let group = self.expect_ident()?;
                Ok(RequireClause::RequireIn { type_var, group })
            }
            Token::Guarantees => {
                self.advance();
                let guarantee = self.expect_ident()?;
                Ok(RequireClause::RequireGuarantees { type_var, guarantee })
            }
            _ => Err(CompileError::syntax(
                format!("expected 'in' or 'guarantees', found {}", tok.node),
                tok.span,
            )),
        }
    }

    /// Returns `(is_never, name)`: `Never` carries no name of its own.
    fn parse_failure_line(&mut self) -> Result<(bool, Option<Spanned<String>>), CompileError> {
        self.expect(&Token::Failure)?;
        let name = self.expect_ident()?;
        if name.node == "Never" {
            Ok((true, None))
        } else {
            Ok((false, Some(name)))
        }
    }

    fn parse_func(&mut self, attrs: Vec<String>) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Func)?;
        let start = kw.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let pname = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            let pty = self.parse_type_ref()?;
            params.push((pname, pty));
        }
        self.expect(&Token::RParen)?;
        let body = self.parse_func_block()?;
        let end = body.span.end;
        Ok(Spanned::new(TopLevel::Func(FuncDecl { name, params, body: body.node, attrs }), Span::new(start, end)))
    }

    fn parse_func_block(&mut self) -> Result<Spanned<Block>, CompileError> {
        let open = self.expect(&Token::LBrace)?;
        let start = open.span.start;
        let mut stmts = Vec::new();
        self.skip_newlines();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RBrace) {
            stmts.push(self.parse_func_stmt()?);
            self.skip_newlines();
        }
        let close = self.expect(&Token::RBrace)?;
        let end = close.span.end;
        Ok(Spanned::new(Block { stmts }, Span::new(start, end)))
    }

    fn parse_func_stmt(&mut self) -> Result<Spanned<FuncStmt>, CompileError> {
        let tok = self
            .peek()
            .ok_or_else(|| CompileError::syntax("unexpected end of file in function body", self.eof_span()))?;

        if matches!(tok.node, Token::Return) {
            let kw = self.advance().unwrap().clone();
            let start = kw.span.start;
            let value = if self.at_statement_boundary()
                || matches!(self.peek().map(|t| &t.node), Some(Token::RBrace))
            {
                None
            } else {
                Some(self.parse_operand()?)
            };
            let end = value.as_ref().map_or(kw.span.end, |v| v.span.end);
            self.consume_statement_end();
            Ok(Spanned::new(FuncStmt::Return(value), Span::new(start, end)))
        } else {
            let expr = self.parse_operand()?;
            let span = expr.span;
            self.consume_statement_end();
            Ok(Spanned::new(FuncStmt::Expr(expr), span))
        }
    }

    fn parse_var(&mut self, mutable: bool) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = if mutable { self.expect(&Token::Var)? } else { self.expect(&Token::Let)? };
        let start = kw.span.start;
        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let ty = self.parse_type_ref()?;
        self.expect(&Token::Eq)?;
        let expr = self.parse_operand()?;
        let end = expr.span.end;
        self.consume_statement_end();
        Ok(Spanned::new(TopLevel::Var(VarDecl { mutable, ty, name, expr }), Span::new(start, end)))
    }

    fn parse_assign_or_expr_stmt(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let ident = self.expect_ident()?;
        let start = ident.span.start;
        if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Eq) {
            self.advance();
            let expr = self.parse_operand()?;
            let end = expr.span.end;
            self.consume_statement_end();
            Ok(Spanned::new(TopLevel::Assign(AssignStmt { name: ident, expr }), Span::new(start, end)))
        } else if self.peek_raw().is_some() && matches!(self.peek_raw().unwrap().node, Token::LParen) {
            let call = self.parse_call_after_ident(ident)?;
            let end = call.span.end;
            self.consume_statement_end();
            Ok(Spanned::new(TopLevel::Expr(ExprStmt { expr: call }), Span::new(start, end)))
        } else {
            Err(CompileError::syntax("expected '=' or '(' after identifier", self.eof_span()))
        }
    }

    fn parse_try(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Try)?;
        let start = kw.span.start;
        let expr = self.parse_operand()?;
        let end = expr.span.end;
        self.consume_statement_end();
        Ok(Spanned::new(TopLevel::Try(TryStmt { expr }), Span::new(start, end)))
    }

    fn parse_catch(&mut self) -> Result<Spanned<TopLevel>, CompileError> {
        let kw = self.expect(&Token::Catch)?;
        let start = kw.span.start;
        let failure_name = self.expect_ident()?;
        if let Some(tok) = self.peek() {
            if matches!(tok.node, Token::Try | Token::Catch) {
                return Err(CompileError::syntax("try/catch may not nest inside a catch handler", tok.span));
            }
        }
        let expr = self.parse_operand()?;
        let end = expr.span.end;
        self.consume_statement_end();
        Ok(Spanned::new(TopLevel::Catch(CatchStmt { failure_name, expr }), Span::new(start, end)))
    }

    fn parse_call_after_ident(&mut self, callee: Spanned<String>) -> Result<Spanned<Expr>, CompileError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        while self.peek().is_some() && !matches!(self.peek().unwrap().node, Token::RParen) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.parse_arg()?);
        }
        let close = self.expect(&Token::RParen)?;
        let span = Span::new(callee.span.start, close.span.end);

        let has_named = args.iter().any(|a| matches!(a, Arg::Named(..)));
        let has_pos = args.iter().any(|a| matches!(a, Arg::Pos(_)));
        if has_named && has_pos {
            return Err(CompileError::syntax("cannot mix positional and named arguments", span));
        }

        Ok(Spanned::new(Expr::Call { callee, args }, span))
    }

    fn parse_arg(&mut self) -> Result<Arg, CompileError> {
        if let Some(tok) = self.peek() {
            if matches!(tok.node, Token::Ident(_)) {
                let save = self.pos;
                let ident = self.expect_ident()?;
                if self.peek().is_some() && matches!(self.peek().unwrap().node, Token::Colon) {
                    self.advance();
                    let expr = self.parse_operand()?;
                    return Ok(Arg::Named(ident, expr));
                }
                self.pos = save;
            }
        }
        Ok(Arg::Pos(self.parse_operand()?))
    }

    /// An operand: literal, identifier, call, or a parenthesised infix
    /// expression. Infix operators are legal only inside parentheses.
    fn parse_operand(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.skip_newlines();
        let tok = self
            .peek()
            .ok_or_else(|| CompileError::syntax("unexpected end of file in expression", self.eof_span()))?
            .clone();

        match &tok.node {
            Token::IntLit(n) => {
                self.advance();
                Ok(Spanned::new(Expr::IntLit(*n), tok.span))
            }
            Token::FloatLit(n) => {
                self.advance();
                Ok(Spanned::new(Expr::FloatLit(*n), tok.span))
            }
            Token::Ident(_) => {
                let ident = self.expect_ident()?;
                if self.peek_raw().is_some() && matches!(self.peek_raw().unwrap().node, Token::LParen) {
                    self.parse_call_after_ident(ident)
                } else {
                    Ok(Spanned::new(Expr::Ident(ident.node.clone()), ident.span))
                }
            }
            Token::LParen => self.parse_paren_expr(),
            _ => Err(CompileError::syntax(format!("unexpected token {} in expression", tok.node), tok.span)),
        }
    }

    /// Parentheses must wrap at least one infix operator; a bare operand
    /// in parens (`(x)`, `(div(1,2))`) is a syntax error.
    fn parse_paren_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let open = self.expect(&Token::LParen)?;
        let start = open.span.start;
        let (inner, has_operator) = self.parse_infix_expr(0)?;
        if !has_operator {
            return Err(CompileError::syntax(
                "parentheses must contain an operator",
                Span::new(start, inner.span.end),
            ));
        }
        let close = self.expect(&Token::RParen)?;
        let end = close.span.end;
        Ok(Spanned::new(inner.node, Span::new(start, end)))
    }

    fn parse_infix_expr(&mut self, min_bp: u8) -> Result<(Spanned<Expr>, bool), CompileError> {
        let mut lhs = self.parse_operand()?;
        let mut consumed_operator = false;

        loop {
            self.skip_newlines();
            let Some(tok) = self.peek() else { break };
            let op = match &tok.node {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            let (lbp, rbp) = binding_power(op);
            if lbp < min_bp {
                break;
            }
            self.advance();
            consumed_operator = true;
            let (rhs, _) = self.parse_infix_expr(rbp)?;
            let span = Span::new(lhs.span.start, rhs.span.end);
            lhs = Spanned::new(Expr::Binary { op, left: Box::new(lhs), right: Box::new(rhs) }, span);
        }

        Ok((lhs, consumed_operator))
    }
}

fn binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Add | BinOp::Sub => (10, 11),
        BinOp::Mul | BinOp::Div => (20, 21),
    }
}
