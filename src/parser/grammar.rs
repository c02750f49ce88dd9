/*!
# Recursive descent grammar

Builds the arena tree directly from the token stream. The parser never fails:
unexpected tokens become `Error` leaves plus a syntax diagnostic, and a block
missing its `}` is closed at the last consumed token.

```text
file      := item*
item      := function | property | class
function  := 'fun' NAME '(' params? ')' (':' TYPE)? (block | '=' expr)?
property  := 'val' NAME (':' TYPE)? '=' expr ';'?
class     := 'class' NAME '{' (function | property)* '}'
block     := '{' stmt* '}'
stmt      := local | 'return' expr? ';'? | expr ';'?
expr      := term (('+'|'-') term)*
term      := unary (('*'|'/') unary)*
unary     := '-' unary | postfix
postfix   := primary ('(' args? ')' | '.' NAME)*
primary   := INT | STRING | 'true' | 'false' | NAME | '(' expr ')' | block
```
*/

use crate::ast_core::{AstBuilder, AstKind, AstPayload, BinaryOp, BuiltAst, NodeId};
use crate::core::position::PackedSpan;
use crate::diagnostics::codes;

use super::lexer::{tokenize, Token, TokenKind};

/// Raw syntax problem; turned into a located `Diagnostic` by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub span: PackedSpan,
    pub code: &'static str,
    pub message: String,
}

pub struct ParseOutput {
    pub ast: BuiltAst,
    pub errors: Vec<SyntaxError>,
}

/// Parse a whole document: the root `File` node spans `[0, len)`.
pub fn parse_file(source: &str) -> ParseOutput {
    let mut p = Parser::new(source);
    p.builder.start_node(AstKind::File, 0);
    while let Some(kind) = p.peek() {
        match kind {
            TokenKind::Fun => p.function(),
            TokenKind::Val => p.value_decl(AstKind::Property),
            TokenKind::Class => p.class(),
            _ => p.error_token("expected a declaration"),
        }
    }
    p.builder.finish_node(source.len() as u32);
    p.finish()
}

/// Parse a standalone function body: exactly one block or expression.
/// The root span is the span of that expression; tokens after it are
/// reported, not consumed.
pub fn parse_body(source: &str) -> ParseOutput {
    let mut p = Parser::new(source);
    match p.peek() {
        Some(TokenKind::LBrace) => p.block(),
        _ => p.expression(),
    }
    if let (Some(first), Some(last)) = (p.tokens.get(p.pos), p.tokens.last()) {
        let span = PackedSpan::between(first.span.start, last.span.end());
        p.errors.push(SyntaxError { span, code: codes::TRAILING_INPUT, message: "unexpected input after the body".to_string() });
    }
    p.finish()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// End of the last consumed token.
    last_end: u32,
    builder: AstBuilder,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, tokens: tokenize(source), pos: 0, last_end: 0, builder: AstBuilder::new(), errors: Vec::new() }
    }

    fn finish(self) -> ParseOutput {
        ParseOutput { ast: self.builder.build(), errors: self.errors }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = *self.tokens.get(self.pos)?;
        self.pos += 1;
        self.last_end = token.span.end();
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) { self.bump() } else { None }
    }

    /// Start of the next token, or the end of input.
    fn here(&self) -> u32 {
        self.tokens.get(self.pos).map(|t| t.span.start).unwrap_or(self.source.len() as u32)
    }

    fn error_at(&mut self, span: PackedSpan, message: impl Into<String>) {
        self.errors.push(SyntaxError { span, code: codes::SYNTAX_ERROR, message: message.into() });
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind).is_some() {
            return true;
        }
        let found = self.peek().map(|k| k.to_string()).unwrap_or_else(|| "end of input".to_string());
        self.error_at(PackedSpan::new(self.here(), 0), format!("expected '{kind}', found {found}"));
        false
    }

    /// Consume the current token into an `Error` leaf.
    fn error_token(&mut self, context: &str) {
        if let Some(token) = self.bump() {
            let message = format!("{context}, found {}", token.kind);
            self.builder.error(token.span, message.clone());
            self.error_at(token.span, message);
        }
    }

    /// Zero-length `Error` leaf; keeps operator wrapping anchored when an operand is missing.
    fn missing(&mut self, what: &str) {
        let span = PackedSpan::new(self.here(), 0);
        let message = format!("expected {what}");
        self.builder.error(span, message.clone());
        self.error_at(span, message);
    }

    fn name(&mut self, owner: NodeId) {
        match self.eat(TokenKind::Identifier) {
            Some(token) => {
                let text = token.text(self.source);
                self.builder.set_ident(owner, text);
                self.builder.leaf_ident(AstKind::Name, token.span, text);
            }
            None => self.missing("a name"),
        }
    }

    fn type_ref(&mut self) {
        match self.eat(TokenKind::Identifier) {
            Some(token) => {
                self.builder.leaf_ident(AstKind::TypeRef, token.span, token.text(self.source));
            }
            None => self.missing("a type name"),
        }
    }

    fn function(&mut self) {
        let Some(fun) = self.bump() else { return };
        let id = self.builder.start_node(AstKind::Function, fun.span.start);
        self.name(id);
        if self.expect(TokenKind::LParen) {
            self.params();
            self.expect(TokenKind::RParen);
        }
        if self.eat(TokenKind::Colon).is_some() {
            self.type_ref();
        }
        match self.peek() {
            Some(TokenKind::LBrace) => self.block(),
            Some(TokenKind::Assign) => {
                self.bump();
                self.expression();
            }
            _ => {}
        }
        self.builder.finish_node(self.last_end);
    }

    fn params(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::RParen => break,
                TokenKind::Identifier => {
                    let Some(token) = self.bump() else { break };
                    self.builder.start_node_with_ident(AstKind::Param, token.span.start, token.text(self.source));
                    if self.expect(TokenKind::Colon) {
                        self.type_ref();
                    }
                    self.builder.finish_node(self.last_end);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                TokenKind::LBrace | TokenKind::Fun | TokenKind::Class => break,
                _ => self.error_token("expected a parameter"),
            }
        }
    }

    /// `val NAME (: T)? = expr ;?` as a top-level property, class member or local.
    fn value_decl(&mut self, kind: AstKind) {
        let Some(val) = self.bump() else { return };
        let id = self.builder.start_node(kind, val.span.start);
        self.name(id);
        if self.eat(TokenKind::Colon).is_some() {
            self.type_ref();
        }
        if self.expect(TokenKind::Assign) {
            self.expression();
        }
        self.builder.finish_node(self.last_end);
        self.eat(TokenKind::Semicolon);
    }

    fn class(&mut self) {
        let Some(class) = self.bump() else { return };
        let id = self.builder.start_node(AstKind::Class, class.span.start);
        self.name(id);
        if self.expect(TokenKind::LBrace) {
            loop {
                match self.peek() {
                    None => {
                        self.error_at(PackedSpan::new(self.last_end, 0), "missing '}' to close the class");
                        break;
                    }
                    Some(TokenKind::RBrace) => {
                        self.bump();
                        break;
                    }
                    Some(TokenKind::Fun) => self.function(),
                    Some(TokenKind::Val) => self.value_decl(AstKind::Property),
                    Some(_) => self.error_token("expected a class member"),
                }
            }
        }
        self.builder.finish_node(self.last_end);
    }

    fn block(&mut self) {
        let Some(brace) = self.bump() else { return };
        self.builder.start_node(AstKind::Block, brace.span.start);
        loop {
            match self.peek() {
                None => {
                    self.error_at(PackedSpan::new(self.last_end, 0), "missing '}' to close the block");
                    break;
                }
                Some(TokenKind::RBrace) => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let before = self.pos;
                    self.statement();
                    if self.pos == before {
                        self.error_token("unexpected token in block");
                    }
                }
            }
        }
        self.builder.finish_node(self.last_end);
    }

    fn statement(&mut self) {
        match self.peek() {
            Some(TokenKind::Val) => self.value_decl(AstKind::LocalVal),
            Some(TokenKind::Semicolon) => {
                self.bump();
            }
            Some(TokenKind::Return) => {
                let Some(ret) = self.bump() else { return };
                self.builder.start_node(AstKind::Return, ret.span.start);
                if !matches!(self.peek(), None | Some(TokenKind::Semicolon | TokenKind::RBrace)) {
                    self.expression();
                }
                self.builder.finish_node(self.last_end);
                self.eat(TokenKind::Semicolon);
            }
            _ => {
                self.expression();
                self.eat(TokenKind::Semicolon);
            }
        }
    }

    fn expression(&mut self) {
        self.term();
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            if self.builder.wrap_last_child(AstKind::Binary, AstPayload::Op(op)).is_none() {
                break;
            }
            self.term();
            self.builder.finish_node(self.last_end);
        }
    }

    fn term(&mut self) {
        self.unary();
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.bump();
            if self.builder.wrap_last_child(AstKind::Binary, AstPayload::Op(op)).is_none() {
                break;
            }
            self.unary();
            self.builder.finish_node(self.last_end);
        }
    }

    fn unary(&mut self) {
        if let Some(minus) = self.eat(TokenKind::Minus) {
            self.builder.start_node(AstKind::Unary, minus.span.start);
            self.unary();
            self.builder.finish_node(self.last_end);
        } else {
            self.postfix();
        }
    }

    fn postfix(&mut self) {
        self.primary();
        loop {
            match self.peek() {
                Some(TokenKind::LParen) => {
                    if self.builder.wrap_last_child(AstKind::Call, AstPayload::None).is_none() {
                        break;
                    }
                    self.bump();
                    while !matches!(self.peek(), None | Some(TokenKind::RParen)) {
                        self.expression();
                        if self.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen);
                    self.builder.finish_node(self.last_end);
                }
                Some(TokenKind::Dot) => {
                    let Some(member) = self.builder.wrap_last_child(AstKind::Member, AstPayload::None) else { break };
                    self.bump();
                    self.name(member);
                    self.builder.finish_node(self.last_end);
                }
                _ => break,
            }
        }
    }

    fn primary(&mut self) {
        let Some(kind) = self.peek() else {
            self.missing("an expression");
            return;
        };
        match kind {
            TokenKind::IntLiteral | TokenKind::StringLiteral | TokenKind::True | TokenKind::False => {
                let Some(token) = self.bump() else { return };
                let node_kind = match kind {
                    TokenKind::IntLiteral => AstKind::IntLiteral,
                    TokenKind::StringLiteral => AstKind::StringLiteral,
                    _ => AstKind::BoolLiteral,
                };
                self.builder.leaf_literal(node_kind, token.span, token.text(self.source));
            }
            TokenKind::Identifier => {
                let Some(token) = self.bump() else { return };
                self.builder.leaf_ident(AstKind::Identifier, token.span, token.text(self.source));
            }
            TokenKind::LParen => {
                let Some(open) = self.bump() else { return };
                self.builder.start_node(AstKind::Paren, open.span.start);
                self.expression();
                self.expect(TokenKind::RParen);
                self.builder.finish_node(self.last_end);
            }
            TokenKind::LBrace => self.block(),
            // Tokens that end or start an enclosing construct are left for the caller.
            TokenKind::RBrace
            | TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Fun
            | TokenKind::Val
            | TokenKind::Class
            | TokenKind::Return => self.missing("an expression"),
            _ => self.error_token("expected an expression"),
        }
    }
}
