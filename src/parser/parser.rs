//! Parser state and the `parse` entry point.
//!
//! Expressions are parsed Pratt style: prefix (NUD) and infix (LED) handlers
//! are looked up by token kind, and binding powers decide precedence.
//! Declarations are parsed by plain recursive descent in `decl`, and
//! statements through the statement table. Syntax errors never abort a file:
//! the failed construct becomes an `Error` node and parsing resumes at the
//! next synchronizing token.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        ast::{Ast, NodeId, NodeKind},
        expressions::ErrorNode,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    decl::parse_file,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// Owns the arena while parsing and hands it back when done.
pub struct Parser {
    pub ast: Ast,
    /// Always ends in EOF
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<String>,
    errors: Vec<Error>,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, file: Rc<String>, ast: Ast) -> Self {
        let mut tokens = tokens;
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(0, 1, 1, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span::new(end.clone(), end),
            });
        }

        Parser {
            ast,
            tokens,
            pos: 0,
            file,
            errors: vec![],
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    pub fn file(&self) -> &Rc<String> {
        &self.file
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Kind of the token after the current one.
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::EOF)
    }

    /// Advances to the next token and returns the previous one. Never moves
    /// past EOF.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span.clone()
    }

    /// Span from `start` up to the most recently consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        start.to(&self.previous_span())
    }

    pub fn syntax_error(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::SyntaxError {
                token: token.value.clone(),
                message: message.to_string(),
            },
            token.span.clone(),
        )
    }

    /// Expects a token of the specified kind, naming `what` on failure.
    pub fn expect_error(&mut self, expected_kind: TokenKind, what: &str) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(self.syntax_error(&format!("expected {}", what)));
        }
        Ok(self.advance())
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, &expected_kind.to_string())
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.alloc(kind, span)
    }

    /// Records `error`, skips to the next synchronisation point and returns
    /// an error leaf standing in for the failed input.
    pub fn recover(&mut self, start: usize, error: Error) -> NodeId {
        let span = error.get_span().clone();
        let message = error.get_error().to_string();
        log::debug!("recovering from syntax error: {}", message);
        self.errors.push(error);

        if self.pos == start {
            self.advance();
        }
        self.synchronize();

        self.alloc(NodeKind::Error(ErrorNode { message }), span)
    }

    /// Skips past the next `;`, or up to a `}` or a token that starts a
    /// declaration or statement.
    fn synchronize(&mut self) {
        loop {
            let kind = self.current_token_kind();
            match kind {
                TokenKind::EOF | TokenKind::CloseCurly => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                kind if kind.starts_declaration()
                    || matches!(
                        kind,
                        TokenKind::Var
                            | TokenKind::Let
                            | TokenKind::Return
                            | TokenKind::If
                            | TokenKind::While
                    ) =>
                {
                    break
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }
}

/// Parses one file's tokens into `ast`.
///
/// Returns the `File` node and every syntax error recovered from. Failed
/// declarations and statements appear in the tree as `Error` leaves.
pub fn parse(ast: &mut Ast, tokens: Vec<Token>, file: Rc<String>) -> (NodeId, Vec<Error>) {
    let mut parser = Parser::new(tokens, file, std::mem::take(ast));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let root = parse_file(&mut parser);

    log::debug!(
        "parsed {} with {} syntax error(s)",
        parser.file,
        parser.errors.len()
    );

    *ast = parser.ast;
    (root, parser.errors)
}
