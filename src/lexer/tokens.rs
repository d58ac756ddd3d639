use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("module", TokenKind::Module);
        map.insert("import", TokenKind::Import);
        map.insert("public", TokenKind::Public);
        map.insert("private", TokenKind::Private);
        map.insert("class", TokenKind::Class);
        map.insert("struct", TokenKind::Struct);
        map.insert("contract", TokenKind::Contract);
        map.insert("enum", TokenKind::Enum);
        map.insert("case", TokenKind::Case);
        map.insert("fn", TokenKind::Fn);
        map.insert("init", TokenKind::Init);
        map.insert("operator", TokenKind::Operator);
        map.insert("var", TokenKind::Var);
        map.insert("let", TokenKind::Let);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("self", TokenKind::SelfValue);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Integer,
    Float,
    String,
    Identifier,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Dot,
    Semicolon,
    Colon,
    Comma,
    Arrow,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Module,
    Import,
    Public,
    Private,
    Class,
    Struct,
    Contract,
    Enum,
    Case,
    Fn,
    Init,
    Operator,
    Var,
    Let,
    Return,
    If,
    Else,
    While,
    SelfValue,
    True,
    False,
}

impl TokenKind {
    /// Tokens that may start a declaration, used as parser synchronisation points.
    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Contract
                | TokenKind::Enum
                | TokenKind::Fn
                | TokenKind::Init
                | TokenKind::Operator
                | TokenKind::Case
                | TokenKind::Import
                | TokenKind::Module
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::String
            | TokenKind::Identifier
            | TokenKind::Integer
            | TokenKind::Float => write!(f, "{} ({})", self.kind, self.value),
            _ => write!(f, "{}", self.kind),
        }
    }
}
