//! Type parsing implementation.
//!
//! Type annotations are plain or dotted names such as `Int32` or
//! `Geometry.Point`. Each becomes a `TypeRef` node that the declaration pass
//! later rewrites to the resolved FQN.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        declarations::TypeRef,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<NodeId, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
}

pub fn parse_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.syntax_error("expected type name"));
    };

    nud(parser)
}

/// Parses `Ident ('.' Ident)*`.
pub fn parse_path(parser: &mut Parser, what: &str) -> Result<(String, crate::Span), Error> {
    let first = parser.expect_error(TokenKind::Identifier, what)?;
    let mut path = first.value;

    while parser.current_token_kind() == TokenKind::Dot {
        parser.advance();
        let segment = parser.expect_error(TokenKind::Identifier, what)?;
        path.push('.');
        path.push_str(&segment.value);
    }

    Ok((path, parser.span_from(&first.span)))
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let (name, span) = parse_path(parser, "type name")?;
    Ok(parser.alloc(NodeKind::TypeRef(TypeRef { name, kind: None }), span))
}
