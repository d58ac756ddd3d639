use std::collections::HashMap;

use crate::{ast::ast::NodeId, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Comma,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Primary,
}

pub type StmtHandler = fn(&mut Parser) -> Result<NodeId, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<NodeId, Error>;
pub type LEDHandler = fn(&mut Parser, NodeId, BindingPower) -> Result<NodeId, Error>;

/// Infix operators that parse as `Binary` nodes, with their binding power.
const BINARY_OPERATORS: &[(TokenKind, BindingPower)] = &[
    (TokenKind::And, BindingPower::Logical),
    (TokenKind::Or, BindingPower::Logical),
    (TokenKind::Less, BindingPower::Relational),
    (TokenKind::LessEquals, BindingPower::Relational),
    (TokenKind::Greater, BindingPower::Relational),
    (TokenKind::GreaterEquals, BindingPower::Relational),
    (TokenKind::Equals, BindingPower::Relational),
    (TokenKind::NotEquals, BindingPower::Relational),
    (TokenKind::Plus, BindingPower::Additive),
    (TokenKind::Dash, BindingPower::Additive),
    (TokenKind::Star, BindingPower::Multiplicative),
    (TokenKind::Slash, BindingPower::Multiplicative),
    (TokenKind::Percent, BindingPower::Multiplicative),
];

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);

    for (kind, binding_power) in BINARY_OPERATORS {
        parser.led(*kind, *binding_power, parse_binary_expr);
    }

    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::SelfValue, parse_primary_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);

    // Statements
    parser.stmt(TokenKind::Var, parse_var_decl_stmt);
    parser.stmt(TokenKind::Let, parse_var_decl_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt);
}

// Tables owned by `Parser`, keyed by the token that triggers the handler
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
