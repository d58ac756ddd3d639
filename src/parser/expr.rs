use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        expressions::{
            ArgumentExpr, AssignmentExpr, BinaryExpr, CallExpr, IdentifierExpr, LiteralExpr,
            MemberAccessExpr, UnaryExpr,
        },
        types::{BinaryOperator, LiteralKind, UnaryOperator},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.syntax_error("expected expression"));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.advance();

    let kind = match token.kind {
        TokenKind::Integer => NodeKind::Literal(LiteralExpr {
            kind: LiteralKind::Integer,
            value: token.value,
        }),
        TokenKind::Float => NodeKind::Literal(LiteralExpr {
            kind: LiteralKind::Float,
            value: token.value,
        }),
        TokenKind::String => NodeKind::Literal(LiteralExpr {
            kind: LiteralKind::String,
            value: token.value,
        }),
        TokenKind::True | TokenKind::False => NodeKind::Literal(LiteralExpr {
            kind: LiteralKind::Boolean,
            value: token.value,
        }),
        TokenKind::Identifier => NodeKind::Identifier(IdentifierExpr { name: token.value }),
        TokenKind::SelfValue => NodeKind::SelfRef,
        _ => return Err(parser.syntax_error("expected expression")),
    };

    Ok(parser.alloc(kind, token.span))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let operator = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Dash => BinaryOperator::Subtract,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        TokenKind::Equals => BinaryOperator::Equal,
        TokenKind::NotEquals => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::LessEquals => BinaryOperator::LessEqual,
        TokenKind::GreaterEquals => BinaryOperator::GreaterEqual,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        _ => return None,
    };
    Some(operator)
}

/// Consumes an operator token usable in a binary expression or an
/// `operator` declaration.
pub fn parse_binary_operator(parser: &mut Parser) -> Result<BinaryOperator, Error> {
    match binary_operator(parser.current_token_kind()) {
        Some(operator) => {
            parser.advance();
            Ok(operator)
        }
        None => Err(parser.syntax_error("expected binary operator")),
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: NodeId, bp: BindingPower) -> Result<NodeId, Error> {
    let operator = parse_binary_operator(parser)?;
    let right = parse_expr(parser, bp)?;

    let span = parser.ast.span(left).to(parser.ast.span(right));
    Ok(parser.alloc(
        NodeKind::Binary(BinaryExpr {
            operator,
            left,
            right,
        }),
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let operator_token = parser.advance();
    let operator = if operator_token.kind == TokenKind::Not {
        UnaryOperator::Not
    } else {
        UnaryOperator::Negate
    };
    let operand = parse_expr(parser, BindingPower::Unary)?;

    let span = operator_token.span.to(parser.ast.span(operand));
    Ok(parser.alloc(NodeKind::Unary(UnaryExpr { operator, operand }), span))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.advance();
    // Right associative
    let value = parse_expr(parser, BindingPower::Comma)?;

    let span = parser.ast.span(left).to(parser.ast.span(value));
    Ok(parser.alloc(
        NodeKind::Assignment(AssignmentExpr {
            target: left,
            value,
        }),
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_error(TokenKind::CloseParen, "`)` to close grouping")?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();

    let mut arguments = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        let start = parser.current_token().span.clone();

        let label = if parser.current_token_kind() == TokenKind::Identifier
            && parser.peek_kind() == TokenKind::Colon
        {
            let label = parser.advance().value;
            parser.advance();
            Some(label)
        } else {
            None
        };

        let value = parse_expr(parser, BindingPower::Comma)?;
        let span = parser.span_from(&start);
        arguments.push(parser.alloc(NodeKind::Argument(ArgumentExpr { label, value }), span));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "`)` after arguments")?;

    let span = parser.span_from(parser.ast.span(left));
    Ok(parser.alloc(
        NodeKind::Call(CallExpr {
            callee: left,
            arguments,
        }),
        span,
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    parser.advance();
    let member = parser.expect_error(TokenKind::Identifier, "member name after `.`")?;

    let span = parser.ast.span(left).to(&member.span);
    Ok(parser.alloc(
        NodeKind::MemberAccess(MemberAccessExpr {
            target: left,
            member: member.value,
        }),
        span,
    ))
}
