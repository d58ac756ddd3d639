use crate::{
    ast::{
        ast::{NodeId, NodeKind},
        declarations::{
            EnumCaseDecl, FileNode, FunctionDecl, ImportDecl, InitDecl, ModuleDecl, OperatorDecl,
            ParameterDecl, PropertyDecl, TypeDecl,
        },
        types::{TypeKind, Visibility},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{
    expr::parse_binary_operator,
    parser::Parser,
    stmt::parse_block_stmt,
    types::{parse_path, parse_type},
};

/// Module used by files without a `module` declaration.
pub const IMPLICIT_MODULE: &str = "Main";

pub fn parse_file(parser: &mut Parser) -> NodeId {
    let start = parser.current_token().span.clone();
    let mut module_name = String::from(IMPLICIT_MODULE);

    if parser.current_token_kind() == TokenKind::Module {
        let position = parser.position();
        match parse_module_header(parser) {
            Ok(name) => module_name = name,
            Err(error) => {
                parser.recover(position, error);
            }
        }
    }

    let mut imports = vec![];
    while parser.current_token_kind() == TokenKind::Import {
        let position = parser.position();
        match parse_import(parser) {
            Ok(import) => imports.push(import),
            Err(error) => {
                parser.recover(position, error);
            }
        }
    }

    let mut members = vec![];
    while parser.has_tokens() {
        let position = parser.position();
        match parse_top_level_decl(parser) {
            Ok(decl) => members.push(decl),
            Err(error) => members.push(parser.recover(position, error)),
        }
    }

    let span = start.to(&parser.current_token().span);
    let module = parser.alloc(
        NodeKind::Module(ModuleDecl {
            name: module_name,
            members,
        }),
        span.clone(),
    );

    let path = parser.file().to_string();
    parser.alloc(
        NodeKind::File(FileNode {
            path,
            imports,
            module,
        }),
        span,
    )
}

fn parse_module_header(parser: &mut Parser) -> Result<String, Error> {
    parser.advance();
    let (name, _) = parse_path(parser, "module name")?;
    parser.expect_error(TokenKind::Semicolon, "`;` after module declaration")?;
    Ok(name)
}

fn parse_import(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span;
    let (path, _) = parse_path(parser, "module path after `import`")?;
    parser.expect_error(TokenKind::Semicolon, "`;` after import")?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(NodeKind::Import(ImportDecl { path }), span))
}

fn parse_visibility(parser: &mut Parser) -> Visibility {
    match parser.current_token_kind() {
        TokenKind::Public => {
            parser.advance();
            Visibility::Public
        }
        TokenKind::Private => {
            parser.advance();
            Visibility::Private
        }
        _ => Visibility::Internal,
    }
}

pub fn parse_top_level_decl(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.current_token().span.clone();
    let visibility = parse_visibility(parser);

    match parser.current_token_kind() {
        TokenKind::Class | TokenKind::Struct | TokenKind::Contract | TokenKind::Enum => {
            parse_type_decl(parser, visibility, start)
        }
        TokenKind::Fn => parse_fn_decl(parser, visibility, start),
        _ => Err(parser.syntax_error("expected type or function declaration")),
    }
}

fn parse_type_decl(parser: &mut Parser, visibility: Visibility, start: Span) -> Result<NodeId, Error> {
    let kind = match parser.advance().kind {
        TokenKind::Class => TypeKind::Class,
        TokenKind::Struct => TypeKind::Struct,
        TokenKind::Contract => TypeKind::Contract,
        _ => TypeKind::Enum,
    };

    let name = parser
        .expect_error(TokenKind::Identifier, "type name")?
        .value;

    let mut conformances = vec![];
    if parser.eat(TokenKind::Colon) {
        conformances.push(parse_type(parser)?);
        while parser.eat(TokenKind::Comma) {
            conformances.push(parse_type(parser)?);
        }
    }

    parser.expect_error(TokenKind::OpenCurly, "`{` to open type body")?;

    let mut members = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        let position = parser.position();
        match parse_member(parser) {
            Ok(parsed) => members.extend(parsed),
            Err(error) => members.push(parser.recover(position, error)),
        }
    }

    parser.expect_error(TokenKind::CloseCurly, "`}` to close type body")?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::TypeDecl(TypeDecl {
            name,
            kind,
            visibility,
            conformances,
            members,
        }),
        span,
    ))
}

/// A member declaration. `case a, b` yields one node per case.
fn parse_member(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    let start = parser.current_token().span.clone();
    let visibility = parse_visibility(parser);

    match parser.current_token_kind() {
        TokenKind::Fn => Ok(vec![parse_fn_decl(parser, visibility, start)?]),
        TokenKind::Init => Ok(vec![parse_init_decl(parser, visibility, start)?]),
        TokenKind::Operator => Ok(vec![parse_operator_decl(parser, start)?]),
        TokenKind::Var | TokenKind::Let => {
            Ok(vec![parse_property_decl(parser, visibility, start)?])
        }
        TokenKind::Case => parse_enum_cases(parser),
        _ => Err(parser.syntax_error("expected member declaration")),
    }
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    parser.expect_error(TokenKind::OpenParen, "`(` to open parameter list")?;

    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name_token = parser.expect_error(TokenKind::Identifier, "parameter name")?;
        parser.expect_error(TokenKind::Colon, "`:` after parameter name")?;
        let ty = parse_type(parser)?;

        let span = parser.span_from(&name_token.span);
        parameters.push(parser.alloc(
            NodeKind::Parameter(ParameterDecl {
                name: name_token.value,
                ty,
            }),
            span,
        ));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect_error(TokenKind::CloseParen, "`)` to close parameter list")?;
    Ok(parameters)
}

/// A body block, or `None` for a bodiless declaration ending in `;`.
fn parse_optional_body(parser: &mut Parser) -> Result<Option<NodeId>, Error> {
    if parser.eat(TokenKind::Semicolon) {
        return Ok(None);
    }
    Ok(Some(parse_block_stmt(parser)?))
}

fn parse_fn_decl(parser: &mut Parser, visibility: Visibility, start: Span) -> Result<NodeId, Error> {
    parser.advance();
    let name = parser
        .expect_error(TokenKind::Identifier, "function name")?
        .value;
    let parameters = parse_parameters(parser)?;

    let return_type = if parser.eat(TokenKind::Arrow) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_optional_body(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::Function(FunctionDecl {
            name,
            visibility,
            parameters,
            return_type,
            body,
        }),
        span,
    ))
}

fn parse_init_decl(parser: &mut Parser, visibility: Visibility, start: Span) -> Result<NodeId, Error> {
    parser.advance();
    let parameters = parse_parameters(parser)?;
    let body = parse_optional_body(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::Init(InitDecl {
            visibility,
            parameters,
            body,
        }),
        span,
    ))
}

fn parse_operator_decl(parser: &mut Parser, start: Span) -> Result<NodeId, Error> {
    parser.advance();
    let operator = parse_binary_operator(parser)?;
    let parameters = parse_parameters(parser)?;
    parser.expect_error(TokenKind::Arrow, "`->` and a return type for operator")?;
    let return_type = parse_type(parser)?;
    let body = parse_optional_body(parser)?;

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::Operator(OperatorDecl {
            operator,
            parameters,
            return_type,
            body,
        }),
        span,
    ))
}

fn parse_property_decl(
    parser: &mut Parser,
    visibility: Visibility,
    start: Span,
) -> Result<NodeId, Error> {
    let mutable = parser.advance().kind == TokenKind::Var;
    let name = parser
        .expect_error(TokenKind::Identifier, "property name")?
        .value;

    let ty = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser)?)
    } else {
        None
    };

    let initializer = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.eat(TokenKind::Semicolon);

    let span = parser.span_from(&start);
    Ok(parser.alloc(
        NodeKind::Property(PropertyDecl {
            name,
            visibility,
            mutable,
            ty,
            initializer,
        }),
        span,
    ))
}

fn parse_enum_cases(parser: &mut Parser) -> Result<Vec<NodeId>, Error> {
    parser.advance();

    let mut cases = vec![];
    loop {
        let token = parser.expect_error(TokenKind::Identifier, "enum case name")?;
        cases.push(parser.alloc(NodeKind::EnumCase(EnumCaseDecl { name: token.value }), token.span));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.eat(TokenKind::Semicolon);
    Ok(cases)
}
