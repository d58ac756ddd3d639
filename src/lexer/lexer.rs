use std::rc::Rc;

use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        // Patterns are fixed at compile time
        regex: Regex::new(regex).expect("lexer pattern must be a valid regex"),
        handler,
    }
}

pub struct Lexer {
    patterns: Vec<RegexPattern>,
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = Rc::new(file.unwrap_or_else(|| String::from("shell")));

        Lexer {
            pos: 0,
            line: 1,
            column: 1,
            tokens: vec![],
            patterns: vec![
                pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
                pattern("^[0-9]+\\.[0-9]+", float_handler),
                pattern("^[0-9]+", integer_handler),
                pattern("^\\s+", skip_handler),
                pattern("^\"(\\\\.|[^\"\\\\])*\"", string_handler),
                pattern("^//[^\n]*", skip_handler),
                pattern("^\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
                pattern("^\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
                pattern("^\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
                pattern("^\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
                pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
                pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
                pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
                pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
                pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
                pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
                pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
                pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
                pattern("^\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
                pattern("^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
                pattern("^\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
                pattern("^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
                pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
                pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
                pattern("^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
                pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
                pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
                pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
                pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
                pattern("^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
            ],
            source,
            file: file_name,
        }
    }

    /// Moves forward by `n` bytes, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn position(&self) -> Position {
        Position::new(
            self.pos as u32,
            self.line,
            self.column,
            Rc::clone(&self.file),
        )
    }

    /// Span of the next `len` bytes of input.
    pub fn span_of(&self, len: usize) -> Span {
        let end = (self.pos + len).min(self.source.len());
        let (mut line, mut column) = (self.line, self.column);
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Span::new(
            self.position(),
            Position::new(end as u32, line, column, Rc::clone(&self.file)),
        )
    }
}

fn integer_handler(lexer: &mut Lexer, regex: &Regex) {
    literal_handler(lexer, regex, TokenKind::Integer);
}

fn float_handler(lexer: &mut Lexer, regex: &Regex) {
    literal_handler(lexer, regex, TokenKind::Float);
}

fn literal_handler(lexer: &mut Lexer, regex: &Regex, kind: TokenKind) {
    let Some(matched) = regex.find(lexer.remainder()) else {
        return;
    };
    let matched = matched.as_str().to_string();

    let span = lexer.span_of(matched.len());
    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(kind, matched, span));
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(matched) = regex.find(lexer.remainder()) else {
        return;
    };
    let end = matched.end();
    lexer.advance_n(end);
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(matched) = regex.find(lexer.remainder()) else {
        return;
    };
    let raw = matched.as_str().to_string();
    let span = lexer.span_of(raw.len());
    lexer.advance_n(raw.len());

    let mut result = String::new();
    let mut chars = raw[1..raw.len() - 1].chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                // Unknown escape, keep it as written
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    lexer.push(MK_TOKEN!(TokenKind::String, result, span));
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let Some(matched) = regex.find(lexer.remainder()) else {
        return;
    };
    let value = matched.as_str().to_string();
    let span = lexer.span_of(value.len());

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let mut matched = false;

        for index in 0..lex.patterns.len() {
            let pattern = lex.patterns[index].clone();

            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            let token = lex
                .remainder()
                .chars()
                .next()
                .map(|ch| ch.to_string())
                .unwrap_or_default();
            let span = lex.span_of(token.len());
            return Err(Error::new(
                ErrorImpl::SyntaxError {
                    token,
                    message: String::from("unrecognised character"),
                },
                span,
            ));
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    log::trace!("tokenized {} into {} tokens", lex.file, lex.tokens.len());
    Ok(lex.tokens)
}
