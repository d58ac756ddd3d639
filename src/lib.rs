#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip, FixIt, Warning};

pub mod ast;
pub mod config;
pub mod errors;
pub mod importer;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod semantic;
pub mod symbols;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<null>")))
    }

    /// A position that only names a file, used for diagnostics about whole inputs.
    pub fn at_file(file: &str) -> Self {
        Position::new(0, 0, 0, Rc::new(String::from(file)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span::new(Position::null(), Position::null())
    }

    pub fn at_file(file: &str) -> Self {
        Span::new(Position::at_file(file), Position::at_file(file))
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }
}

/// Returns the 1-based line number, the line text and the offset within that line.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // Position sits exactly at the end of the content
    Some((line_number, String::new(), 0))
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let content = "Hello, world!\nmodule Main;\n\nTesting { }\n";
        let (line_number, line, line_pos) = super::get_line_at_position(content, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(content, 36).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);

        assert!(super::get_line_at_position(content, 500).is_none());
    }

    #[test]
    fn test_format_error_points_at_column() {
        use crate::errors::errors::{Error, ErrorImpl};
        use crate::{Position, Span};
        use std::rc::Rc;

        let content = "module Main;\n  var y;\n";
        let file = Rc::new(String::from("main.tn"));
        let span = Span::new(
            Position::new(19, 2, 7, Rc::clone(&file)),
            Position::new(20, 2, 8, file),
        );
        let error = Error::new(
            ErrorImpl::MissingTypeAnnotation {
                name: String::from("y"),
            },
            span,
        );

        let rendered = super::format_error(&error, content);
        assert!(rendered.starts_with("Error: MissingTypeAnnotation"));
        assert!(rendered.contains("-> main.tn:2:7"));
        assert!(rendered.contains("2 | var y;"));
        assert!(rendered.ends_with("----^"));
    }
}

/// Renders an error against the source it was reported in.
pub fn format_error(error: &Error, source: &str) -> String {
    /*
        Error: name (tip)
        -> main.tn:20:9
           |
        20 | let a = #;
           | --------^
    */

    let position = &error.get_span().start;
    let mut result = String::new();

    if let ErrorTip::None = error.get_tip() {
        result.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        result.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    result.push_str(&format!(
        "-> {}:{}:{}",
        position.file, position.line, position.column
    ));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.offset) else {
        return result;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    result.push_str(&format!("\n{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    result.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    result.push_str(&format!("{:>padding$} {:->arrows$}", "|", "^"));
    result
}

pub fn format_warning(warning: &Warning) -> String {
    let position = &warning.get_span().start;
    format!(
        "Warning: {} ({})\n-> {}:{}:{}",
        warning.get_warning_name(),
        warning.get_message(),
        position.file,
        position.line,
        position.column
    )
}

pub fn format_fixit(fixit: &FixIt) -> String {
    let position = &fixit.span.start;
    format!(
        "FixIt: {} (replace with `{}`)\n-> {}:{}:{}",
        fixit.message, fixit.replacement, position.file, position.line, position.column
    )
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
