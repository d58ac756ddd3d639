//! Utility macros for the compiler.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for fixed tokens
//! - `MK_ID!` - Declares an arena handle newtype
//!
//! These macros reduce boilerplate in the lexer and the arenas.

/// Builds a `Token` from its kind, text and span.
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Lexer handler for a fixed-text token: pushes the token and skips its text.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^->").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            let span = lexer.span_of($value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
        }
    };
}

/// Declares a `u32` newtype handle into one of the compiler's arenas.
///
/// # Example
///
/// ```ignore
/// MK_ID!(NodeId);
/// let id = NodeId::from_raw(3);
/// ```
#[macro_export]
macro_rules! MK_ID {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}
