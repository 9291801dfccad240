//! Parse error types.

use cbuf_ast::Span;
use cbuf_lexer::Token;
use std::fmt;

/// Parse error with source location and context.
///
/// `line` is 1-based and filled in by the public entry point from the byte
/// span; internal constructors leave it at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub line: u32,
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was expected and something else was found.
    UnexpectedToken,
    /// Input ended while a construct was incomplete.
    UnexpectedEof,
    /// Tokens are present but violate the grammar (bad literal, reserved
    /// name, array length out of range, …).
    InvalidSyntax,
    /// The input contained no declarations at all.
    EmptyInput,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected_token(expected: &Token, found: Option<&Token>, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("expected {:?}, found {:?}", expected, token),
            None => format!("expected {:?}, found end of input", expected),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            line: 0,
            message,
        }
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(found: Option<&Token>, context: &str, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("unexpected {:?} {}", token, context),
            None => format!("unexpected end of input {}", context),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            line: 0,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            span,
            line: 0,
            message: message.into(),
        }
    }

    /// Create the empty-input error.
    pub fn empty_input() -> Self {
        Self {
            kind: ParseErrorKind::EmptyInput,
            span: 0..0,
            line: 0,
            message: "schema source contains no declarations".to_owned(),
        }
    }

    /// Fill in the 1-based line number from the span start.
    pub(crate) fn with_line(mut self, source: &str) -> Self {
        let start = self.span.start.min(source.len());
        self.line = 1 + source[..start].bytes().filter(|&b| b == b'\n').count() as u32;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

impl std::error::Error for ParseError {}
