// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for cbuf schema sources.
//!
//! Tokenization uses logos. Comments are normally removed by the
//! preprocessor before the lexer ever sees the text, but both comment
//! forms are also skip rules here so that comment handling never depends
//! on call order.
//!
//! Type spellings (`u32`, `int8_t`, `double`, …) are NOT keywords: they
//! lex as [`Token::Ident`] and the parser classifies them against the
//! spelling table. Only the structural keywords and the `@` attributes
//! have dedicated tokens.

use logos::Logos;

/// cbuf token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
#[logos(skip r"/\*([^*]|\*[^/])*\*/")] // Skip block comments (non-greedy)
pub enum Token {
    // === Keywords ===
    /// Keyword `namespace`
    #[token("namespace")]
    Namespace,
    /// Keyword `struct`
    #[token("struct")]
    Struct,
    /// Keyword `enum`
    #[token("enum")]
    Enum,
    /// Keyword `class`
    #[token("class")]
    Class,
    /// Keyword `const`
    #[token("const")]
    Const,
    /// Boolean literal `true`
    #[token("true")]
    True,
    /// Boolean literal `false`
    #[token("false")]
    False,

    // === Attributes ===
    /// Attribute `@naked` on a struct
    #[token("@naked")]
    Naked,
    /// Attribute `@compact` on an array length
    #[token("@compact")]
    Compact,

    // === Operators & punctuation ===
    /// Separator `::`
    #[token("::")]
    PathSep,
    /// Operator `=`
    #[token("=")]
    Eq,
    /// Operator `+`
    #[token("+")]
    Plus,
    /// Operator `-`
    #[token("-")]
    Minus,
    /// Operator `*`
    #[token("*")]
    Star,
    /// Operator `/`
    #[token("/")]
    Slash,
    /// Delimiter `,`
    #[token(",")]
    Comma,
    /// Delimiter `;`
    #[token(";")]
    Semicolon,

    // === Delimiters ===
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// Delimiter `{`
    #[token("{")]
    LBrace,
    /// Delimiter `}`
    #[token("}")]
    RBrace,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,

    // === Literals ===
    /// Float literal (e.g. 3.14)
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    /// Integer literal (e.g. 42, 0, 1000)
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    /// String literal with the usual backslash escapes.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    /// Identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    ///
    /// Includes type spellings; the parser decides which identifiers are
    /// reserved in which position.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),
}

/// Unescape a string literal's content.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}
