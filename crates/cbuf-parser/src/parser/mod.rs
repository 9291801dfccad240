//! Hand-written recursive descent parser for cbuf schema sources.
//!
//! ## Architecture
//!
//! - `stream`: token stream wrapper with lookahead
//! - `error`: [`ParseError`] and its constructors
//! - `decl`: declaration parsers (keyword-dispatched)
//!
//! The parser is deterministic, so the grammar requirement that a parse
//! yield exactly one result holds by construction. It also fails fast: the
//! first error aborts the parse and is the one the caller sees.

mod decl;
mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

use cbuf_ast::{Declaration, Span};
use cbuf_lexer::Token;
use logos::Logos;

/// Lex and parse preprocessed schema source into raw declarations.
///
/// The input must already be preprocessed (no comments, no `#import`
/// lines), though stray comments are tolerated because the lexer skips
/// them too.
pub fn parse_declarations(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let tokens = lex(source).map_err(|e| e.with_line(source))?;
    let mut stream = TokenStream::new(&tokens);
    decl::parse_declarations(&mut stream).map_err(|e| e.with_line(source))
}

/// Tokenize with byte spans, turning lexer failures into syntax errors.
fn lex(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(ParseError::invalid_syntax(
                    format!("unrecognized character '{}'", &source[span.clone()]),
                    span,
                ));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbuf_ast::decl::RawType;
    use cbuf_ast::schema::{ArrayKind, Literal, Primitive};

    /// Test helper: parse source that must be valid.
    fn parse_ok(source: &str) -> Vec<Declaration> {
        parse_declarations(source).expect("parse should succeed")
    }

    /// Test helper: the single struct in `source`.
    fn single_struct(source: &str) -> cbuf_ast::StructDecl {
        match parse_ok(source).remove(0) {
            Declaration::Struct(s) => s,
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_struct() {
        let s = single_struct("struct a { string b; bool c; }");
        assert_eq!(s.name, "a");
        assert!(!s.is_naked);
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[0].name, "b");
        assert_eq!(s.fields[0].ty, RawType::Primitive(Primitive::String));
        assert_eq!(s.fields[1].ty, RawType::Primitive(Primitive::Bool));
    }

    #[test]
    fn test_naked_struct() {
        let s = single_struct("struct inner @naked { u32 x; }");
        assert!(s.is_naked);
    }

    #[test]
    fn test_short_string_sugar() {
        let s = single_struct("struct a { short_string name; }");
        assert_eq!(s.fields[0].ty, RawType::Primitive(Primitive::String));
        assert_eq!(s.fields[0].upper_bound, Some(16));
    }

    #[test]
    fn test_array_forms() {
        let s = single_struct("struct a { u8 x[]; u8 y[4]; u8 z[8] @compact; }");
        assert_eq!(s.fields[0].array, Some(ArrayKind::Dynamic));
        assert_eq!(s.fields[1].array, Some(ArrayKind::Fixed(4)));
        assert_eq!(s.fields[2].array, Some(ArrayKind::Bounded(8)));
    }

    #[test]
    fn test_array_length_folding() {
        let s = single_struct("struct a { u8 x[2 * (3 + 1)]; u8 y[10 - 8 / 2]; }");
        assert_eq!(s.fields[0].array, Some(ArrayKind::Fixed(8)));
        assert_eq!(s.fields[1].array, Some(ArrayKind::Fixed(6)));
    }

    #[test]
    fn test_zero_array_length_rejected() {
        let err = parse_declarations("struct a { u8 x[0]; }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_field_defaults() {
        let s = single_struct(
            r#"struct a { u32 n = 7; f64 x = -1.5; bool b = true; string s = "hi"; u8 v[] = {1, 2, 3}; }"#,
        );
        assert_eq!(s.fields[0].default, Some(Literal::Int(7)));
        assert_eq!(s.fields[1].default, Some(Literal::Float(-1.5)));
        assert_eq!(s.fields[2].default, Some(Literal::Bool(true)));
        assert_eq!(s.fields[3].default, Some(Literal::Str("hi".to_owned())));
        assert_eq!(
            s.fields[4].default,
            Some(Literal::Seq(vec![
                Literal::Int(1),
                Literal::Int(2),
                Literal::Int(3)
            ]))
        );
    }

    #[test]
    fn test_enum_members() {
        let decls = parse_ok("enum E { A, B = 10, C, }");
        match &decls[0] {
            Declaration::Enum(e) => {
                assert!(!e.is_class);
                assert_eq!(e.members.len(), 3);
                assert_eq!(e.members[0].value, None);
                assert_eq!(e.members[1].value, Some(10));
                assert_eq!(e.members[2].value, None);
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_class_flag() {
        let decls = parse_ok("enum class E { A }");
        match &decls[0] {
            Declaration::Enum(e) => assert!(e.is_class),
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_const_declaration() {
        let decls = parse_ok("const u32 MAX_NODES = 64;");
        match &decls[0] {
            Declaration::Const(c) => {
                assert_eq!(c.ty, Primitive::UInt32);
                assert_eq!(c.name, "MAX_NODES");
                assert_eq!(c.value, Literal::Int(64));
            }
            other => panic!("expected const, got {:?}", other),
        }
    }

    #[test]
    fn test_namespace_with_members() {
        let decls = parse_ok("namespace msg { struct a { bool b; } enum E { X } }");
        match &decls[0] {
            Declaration::Namespace(ns) => {
                assert_eq!(ns.name, "msg");
                assert_eq!(ns.body.len(), 2);
            }
            other => panic!("expected namespace, got {:?}", other),
        }
    }

    #[test]
    fn test_qualified_type_reference() {
        let s = single_struct("struct a { messages::pose p; }");
        assert_eq!(s.fields[0].ty, RawType::Named("messages::pose".to_owned()));
    }

    #[test]
    fn test_enum_default_by_name() {
        let s = single_struct("struct a { E mode = B; }");
        assert_eq!(s.fields[0].ty, RawType::Named("E".to_owned()));
        assert_eq!(s.fields[0].default, Some(Literal::Ident("B".to_owned())));
    }

    #[test]
    fn test_empty_input() {
        let err = parse_declarations("   \n  ").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::EmptyInput);
    }

    #[test]
    fn test_reserved_name_rejected() {
        let err = parse_declarations("struct u32 { bool b; }").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);
        assert!(err.message.contains("reserved"));
    }

    #[test]
    fn test_error_carries_line() {
        let err = parse_declarations("struct a {\n bool b\n}").unwrap_err();
        // Missing semicolon is noticed at the closing brace on line 3.
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_unterminated_struct() {
        let err = parse_declarations("struct a { bool b;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }
}
