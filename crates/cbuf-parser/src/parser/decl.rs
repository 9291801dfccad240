//! Declaration parsers (keyword-dispatched).

use cbuf_ast::decl::{
    ConstDecl, Declaration, EnumDecl, EnumMember, NamespaceDecl, RawField, RawType, StructDecl,
};
use cbuf_ast::schema::{ArrayKind, Literal, Primitive};
use cbuf_lexer::Token;

use super::{ParseError, TokenStream};

/// Parse all declarations from a token stream.
///
/// Fails fast: the first error aborts the parse.
pub fn parse_declarations(stream: &mut TokenStream) -> Result<Vec<Declaration>, ParseError> {
    let mut declarations = Vec::new();

    while !stream.at_end() {
        declarations.push(parse_declaration(stream)?);
    }

    if declarations.is_empty() {
        return Err(ParseError::empty_input());
    }

    Ok(declarations)
}

/// Parse a single declaration (keyword-dispatched).
fn parse_declaration(stream: &mut TokenStream) -> Result<Declaration, ParseError> {
    match stream.peek() {
        Some(Token::Namespace) => parse_namespace(stream),
        Some(Token::Const) => parse_const(stream),
        Some(Token::Enum) => parse_enum(stream),
        Some(Token::Struct) => parse_struct(stream),
        other => Err(ParseError::unexpected_token(
            other,
            "at declaration",
            stream.current_span(),
        )),
    }
}

// ============================================================================
// Declarations
// ============================================================================

fn parse_namespace(stream: &mut TokenStream) -> Result<Declaration, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Namespace)?;
    let name = expect_declared_ident(stream, "namespace name")?;
    stream.expect(Token::LBrace)?;

    // Nested namespaces parse fine here; the analyzer rejects them. This
    // keeps grammar and scoping rules in their own stages.
    let mut body = Vec::new();
    while !stream.check(&Token::RBrace) {
        if stream.at_end() {
            return Err(ParseError::unexpected_token(
                None,
                "inside namespace body",
                stream.current_span(),
            ));
        }
        body.push(parse_declaration(stream)?);
    }
    stream.expect(Token::RBrace)?;

    Ok(Declaration::Namespace(NamespaceDecl {
        name,
        body,
        span: stream.span_from(start),
    }))
}

fn parse_const(stream: &mut TokenStream) -> Result<Declaration, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Const)?;

    let (ty, upper_bound) = match parse_type(stream)? {
        (RawType::Primitive(p), ub) => (p, ub),
        (RawType::Named(name), _) => {
            return Err(ParseError::invalid_syntax(
                format!("constant type must be a primitive, found '{}'", name),
                stream.current_span(),
            ));
        }
    };
    let name = expect_declared_ident(stream, "constant name")?;
    stream.expect(Token::Eq)?;
    let value = parse_rhs(stream)?;
    stream.expect(Token::Semicolon)?;

    Ok(Declaration::Const(ConstDecl {
        ty,
        upper_bound,
        name,
        value,
        span: stream.span_from(start),
    }))
}

fn parse_enum(stream: &mut TokenStream) -> Result<Declaration, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Enum)?;
    let is_class = stream.eat(&Token::Class);
    let name = expect_declared_ident(stream, "enum name")?;
    stream.expect(Token::LBrace)?;

    let mut members = Vec::new();
    while !stream.check(&Token::RBrace) {
        let member_start = stream.current_pos();
        let member_name = expect_declared_ident(stream, "enum member name")?;

        let value = if stream.eat(&Token::Eq) {
            Some(parse_integer(stream, "enum member value")?)
        } else {
            None
        };

        members.push(EnumMember {
            name: member_name,
            value,
            span: stream.span_from(member_start),
        });

        // Members are comma-separated; a trailing comma is allowed.
        if !stream.eat(&Token::Comma) && !stream.check(&Token::RBrace) {
            return Err(ParseError::expected_token(
                &Token::Comma,
                stream.peek(),
                stream.current_span(),
            ));
        }
    }
    stream.expect(Token::RBrace)?;

    Ok(Declaration::Enum(EnumDecl {
        name,
        is_class,
        members,
        span: stream.span_from(start),
    }))
}

fn parse_struct(stream: &mut TokenStream) -> Result<Declaration, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Struct)?;
    let name = expect_declared_ident(stream, "struct name")?;
    let is_naked = stream.eat(&Token::Naked);
    stream.expect(Token::LBrace)?;

    let mut fields = Vec::new();
    while !stream.check(&Token::RBrace) {
        if stream.at_end() {
            return Err(ParseError::unexpected_token(
                None,
                "inside struct body",
                stream.current_span(),
            ));
        }
        fields.push(parse_field(stream)?);
    }
    stream.expect(Token::RBrace)?;

    Ok(Declaration::Struct(StructDecl {
        name,
        is_naked,
        fields,
        span: stream.span_from(start),
    }))
}

// ============================================================================
// Fields
// ============================================================================

fn parse_field(stream: &mut TokenStream) -> Result<RawField, ParseError> {
    let start = stream.current_pos();
    let (ty, upper_bound) = parse_type(stream)?;
    let name = expect_declared_ident(stream, "field name")?;

    let array = if stream.eat(&Token::LBracket) {
        if stream.eat(&Token::RBracket) {
            Some(ArrayKind::Dynamic)
        } else {
            let len = parse_array_length(stream)?;
            stream.expect(Token::RBracket)?;
            if stream.eat(&Token::Compact) {
                Some(ArrayKind::Bounded(len))
            } else {
                Some(ArrayKind::Fixed(len))
            }
        }
    } else {
        None
    };

    let default = if stream.eat(&Token::Eq) {
        Some(parse_rhs(stream)?)
    } else {
        None
    };

    stream.expect(Token::Semicolon)?;

    Ok(RawField {
        name,
        ty,
        array,
        upper_bound,
        default,
        span: stream.span_from(start),
    })
}

/// Parse a type: a primitive spelling, `short_string`, or a (possibly
/// `::`-qualified) complex type name.
fn parse_type(stream: &mut TokenStream) -> Result<(RawType, Option<u32>), ParseError> {
    let mut segments = vec![expect_ident(stream, "type name")?];
    while stream.eat(&Token::PathSep) {
        segments.push(expect_ident(stream, "type name segment")?);
    }

    if segments.len() == 1 {
        let name = &segments[0];
        if name == "short_string" {
            return Ok((RawType::Primitive(Primitive::String), Some(16)));
        }
        if let Some(prim) = Primitive::from_spelling(name) {
            return Ok((RawType::Primitive(prim), None));
        }
        return Ok((RawType::Named(segments.pop().unwrap_or_default()), None));
    }

    Ok((RawType::Named(segments.join("::")), None))
}

// ============================================================================
// Literals and expressions
// ============================================================================

/// Parse a right-hand side: a scalar literal, an identifier (enum member
/// reference), or a `{…}` sequence of scalars.
fn parse_rhs(stream: &mut TokenStream) -> Result<Literal, ParseError> {
    if stream.eat(&Token::LBrace) {
        let mut items = Vec::new();
        while !stream.check(&Token::RBrace) {
            items.push(parse_scalar(stream)?);
            if !stream.eat(&Token::Comma) && !stream.check(&Token::RBrace) {
                return Err(ParseError::expected_token(
                    &Token::Comma,
                    stream.peek(),
                    stream.current_span(),
                ));
            }
        }
        stream.expect(Token::RBrace)?;
        return Ok(Literal::Seq(items));
    }
    parse_scalar(stream)
}

fn parse_scalar(stream: &mut TokenStream) -> Result<Literal, ParseError> {
    let span = stream.current_span();
    if stream.eat(&Token::Minus) {
        return match stream.advance() {
            Some(Token::Integer(n)) => Ok(Literal::Int(-n)),
            Some(Token::Float(x)) => Ok(Literal::Float(-x)),
            other => {
                let msg = format!("expected number after '-', found {:?}", other);
                Err(ParseError::invalid_syntax(msg, span))
            }
        };
    }

    match stream.advance() {
        Some(Token::Integer(n)) => Ok(Literal::Int(*n)),
        Some(Token::Float(x)) => Ok(Literal::Float(*x)),
        Some(Token::True) => Ok(Literal::Bool(true)),
        Some(Token::False) => Ok(Literal::Bool(false)),
        Some(Token::String(s)) => Ok(Literal::Str(s.clone())),
        Some(Token::Ident(name)) => Ok(Literal::Ident(name.clone())),
        other => Err(ParseError::unexpected_token(other, "in value", span)),
    }
}

/// Parse a signed integer literal.
fn parse_integer(stream: &mut TokenStream, context: &str) -> Result<i64, ParseError> {
    let span = stream.current_span();
    let negate = stream.eat(&Token::Minus);
    match stream.advance() {
        Some(Token::Integer(n)) => Ok(if negate { -n } else { *n }),
        other => {
            let msg = format!("expected integer for {}, found {:?}", context, other);
            Err(ParseError::invalid_syntax(msg, span))
        }
    }
}

/// Parse and constant-fold an array length expression: `+ - * /` with
/// parentheses over integer literals. The result must be positive and fit
/// in u32.
fn parse_array_length(stream: &mut TokenStream) -> Result<u32, ParseError> {
    let span = stream.current_span();
    let value = parse_additive(stream)?;
    if value <= 0 || value > i64::from(u32::MAX) {
        return Err(ParseError::invalid_syntax(
            format!("array length must be a positive 32-bit value, got {}", value),
            span,
        ));
    }
    Ok(value as u32)
}

fn parse_additive(stream: &mut TokenStream) -> Result<i64, ParseError> {
    let mut acc = parse_multiplicative(stream)?;
    loop {
        if stream.eat(&Token::Plus) {
            acc += parse_multiplicative(stream)?;
        } else if stream.eat(&Token::Minus) {
            acc -= parse_multiplicative(stream)?;
        } else {
            return Ok(acc);
        }
    }
}

fn parse_multiplicative(stream: &mut TokenStream) -> Result<i64, ParseError> {
    let mut acc = parse_factor(stream)?;
    loop {
        if stream.eat(&Token::Star) {
            acc *= parse_factor(stream)?;
        } else if stream.eat(&Token::Slash) {
            let span = stream.current_span();
            let rhs = parse_factor(stream)?;
            if rhs == 0 {
                return Err(ParseError::invalid_syntax(
                    "division by zero in array length",
                    span,
                ));
            }
            acc /= rhs;
        } else {
            return Ok(acc);
        }
    }
}

fn parse_factor(stream: &mut TokenStream) -> Result<i64, ParseError> {
    let span = stream.current_span();
    if stream.eat(&Token::LParen) {
        let value = parse_additive(stream)?;
        stream.expect(Token::RParen)?;
        return Ok(value);
    }
    if stream.eat(&Token::Minus) {
        return Ok(-parse_factor(stream)?);
    }
    match stream.advance() {
        Some(Token::Integer(n)) => Ok(*n),
        other => Err(ParseError::unexpected_token(
            other,
            "in array length expression",
            span,
        )),
    }
}

// ============================================================================
// Identifier helpers
// ============================================================================

/// Consume an identifier token.
fn expect_ident(stream: &mut TokenStream, context: &str) -> Result<String, ParseError> {
    let span = stream.current_span();
    match stream.advance() {
        Some(Token::Ident(name)) => Ok(name.clone()),
        other => Err(ParseError::unexpected_token(other, context, span)),
    }
}

/// Consume an identifier that names a new declaration; type spellings are
/// reserved and rejected here.
fn expect_declared_ident(stream: &mut TokenStream, context: &str) -> Result<String, ParseError> {
    let span = stream.current_span();
    let name = expect_ident(stream, context)?;
    if Primitive::is_type_spelling(&name) {
        return Err(ParseError::invalid_syntax(
            format!("'{}' is a reserved type name and cannot be used as {}", name, context),
            span,
        ));
    }
    Ok(name)
}
