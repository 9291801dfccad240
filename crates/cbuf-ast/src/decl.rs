//! Raw declarations as produced by the parser.
//!
//! These mirror the concrete syntax one-to-one and carry byte spans for
//! diagnostics. The analyzer consumes them in source order and emits the
//! flat [`TypeDef`](crate::TypeDef) list.

use serde::{Deserialize, Serialize};

use crate::schema::{ArrayKind, Literal, Primitive};
use crate::Span;

/// One top-level (or namespace-level) declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Namespace(NamespaceDecl),
    Const(ConstDecl),
    Enum(EnumDecl),
    Struct(StructDecl),
}

/// `namespace IDENT { … }`.
///
/// The parser admits nested namespaces structurally; the analyzer rejects
/// any nesting beyond depth one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub body: Vec<Declaration>,
    pub span: Span,
}

/// `const TYPE IDENT = VALUE;` — compile-time only, never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub ty: Primitive,
    /// `Some(16)` when the constant was declared `short_string`.
    pub upper_bound: Option<u32>,
    pub name: String,
    pub value: Literal,
    pub span: Span,
}

/// `enum [class] IDENT { … }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub is_class: bool,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

/// One enum member; `value` is `None` when the source omitted `= N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<i64>,
    pub span: Span,
}

/// `struct IDENT [@naked] { field; … }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub is_naked: bool,
    pub fields: Vec<RawField>,
    pub span: Span,
}

/// Field type before analysis: a resolved primitive spelling, or a name
/// that will later resolve to a struct or an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawType {
    Primitive(Primitive),
    Named(String),
}

/// One struct field as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub ty: RawType,
    pub array: Option<ArrayKind>,
    /// `Some(16)` when declared `short_string`.
    pub upper_bound: Option<u32>,
    pub default: Option<Literal>,
    pub span: Span,
}
