//! Semantic analysis diagnostics.
//!
//! # Design
//!
//! - `CompileError` — single diagnostic with an optional source span
//! - `ErrorKind` — categorizes errors; discriminants index the name table
//!
//! Analysis fails fast, so a failing call produces exactly one error.

use cbuf_ast::Span;
use std::fmt;

/// Semantic error with category and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this error
    pub kind: ErrorKind,
    /// Source location, when the failing construct still has one.
    /// Hash-time errors (unresolved or cyclic types) have none.
    pub span: Option<Span>,
    /// Human-readable error message
    pub message: String,
}

/// Category of semantic error.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// A namespace block inside another namespace block
    NestedNamespace = 0,
    /// Two entities share a qualified name
    DuplicateEntity = 1,
    /// A complex type reference that resolves to nothing
    UnknownType = 2,
    /// A named default that is not a member of the referenced enum
    UnknownEnumValue = 3,
    /// A default value on a struct-typed field
    ComplexDefaultForbidden = 4,
    /// A default value whose type does not match the field
    InvalidDefaultValue = 5,
    /// A schema with no struct entities at all
    NoStructs = 6,
    /// A cycle in the struct reference graph
    CyclicSchema = 7,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "nested namespace",          // 0: NestedNamespace
    "duplicate entity",          // 1: DuplicateEntity
    "unknown type",              // 2: UnknownType
    "unknown enum value",        // 3: UnknownEnumValue
    "complex default forbidden", // 4: ComplexDefaultForbidden
    "invalid default value",     // 5: InvalidDefaultValue
    "no structs",                // 6: NoStructs
    "cyclic schema",             // 7: CyclicSchema
];

impl CompileError {
    /// Creates a new diagnostic with a source span.
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: Some(span),
            message: message.into(),
        }
    }

    /// Creates a diagnostic with no source location (hash-time errors).
    pub fn spanless(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: None,
            message: message.into(),
        }
    }
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for CompileError {}
