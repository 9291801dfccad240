//! Analyzed schema entities.
//!
//! A parsed and analyzed schema is a flat list of [`TypeDef`]s (structs and
//! enums). Struct fields are [`FieldDef`]s whose complex type references are
//! fully qualified `a::b::c` names; enum references have already been
//! rewritten to `uint32` by the analyzer, so they never appear here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of primitive wire types.
///
/// Every accepted spelling (see [`Primitive::from_spelling`]) maps to one of
/// these canonical tags. `short_string` is not a tag of its own: it is
/// `String` with an upper bound of 16 on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
}

impl Primitive {
    /// Map a source spelling to its canonical tag.
    ///
    /// Returns `None` for `short_string` (sugar handled by the parser) and
    /// for anything that is not a primitive spelling.
    pub fn from_spelling(s: &str) -> Option<Self> {
        let tag = match s {
            "bool" => Self::Bool,
            "s8" | "int8" | "int8_t" => Self::Int8,
            "u8" | "uint8" | "uint8_t" => Self::UInt8,
            "s16" | "int16" | "int16_t" => Self::Int16,
            "u16" | "uint16" | "uint16_t" => Self::UInt16,
            "s32" | "int32" | "int32_t" | "int" => Self::Int32,
            "u32" | "uint32" | "uint32_t" => Self::UInt32,
            "s64" | "int64" | "int64_t" => Self::Int64,
            "u64" | "uint64" | "uint64_t" => Self::UInt64,
            "f32" | "float32" | "float" => Self::Float32,
            "f64" | "float64" | "double" => Self::Float64,
            "string" => Self::String,
            _ => return None,
        };
        Some(tag)
    }

    /// True if `s` spells a primitive type or the `short_string` sugar.
    ///
    /// These spellings are reserved and may not be used as identifiers.
    pub fn is_type_spelling(s: &str) -> bool {
        s == "short_string" || Self::from_spelling(s).is_some()
    }

    /// The C spelling used in the canonical hash text.
    pub fn c_spelling(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8_t",
            Self::UInt8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::UInt16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::UInt32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::UInt64 => "uint64_t",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::String => "std::string",
        }
    }

    /// Encoded size in bytes for fixed-width tags; `None` for `String`.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::String => None,
        }
    }

}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        };
        write!(f, "{}", tag)
    }
}

/// Array shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayKind {
    /// `[N]` — exactly N elements on the wire, no count prefix.
    Fixed(u32),
    /// `[N] @compact` — count prefix, at most N elements.
    Bounded(u32),
    /// `[]` — count prefix, unbounded.
    Dynamic,
}

/// Element type of a field: a primitive tag or a struct reference.
///
/// After analysis a `Complex` name is fully qualified and always refers to a
/// struct; enum references have been rewritten to `Primitive(UInt32)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Primitive(Primitive),
    Complex(String),
}

/// A literal value from the schema source.
///
/// `Ident` only survives until analysis: it names an enum member and is
/// replaced by its integer value, or rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Seq(Vec<Literal>),
}

/// One field of a struct, or one member of an enum.
///
/// Enum members are modeled as pseudo-fields: `kind` is `uint32`, and
/// `constant` carries the member's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub array: Option<ArrayKind>,
    /// Fixed-width bound for strings only; `short_string` sets 16.
    pub upper_bound: Option<u32>,
    pub default: Option<Literal>,
    /// Enum member value; `Some` iff this pseudo-field belongs to an enum.
    pub constant: Option<i64>,
}

impl FieldDef {
    /// A plain scalar or array field of primitive type `prim`.
    pub fn primitive(name: impl Into<String>, prim: Primitive) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Primitive(prim),
            array: None,
            upper_bound: None,
            default: None,
            constant: None,
        }
    }

    /// A field referencing the struct `type_name` (fully qualified).
    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Complex(type_name.into()),
            array: None,
            upper_bound: None,
            default: None,
            constant: None,
        }
    }
}

/// An analyzed schema entity: a struct or an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Unqualified name as written in the source.
    pub name: String,
    /// `ns1::ns2::Name`, the key used in schema maps.
    pub qualified_name: String,
    /// Enclosing namespaces, outermost first.
    pub namespaces: Vec<String>,
    pub fields: Vec<FieldDef>,
    /// djb2-64 of the canonical text; 0 for enums.
    pub hash: u64,
    pub is_enum: bool,
    pub is_enum_class: bool,
    pub is_naked: bool,
}

impl TypeDef {
    /// A bare struct entity with no fields and hash 0 (filled by the hasher).
    pub fn new_struct(name: impl Into<String>, namespaces: Vec<String>) -> Self {
        let name = name.into();
        let qualified_name = qualify(&namespaces, &name);
        Self {
            name,
            qualified_name,
            namespaces,
            fields: Vec::new(),
            hash: 0,
            is_enum: false,
            is_enum_class: false,
            is_naked: false,
        }
    }
}

/// Join namespaces and a name with `::`.
pub fn qualify(namespaces: &[String], name: &str) -> String {
    if namespaces.is_empty() {
        name.to_owned()
    } else {
        let mut out = namespaces.join("::");
        out.push_str("::");
        out.push_str(name);
        out
    }
}
