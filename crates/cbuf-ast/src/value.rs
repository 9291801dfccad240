//! Runtime message values.
//!
//! A decoded message is a map from field name to [`FieldValue`], a tagged
//! sum over every kind of value the wire format can carry. The codec
//! dispatches on the schema's type tag, not on the value variant, and
//! coerces tolerantly on encode (a `Bool` is accepted where a numeric tag
//! expects 0/1, any numeric variant feeds any numeric tag).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name → value, in declaration order.
pub type MessageFields = IndexMap<String, FieldValue>;

/// One value in a message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    ArrayBool(Vec<bool>),
    ArrayI8(Vec<i8>),
    ArrayU8(Vec<u8>),
    ArrayI16(Vec<i16>),
    ArrayU16(Vec<u16>),
    ArrayI32(Vec<i32>),
    ArrayU32(Vec<u32>),
    ArrayI64(Vec<i64>),
    ArrayU64(Vec<u64>),
    ArrayF32(Vec<f32>),
    ArrayF64(Vec<f64>),
    ArrayStr(Vec<String>),
    Struct(MessageFields),
    ArrayStruct(Vec<MessageFields>),
}

impl FieldValue {
    /// Short variant name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::U8(_) => "u8",
            Self::I16(_) => "i16",
            Self::U16(_) => "u16",
            Self::I32(_) => "i32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::ArrayBool(_) => "bool[]",
            Self::ArrayI8(_) => "i8[]",
            Self::ArrayU8(_) => "u8[]",
            Self::ArrayI16(_) => "i16[]",
            Self::ArrayU16(_) => "u16[]",
            Self::ArrayI32(_) => "i32[]",
            Self::ArrayU32(_) => "u32[]",
            Self::ArrayI64(_) => "i64[]",
            Self::ArrayU64(_) => "u64[]",
            Self::ArrayF32(_) => "f32[]",
            Self::ArrayF64(_) => "f64[]",
            Self::ArrayStr(_) => "string[]",
            Self::Struct(_) => "struct",
            Self::ArrayStruct(_) => "struct[]",
        }
    }
}

/// A framed message: preamble fields plus the decoded payload.
///
/// Deserialization fills every field. Serialization only reads
/// `type_name`, `timestamp`, and `message`; `size`, `variant`, and `hash`
/// are derived from the schema and written fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Fully qualified struct name, e.g. `messages::pose`.
    pub type_name: String,
    /// Total framed size in bytes (preamble + payload).
    pub size: usize,
    /// 4-bit publisher discriminator from the size word; 0 on serialize.
    pub variant: u8,
    /// The struct's 64-bit hash from the preamble.
    pub hash: u64,
    /// Seconds since epoch.
    pub timestamp: f64,
    pub message: MessageFields,
}

impl MessageRecord {
    /// A record ready for serialization; `size`, `variant`, and `hash` are
    /// left zero and derived when the message is encoded.
    pub fn new(type_name: impl Into<String>, timestamp: f64, message: MessageFields) -> Self {
        Self {
            type_name: type_name.into(),
            size: 0,
            variant: 0,
            hash: 0,
            timestamp,
            message,
        }
    }
}
