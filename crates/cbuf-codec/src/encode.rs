//! Message serialization.
//!
//! The encoder walks the field list in declaration order, little-endian
//! throughout. It allocates exactly [`serialized_message_size`] bytes up
//! front and asserts it filled them all; the size walk and the write walk
//! share their resolution helpers so they cannot drift apart silently.

use tracing::debug;

use cbuf_ast::schema::{ArrayKind, FieldDef, FieldKind, Primitive, TypeDef};
use cbuf_ast::{FieldValue, MessageFields, MessageRecord};
use cbuf_resolve::SchemaByName;

use crate::error::{CodecError, Result};
use crate::frame::{pack_size, HEADER_SIZE, MAGIC};
use crate::metadata::lookup_message_type;
use crate::scalar::{scalar_zero, Scalar};
use crate::size::{
    clamped, naked_size, resolve_array, resolve_scalar, resolve_struct, serialized_message_size,
    struct_items,
};

/// Serialize `msg` into a framed byte vector.
///
/// Only `type_name`, `timestamp`, and `message` are read; the size word is
/// derived (variant 0) and the hash comes from the schema. Missing fields
/// fall back to declared defaults, then to zeros.
pub fn serialize_message(map: &SchemaByName, msg: &MessageRecord) -> Result<Vec<u8>> {
    let def = lookup_message_type(map, &msg.type_name)?;
    if def.is_naked {
        return Err(CodecError::unsupported(
            &msg.type_name,
            "naked struct cannot be a top-level message",
        ));
    }

    let total = serialized_message_size(map, msg)?;
    let mut buf = Vec::with_capacity(total);
    write_preamble(&mut buf, total, def.hash, msg.timestamp);
    encode_fields(&mut buf, map, def, &msg.message)?;

    assert_eq!(
        buf.len(),
        total,
        "BUG: serializer wrote {} bytes into a {}-byte frame of '{}'",
        buf.len(),
        total,
        def.qualified_name
    );
    debug!(
        type_name = %def.qualified_name,
        bytes = buf.len(),
        "serialized message"
    );
    Ok(buf)
}

fn write_preamble(buf: &mut Vec<u8>, total: usize, hash: u64, timestamp: f64) {
    buf.extend_from_slice(&MAGIC.to_le_bytes());
    buf.extend_from_slice(&pack_size(total).to_le_bytes());
    buf.extend_from_slice(&hash.to_le_bytes());
    buf.extend_from_slice(&timestamp.to_le_bytes());
}

fn encode_fields(
    buf: &mut Vec<u8>,
    map: &SchemaByName,
    def: &TypeDef,
    fields: &MessageFields,
) -> Result<()> {
    for field in &def.fields {
        encode_field(buf, map, def, field, fields.get(&field.name))?;
    }
    Ok(())
}

fn encode_field(
    buf: &mut Vec<u8>,
    map: &SchemaByName,
    def: &TypeDef,
    field: &FieldDef,
    value: Option<&FieldValue>,
) -> Result<()> {
    match (&field.kind, field.array) {
        (FieldKind::Primitive(prim), None) => {
            let scalar = resolve_scalar(field, value, *prim)?;
            write_scalar(buf, *prim, field.upper_bound, scalar, &field.name)
        }
        (FieldKind::Primitive(prim), Some(kind)) => {
            let elems = resolve_array(field, value)?;
            match kind {
                ArrayKind::Fixed(n) => {
                    // Exactly n elements, zero-padded, no count prefix.
                    for idx in 0..n as usize {
                        let scalar = elems
                            .get(idx)
                            .copied()
                            .unwrap_or_else(|| scalar_zero(*prim));
                        write_scalar(buf, *prim, field.upper_bound, scalar, &field.name)?;
                    }
                }
                ArrayKind::Dynamic | ArrayKind::Bounded(_) => {
                    let elems = clamped(&elems, kind);
                    buf.extend_from_slice(&(elems.len() as u32).to_le_bytes());
                    for scalar in elems {
                        write_scalar(buf, *prim, field.upper_bound, *scalar, &field.name)?;
                    }
                }
            }
            Ok(())
        }
        (FieldKind::Complex(type_name), None) => {
            let child = resolve_struct(map, def, type_name)?;
            match value {
                Some(FieldValue::Struct(nested)) => encode_nested(buf, map, child, nested),
                None => encode_nested(buf, map, child, &MessageFields::new()),
                Some(other) => Err(CodecError::unsupported(
                    &field.name,
                    format!("{} where struct expected", other.kind_name()),
                )),
            }
        }
        (FieldKind::Complex(type_name), Some(kind)) => {
            let child = resolve_struct(map, def, type_name)?;
            let items = struct_items(value, &field.name)?;
            match kind {
                ArrayKind::Fixed(n) => {
                    let empty = MessageFields::new();
                    for idx in 0..n as usize {
                        encode_nested(buf, map, child, items.get(idx).unwrap_or(&empty))?;
                    }
                }
                ArrayKind::Dynamic | ArrayKind::Bounded(_) => {
                    let items = clamped(items, kind);
                    buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
                    for item in items {
                        encode_nested(buf, map, child, item)?;
                    }
                }
            }
            Ok(())
        }
    }
}

/// Encode one nested struct value.
///
/// Naked structs contribute payload only. Non-naked nested structs get a
/// full preamble in place, with their own hash and timestamp 0.
fn encode_nested(
    buf: &mut Vec<u8>,
    map: &SchemaByName,
    child: &TypeDef,
    fields: &MessageFields,
) -> Result<()> {
    if !child.is_naked {
        let total = HEADER_SIZE + naked_size(map, child, fields)?;
        write_preamble(buf, total, child.hash, 0.0);
    }
    encode_fields(buf, map, child, fields)
}

fn write_scalar(
    buf: &mut Vec<u8>,
    prim: Primitive,
    upper_bound: Option<u32>,
    scalar: Scalar<'_>,
    field: &str,
) -> Result<()> {
    match prim {
        Primitive::Bool => buf.push(u8::from(scalar.to_bool(field)?)),
        Primitive::Int8 => buf.extend_from_slice(&(scalar.to_i64(field)? as i8).to_le_bytes()),
        Primitive::UInt8 => buf.extend_from_slice(&(scalar.to_u64(field)? as u8).to_le_bytes()),
        Primitive::Int16 => buf.extend_from_slice(&(scalar.to_i64(field)? as i16).to_le_bytes()),
        Primitive::UInt16 => buf.extend_from_slice(&(scalar.to_u64(field)? as u16).to_le_bytes()),
        Primitive::Int32 => buf.extend_from_slice(&(scalar.to_i64(field)? as i32).to_le_bytes()),
        Primitive::UInt32 => buf.extend_from_slice(&(scalar.to_u64(field)? as u32).to_le_bytes()),
        Primitive::Int64 => buf.extend_from_slice(&scalar.to_i64(field)?.to_le_bytes()),
        Primitive::UInt64 => buf.extend_from_slice(&scalar.to_u64(field)?.to_le_bytes()),
        Primitive::Float32 => {
            buf.extend_from_slice(&(scalar.to_f64(field)? as f32).to_le_bytes());
        }
        Primitive::Float64 => buf.extend_from_slice(&scalar.to_f64(field)?.to_le_bytes()),
        Primitive::String => {
            let s = scalar.as_str(field)?;
            match upper_bound {
                Some(bound) => {
                    // Exactly `bound` bytes: truncate long input, null-pad
                    // the tail.
                    let bound = bound as usize;
                    let bytes = s.as_bytes();
                    let take = bytes.len().min(bound);
                    buf.extend_from_slice(&bytes[..take]);
                    buf.resize(buf.len() + (bound - take), 0);
                }
                None => {
                    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                    buf.extend_from_slice(s.as_bytes());
                }
            }
        }
    }
    Ok(())
}
