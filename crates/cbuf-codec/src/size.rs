//! Serialized size calculation.
//!
//! [`naked_size`] walks a struct's field list with exactly the rules the
//! encoder applies — same default resolution, same padding and clamping —
//! but counts bytes instead of writing them. The encoder allocates from
//! this number and asserts it filled every byte, so the two walks must
//! never disagree.

use std::sync::Arc;

use cbuf_ast::schema::{ArrayKind, FieldDef, FieldKind, Primitive, TypeDef};
use cbuf_ast::{FieldValue, MessageFields, MessageRecord};
use cbuf_resolve::{resolve_name, SchemaByName};

use crate::error::{CodecError, Result};
use crate::frame::HEADER_SIZE;
use crate::metadata::lookup_message_type;
use crate::scalar::{
    array_scalars, literal_seq, scalar_from_literal, scalar_from_value, scalar_zero, Scalar,
};

/// Total framed size of `msg`: preamble plus payload.
pub fn serialized_message_size(map: &SchemaByName, msg: &MessageRecord) -> Result<usize> {
    let def = lookup_message_type(map, &msg.type_name)?;
    Ok(HEADER_SIZE + naked_size(map, def, &msg.message)?)
}

/// Payload-only size of `fields` against `def`.
pub fn naked_size(map: &SchemaByName, def: &TypeDef, fields: &MessageFields) -> Result<usize> {
    let mut total = 0;
    for field in &def.fields {
        total += field_size(map, def, field, fields.get(&field.name))?;
    }
    Ok(total)
}

fn field_size(
    map: &SchemaByName,
    def: &TypeDef,
    field: &FieldDef,
    value: Option<&FieldValue>,
) -> Result<usize> {
    match (&field.kind, field.array) {
        (FieldKind::Primitive(prim), None) => {
            let scalar = resolve_scalar(field, value, *prim)?;
            scalar_size(*prim, field.upper_bound, scalar, &field.name)
        }
        (FieldKind::Primitive(prim), Some(kind)) => {
            let elems = resolve_array(field, value)?;
            let mut total = 0;
            match kind {
                ArrayKind::Fixed(n) => {
                    for idx in 0..n as usize {
                        let scalar = elems
                            .get(idx)
                            .copied()
                            .unwrap_or_else(|| scalar_zero(*prim));
                        total += scalar_size(*prim, field.upper_bound, scalar, &field.name)?;
                    }
                }
                ArrayKind::Dynamic | ArrayKind::Bounded(_) => {
                    total += 4;
                    for scalar in clamped(&elems, kind) {
                        total += scalar_size(*prim, field.upper_bound, *scalar, &field.name)?;
                    }
                }
            }
            Ok(total)
        }
        (FieldKind::Complex(type_name), None) => {
            let child = resolve_struct(map, def, type_name)?;
            match value {
                Some(FieldValue::Struct(nested)) => nested_size(map, child, nested),
                None => nested_size(map, child, &MessageFields::new()),
                Some(other) => Err(CodecError::unsupported(
                    &field.name,
                    format!("{} where struct expected", other.kind_name()),
                )),
            }
        }
        (FieldKind::Complex(type_name), Some(kind)) => {
            let child = resolve_struct(map, def, type_name)?;
            let items = struct_items(value, &field.name)?;
            let mut total = 0;
            match kind {
                ArrayKind::Fixed(n) => {
                    let empty = MessageFields::new();
                    for idx in 0..n as usize {
                        total += nested_size(map, child, items.get(idx).unwrap_or(&empty))?;
                    }
                }
                ArrayKind::Dynamic | ArrayKind::Bounded(_) => {
                    total += 4;
                    for item in clamped(items, kind) {
                        total += nested_size(map, child, item)?;
                    }
                }
            }
            Ok(total)
        }
    }
}

/// Framed size of one nested value: naked structs contribute payload only.
fn nested_size(map: &SchemaByName, child: &TypeDef, fields: &MessageFields) -> Result<usize> {
    let payload = naked_size(map, child, fields)?;
    Ok(if child.is_naked {
        payload
    } else {
        HEADER_SIZE + payload
    })
}

fn scalar_size(
    prim: Primitive,
    upper_bound: Option<u32>,
    scalar: Scalar<'_>,
    field: &str,
) -> Result<usize> {
    if let Some(size) = prim.fixed_size() {
        return Ok(size);
    }
    match upper_bound {
        Some(bound) => Ok(bound as usize),
        None => Ok(4 + scalar.as_str(field)?.len()),
    }
}

// ============================================================================
// Shared resolution helpers (used by the encoder as well)
// ============================================================================

/// Caller value → declared default → type zero.
pub(crate) fn resolve_scalar<'a>(
    field: &'a FieldDef,
    value: Option<&'a FieldValue>,
    prim: Primitive,
) -> Result<Scalar<'a>> {
    match (value, &field.default) {
        (Some(v), _) => scalar_from_value(v, &field.name),
        (None, Some(lit)) => scalar_from_literal(lit, &field.name),
        (None, None) => Ok(scalar_zero(prim)),
    }
}

/// Caller array → declared sequence default → empty.
pub(crate) fn resolve_array<'a>(
    field: &'a FieldDef,
    value: Option<&'a FieldValue>,
) -> Result<Vec<Scalar<'a>>> {
    match (value, &field.default) {
        (Some(v), _) => array_scalars(v, &field.name),
        (None, Some(lit)) => literal_seq(lit, &field.name),
        (None, None) => Ok(Vec::new()),
    }
}

/// Caller struct-array value, or empty when the field is absent.
pub(crate) fn struct_items<'a>(
    value: Option<&'a FieldValue>,
    field: &str,
) -> Result<&'a [MessageFields]> {
    match value {
        Some(FieldValue::ArrayStruct(items)) => Ok(items),
        None => Ok(&[]),
        Some(other) => Err(CodecError::unsupported(
            field,
            format!("{} where struct array expected", other.kind_name()),
        )),
    }
}

/// Bounded arrays clamp to their bound; dynamic arrays pass through.
pub(crate) fn clamped<T>(items: &[T], kind: ArrayKind) -> &[T] {
    match kind {
        ArrayKind::Bounded(bound) => &items[..items.len().min(bound as usize)],
        _ => items,
    }
}

/// Resolve a field's struct reference through the schema map.
pub(crate) fn resolve_struct<'a>(
    map: &'a SchemaByName,
    def: &TypeDef,
    type_name: &str,
) -> Result<&'a Arc<TypeDef>> {
    match resolve_name(map, &def.namespaces, type_name) {
        Some(child) if !child.is_enum => Ok(child),
        _ => Err(CodecError::UnknownMessageType(type_name.to_owned())),
    }
}
