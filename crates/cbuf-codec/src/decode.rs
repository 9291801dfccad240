//! Message deserialization.
//!
//! Decoding is strict where the frame is concerned — magic, declared size,
//! and the consumed byte count must all line up — and owning where values
//! are concerned: every decoded value is freshly allocated, so the input
//! buffer can be dropped or reused immediately.
//!
//! Numeric arrays take a fast path when the payload slice happens to be
//! naturally aligned for the element type (a straight POD cast and copy);
//! otherwise each element is read through `from_le_bytes`. Both paths
//! produce identical values.

use tracing::debug;

use cbuf_ast::schema::{ArrayKind, FieldDef, FieldKind, Primitive, TypeDef};
use cbuf_ast::{FieldValue, MessageFields, MessageRecord};
use cbuf_resolve::{SchemaByHash, SchemaByName};

use crate::error::{CodecError, Result};
use crate::frame::{unpack_size_and_variant, HEADER_SIZE, MAGIC};
use crate::metadata::{METADATA_DEF, METADATA_HASH};
use crate::size::resolve_struct;

/// Decode one framed message starting at `offset`.
///
/// The struct is found through `by_hash` (or recognized as the metadata
/// built-in); `map` resolves nested struct references. Exactly the
/// declared frame is consumed: decoding that stops short or runs long is
/// a [`CodecError::SizeMismatch`].
pub fn deserialize_message(
    map: &SchemaByName,
    by_hash: &SchemaByHash,
    bytes: &[u8],
    offset: usize,
) -> Result<MessageRecord> {
    let available = bytes.len().saturating_sub(offset);
    if available < HEADER_SIZE {
        return Err(CodecError::BufferTooSmall {
            needed: HEADER_SIZE,
            available,
        });
    }

    let mut reader = Reader::new(&bytes[offset..]);
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(CodecError::BadMagic(magic));
    }
    let (size, variant) = unpack_size_and_variant(reader.u32()?);
    if size > available {
        return Err(CodecError::SizeExceedsBuffer { size, available });
    }
    let hash = reader.u64()?;
    let def = match by_hash.get(&hash) {
        Some(def) => def,
        None if hash == METADATA_HASH => &*METADATA_DEF,
        None => return Err(CodecError::HashNotFound(hash)),
    };
    let timestamp = reader.f64()?;

    // Re-anchor on exactly the declared frame so payload reads can never
    // stray into trailing data.
    let mut payload = Reader::new(&bytes[offset..offset + size]);
    payload.skip(HEADER_SIZE)?;
    let message = decode_fields(&mut payload, map, def)?;
    if payload.pos != size {
        return Err(CodecError::SizeMismatch {
            declared: size,
            consumed: payload.pos,
        });
    }

    debug!(
        type_name = %def.qualified_name,
        size,
        variant,
        "deserialized message"
    );
    Ok(MessageRecord {
        type_name: def.qualified_name.clone(),
        size,
        variant,
        hash,
        timestamp,
        message,
    })
}

fn decode_fields(
    reader: &mut Reader<'_>,
    map: &SchemaByName,
    def: &TypeDef,
) -> Result<MessageFields> {
    let mut out = MessageFields::new();
    for field in &def.fields {
        let value = decode_field(reader, map, def, field)?;
        out.insert(field.name.clone(), value);
    }
    Ok(out)
}

fn decode_field(
    reader: &mut Reader<'_>,
    map: &SchemaByName,
    def: &TypeDef,
    field: &FieldDef,
) -> Result<FieldValue> {
    match (&field.kind, field.array) {
        (FieldKind::Primitive(prim), None) => decode_scalar(reader, *prim, field.upper_bound),
        (FieldKind::Primitive(prim), Some(kind)) => {
            let count = element_count(reader, kind)?;
            decode_primitive_array(reader, *prim, field.upper_bound, count)
        }
        (FieldKind::Complex(type_name), None) => {
            let child = resolve_struct(map, def, type_name)?;
            Ok(FieldValue::Struct(decode_nested(reader, map, child)?))
        }
        (FieldKind::Complex(type_name), Some(kind)) => {
            let child = resolve_struct(map, def, type_name)?;
            let count = element_count(reader, kind)?;
            let mut items = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                items.push(decode_nested(reader, map, child)?);
            }
            Ok(FieldValue::ArrayStruct(items))
        }
    }
}

/// Fixed arrays carry no count prefix; dynamic and bounded ones do.
fn element_count(reader: &mut Reader<'_>, kind: ArrayKind) -> Result<usize> {
    match kind {
        ArrayKind::Fixed(n) => Ok(n as usize),
        ArrayKind::Dynamic | ArrayKind::Bounded(_) => Ok(reader.u32()? as usize),
    }
}

/// Decode one nested struct value.
///
/// A non-naked nested struct carries its own preamble: the magic is
/// validated, and the size, hash, and timestamp words are consumed; the
/// field's declared type drives the payload decode.
fn decode_nested(
    reader: &mut Reader<'_>,
    map: &SchemaByName,
    child: &TypeDef,
) -> Result<MessageFields> {
    if !child.is_naked {
        let magic = reader.u32()?;
        if magic != MAGIC {
            return Err(CodecError::BadMagic(magic));
        }
        reader.skip(4 + 8 + 8)?; // size word, hash, timestamp
    }
    decode_fields(reader, map, child)
}

fn decode_scalar(
    reader: &mut Reader<'_>,
    prim: Primitive,
    upper_bound: Option<u32>,
) -> Result<FieldValue> {
    let value = match prim {
        Primitive::Bool => FieldValue::Bool(reader.u8()? != 0),
        Primitive::Int8 => FieldValue::I8(reader.u8()? as i8),
        Primitive::UInt8 => FieldValue::U8(reader.u8()?),
        Primitive::Int16 => FieldValue::I16(reader.u16()? as i16),
        Primitive::UInt16 => FieldValue::U16(reader.u16()?),
        Primitive::Int32 => FieldValue::I32(reader.u32()? as i32),
        Primitive::UInt32 => FieldValue::U32(reader.u32()?),
        Primitive::Int64 => FieldValue::I64(reader.u64()? as i64),
        Primitive::UInt64 => FieldValue::U64(reader.u64()?),
        Primitive::Float32 => FieldValue::F32(f32::from_le_bytes(reader.array::<4>()?)),
        Primitive::Float64 => FieldValue::F64(reader.f64()?),
        Primitive::String => FieldValue::Str(decode_string(reader, upper_bound)?),
    };
    Ok(value)
}

/// Unbounded strings are length-prefixed; bounded ones occupy exactly
/// their bound and are cut at the first null.
fn decode_string(reader: &mut Reader<'_>, upper_bound: Option<u32>) -> Result<String> {
    let bytes = match upper_bound {
        Some(bound) => {
            let raw = reader.take(bound as usize)?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            &raw[..end]
        }
        None => {
            let len = reader.u32()? as usize;
            reader.take(len)?
        }
    };
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn decode_primitive_array(
    reader: &mut Reader<'_>,
    prim: Primitive,
    upper_bound: Option<u32>,
    count: usize,
) -> Result<FieldValue> {
    let value = match prim {
        Primitive::Bool => {
            let raw = reader.take(count)?;
            FieldValue::ArrayBool(raw.iter().map(|&b| b != 0).collect())
        }
        Primitive::Int8 => {
            let raw = reader.take(count)?;
            FieldValue::ArrayI8(raw.iter().map(|&b| b as i8).collect())
        }
        Primitive::UInt8 => FieldValue::ArrayU8(reader.take(count)?.to_vec()),
        Primitive::Int16 => FieldValue::ArrayI16(read_numeric(reader.take(count * 2)?, |b| {
            i16::from_le_bytes([b[0], b[1]])
        })),
        Primitive::UInt16 => FieldValue::ArrayU16(read_numeric(reader.take(count * 2)?, |b| {
            u16::from_le_bytes([b[0], b[1]])
        })),
        Primitive::Int32 => FieldValue::ArrayI32(read_numeric(reader.take(count * 4)?, |b| {
            i32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })),
        Primitive::UInt32 => FieldValue::ArrayU32(read_numeric(reader.take(count * 4)?, |b| {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })),
        Primitive::Int64 => FieldValue::ArrayI64(read_numeric(reader.take(count * 8)?, |b| {
            i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })),
        Primitive::UInt64 => FieldValue::ArrayU64(read_numeric(reader.take(count * 8)?, |b| {
            u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })),
        Primitive::Float32 => FieldValue::ArrayF32(read_numeric(reader.take(count * 4)?, |b| {
            f32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })),
        Primitive::Float64 => FieldValue::ArrayF64(read_numeric(reader.take(count * 8)?, |b| {
            f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })),
        Primitive::String => {
            let mut items = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                items.push(decode_string(reader, upper_bound)?);
            }
            FieldValue::ArrayStr(items)
        }
    };
    Ok(value)
}

/// Copy a little-endian numeric slice out of the payload.
///
/// When the slice is naturally aligned for `T` (and the host is
/// little-endian) the bytes are reinterpreted in one cast; otherwise the
/// elements are assembled one at a time. The alignment of the input
/// buffer decides at runtime, so callers get correct values either way.
fn read_numeric<T: bytemuck::Pod>(bytes: &[u8], element: fn(&[u8]) -> T) -> Vec<T> {
    if cfg!(target_endian = "little") {
        if let Ok(cast) = bytemuck::try_cast_slice::<u8, T>(bytes) {
            return cast.to_vec();
        }
    }
    bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(element)
        .collect()
}

// ============================================================================
// Byte reader
// ============================================================================

/// Cursor over a byte slice with bounds-checked little-endian reads.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.buf.len() - self.pos;
        if n > available {
            return Err(CodecError::BufferTooSmall {
                needed: n,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array::<2>()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array::<4>()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array::<8>()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array::<8>()?))
    }
}
