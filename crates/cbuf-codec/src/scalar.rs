//! Scalar normalization and tolerant coercion.
//!
//! Encode-side values arrive three ways: from the caller's message map,
//! from a declared default, or as the type's zero. All three funnel into
//! [`Scalar`], and the writers dispatch on the schema tag, coercing the
//! scalar as needed (a bool feeds a numeric tag as 0/1, any numeric kind
//! feeds any numeric tag, a nonzero number feeds bool as true).

use cbuf_ast::schema::{Literal, Primitive};
use cbuf_ast::FieldValue;

use crate::error::{CodecError, Result};

/// One scalar ready for encoding, detached from its source variant.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
}

impl<'a> Scalar<'a> {
    pub(crate) fn to_i64(self, field: &str) -> Result<i64> {
        match self {
            Self::Bool(b) => Ok(i64::from(b)),
            Self::Int(v) => Ok(v),
            Self::UInt(v) => Ok(v as i64),
            Self::Float(v) => Ok(v as i64),
            Self::Str(_) => Err(CodecError::unsupported(field, "string where integer expected")),
        }
    }

    pub(crate) fn to_u64(self, field: &str) -> Result<u64> {
        match self {
            Self::Bool(b) => Ok(u64::from(b)),
            Self::Int(v) => Ok(v as u64),
            Self::UInt(v) => Ok(v),
            Self::Float(v) => Ok(v as i64 as u64),
            Self::Str(_) => Err(CodecError::unsupported(field, "string where integer expected")),
        }
    }

    pub(crate) fn to_f64(self, field: &str) -> Result<f64> {
        match self {
            Self::Bool(b) => Ok(f64::from(u8::from(b))),
            Self::Int(v) => Ok(v as f64),
            Self::UInt(v) => Ok(v as f64),
            Self::Float(v) => Ok(v),
            Self::Str(_) => Err(CodecError::unsupported(field, "string where number expected")),
        }
    }

    pub(crate) fn to_bool(self, field: &str) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Int(v) => Ok(v != 0),
            Self::UInt(v) => Ok(v != 0),
            Self::Float(v) => Ok(v != 0.0),
            Self::Str(_) => Err(CodecError::unsupported(field, "string where bool expected")),
        }
    }

    pub(crate) fn as_str(self, field: &str) -> Result<&'a str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(CodecError::unsupported(
                field,
                format!("{:?} where string expected", other),
            )),
        }
    }
}

/// Normalize a caller-provided scalar value.
pub(crate) fn scalar_from_value<'a>(value: &'a FieldValue, field: &str) -> Result<Scalar<'a>> {
    let scalar = match value {
        FieldValue::Bool(b) => Scalar::Bool(*b),
        FieldValue::I8(v) => Scalar::Int(i64::from(*v)),
        FieldValue::I16(v) => Scalar::Int(i64::from(*v)),
        FieldValue::I32(v) => Scalar::Int(i64::from(*v)),
        FieldValue::I64(v) => Scalar::Int(*v),
        FieldValue::U8(v) => Scalar::UInt(u64::from(*v)),
        FieldValue::U16(v) => Scalar::UInt(u64::from(*v)),
        FieldValue::U32(v) => Scalar::UInt(u64::from(*v)),
        FieldValue::U64(v) => Scalar::UInt(*v),
        FieldValue::F32(v) => Scalar::Float(f64::from(*v)),
        FieldValue::F64(v) => Scalar::Float(*v),
        FieldValue::Str(s) => Scalar::Str(s),
        other => {
            return Err(CodecError::unsupported(
                field,
                format!("{} where scalar expected", other.kind_name()),
            ));
        }
    };
    Ok(scalar)
}

/// Normalize a declared default.
///
/// Identifiers were replaced by the analyzer; meeting one here means the
/// definition never went through analysis.
pub(crate) fn scalar_from_literal<'a>(lit: &'a Literal, field: &str) -> Result<Scalar<'a>> {
    match lit {
        Literal::Bool(b) => Ok(Scalar::Bool(*b)),
        Literal::Int(v) => Ok(Scalar::Int(*v)),
        Literal::Float(v) => Ok(Scalar::Float(*v)),
        Literal::Str(s) => Ok(Scalar::Str(s)),
        Literal::Ident(name) => Err(CodecError::unsupported(
            field,
            format!("unresolved enum member '{}' in default", name),
        )),
        Literal::Seq(_) => Err(CodecError::unsupported(
            field,
            "sequence default where scalar expected",
        )),
    }
}

/// The zero value of a primitive tag.
pub(crate) fn scalar_zero(prim: Primitive) -> Scalar<'static> {
    match prim {
        Primitive::Bool => Scalar::Bool(false),
        Primitive::String => Scalar::Str(""),
        _ => Scalar::Int(0),
    }
}

/// Normalize a caller-provided array value into per-element scalars.
pub(crate) fn array_scalars<'a>(value: &'a FieldValue, field: &str) -> Result<Vec<Scalar<'a>>> {
    let scalars = match value {
        FieldValue::ArrayBool(v) => v.iter().map(|b| Scalar::Bool(*b)).collect(),
        FieldValue::ArrayI8(v) => v.iter().map(|x| Scalar::Int(i64::from(*x))).collect(),
        FieldValue::ArrayI16(v) => v.iter().map(|x| Scalar::Int(i64::from(*x))).collect(),
        FieldValue::ArrayI32(v) => v.iter().map(|x| Scalar::Int(i64::from(*x))).collect(),
        FieldValue::ArrayI64(v) => v.iter().map(|x| Scalar::Int(*x)).collect(),
        FieldValue::ArrayU8(v) => v.iter().map(|x| Scalar::UInt(u64::from(*x))).collect(),
        FieldValue::ArrayU16(v) => v.iter().map(|x| Scalar::UInt(u64::from(*x))).collect(),
        FieldValue::ArrayU32(v) => v.iter().map(|x| Scalar::UInt(u64::from(*x))).collect(),
        FieldValue::ArrayU64(v) => v.iter().map(|x| Scalar::UInt(*x)).collect(),
        FieldValue::ArrayF32(v) => v.iter().map(|x| Scalar::Float(f64::from(*x))).collect(),
        FieldValue::ArrayF64(v) => v.iter().map(|x| Scalar::Float(*x)).collect(),
        FieldValue::ArrayStr(v) => v.iter().map(|s| Scalar::Str(s.as_str())).collect(),
        other => {
            return Err(CodecError::unsupported(
                field,
                format!("{} where array expected", other.kind_name()),
            ));
        }
    };
    Ok(scalars)
}

/// Normalize a sequence default into per-element scalars.
pub(crate) fn literal_seq<'a>(lit: &'a Literal, field: &str) -> Result<Vec<Scalar<'a>>> {
    let Literal::Seq(items) = lit else {
        return Err(CodecError::unsupported(
            field,
            "scalar default where sequence expected",
        ));
    };
    items
        .iter()
        .map(|item| scalar_from_literal(item, field))
        .collect()
}
