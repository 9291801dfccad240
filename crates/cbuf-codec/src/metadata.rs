//! The ambient `cbufmsg::metadata` definition.
//!
//! Stream files open with a metadata message that carries the schemas for
//! everything that follows, so the codec must be able to frame and decode
//! this one struct even when the caller's schema maps don't contain it.
//! The definition and its hash are fixed for all time; treat them as wire
//! constants.

use std::sync::Arc;

use cbuf_ast::schema::{FieldDef, Primitive, TypeDef};
use cbuf_resolve::SchemaByName;
use once_cell::sync::Lazy;

use crate::error::{CodecError, Result};

/// Qualified name of the built-in metadata struct.
pub const METADATA_TYPE_NAME: &str = "cbufmsg::metadata";

/// Fixed hash of the built-in metadata struct.
pub const METADATA_HASH: u64 = 0xbe67_38d5_44ab_72c6;

/// `struct metadata { u64 msg_hash; string msg_name; string msg_meta; }`
/// in namespace `cbufmsg`.
pub static METADATA_DEF: Lazy<Arc<TypeDef>> = Lazy::new(|| {
    Arc::new(TypeDef {
        name: "metadata".to_owned(),
        qualified_name: METADATA_TYPE_NAME.to_owned(),
        namespaces: vec!["cbufmsg".to_owned()],
        fields: vec![
            FieldDef::primitive("msg_hash", Primitive::UInt64),
            FieldDef::primitive("msg_name", Primitive::String),
            FieldDef::primitive("msg_meta", Primitive::String),
        ],
        hash: METADATA_HASH,
        is_enum: false,
        is_enum_class: false,
        is_naked: false,
    })
});

/// Look up a top-level message type by its qualified name.
///
/// Falls back to the metadata built-in when the map misses. Enums are not
/// messages and are reported as unknown.
pub(crate) fn lookup_message_type<'a>(
    map: &'a SchemaByName,
    type_name: &str,
) -> Result<&'a Arc<TypeDef>> {
    if let Some(def) = map.get(type_name) {
        if def.is_enum {
            return Err(CodecError::UnknownMessageType(type_name.to_owned()));
        }
        return Ok(def);
    }
    if type_name == METADATA_TYPE_NAME {
        return Ok(&METADATA_DEF);
    }
    Err(CodecError::UnknownMessageType(type_name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_definition_shape() {
        let def = &*METADATA_DEF;
        assert_eq!(def.qualified_name, "cbufmsg::metadata");
        assert_eq!(def.hash, 0xbe6738d544ab72c6);
        let names: Vec<_> = def.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["msg_hash", "msg_name", "msg_meta"]);
    }

    #[test]
    fn test_lookup_falls_back_to_builtin() {
        let map = SchemaByName::new();
        let def = lookup_message_type(&map, METADATA_TYPE_NAME).unwrap();
        assert_eq!(def.hash, METADATA_HASH);
        assert!(lookup_message_type(&map, "nope").is_err());
    }
}
