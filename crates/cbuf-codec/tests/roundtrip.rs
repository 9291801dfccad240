//! End-to-end codec tests against parsed schemas.

use cbuf_ast::{FieldValue, MessageFields, MessageRecord};
use cbuf_codec::{
    deserialize_message, serialize_message, serialized_message_size, CodecError, HEADER_SIZE,
    METADATA_HASH,
};
use cbuf_resolve::{create_schema_maps, SchemaByHash, SchemaByName};

/// Helper: parse, analyze, and index a schema.
fn compile(source: &str) -> (SchemaByName, SchemaByHash) {
    let decls = cbuf_parser::parse_declarations(source).expect("parse should succeed");
    let defs = cbuf_resolve::compile_schemas(&decls).expect("compile should succeed");
    create_schema_maps(&defs)
}

/// Helper: build a message field map.
fn fields(pairs: Vec<(&str, FieldValue)>) -> MessageFields {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

#[test]
fn test_simple_struct_frame_layout() {
    let (by_name, by_hash) = compile("struct a { string b; bool c; }");
    let msg = MessageRecord::new(
        "a",
        12.25,
        fields(vec![
            ("b", FieldValue::Str("Hello, world!".to_owned())),
            ("c", FieldValue::Bool(true)),
        ]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), 42); // 24 + 4 + 13 + 1
    assert_eq!(serialized_message_size(&by_name, &msg).unwrap(), 42);

    // Preamble: magic, size word (variant 0), hash, timestamp.
    assert_eq!(&bytes[0..4], &[0x54, 0x4e, 0x44, 0x56]);
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 42);
    let hash = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
    assert_eq!(hash, by_name.get("a").unwrap().hash);
    assert_eq!(f64::from_le_bytes(bytes[16..24].try_into().unwrap()), 12.25);

    // Payload: u32 length + text + bool byte.
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 13);
    assert_eq!(&bytes[28..41], b"Hello, world!");
    assert_eq!(bytes[41], 1);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.type_name, "a");
    assert_eq!(back.size, 42);
    assert_eq!(back.variant, 0);
    assert_eq!(back.hash, hash);
    assert_eq!(back.timestamp, 12.25);
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_post_edited_variant_word() {
    let (by_name, by_hash) = compile("struct a { string b; bool c; }");
    let msg = MessageRecord::new(
        "a",
        0.0,
        fields(vec![
            ("b", FieldValue::Str("Hello, world!".to_owned())),
            ("c", FieldValue::Bool(true)),
        ]),
    );

    let mut bytes = serialize_message(&by_name, &msg).unwrap();
    let word: u32 = (9 << 27) | 42;
    bytes[4..8].copy_from_slice(&word.to_le_bytes());

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.size, 42);
    assert_eq!(back.variant, 9);
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_nested_naked_struct_has_no_inner_preamble() {
    let (by_name, by_hash) = compile(
        "struct nested @naked { string text; } struct outer { nested n; }",
    );
    let msg = MessageRecord::new(
        "outer",
        0.0,
        fields(vec![(
            "n",
            FieldValue::Struct(fields(vec![("text", FieldValue::Str("hi".to_owned()))])),
        )]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 4 + 2);
    // Payload starts directly with the string length — no inner magic.
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 2);
    assert_eq!(&bytes[28..30], b"hi");

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_nested_non_naked_struct_carries_preamble() {
    let (by_name, by_hash) = compile(
        "struct nested { string text; } struct outer { nested n; }",
    );
    let msg = MessageRecord::new(
        "outer",
        0.0,
        fields(vec![(
            "n",
            FieldValue::Struct(fields(vec![("text", FieldValue::Str("hi".to_owned()))])),
        )]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + HEADER_SIZE + 4 + 2);

    // Inner preamble sits at the start of the payload.
    assert_eq!(&bytes[24..28], &[0x54, 0x4e, 0x44, 0x56]);
    let inner_size = u32::from_le_bytes(bytes[28..32].try_into().unwrap());
    assert_eq!(inner_size as usize, HEADER_SIZE + 4 + 2);
    let inner_hash = u64::from_le_bytes(bytes[32..40].try_into().unwrap());
    assert_eq!(inner_hash, by_name.get("nested").unwrap().hash);
    let inner_ts = f64::from_le_bytes(bytes[40..48].try_into().unwrap());
    assert_eq!(inner_ts, 0.0);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_fixed_short_string_array() {
    let (by_name, by_hash) = compile("struct s { short_string names[2]; }");
    let long = "this-name-is-longer-than-sixteen-bytes";
    let msg = MessageRecord::new(
        "s",
        0.0,
        fields(vec![(
            "names",
            FieldValue::ArrayStr(vec!["ab".to_owned(), long.to_owned()]),
        )]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    // No count prefix: exactly 2 × 16 bytes of payload.
    assert_eq!(bytes.len(), HEADER_SIZE + 32);
    assert_eq!(&bytes[24..26], b"ab");
    assert!(bytes[26..40].iter().all(|&b| b == 0));
    assert_eq!(&bytes[40..56], &long.as_bytes()[..16]);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(
        back.message.get("names").unwrap(),
        &FieldValue::ArrayStr(vec!["ab".to_owned(), long[..16].to_owned()])
    );
}

#[test]
fn test_scalar_primitives_roundtrip() {
    let (by_name, by_hash) = compile(
        "struct t { bool a; s8 b; u8 c; s16 d; u16 e; s32 f; u32 g; s64 h; u64 i; f32 j; f64 k; }",
    );
    let message = fields(vec![
        ("a", FieldValue::Bool(true)),
        ("b", FieldValue::I8(-5)),
        ("c", FieldValue::U8(200)),
        ("d", FieldValue::I16(-3000)),
        ("e", FieldValue::U16(60000)),
        ("f", FieldValue::I32(-70000)),
        ("g", FieldValue::U32(4000000000)),
        ("h", FieldValue::I64(-5_000_000_000)),
        ("i", FieldValue::U64(u64::MAX)),
        ("j", FieldValue::F32(1.5)),
        ("k", FieldValue::F64(-2.25)),
    ]);
    let msg = MessageRecord::new("t", 1.0, message.clone());

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), 24 + 1 + 1 + 1 + 2 + 2 + 4 + 4 + 8 + 8 + 4 + 8);
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, message);
}

#[test]
fn test_variable_array_has_count_prefix() {
    let (by_name, by_hash) = compile("struct s { u16 v[]; }");
    let msg = MessageRecord::new(
        "s",
        0.0,
        fields(vec![("v", FieldValue::ArrayU16(vec![7, 8, 9]))]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 4 + 6);
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 3);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(
        back.message.get("v").unwrap(),
        &FieldValue::ArrayU16(vec![7, 8, 9])
    );
}

#[test]
fn test_compact_array_clamps_to_bound() {
    let (by_name, by_hash) = compile("struct s { u16 v[2] @compact; }");
    let msg = MessageRecord::new(
        "s",
        0.0,
        fields(vec![("v", FieldValue::ArrayU16(vec![1, 2, 3, 4]))]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 4 + 4);
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(
        back.message.get("v").unwrap(),
        &FieldValue::ArrayU16(vec![1, 2])
    );
}

#[test]
fn test_fixed_array_pads_and_truncates() {
    let (by_name, by_hash) = compile("struct s { u8 v[4]; }");

    let short = MessageRecord::new(
        "s",
        0.0,
        fields(vec![("v", FieldValue::ArrayU8(vec![1, 2]))]),
    );
    let bytes = serialize_message(&by_name, &short).unwrap();
    assert_eq!(&bytes[24..28], &[1, 2, 0, 0]);

    let long = MessageRecord::new(
        "s",
        0.0,
        fields(vec![("v", FieldValue::ArrayU8(vec![1, 2, 3, 4, 5, 6]))]),
    );
    let bytes = serialize_message(&by_name, &long).unwrap();
    assert_eq!(&bytes[24..28], &[1, 2, 3, 4]);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(
        back.message.get("v").unwrap(),
        &FieldValue::ArrayU8(vec![1, 2, 3, 4])
    );
}

#[test]
fn test_missing_fields_use_defaults_then_zeros() {
    let (by_name, by_hash) = compile(
        r#"struct d { u32 n = 7; string s = "hey"; u8 v[3]; f32 w[]; bool b; }"#,
    );
    let msg = MessageRecord::new("d", 0.0, MessageFields::new());

    let expected_size = 24 + 4 + (4 + 3) + 3 + 4 + 1;
    assert_eq!(serialized_message_size(&by_name, &msg).unwrap(), expected_size);
    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(bytes.len(), expected_size);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message.get("n").unwrap(), &FieldValue::U32(7));
    assert_eq!(
        back.message.get("s").unwrap(),
        &FieldValue::Str("hey".to_owned())
    );
    assert_eq!(
        back.message.get("v").unwrap(),
        &FieldValue::ArrayU8(vec![0, 0, 0])
    );
    assert_eq!(back.message.get("w").unwrap(), &FieldValue::ArrayF32(vec![]));
    assert_eq!(back.message.get("b").unwrap(), &FieldValue::Bool(false));
}

#[test]
fn test_enum_default_applies_on_encode() {
    let (by_name, by_hash) = compile("enum E { A, B = 10, C } struct s { E f = B; }");
    let msg = MessageRecord::new("s", 0.0, MessageFields::new());

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), 10);

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message.get("f").unwrap(), &FieldValue::U32(10));
}

#[test]
fn test_struct_array_roundtrip() {
    let (by_name, by_hash) = compile(
        "struct item @naked { u32 id; } struct list { item items[]; }",
    );
    let msg = MessageRecord::new(
        "list",
        0.0,
        fields(vec![(
            "items",
            FieldValue::ArrayStruct(vec![
                fields(vec![("id", FieldValue::U32(1))]),
                fields(vec![("id", FieldValue::U32(2))]),
            ]),
        )]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    // count + 2 × naked u32 payloads
    assert_eq!(bytes.len(), HEADER_SIZE + 4 + 8);
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_typed_array_decode_aligned_and_misaligned() {
    let (by_name, by_hash) = compile("struct s { f64 vals[2]; u32 tail; }");
    let msg = MessageRecord::new(
        "s",
        0.0,
        fields(vec![
            ("vals", FieldValue::ArrayF64(vec![1.5, -2.25])),
            ("tail", FieldValue::U32(9)),
        ]),
    );
    let bytes = serialize_message(&by_name, &msg).unwrap();

    // Aligned-as-serialized decode.
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, msg.message);

    // Shift the frame by one byte and decode at offset 1: the payload is
    // now misaligned for f64, which must not change the values.
    let mut shifted = vec![0u8; 1];
    shifted.extend_from_slice(&bytes);
    let back = deserialize_message(&by_name, &by_hash, &shifted, 1).unwrap();
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_unaligned_array_after_odd_scalar() {
    let (by_name, by_hash) = compile("struct s { u8 pad; u64 vals[3]; }");
    let msg = MessageRecord::new(
        "s",
        0.0,
        fields(vec![
            ("pad", FieldValue::U8(1)),
            (
                "vals",
                FieldValue::ArrayU64(vec![u64::MAX, 42, 0x0102_0304_0506_0708]),
            ),
        ]),
    );
    let bytes = serialize_message(&by_name, &msg).unwrap();
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_metadata_builtin_without_schema_maps() {
    let by_name = SchemaByName::new();
    let by_hash = SchemaByHash::new();
    let msg = MessageRecord::new(
        "cbufmsg::metadata",
        3.5,
        fields(vec![
            ("msg_hash", FieldValue::U64(0xdead_beef)),
            ("msg_name", FieldValue::Str("a".to_owned())),
            ("msg_meta", FieldValue::Str("struct a { bool b; }".to_owned())),
        ]),
    );

    let bytes = serialize_message(&by_name, &msg).unwrap();
    assert_eq!(
        u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
        METADATA_HASH
    );

    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.type_name, "cbufmsg::metadata");
    assert_eq!(back.hash, METADATA_HASH);
    assert_eq!(back.message, msg.message);
}

#[test]
fn test_size_matches_serialize_for_varied_messages() {
    let (by_name, _) = compile(
        "struct inner @naked { string s; } \
         struct t { inner i; u16 v[] ; short_string tag; f64 x; }",
    );
    let messages = [
        MessageFields::new(),
        fields(vec![
            (
                "i",
                FieldValue::Struct(fields(vec![("s", FieldValue::Str("abc".to_owned()))])),
            ),
            ("v", FieldValue::ArrayU16(vec![1, 2, 3, 4, 5])),
            ("tag", FieldValue::Str("t".to_owned())),
            ("x", FieldValue::F64(0.5)),
        ]),
    ];
    for message in messages {
        let msg = MessageRecord::new("t", 0.0, message);
        let bytes = serialize_message(&by_name, &msg).unwrap();
        assert_eq!(bytes.len(), serialized_message_size(&by_name, &msg).unwrap());
    }
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_bad_magic() {
    let (by_name, by_hash) = compile("struct a { bool b; }");
    let msg = MessageRecord::new("a", 0.0, MessageFields::new());
    let mut bytes = serialize_message(&by_name, &msg).unwrap();
    bytes[0] = 0xff;

    let err = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap_err();
    assert!(matches!(err, CodecError::BadMagic(_)));
}

#[test]
fn test_size_exceeds_buffer() {
    let (by_name, by_hash) = compile("struct a { string s; }");
    let msg = MessageRecord::new(
        "a",
        0.0,
        fields(vec![("s", FieldValue::Str("payload".to_owned()))]),
    );
    let bytes = serialize_message(&by_name, &msg).unwrap();

    let err = deserialize_message(&by_name, &by_hash, &bytes[..bytes.len() - 3], 0).unwrap_err();
    assert!(matches!(err, CodecError::SizeExceedsBuffer { .. }));
}

#[test]
fn test_buffer_too_small_for_preamble() {
    let (by_name, by_hash) = compile("struct a { bool b; }");
    let err = deserialize_message(&by_name, &by_hash, &[0x54, 0x4e], 0).unwrap_err();
    assert!(matches!(err, CodecError::BufferTooSmall { .. }));
}

#[test]
fn test_hash_not_found() {
    let (by_name, by_hash) = compile("struct a { bool b; }");
    let msg = MessageRecord::new("a", 0.0, MessageFields::new());
    let mut bytes = serialize_message(&by_name, &msg).unwrap();
    bytes[8..16].copy_from_slice(&0x1234_5678u64.to_le_bytes());

    let err = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap_err();
    assert_eq!(err, CodecError::HashNotFound(0x1234_5678));
}

#[test]
fn test_unknown_message_type() {
    let (by_name, _) = compile("struct a { bool b; }");
    let msg = MessageRecord::new("nope", 0.0, MessageFields::new());
    let err = serialize_message(&by_name, &msg).unwrap_err();
    assert_eq!(err, CodecError::UnknownMessageType("nope".to_owned()));
}

#[test]
fn test_naked_struct_rejected_at_top_level() {
    let (by_name, _) = compile("struct n @naked { bool b; } struct a { n x; }");
    let msg = MessageRecord::new("n", 0.0, MessageFields::new());
    let err = serialize_message(&by_name, &msg).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType { .. }));
}

#[test]
fn test_wrong_value_shape_rejected() {
    let (by_name, _) = compile("struct a { u32 n; }");
    let msg = MessageRecord::new(
        "a",
        0.0,
        fields(vec![("n", FieldValue::Str("not a number".to_owned()))]),
    );
    let err = serialize_message(&by_name, &msg).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType { .. }));
}

#[test]
fn test_tolerant_numeric_coercions_on_encode() {
    let (by_name, by_hash) = compile("struct a { u64 big; f64 x; bool flag; }");
    // An i32-kind value feeds the u64 tag, an integer feeds f64, and a
    // number feeds bool.
    let msg = MessageRecord::new(
        "a",
        0.0,
        fields(vec![
            ("big", FieldValue::I32(41)),
            ("x", FieldValue::I64(2)),
            ("flag", FieldValue::U8(1)),
        ]),
    );
    let bytes = serialize_message(&by_name, &msg).unwrap();
    let back = deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
    assert_eq!(back.message.get("big").unwrap(), &FieldValue::U64(41));
    assert_eq!(back.message.get("x").unwrap(), &FieldValue::F64(2.0));
    assert_eq!(back.message.get("flag").unwrap(), &FieldValue::Bool(true));
}
