//! Codec Tests
//!
//! Tests for MsgPack envelope encoding/decoding.

use std::collections::BTreeMap;

use raftkv_probe::protocol::{decode_command, encode_command, Operation, WriteCommand};
use raftkv_probe::ProbeError;

// =============================================================================
// Helper Functions
// =============================================================================

/// Decode with a plain map type, independent of `WriteCommand`
fn decode_as_map(bytes: &[u8]) -> BTreeMap<String, String> {
    rmp_serde::from_slice(bytes).unwrap()
}

fn expected_map(op: &str, key: &str, value: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert("op".to_string(), op.to_string());
    map.insert("key".to_string(), key.to_string());
    map.insert("value".to_string(), value.to_string());
    map
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_encode_set_decodes_to_original_mapping() {
    let cmd = WriteCommand::set("user_123", "msgpack_optimization_active");
    let envelope = encode_command(&cmd).unwrap();

    assert_eq!(
        decode_as_map(envelope.as_bytes()),
        expected_map("SET", "user_123", "msgpack_optimization_active")
    );
}

#[test]
fn test_encode_decode_command() {
    let cmd = WriteCommand::set("mykey", "myvalue");
    let envelope = encode_command(&cmd).unwrap();
    let decoded = decode_command(envelope.as_bytes()).unwrap();

    assert_eq!(decoded, cmd);
    assert_eq!(decoded.op, Operation::Set);
}

#[test]
fn test_encode_delete() {
    let cmd = WriteCommand::delete("gone");
    let envelope = encode_command(&cmd).unwrap();

    assert_eq!(decode_as_map(envelope.as_bytes()), expected_map("DELETE", "gone", ""));
}

#[test]
fn test_multibyte_text_survives_round_trip() {
    let cases = [
        ("ключ", "значение"),
        ("键", "值🚀"),
        ("emoji_🔑", "e\u{301}\u{0}tail"),
        ("spaces in key", "line\nbreak\ttab"),
    ];

    for (key, value) in cases {
        let envelope = encode_command(&WriteCommand::set(key, value)).unwrap();
        assert_eq!(decode_as_map(envelope.as_bytes()), expected_map("SET", key, value));
    }
}

#[test]
fn test_empty_value_is_allowed() {
    let cmd = WriteCommand::set("key", "");
    let envelope = encode_command(&cmd).unwrap();
    assert_eq!(decode_command(envelope.as_bytes()).unwrap().value, "");
}

#[test]
fn test_large_value() {
    let value = "x".repeat(1024 * 1024);
    let envelope = encode_command(&WriteCommand::set("big", value.clone())).unwrap();
    assert_eq!(decode_command(envelope.as_bytes()).unwrap().value, value);
}

// =============================================================================
// Wire Layout Tests
// =============================================================================

#[test]
fn test_envelope_is_three_entry_map_in_field_order() {
    let envelope = encode_command(&WriteCommand::set("k", "v")).unwrap();
    let bytes = envelope.as_bytes();

    // fixmap with 3 entries
    assert_eq!(bytes[0], 0x83);

    // first key is fixstr "op", followed by fixstr "SET"
    assert_eq!(&bytes[1..4], &[0xa2, b'o', b'p']);
    assert_eq!(&bytes[4..8], &[0xa3, b'S', b'E', b'T']);

    // then "key" and "value" in that order
    assert_eq!(&bytes[8..12], &[0xa3, b'k', b'e', b'y']);
    assert_eq!(&bytes[12..14], &[0xa1, b'k']);
    assert_eq!(&bytes[14..20], &[0xa5, b'v', b'a', b'l', b'u', b'e']);
    assert_eq!(&bytes[20..22], &[0xa1, b'v']);
    assert_eq!(bytes.len(), 22);
}

#[test]
fn test_strings_use_str_family_not_bin() {
    let envelope = encode_command(&WriteCommand::set("k", "é")).unwrap();
    let bytes = envelope.as_bytes();

    // "é" is 2 UTF-8 bytes: fixstr of length 2, raw bytes unchanged
    let tail = &bytes[bytes.len() - 3..];
    assert_eq!(tail, &[0xa2, 0xc3, 0xa9]);
}

#[test]
fn test_envelope_len_matches_bytes() {
    let long_value = "值".repeat(100);
    let cases = [
        ("a", "b"),
        ("user_123", "msgpack_optimization_active"),
        ("键", long_value.as_str()),
    ];

    for (key, value) in cases {
        let envelope = encode_command(&WriteCommand::set(key, value)).unwrap();
        assert_eq!(envelope.len(), envelope.as_bytes().len());
        assert!(!envelope.is_empty());
        let len = envelope.len();
        assert_eq!(envelope.into_bytes().len(), len);
    }
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_encode_rejects_empty_key() {
    let result = encode_command(&WriteCommand::set("", "value"));
    assert!(matches!(result, Err(ProbeError::Protocol(_))));
}

#[test]
fn test_decode_garbage() {
    let result = decode_command(&[0xc1, 0x00, 0xff]);
    assert!(matches!(result, Err(ProbeError::Decode(_))));
}

#[test]
fn test_decode_unknown_operation() {
    #[derive(serde::Serialize)]
    struct Raw<'a> {
        op: &'a str,
        key: &'a str,
        value: &'a str,
    }

    let bytes = rmp_serde::to_vec_named(&Raw {
        op: "INCR",
        key: "k",
        value: "1",
    })
    .unwrap();

    assert!(matches!(decode_command(&bytes), Err(ProbeError::Decode(_))));
}

#[test]
fn test_operation_parse() {
    assert_eq!("SET".parse::<Operation>().unwrap(), Operation::Set);
    assert_eq!("DELETE".parse::<Operation>().unwrap(), Operation::Delete);
    assert!(matches!("set".parse::<Operation>(), Err(ProbeError::Protocol(_))));
}

#[test]
fn test_decode_rejects_empty_key() {
    #[derive(serde::Serialize)]
    struct Raw {
        op: String,
        key: String,
        value: String,
    }

    let bytes = rmp_serde::to_vec_named(&Raw {
        op: "SET".to_string(),
        key: String::new(),
        value: "v".to_string(),
    })
    .unwrap();

    assert!(matches!(decode_command(&bytes), Err(ProbeError::Protocol(_))));
}
