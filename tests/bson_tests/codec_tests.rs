//! Tests for the binary document codec
//!
//! These tests verify:
//! - Encoding matches the reference byte layout
//! - Every value kind survives a binary round trip
//! - Truncated and malformed input is rejected

use bytes::{BufMut, BytesMut};
use mongowire::bson::codec::{
    decode_document, encode_document, write_document, MAX_NESTING_DEPTH, MIN_DOCUMENT_SIZE,
};
use mongowire::bson::{DateTime, Document, DocumentBuilder, ObjectId, Timestamp, Value};
use mongowire::WireError;

const MAX: usize = 16 * 1024 * 1024;

fn sample() -> Document {
    let inner = DocumentBuilder::new().append_value("x", 1).build();
    DocumentBuilder::new()
        .append_value("null", Value::Null)
        .append_value("bool", true)
        .append_value("int", -5)
        .append_value("long", 1i64 << 40)
        .append_value("double", 0.25)
        .append_value("string", "héllo")
        .append_value("ts", Timestamp::new(10, 2))
        .append_value("date", DateTime::from_millis(-1))
        .append_value("oid", ObjectId::from_bytes([7; 12]))
        .append_value("array", vec![Value::Int32(1), Value::from("two")])
        .append_value("doc", inner)
        .build()
}

#[test]
fn test_encode_reference_bytes() {
    let doc = DocumentBuilder::new().append_value("a", 1).build();
    let bytes = encode_document(&doc).unwrap();

    assert_eq!(
        &bytes[..],
        &[12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0][..]
    );
}

#[test]
fn test_empty_document() {
    let bytes = encode_document(&Document::new()).unwrap();
    assert_eq!(bytes.len(), MIN_DOCUMENT_SIZE);
    assert!(decode_document(&mut &bytes[..], MAX).unwrap().is_empty());
}

#[test]
fn test_all_kinds_survive_binary_round_trip() {
    let doc = sample();
    let bytes = encode_document(&doc).unwrap();
    let mut cursor = &bytes[..];

    let decoded = decode_document(&mut cursor, MAX).unwrap();
    assert_eq!(decoded, doc);
    assert!(cursor.is_empty());
}

#[test]
fn test_decode_consumes_only_one_document() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&encode_document(&sample()).unwrap());
    buf.put_u8(0xff);

    let mut cursor = &buf[..];
    decode_document(&mut cursor, MAX).unwrap();
    assert_eq!(cursor, &[0xff][..]);
}

#[test]
fn test_truncated_document() {
    let bytes = encode_document(&sample()).unwrap();
    let truncated = &bytes[..bytes.len() - 3];

    match decode_document(&mut &truncated[..], MAX) {
        Err(WireError::InvalidMessage(_)) => {}
        other => panic!("Expected InvalidMessage, got {:?}", other),
    }
}

#[test]
fn test_document_over_limit() {
    let bytes = encode_document(&sample()).unwrap();
    match decode_document(&mut &bytes[..], 16) {
        Err(WireError::FailedToParse(_)) => {}
        other => panic!("Expected FailedToParse, got {:?}", other),
    }
}

#[test]
fn test_unknown_element_type() {
    // { "a": <type 0x7f> }
    let raw = [8u8, 0, 0, 0, 0x7f, b'a', 0, 0];
    match decode_document(&mut &raw[..], MAX) {
        Err(WireError::FailedToParse(message)) => assert!(message.contains("0x7f")),
        other => panic!("Expected FailedToParse, got {:?}", other),
    }
}

#[test]
fn test_bytes_after_terminator() {
    // Length says 6 but the terminator comes after one byte
    let raw = [6u8, 0, 0, 0, 0, 0];
    assert!(matches!(
        decode_document(&mut &raw[..], MAX),
        Err(WireError::FailedToParse(_))
    ));
}

/// A chain of `levels` documents, each holding the next under the empty key
fn nested_bytes(levels: usize) -> Vec<u8> {
    let mut raw = Vec::with_capacity(levels * 8);
    for level in 1..levels {
        // Each wrapper adds length, type, empty key and terminator
        let len = (MIN_DOCUMENT_SIZE + 7 * (levels - level)) as i32;
        raw.extend_from_slice(&len.to_le_bytes());
        raw.extend_from_slice(&[0x03, 0]);
    }
    raw.extend_from_slice(&[5, 0, 0, 0, 0]);
    raw.resize(raw.len() + levels - 1, 0);
    raw
}

#[test]
fn test_nesting_up_to_limit() {
    let raw = nested_bytes(MAX_NESTING_DEPTH);
    let mut doc = decode_document(&mut &raw[..], MAX).unwrap();

    let mut levels = 1;
    while let Some(Value::Document(inner)) = doc.get("").cloned() {
        doc = inner;
        levels += 1;
    }
    assert_eq!(levels, MAX_NESTING_DEPTH);
}

#[test]
fn test_nesting_past_limit() {
    let raw = nested_bytes(MAX_NESTING_DEPTH + 1);
    match decode_document(&mut &raw[..], MAX) {
        Err(WireError::FailedToParse(message)) => assert!(message.contains("nested too deeply")),
        other => panic!("Expected FailedToParse, got {:?}", other),
    }
}

#[test]
fn test_deep_nesting_is_an_error() {
    // Far deeper than the stack could recurse through
    let raw = nested_bytes(200_000);
    assert!(matches!(
        decode_document(&mut &raw[..], MAX),
        Err(WireError::FailedToParse(_))
    ));
}

#[test]
fn test_deep_array_nesting() {
    // [[[...]]] built from array elements instead of documents
    let mut raw = vec![5u8, 0, 0, 0, 0];
    for _ in 0..MAX_NESTING_DEPTH {
        let len = (raw.len() + 8) as i32;
        let mut outer = Vec::new();
        outer.extend_from_slice(&len.to_le_bytes());
        outer.push(0x04);
        outer.extend_from_slice(b"0\0");
        outer.extend_from_slice(&raw);
        outer.push(0);
        raw = outer;
    }
    assert!(matches!(
        decode_document(&mut &raw[..], MAX),
        Err(WireError::FailedToParse(_))
    ));
}

#[test]
fn test_key_with_nul_is_rejected() {
    let doc = DocumentBuilder::new().append_value("a\0b", 1).build();
    match encode_document(&doc) {
        Err(WireError::BadValue(message)) => assert!(message.contains("NUL")),
        other => panic!("Expected BadValue, got {:?}", other),
    }
}

#[test]
fn test_nested_key_with_nul_leaves_buffer_untouched() {
    let inner = DocumentBuilder::new().append_value("x\0", 1).build();
    let doc = DocumentBuilder::new()
        .append_value("ok", 1)
        .append_value("inner", inner)
        .build();

    let mut buf = BytesMut::new();
    buf.put_u8(0xaa);
    assert!(write_document(&mut buf, &doc).is_err());
    assert_eq!(&buf[..], &[0xaa][..]);
}
