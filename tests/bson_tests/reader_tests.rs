//! Tests for the document reader
//!
//! These tests verify:
//! - Required reads fail NoSuchKey iff absent, TypesMismatch iff mistyped
//! - Defaults apply only to absent keys
//! - Null handling
//! - Numeric widening through typed and number reads

use mongowire::bson::{
    reader, BooleanField, DocumentBuilder, Expected, HostAndPortField, IntField, LongField,
    NumberField, StringField, Value, ValueType,
};
use mongowire::WireError;

const NAME: StringField = StringField::new("name");
const COUNT: LongField = LongField::new("count");
const SMALL: IntField = IntField::new("small");
const FLAG: BooleanField = BooleanField::new("flag");
const ANY: NumberField = NumberField::new("any");
const HOST: HostAndPortField = HostAndPortField::new("host");

// =============================================================================
// Required Reads
// =============================================================================

#[test]
fn test_get_missing_key() {
    let doc = DocumentBuilder::new().build();
    match reader::get(&doc, &NAME) {
        Err(WireError::NoSuchKey { key, reason }) => {
            assert_eq!(key, "name");
            assert!(reason.is_none());
        }
        other => panic!("Expected NoSuchKey, got {:?}", other),
    }
}

#[test]
fn test_get_wrong_type() {
    let doc = DocumentBuilder::new().append_value("name", 5).build();
    match reader::get(&doc, &NAME) {
        Err(WireError::TypesMismatch(mismatch)) => {
            assert_eq!(mismatch.field, "name");
            assert_eq!(mismatch.expected, Expected::Type(ValueType::String));
            assert_eq!(mismatch.found, ValueType::Int32);
        }
        other => panic!("Expected TypesMismatch, got {:?}", other),
    }
}

#[test]
fn test_get_null_is_mismatch() {
    let doc = DocumentBuilder::new().append_null(&NAME).build();
    match reader::get(&doc, &NAME) {
        Err(WireError::TypesMismatch(mismatch)) => assert_eq!(mismatch.found, ValueType::Null),
        other => panic!("Expected TypesMismatch, got {:?}", other),
    }
}

#[test]
fn test_long_field_accepts_int32() {
    let doc = DocumentBuilder::new().append_value("count", 3).build();
    assert_eq!(reader::get(&doc, &COUNT).unwrap(), 3i64);
}

#[test]
fn test_int_field_rejects_int64() {
    let doc = DocumentBuilder::new().append_value("small", 3i64).build();
    assert!(matches!(
        reader::get(&doc, &SMALL),
        Err(WireError::TypesMismatch(_))
    ));
}

// =============================================================================
// Optional and Defaulted Reads
// =============================================================================

#[test]
fn test_default_only_when_absent() {
    let empty = DocumentBuilder::new().build();
    assert!(!reader::get_or(&empty, &FLAG, false).unwrap());

    let mistyped = DocumentBuilder::new().append_value("flag", "yes").build();
    assert!(matches!(
        reader::get_or(&mistyped, &FLAG, false),
        Err(WireError::TypesMismatch(_))
    ));
}

#[test]
fn test_optional_null_is_absent() {
    let doc = DocumentBuilder::new().append_null(&NAME).build();
    assert_eq!(reader::get_opt(&doc, &NAME).unwrap(), None);
    assert_eq!(reader::get_or(&doc, &NAME, "x").unwrap(), "x");
}

#[test]
fn test_empty_host_is_absent() {
    let doc = DocumentBuilder::new().append_value("host", "").build();
    assert_eq!(reader::get_opt(&doc, &HOST).unwrap(), None);

    let doc = DocumentBuilder::new().append_value("host", "h1:27017").build();
    let host = reader::get_opt(&doc, &HOST).unwrap().unwrap();
    assert_eq!(host.host(), "h1");
    assert_eq!(host.port(), Some(27017));
}

// =============================================================================
// Number Reads
// =============================================================================

#[test]
fn test_number_field_accepts_double() {
    let doc = DocumentBuilder::new().append_value("any", 2.0).build();
    assert_eq!(reader::get(&doc, &ANY).unwrap().as_i64(), 2);
}

#[test]
fn test_get_number_on_typed_field() {
    let doc = DocumentBuilder::new().append_value("small", 1.0).build();
    assert_eq!(reader::get_number(&doc, &SMALL).unwrap().exact_i32(), Some(1));

    let doc = DocumentBuilder::new().append_value("small", "1").build();
    match reader::get_number(&doc, &SMALL) {
        Err(WireError::TypesMismatch(mismatch)) => {
            assert_eq!(mismatch.expected, Expected::Number);
            assert_eq!(mismatch.found, ValueType::String);
        }
        other => panic!("Expected TypesMismatch, got {:?}", other),
    }
}

#[test]
fn test_get_i32_number_accepts_whole_values() {
    for value in [Value::Int32(7), Value::Int64(7), Value::Double(7.0)] {
        let doc = DocumentBuilder::new().append_value("any", value).build();
        assert_eq!(reader::get_i32_number(&doc, &ANY).unwrap(), 7);
    }

    let doc = DocumentBuilder::new().build();
    assert_eq!(reader::get_i32_number_opt(&doc, &ANY).unwrap(), None);
}

#[test]
fn test_get_i32_number_rejects_lossy_values() {
    for value in [
        Value::Int64(4_294_967_297),
        Value::Int64(i64::from(i32::MIN) - 1),
        Value::Double(91.9),
        Value::Double(1e12),
        Value::Double(f64::NAN),
    ] {
        let doc = DocumentBuilder::new().append_value("any", value.clone()).build();
        match reader::get_i32_number(&doc, &ANY) {
            Err(WireError::BadValue(_)) => {}
            other => panic!("Expected BadValue for {:?}, got {:?}", value, other),
        }
    }
}

// =============================================================================
// Field Whitelists
// =============================================================================

#[test]
fn test_check_only_has_fields() {
    let doc = DocumentBuilder::new()
        .append_value("a", 1)
        .append_value("b", Value::Null)
        .build();
    assert!(reader::check_only_has_fields("Thing", &doc, &["a", "b"]).is_ok());

    match reader::check_only_has_fields("Thing", &doc, &["a"]) {
        Err(WireError::BadValue(message)) => assert_eq!(message, "Unexpected field b in Thing"),
        other => panic!("Expected BadValue, got {:?}", other),
    }
}
