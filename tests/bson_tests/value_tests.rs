//! Tests for the value model
//!
//! These tests verify:
//! - Canonical lower-case type names
//! - Numeric widening and rejected narrowing
//! - Object id and timestamp representations

use mongowire::bson::{Expected, Number, ObjectId, Timestamp, Value, ValueType};
use mongowire::{TypesMismatch, WireError};

// =============================================================================
// Type Names
// =============================================================================

#[test]
fn test_type_names_are_lower_case() {
    assert_eq!(ValueType::Int64.name(), "int64");
    assert_eq!(ValueType::String.name(), "string");
    assert_eq!(ValueType::DateTime.name(), "date");
    assert_eq!(ValueType::Document.name(), "object");
    assert_eq!(Value::Null.value_type(), ValueType::Null);
}

#[test]
fn test_expected_display() {
    assert_eq!(Expected::Type(ValueType::Boolean).to_string(), "boolean");
    assert_eq!(Expected::Number.to_string(), "number");
    assert_eq!(Expected::DateOrTimestamp.to_string(), "date or timestamp");
}

#[test]
fn test_types_mismatch_message() {
    let plain = TypesMismatch::new("v", Expected::Type(ValueType::Int64), ValueType::String);
    assert_eq!(
        plain.to_string(),
        "Expected \"v\" field to have type int64, but found string"
    );

    let with_origin = plain.in_context("response to replSetHeartbeat");
    assert_eq!(
        with_origin.to_string(),
        "Expected \"v\" field in response to replSetHeartbeat to have type int64, but found string"
    );
}

// =============================================================================
// Numeric Conversions
// =============================================================================

#[test]
fn test_int32_widens_to_int64_and_double() {
    let value = Value::Int32(7);
    assert_eq!(value.to_i64().unwrap(), 7);
    assert_eq!(value.to_f64().unwrap(), 7.0);
}

#[test]
fn test_double_does_not_narrow() {
    let err = Value::Double(1.5).to_i64().unwrap_err();
    assert_eq!(err.found, ValueType::Double);
    assert_eq!(err.expected, Expected::Type(ValueType::Int64));

    assert!(Value::Int64(1).to_i32().is_err());
}

#[test]
fn test_to_number_accepts_every_numeric_tag() {
    assert_eq!(Value::Int32(1).to_number().unwrap(), Number::Int32(1));
    assert_eq!(Value::Int64(2).to_number().unwrap(), Number::Int64(2));
    assert_eq!(Value::Double(3.0).to_number().unwrap(), Number::Double(3.0));
    assert!(Value::from("3").to_number().is_err());
}

#[test]
fn test_number_compact() {
    assert_eq!(Number::compact(5), Number::Int32(5));
    assert_eq!(Number::compact(1 << 40), Number::Int64(1 << 40));
    assert_eq!(Number::Double(2.9).as_i64(), 2);
}

// =============================================================================
// Identifiers and Clocks
// =============================================================================

#[test]
fn test_object_id_hex() {
    let oid: ObjectId = "507f1f77bcf86cd799439011".parse().unwrap();
    assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
    assert_eq!(oid.bytes()[0], 0x50);
}

#[test]
fn test_object_id_rejects_bad_hex() {
    match "xyz".parse::<ObjectId>() {
        Err(WireError::BadValue(_)) => {}
        other => panic!("Expected BadValue, got {:?}", other),
    }
    assert!("zz7f1f77bcf86cd799439011".parse::<ObjectId>().is_err());
}

#[test]
fn test_timestamp_packing() {
    let ts = Timestamp::new(100, 3);
    assert_eq!(ts.to_u64(), (100u64 << 32) | 3);
    assert_eq!(Timestamp::from_u64(ts.to_u64()), ts);
}

#[test]
fn test_value_display() {
    assert_eq!(Value::Int64(4).to_string(), "NumberLong(4)");
    assert_eq!(Value::from("rs0").to_string(), "\"rs0\"");
    assert_eq!(
        Value::Array(vec![Value::Int32(1), Value::Null]).to_string(),
        "[1, null]"
    );
}
