//! Tests for DocumentBuilder
//!
//! These tests verify:
//! - Insertion order is preserved
//! - Duplicate appends keep the last value at the original position
//! - Optional and null appends

use mongowire::bson::{
    BooleanField, DocField, DocumentBuilder, IntField, LongField, StringField, Value,
};

const NAME: StringField = StringField::new("name");
const SIZE: IntField = IntField::new("size");
const VERSION: LongField = LongField::new("version");
const ACTIVE: BooleanField = BooleanField::new("active");
const NESTED: DocField = DocField::new("nested");

#[test]
fn test_append_preserves_order() {
    let doc = DocumentBuilder::new()
        .append(&NAME, "rs0")
        .append(&SIZE, 3)
        .append(&VERSION, 9i64)
        .build();

    let keys: Vec<&str> = doc.keys().collect();
    assert_eq!(keys, vec!["name", "size", "version"]);
    assert_eq!(doc.first_key(), Some("name"));
    assert_eq!(doc.get("version"), Some(&Value::Int64(9)));
}

#[test]
fn test_duplicate_append_keeps_last_value_in_place() {
    let doc = DocumentBuilder::new()
        .append(&NAME, "first")
        .append(&SIZE, 1)
        .append(&NAME, "second")
        .build();

    assert_eq!(doc.len(), 2);
    let entries: Vec<(&str, &Value)> = doc.iter().collect();
    assert_eq!(entries[0], ("name", &Value::from("second")));
    assert_eq!(entries[1], ("size", &Value::Int32(1)));
}

#[test]
fn test_append_opt_omits_none() {
    let doc = DocumentBuilder::new()
        .append_opt(&SIZE, None::<i32>)
        .append_opt(&ACTIVE, Some(true))
        .build();

    assert!(!doc.contains_key("size"));
    assert_eq!(doc.get("active"), Some(&Value::Boolean(true)));
}

#[test]
fn test_append_null_is_present() {
    let doc = DocumentBuilder::new().append_null(&NAME).build();
    assert!(doc.contains_key("name"));
    assert_eq!(doc.get("name"), Some(&Value::Null));
}

#[test]
fn test_copy_and_nested() {
    let inner = DocumentBuilder::new().append(&SIZE, 2).build();
    let base = DocumentBuilder::new()
        .append(&NAME, "a")
        .append(&NESTED, inner.clone())
        .build();

    let builder = DocumentBuilder::new().append(&NAME, "b").copy(&base);
    assert!(builder.contains_field(&NESTED));

    let doc = builder.build();
    assert_eq!(doc.get("name"), Some(&Value::from("a")));
    assert_eq!(doc.get("nested"), Some(&Value::Document(inner)));
}

#[test]
fn test_display() {
    let doc = DocumentBuilder::new()
        .append(&NAME, "rs0")
        .append(&SIZE, 3)
        .build();
    assert_eq!(doc.to_string(), "{ \"name\": \"rs0\", \"size\": 3 }");
    assert_eq!(DocumentBuilder::new().build().to_string(), "{}");
}
