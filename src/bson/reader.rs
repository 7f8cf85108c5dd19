//! Document Reader
//!
//! Typed, fail-fast extraction of fields from a document.
//!
//! ## Outcomes
//! - key absent, no default:            `NoSuchKey`
//! - key present with an incompatible tag: `TypesMismatch` (never defaulted)
//! - key present with an explicit null:  treated as absent by the optional
//!   and defaulted getters, a `TypesMismatch` for the required ones

use crate::error::{Result, TypesMismatch, WireError};

use super::field::{Field, FieldKind};
use super::{Document, Expected, Number, Value};

/// Read a required field
pub fn get<K: FieldKind>(doc: &Document, field: &Field<K>) -> Result<K::Value> {
    match doc.get(field.name()) {
        Some(value) => K::from_value(field.name(), value),
        None => Err(WireError::no_such_key(field.name())),
    }
}

/// Read an optional field
pub fn get_opt<K: FieldKind>(doc: &Document, field: &Field<K>) -> Result<Option<K::Value>> {
    match doc.get(field.name()) {
        Some(value) if K::is_absent(value) => Ok(None),
        Some(value) => K::from_value(field.name(), value).map(Some),
        None => Ok(None),
    }
}

/// Read a field, substituting `default` only when it is absent
pub fn get_or<K: FieldKind>(
    doc: &Document,
    field: &Field<K>,
    default: impl Into<K::Value>,
) -> Result<K::Value> {
    Ok(get_opt(doc, field)?.unwrap_or_else(|| default.into()))
}

/// Read any numeric tag stored under `field`, whatever width it declares
pub fn get_number<K>(doc: &Document, field: &Field<K>) -> Result<Number> {
    match get_number_opt(doc, field)? {
        Some(number) => Ok(number),
        None => Err(WireError::no_such_key(field.name())),
    }
}

pub fn get_number_opt<K>(doc: &Document, field: &Field<K>) -> Result<Option<Number>> {
    match doc.get(field.name()) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.to_number().map(Some).map_err(|kind| {
            WireError::TypesMismatch(TypesMismatch::new(field.name(), Expected::Number, kind.found))
        }),
    }
}

/// Read an optional number that must be a whole value within 32 bits
pub fn get_i32_number_opt<K>(doc: &Document, field: &Field<K>) -> Result<Option<i32>> {
    match get_number_opt(doc, field)? {
        Some(number) => number.exact_i32().map(Some).ok_or_else(|| {
            WireError::BadValue(format!(
                "Value for \"{}\" is not a 32-bit integer: {:?}",
                field.name(),
                number
            ))
        }),
        None => Ok(None),
    }
}

/// Required variant of [`get_i32_number_opt`]
pub fn get_i32_number<K>(doc: &Document, field: &Field<K>) -> Result<i32> {
    match get_i32_number_opt(doc, field)? {
        Some(value) => Ok(value),
        None => Err(WireError::no_such_key(field.name())),
    }
}

pub fn contains<K>(doc: &Document, field: &Field<K>) -> bool {
    doc.contains_key(field.name())
}

/// Reject documents carrying any key outside `allowed`
///
/// `object_name` names the structure being parsed in the error message.
pub fn check_only_has_fields(object_name: &str, doc: &Document, allowed: &[&str]) -> Result<()> {
    match doc.keys().find(|key| !allowed.contains(key)) {
        Some(unexpected) => Err(WireError::BadValue(format!(
            "Unexpected field {} in {}",
            unexpected, object_name
        ))),
        None => Ok(()),
    }
}
