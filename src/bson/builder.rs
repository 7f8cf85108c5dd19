//! Document Builder
//!
//! Accumulates entries for a new document. The builder is consumed by
//! `build()`, so a finished builder can never be appended to again.

use super::field::{Field, FieldKind};
use super::{Document, Value};

/// Write-only, single-use document construction
///
/// ```
/// use mongowire::bson::{DocumentBuilder, IntField, StringField};
///
/// const NAME: StringField = StringField::new("name");
/// const SIZE: IntField = IntField::new("size");
///
/// let doc = DocumentBuilder::new()
///     .append(&NAME, "rs0")
///     .append(&SIZE, 3)
///     .build();
/// assert_eq!(doc.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    entries: Vec<(String, Value)>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Start from a copy of an existing document's entries
    pub fn from_document(doc: &Document) -> Self {
        Self::with_capacity(doc.len()).copy(doc)
    }

    /// Append every entry of `other`, overwriting keys already present
    pub fn copy(mut self, other: &Document) -> Self {
        for (key, value) in other {
            self.put(key, value.clone());
        }
        self
    }

    pub fn contains_field<K>(&self, field: &Field<K>) -> bool {
        self.entries.iter().any(|(k, _)| k == field.name())
    }

    /// Append a typed value under `field`
    pub fn append<K: FieldKind>(mut self, field: &Field<K>, value: impl Into<K::Value>) -> Self {
        self.put(field.name(), K::to_value(value.into()));
        self
    }

    /// Append only when `value` is present; `None` leaves the key out entirely
    pub fn append_opt<K: FieldKind, V: Into<K::Value>>(self, field: &Field<K>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.append(field, value),
            None => self,
        }
    }

    /// Append an explicit null, which readers distinguish from a missing key
    pub fn append_null<K>(mut self, field: &Field<K>) -> Self {
        self.put(field.name(), Value::Null);
        self
    }

    /// Append an untyped value under a raw key
    pub fn append_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.put(key, value.into());
        self
    }

    /// Finish the document
    pub fn build(self) -> Document {
        Document::from_entries(self.entries)
    }

    /// Overwrites keep the position the key was first appended at
    fn put(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}
