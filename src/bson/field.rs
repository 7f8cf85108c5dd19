//! Field descriptors
//!
//! A field binds a key to the kind of value expected under it. Commands
//! declare their fields once as constants and use them for both building
//! and reading documents, so the two directions cannot disagree.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, TypesMismatch, WireError};
use crate::repl::HostAndPort;

use super::{DateTime, Document, Expected, KindMismatch, Number, ObjectId, Timestamp, Value, ValueType};

/// Conversion between a Rust type and the document value kind it travels as
pub trait FieldKind {
    type Value;

    /// Reported in type-mismatch errors
    const EXPECTED: Expected;

    fn to_value(value: Self::Value) -> Value;

    fn from_value(field: &str, value: &Value) -> Result<Self::Value>;

    /// Whether a present value should be read as "no value"
    fn is_absent(value: &Value) -> bool {
        value.is_null()
    }
}

fn mismatch(field: &str, kind: KindMismatch) -> WireError {
    WireError::TypesMismatch(TypesMismatch::new(field, kind.expected, kind.found))
}

/// A named, statically typed document key
pub struct Field<K> {
    name: &'static str,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Field<K> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<K> Clone for Field<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Field<K> {}

impl<K: FieldKind> fmt::Debug for Field<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({:?}: {})", self.name, K::EXPECTED)
    }
}

impl<K> fmt::Display for Field<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// Field Kinds
// =============================================================================

macro_rules! simple_kind {
    ($kind:ident, $value:ty, $tag:ident, $convert:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub enum $kind {}

        impl FieldKind for $kind {
            type Value = $value;
            const EXPECTED: Expected = Expected::Type(ValueType::$tag);

            fn to_value(value: $value) -> Value {
                Value::from(value)
            }

            fn from_value(field: &str, value: &Value) -> Result<$value> {
                value.$convert().map_err(|kind| mismatch(field, kind))
            }
        }
    };
}

simple_kind!(BooleanKind, bool, Boolean, to_bool);
simple_kind!(IntKind, i32, Int32, to_i32);
simple_kind!(LongKind, i64, Int64, to_i64);
simple_kind!(DoubleKind, f64, Double, to_f64);
simple_kind!(ObjectIdKind, ObjectId, ObjectId, to_object_id);
simple_kind!(TimestampKind, Timestamp, Timestamp, to_timestamp);
simple_kind!(DateTimeKind, DateTime, DateTime, to_date_time);

#[derive(Debug, Clone, Copy)]
pub enum StringKind {}

impl FieldKind for StringKind {
    type Value = String;
    const EXPECTED: Expected = Expected::Type(ValueType::String);

    fn to_value(value: String) -> Value {
        Value::String(value)
    }

    fn from_value(field: &str, value: &Value) -> Result<String> {
        value
            .as_str()
            .map(str::to_string)
            .map_err(|kind| mismatch(field, kind))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DocKind {}

impl FieldKind for DocKind {
    type Value = Document;
    const EXPECTED: Expected = Expected::Type(ValueType::Document);

    fn to_value(value: Document) -> Value {
        Value::Document(value)
    }

    fn from_value(field: &str, value: &Value) -> Result<Document> {
        value
            .as_document()
            .cloned()
            .map_err(|kind| mismatch(field, kind))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ArrayKind {}

impl FieldKind for ArrayKind {
    type Value = Vec<Value>;
    const EXPECTED: Expected = Expected::Type(ValueType::Array);

    fn to_value(value: Vec<Value>) -> Value {
        Value::Array(value)
    }

    fn from_value(field: &str, value: &Value) -> Result<Vec<Value>> {
        value
            .as_array()
            .map(<[Value]>::to_vec)
            .map_err(|kind| mismatch(field, kind))
    }
}

/// Any numeric tag; written back in whatever width the value carries
#[derive(Debug, Clone, Copy)]
pub enum NumberKind {}

impl FieldKind for NumberKind {
    type Value = Number;
    const EXPECTED: Expected = Expected::Number;

    fn to_value(value: Number) -> Value {
        Value::from(value)
    }

    fn from_value(field: &str, value: &Value) -> Result<Number> {
        value.to_number().map_err(|kind| mismatch(field, kind))
    }
}

/// A `host[:port]` string
///
/// An empty string reads as "no host", which is how senders without a known
/// address fill the field.
#[derive(Debug, Clone, Copy)]
pub enum HostAndPortKind {}

impl FieldKind for HostAndPortKind {
    type Value = HostAndPort;
    const EXPECTED: Expected = Expected::Type(ValueType::String);

    fn to_value(value: HostAndPort) -> Value {
        Value::String(value.to_string())
    }

    fn from_value(field: &str, value: &Value) -> Result<HostAndPort> {
        let text = value.as_str().map_err(|kind| mismatch(field, kind))?;
        text.parse()
    }

    fn is_absent(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

pub type BooleanField = Field<BooleanKind>;
pub type IntField = Field<IntKind>;
pub type LongField = Field<LongKind>;
pub type DoubleField = Field<DoubleKind>;
pub type NumberField = Field<NumberKind>;
pub type StringField = Field<StringKind>;
pub type DocField = Field<DocKind>;
pub type ArrayField = Field<ArrayKind>;
pub type ObjectIdField = Field<ObjectIdKind>;
pub type TimestampField = Field<TimestampKind>;
pub type DateTimeField = Field<DateTimeKind>;
pub type HostAndPortField = Field<HostAndPortKind>;
