//! Value definitions
//!
//! The closed set of value kinds a document can hold.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WireError};

use super::Document;

/// The tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Int32,
    Int64,
    Double,
    String,
    Timestamp,
    DateTime,
    ObjectId,
    Array,
    Document,
}

impl ValueType {
    /// Lower-case canonical name, as used in error messages
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Int32 => "int32",
            ValueType::Int64 => "int64",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Timestamp => "timestamp",
            ValueType::DateTime => "date",
            ValueType::ObjectId => "objectid",
            ValueType::Array => "array",
            ValueType::Document => "object",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Int32 | ValueType::Int64 | ValueType::Double)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a reader was willing to accept for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Exactly this tag (or a sanctioned widening of it)
    Type(ValueType),
    /// Any of int32, int64 or double
    Number,
    /// A date or a timestamp, both readable as an op time
    DateOrTimestamp,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Type(value_type) => f.write_str(value_type.name()),
            Expected::Number => f.write_str("number"),
            Expected::DateOrTimestamp => f.write_str("date or timestamp"),
        }
    }
}

/// Expected-vs-found outcome of a failed value conversion
///
/// The reader layer turns this into a [`crate::error::TypesMismatch`] once it
/// knows the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMismatch {
    pub expected: Expected,
    pub found: ValueType,
}

// =============================================================================
// Scalar Types
// =============================================================================

/// Logical clock pair: seconds since epoch plus an ordinal within the second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    pub seconds: u32,
    pub increment: u32,
}

impl Timestamp {
    pub const fn new(seconds: u32, increment: u32) -> Self {
        Self { seconds, increment }
    }

    /// The packed 64-bit form used on the wire (seconds in the high half)
    pub fn to_u64(self) -> u64 {
        ((self.seconds as u64) << 32) | self.increment as u64
    }

    pub fn from_u64(raw: u64) -> Self {
        Self {
            seconds: (raw >> 32) as u32,
            increment: raw as u32,
        }
    }
}

/// An instant, stored as milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime(pub i64);

impl DateTime {
    pub fn from_millis(millis: i64) -> Self {
        DateTime(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }
}

/// 12-byte object identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl FromStr for ObjectId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 24 || !s.is_ascii() {
            return Err(WireError::BadValue(format!(
                "Invalid object id \"{}\": expected 24 hex digits",
                s
            )));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                WireError::BadValue(format!("Invalid object id \"{}\": not hexadecimal", s))
            })?;
        }
        Ok(ObjectId(bytes))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A numeric value read through a widening field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

impl Number {
    /// Truncating conversion; doubles lose their fraction
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int32(v) => v as i64,
            Number::Int64(v) => v,
            Number::Double(v) => v as i64,
        }
    }

    /// Lossless conversion to 32 bits; `None` for fractions and out-of-range values
    pub fn exact_i32(self) -> Option<i32> {
        match self {
            Number::Int32(v) => Some(v),
            Number::Int64(v) => i32::try_from(v).ok(),
            Number::Double(v) if v.fract() == 0.0
                && v >= i32::MIN as f64
                && v <= i32::MAX as f64 => Some(v as i32),
            Number::Double(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int32(v) => v as f64,
            Number::Int64(v) => v as f64,
            Number::Double(v) => v,
        }
    }

    /// Smallest integer encoding that holds `value`
    pub fn compact(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(small) => Number::Int32(small),
            Err(_) => Number::Int64(value),
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int32(v) => Value::Int32(v),
            Number::Int64(v) => Value::Int64(v),
            Number::Double(v) => Value::Double(v),
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A single document value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Timestamp(Timestamp),
    DateTime(DateTime),
    ObjectId(ObjectId),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Get the value's tag
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Int32(_) => ValueType::Int32,
            Value::Int64(_) => ValueType::Int64,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::DateTime(_) => ValueType::DateTime,
            Value::ObjectId(_) => ValueType::ObjectId,
            Value::Array(_) => ValueType::Array,
            Value::Document(_) => ValueType::Document,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: Expected) -> KindMismatch {
        KindMismatch {
            expected,
            found: self.value_type(),
        }
    }

    pub fn to_bool(&self) -> std::result::Result<bool, KindMismatch> {
        match self {
            Value::Boolean(v) => Ok(*v),
            other => Err(other.mismatch(Expected::Type(ValueType::Boolean))),
        }
    }

    pub fn to_i32(&self) -> std::result::Result<i32, KindMismatch> {
        match self {
            Value::Int32(v) => Ok(*v),
            other => Err(other.mismatch(Expected::Type(ValueType::Int32))),
        }
    }

    /// Int64, or an Int32 widened to 64 bits
    pub fn to_i64(&self) -> std::result::Result<i64, KindMismatch> {
        match self {
            Value::Int64(v) => Ok(*v),
            Value::Int32(v) => Ok(*v as i64),
            other => Err(other.mismatch(Expected::Type(ValueType::Int64))),
        }
    }

    /// Double, or any integer widened to a double
    pub fn to_f64(&self) -> std::result::Result<f64, KindMismatch> {
        match self {
            Value::Double(v) => Ok(*v),
            Value::Int64(v) => Ok(*v as f64),
            Value::Int32(v) => Ok(*v as f64),
            other => Err(other.mismatch(Expected::Type(ValueType::Double))),
        }
    }

    pub fn to_number(&self) -> std::result::Result<Number, KindMismatch> {
        match self {
            Value::Int32(v) => Ok(Number::Int32(*v)),
            Value::Int64(v) => Ok(Number::Int64(*v)),
            Value::Double(v) => Ok(Number::Double(*v)),
            other => Err(other.mismatch(Expected::Number)),
        }
    }

    pub fn as_str(&self) -> std::result::Result<&str, KindMismatch> {
        match self {
            Value::String(v) => Ok(v),
            other => Err(other.mismatch(Expected::Type(ValueType::String))),
        }
    }

    pub fn as_document(&self) -> std::result::Result<&Document, KindMismatch> {
        match self {
            Value::Document(v) => Ok(v),
            other => Err(other.mismatch(Expected::Type(ValueType::Document))),
        }
    }

    pub fn as_array(&self) -> std::result::Result<&[Value], KindMismatch> {
        match self {
            Value::Array(v) => Ok(v),
            other => Err(other.mismatch(Expected::Type(ValueType::Array))),
        }
    }

    pub fn to_object_id(&self) -> std::result::Result<ObjectId, KindMismatch> {
        match self {
            Value::ObjectId(v) => Ok(*v),
            other => Err(other.mismatch(Expected::Type(ValueType::ObjectId))),
        }
    }

    pub fn to_timestamp(&self) -> std::result::Result<Timestamp, KindMismatch> {
        match self {
            Value::Timestamp(v) => Ok(*v),
            other => Err(other.mismatch(Expected::Type(ValueType::Timestamp))),
        }
    }

    pub fn to_date_time(&self) -> std::result::Result<DateTime, KindMismatch> {
        match self {
            Value::DateTime(v) => Ok(*v),
            other => Err(other.mismatch(Expected::Type(ValueType::DateTime))),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Document(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "NumberLong({})", v),
            Value::Double(v) => write!(f, "{:?}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Timestamp(ts) => write!(f, "Timestamp({}, {})", ts.seconds, ts.increment),
            Value::DateTime(dt) => write!(f, "Date({})", dt.0),
            Value::ObjectId(oid) => write!(f, "ObjectId(\"{}\")", oid),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}
