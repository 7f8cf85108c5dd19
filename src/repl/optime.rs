//! Operation time
//!
//! The logical clock used to order replicated operations and elections.

use std::fmt;

use crate::bson::{reader, Document, Expected, Timestamp, TimestampField, Value};
use crate::error::{Result, TypesMismatch, WireError};

/// A logical-clock pair ordering replicated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OpTime {
    pub seconds: u32,
    pub increment: u32,
}

impl OpTime {
    /// The zero time, used by replies that carry no election
    pub const EPOCH: OpTime = OpTime {
        seconds: 0,
        increment: 0,
    };

    pub const fn new(seconds: u32, increment: u32) -> Self {
        Self { seconds, increment }
    }

    pub fn timestamp(self) -> Timestamp {
        Timestamp::new(self.seconds, self.increment)
    }

    /// Legacy peers ship op times as dates whose 64 bits hold the packed clock
    pub fn from_date_bits(raw: i64) -> Self {
        Timestamp::from_u64(raw as u64).into()
    }

    /// Accept either a timestamp or a date
    pub fn from_value(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok((*ts).into()),
            Value::DateTime(dt) => Ok(Self::from_date_bits(dt.millis())),
            other => Err(WireError::TypesMismatch(TypesMismatch::new(
                field,
                Expected::DateOrTimestamp,
                other.value_type(),
            ))),
        }
    }
}

impl From<Timestamp> for OpTime {
    fn from(ts: Timestamp) -> Self {
        Self::new(ts.seconds, ts.increment)
    }
}

impl From<OpTime> for Timestamp {
    fn from(op_time: OpTime) -> Self {
        op_time.timestamp()
    }
}

impl fmt::Display for OpTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.seconds, self.increment)
    }
}

/// Read a required op time stored as a date or a timestamp
pub fn get_op_time(doc: &Document, field: &TimestampField) -> Result<OpTime> {
    match doc.get(field.name()) {
        Some(value) => OpTime::from_value(field.name(), value),
        None => Err(WireError::no_such_key(field.name())),
    }
}

/// Read an optional op time stored as a date or a timestamp
pub fn get_op_time_opt(doc: &Document, field: &TimestampField) -> Result<Option<OpTime>> {
    if !reader::contains(doc, field) {
        return Ok(None);
    }
    get_op_time(doc, field).map(Some)
}
