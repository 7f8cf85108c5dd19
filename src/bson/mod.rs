//! Document Module
//!
//! The binary document model and its construction/extraction discipline.
//!
//! ## Responsibilities
//! - Closed value model (`Value`, `ValueType`)
//! - Immutable ordered `Document`
//! - Typed field descriptors shared by builders and readers
//! - Move-once `DocumentBuilder`
//! - Fail-fast `reader` functions
//! - Little-endian binary `codec`
//!
//! ## Widening Rules
//! ```text
//!   Int32 ──► Int64 ──► Double      (accepted)
//!   Double ─X─► Int64 ─X─► Int32    (rejected, except through NumberField)
//! ```

mod value;
mod document;
mod builder;
mod field;

pub mod reader;
pub mod codec;

pub use value::{DateTime, Expected, KindMismatch, Number, ObjectId, Timestamp, Value, ValueType};
pub use document::Document;
pub use builder::DocumentBuilder;
pub use field::{
    ArrayField, ArrayKind, BooleanField, BooleanKind, DateTimeField, DateTimeKind, DocField,
    DocKind, DoubleField, DoubleKind, Field, FieldKind, HostAndPortField, HostAndPortKind,
    IntField, IntKind, LongField, LongKind, NumberField, NumberKind, ObjectIdField, ObjectIdKind,
    StringField, StringKind, TimestampField, TimestampKind,
};
