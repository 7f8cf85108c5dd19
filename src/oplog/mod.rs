//! Oplog Module
//!
//! The closed set of replicated operation kinds.
//!
//! ## Responsibilities
//! - Operation header (database, op time, hash, version, migration flag)
//! - Kind-specific payloads
//! - Descriptive document encoding and decoding
//! - Exhaustive visitor dispatch

mod operation;
mod visitor;

pub use operation::{
    CommandPayload, DeletePayload, InsertPayload, NoopPayload, OplogOperation,
    OplogOperationType, OplogPayload, OplogVersion, UpdatePayload,
};
pub use visitor::OplogOperationVisitor;
