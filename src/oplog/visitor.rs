//! Oplog visitor
//!
//! One method per operation kind. There are no default methods, so adding a
//! kind breaks every visitor until it handles it.

use super::operation::{
    CommandPayload, DeletePayload, InsertPayload, NoopPayload, OplogOperation, UpdatePayload,
};

/// Per-kind handling of oplog operations, producing `R` from an extra `A`
pub trait OplogOperationVisitor<R, A> {
    fn visit_insert(&mut self, op: &OplogOperation, insert: &InsertPayload, arg: A) -> R;

    fn visit_update(&mut self, op: &OplogOperation, update: &UpdatePayload, arg: A) -> R;

    fn visit_delete(&mut self, op: &OplogOperation, delete: &DeletePayload, arg: A) -> R;

    fn visit_command(&mut self, op: &OplogOperation, command: &CommandPayload, arg: A) -> R;

    fn visit_noop(&mut self, op: &OplogOperation, noop: &NoopPayload, arg: A) -> R;
}
