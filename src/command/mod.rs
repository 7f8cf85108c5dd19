//! Command Module
//!
//! The marshalling contract binding a named wire command to a typed
//! argument and a typed reply.
//!
//! ## Request Flow
//! ```text
//!   request doc ──unmarshall_arg──► Arg ──(engine)──► Reply ──marshall_result──► reply doc
//!        │                                                    │
//!        └──────────── error ──► { ok: 0, errmsg, code } ◄────┘
//! ```
//!
//! Commands are stateless values; one instance serves every caller.

mod registry;

pub use registry::{CommandGroup, CommandRegistry, GetLogType, ProcessorCaller, QueryCommand};

use crate::bson::{Document, DocumentBuilder, DoubleField, IntField, StringField};
use crate::error::{Result, WireError};

/// Value of `ok` in a successful reply
pub const OK: f64 = 1.0;

/// Value of `ok` in a failed reply
pub const KO: f64 = 0.0;

pub(crate) const OK_FIELD: DoubleField = DoubleField::new("ok");
pub(crate) const ERR_MSG_FIELD: StringField = StringField::new("errmsg");
pub(crate) const CODE_FIELD: IntField = IntField::new("code");

/// A named command with typed argument and reply marshalling
pub trait Command: Send + Sync {
    type Arg;
    type Reply;

    /// Wire name, the first key of the request document
    fn name(&self) -> &'static str;

    fn unmarshall_arg(&self, doc: &Document) -> Result<Self::Arg>;

    fn marshall_arg(&self, arg: &Self::Arg) -> Document;

    fn unmarshall_result(&self, doc: &Document) -> Result<Self::Reply>;

    fn marshall_result(&self, reply: &Self::Reply) -> Document;

    /// Whether `reply` is already final, so the caller can stop waiting
    fn is_ready_to_reply_result(&self, _reply: &Self::Reply) -> bool {
        true
    }
}

/// Reply of commands that answer with nothing but `ok`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Empty;

/// The `{ ok: 0, errmsg, code }` document reporting `err` to a peer
pub fn error_reply(err: &WireError) -> Document {
    DocumentBuilder::with_capacity(3)
        .append(&OK_FIELD, KO)
        .append(&ERR_MSG_FIELD, err.to_string())
        .append(&CODE_FIELD, err.code().code())
        .build()
}

/// Run one inbound request through `command`
///
/// Unmarshalls the argument, hands it to `handler`, and marshalls either the
/// reply or the failure. Replies lacking an `ok` field get `ok: 1` appended.
pub fn execute<C, F>(command: &C, request: &Document, handler: F) -> Document
where
    C: Command,
    F: FnOnce(C::Arg) -> Result<C::Reply>,
{
    let outcome = command.unmarshall_arg(request).and_then(handler);

    match outcome {
        Ok(reply) => {
            let doc = command.marshall_result(&reply);
            if doc.contains_key(OK_FIELD.name()) {
                doc
            } else {
                DocumentBuilder::from_document(&doc).append(&OK_FIELD, OK).build()
            }
        }
        Err(e) => {
            tracing::debug!("Command {} failed: {}", command.name(), e);
            error_reply(&e)
        }
    }
}
