//! Request message definitions
//!
//! Structured forms of the request frames this crate decodes.

use crate::bson::Document;

use super::{OpCode, RequestBaseMessage};

/// Fetch the next batch from an open cursor
#[derive(Debug, Clone, PartialEq)]
pub struct GetMoreMessage {
    pub base: RequestBaseMessage,
    /// `database.collection`
    pub full_collection_name: String,
    pub number_to_return: i32,
    pub cursor_id: i64,
}

impl GetMoreMessage {
    /// Database part of the namespace
    pub fn database(&self) -> &str {
        split_namespace(&self.full_collection_name).0
    }

    pub fn collection(&self) -> &str {
        split_namespace(&self.full_collection_name).1
    }
}

/// Close cursors the client no longer needs
#[derive(Debug, Clone, PartialEq)]
pub struct KillCursorsMessage {
    pub base: RequestBaseMessage,
    pub cursor_ids: Vec<i64>,
}

/// Query flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryFlags(pub u32);

impl QueryFlags {
    pub const TAILABLE_CURSOR: u32 = 1 << 1;
    pub const SLAVE_OK: u32 = 1 << 2;
    pub const OPLOG_REPLAY: u32 = 1 << 3;
    pub const NO_CURSOR_TIMEOUT: u32 = 1 << 4;
    pub const AWAIT_DATA: u32 = 1 << 5;
    pub const EXHAUST: u32 = 1 << 6;
    pub const PARTIAL: u32 = 1 << 7;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// A query, or a command addressed to `database.$cmd`
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMessage {
    pub base: RequestBaseMessage,
    pub flags: QueryFlags,
    pub full_collection_name: String,
    pub number_to_skip: i32,
    pub number_to_return: i32,
    pub query: Document,
    pub return_fields_selector: Option<Document>,
}

impl QueryMessage {
    pub fn database(&self) -> &str {
        split_namespace(&self.full_collection_name).0
    }

    pub fn collection(&self) -> &str {
        split_namespace(&self.full_collection_name).1
    }

    /// Commands travel as queries against the `$cmd` pseudo-collection
    pub fn is_command(&self) -> bool {
        self.collection() == "$cmd"
    }
}

/// Any decoded request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestMessage {
    GetMore(GetMoreMessage),
    KillCursors(KillCursorsMessage),
    Query(QueryMessage),
}

impl RequestMessage {
    pub fn base(&self) -> &RequestBaseMessage {
        match self {
            RequestMessage::GetMore(m) => &m.base,
            RequestMessage::KillCursors(m) => &m.base,
            RequestMessage::Query(m) => &m.base,
        }
    }

    pub fn op_code(&self) -> OpCode {
        self.base().op_code
    }
}

/// Split `db.coll.sub` into (`db`, `coll.sub`)
fn split_namespace(namespace: &str) -> (&str, &str) {
    namespace.split_once('.').unwrap_or((namespace, ""))
}
