//! Handshake command
//!
//! The identity exchange a replica sends when opening a replication
//! connection to its sync source.
//!
//! ## Wire Shapes
//! ```text
//! { handshake: ObjectId, member: Int64?, config: Document? }
//! { replSetUpdatePosition: 1, handshake: { ... } }
//! ```

use std::fmt;

use crate::bson::{reader, DocField, Document, DocumentBuilder, IntField, LongField, ObjectId, ObjectIdField};
use crate::command::{Command, Empty};
use crate::error::{Result, WireError};

use super::MemberConfig;

const REPL_SET_UPDATE_POSITION_FIELD: IntField = IntField::new("replSetUpdatePosition");
const HANDSHAKE_OBJ_FIELD: DocField = DocField::new("handshake");
const RID_FIELD: ObjectIdField = ObjectIdField::new("handshake");
const MEMBER_FIELD: LongField = LongField::new("member");
const CONFIG_FIELD: DocField = DocField::new("config");

/// The `handshake` command
#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeCommand;

impl Command for HandshakeCommand {
    type Arg = HandshakeArgument;
    type Reply = Empty;

    fn name(&self) -> &'static str {
        RID_FIELD.name()
    }

    fn unmarshall_arg(&self, doc: &Document) -> Result<HandshakeArgument> {
        HandshakeArgument::unmarshall(doc)
    }

    fn marshall_arg(&self, arg: &HandshakeArgument) -> Document {
        arg.marshall()
    }

    fn unmarshall_result(&self, _doc: &Document) -> Result<Empty> {
        Ok(Empty)
    }

    fn marshall_result(&self, _reply: &Empty) -> Document {
        Document::new()
    }
}

/// Identity of the replica opening the connection
#[derive(Debug, Clone, PartialEq)]
pub struct HandshakeArgument {
    /// Replica identity
    pub rid: ObjectId,
    pub member_id: Option<i64>,
    /// Only sent by peers predating identity-only handshakes
    pub config: Option<MemberConfig>,
}

impl HandshakeArgument {
    pub fn new(rid: ObjectId, member_id: Option<i64>, config: Option<MemberConfig>) -> Self {
        Self {
            rid,
            member_id,
            config,
        }
    }

    /// Identity-only handshake
    pub fn from_rid(rid: ObjectId) -> Self {
        Self::new(rid, None, None)
    }

    /// Member id to act on; a legacy config overrides the bare id
    pub fn effective_member_id(&self) -> Option<i64> {
        match &self.config {
            Some(config) => Some(config.id as i64),
            None => self.member_id,
        }
    }

    pub fn unmarshall(doc: &Document) -> Result<Self> {
        let rid = reader::get(doc, &RID_FIELD)?;
        let member_id = reader::get_opt(doc, &MEMBER_FIELD)?;
        let config = reader::get_opt(doc, &CONFIG_FIELD)?
            .map(|config_doc| MemberConfig::from_document(&config_doc))
            .transpose()?;

        Ok(Self::new(rid, member_id, config))
    }

    /// Bare handshake document; absent member id and config are left out
    pub fn marshall(&self) -> Document {
        DocumentBuilder::with_capacity(3)
            .append(&RID_FIELD, self.rid)
            .append_opt(&MEMBER_FIELD, self.member_id)
            .append_opt(&CONFIG_FIELD, self.config.as_ref().map(MemberConfig::to_document))
            .build()
    }

    /// The handshake wrapped in a position-update envelope, as sent on the wire
    pub fn marshall_as_repl_set_update(&self) -> Document {
        DocumentBuilder::with_capacity(2)
            .append(&REPL_SET_UPDATE_POSITION_FIELD, 1)
            .append(&HANDSHAKE_OBJ_FIELD, self.marshall())
            .build()
    }

    /// Unwrap a position-update envelope produced by `marshall_as_repl_set_update`
    pub fn unmarshall_repl_set_update(doc: &Document) -> Result<Self> {
        if !reader::contains(doc, &REPL_SET_UPDATE_POSITION_FIELD) {
            return Err(WireError::no_such_key(REPL_SET_UPDATE_POSITION_FIELD.name()));
        }
        let inner = reader::get(doc, &HANDSHAKE_OBJ_FIELD)?;
        Self::unmarshall(&inner)
    }
}

impl fmt::Display for HandshakeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marshall())
    }
}
