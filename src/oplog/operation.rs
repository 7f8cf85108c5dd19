//! Oplog operations
//!
//! One replicated event: the common header every kind carries plus the
//! kind-specific payload.
//!
//! ## Descriptive Document
//! ```text
//! { ts, h, v, op, ns, o?, o2?, b?, fromMigrate? }
//!
//!   op   ns               o              o2       b
//!   i    <db>.<coll>      document       -        -
//!   u    <db>.<coll>      modification   filter   upsert
//!   d    <db>.<coll>      filter         -        justOne
//!   c    <db>.$cmd        command        -        -
//!   n    ""               message?       -        -
//! ```

use std::fmt;

use crate::bson::{
    reader, BooleanField, DocField, Document, DocumentBuilder, IntField, LongField, StringField,
    TimestampField,
};
use crate::error::{Result, WireError};
use crate::repl::{get_op_time, OpTime};

use super::visitor::OplogOperationVisitor;

const TS_FIELD: TimestampField = TimestampField::new("ts");
const HASH_FIELD: LongField = LongField::new("h");
const VERSION_FIELD: IntField = IntField::new("v");
const OP_FIELD: StringField = StringField::new("op");
const NS_FIELD: StringField = StringField::new("ns");
const OBJECT_FIELD: DocField = DocField::new("o");
const QUERY_FIELD: DocField = DocField::new("o2");
const FLAG_FIELD: BooleanField = BooleanField::new("b");
const FROM_MIGRATE_FIELD: BooleanField = BooleanField::new("fromMigrate");

/// Collection suffix addressing a database's command namespace
const COMMAND_COLLECTION: &str = "$cmd";

// =============================================================================
// Kinds and versions
// =============================================================================

/// Kind of a replicated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OplogOperationType {
    Insert,
    Update,
    Delete,
    Command,
    Noop,
}

impl OplogOperationType {
    /// The single-letter `op` value
    pub fn oplog_name(self) -> &'static str {
        match self {
            OplogOperationType::Insert => "i",
            OplogOperationType::Update => "u",
            OplogOperationType::Delete => "d",
            OplogOperationType::Command => "c",
            OplogOperationType::Noop => "n",
        }
    }

    pub fn from_oplog_name(name: &str) -> Result<Self> {
        match name {
            "i" => Ok(OplogOperationType::Insert),
            "u" => Ok(OplogOperationType::Update),
            "d" => Ok(OplogOperationType::Delete),
            "c" => Ok(OplogOperationType::Command),
            "n" => Ok(OplogOperationType::Noop),
            other => Err(WireError::BadValue(format!(
                "Unknown oplog operation type: {}",
                other
            ))),
        }
    }
}

/// Version of the oplog entry format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OplogVersion {
    V1 = 1,
    V2 = 2,
}

impl OplogVersion {
    pub fn from_version(version: i32) -> Result<Self> {
        match version {
            1 => Ok(OplogVersion::V1),
            2 => Ok(OplogVersion::V2),
            other => Err(WireError::BadValue(format!(
                "Unsupported oplog version: {}",
                other
            ))),
        }
    }

    pub fn version(self) -> i32 {
        self as i32
    }
}

impl Default for OplogVersion {
    fn default() -> Self {
        OplogVersion::V2
    }
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InsertPayload {
    pub collection: String,
    pub document: Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    pub collection: String,
    /// Selects the document to modify
    pub filter: Document,
    pub modification: Document,
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletePayload {
    pub collection: String,
    pub filter: Document,
    pub just_one: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandPayload {
    pub command: Document,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoopPayload {
    /// Free-form note, often absent
    pub message: Option<Document>,
}

/// Kind-specific part of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum OplogPayload {
    Insert(InsertPayload),
    Update(UpdatePayload),
    Delete(DeletePayload),
    Command(CommandPayload),
    Noop(NoopPayload),
}

impl OplogPayload {
    pub fn get_type(&self) -> OplogOperationType {
        match self {
            OplogPayload::Insert(_) => OplogOperationType::Insert,
            OplogPayload::Update(_) => OplogOperationType::Update,
            OplogPayload::Delete(_) => OplogOperationType::Delete,
            OplogPayload::Command(_) => OplogOperationType::Command,
            OplogPayload::Noop(_) => OplogOperationType::Noop,
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// A single replicated event
#[derive(Debug, Clone, PartialEq)]
pub struct OplogOperation {
    pub database: String,
    pub op_time: OpTime,
    pub hash: i64,
    pub version: OplogVersion,
    /// Written by a chunk migration rather than a client
    pub from_migrate: bool,
    pub payload: OplogPayload,
}

impl OplogOperation {
    pub fn new(
        database: impl Into<String>,
        op_time: OpTime,
        hash: i64,
        version: OplogVersion,
        from_migrate: bool,
        payload: OplogPayload,
    ) -> Self {
        Self {
            database: database.into(),
            op_time,
            hash,
            version,
            from_migrate,
            payload,
        }
    }

    /// A no-op entry, as written by heartbeat-driven oplog bumps
    pub fn noop(
        message: Option<Document>,
        database: impl Into<String>,
        op_time: OpTime,
        hash: i64,
        version: OplogVersion,
        from_migrate: bool,
    ) -> Self {
        Self::new(
            database,
            op_time,
            hash,
            version,
            from_migrate,
            OplogPayload::Noop(NoopPayload { message }),
        )
    }

    pub fn get_type(&self) -> OplogOperationType {
        self.payload.get_type()
    }

    /// Dispatch to the visitor method matching this operation's kind
    pub fn accept<R, A, V>(&self, visitor: &mut V, arg: A) -> R
    where
        V: OplogOperationVisitor<R, A> + ?Sized,
    {
        match &self.payload {
            OplogPayload::Insert(insert) => visitor.visit_insert(self, insert, arg),
            OplogPayload::Update(update) => visitor.visit_update(self, update, arg),
            OplogPayload::Delete(delete) => visitor.visit_delete(self, delete, arg),
            OplogPayload::Command(command) => visitor.visit_command(self, command, arg),
            OplogPayload::Noop(noop) => visitor.visit_noop(self, noop, arg),
        }
    }

    /// The `{ts, h, v, op, ns, ...}` document describing this operation
    pub fn to_descriptive_document(&self) -> Document {
        let builder = DocumentBuilder::with_capacity(9)
            .append(&TS_FIELD, self.op_time)
            .append(&HASH_FIELD, self.hash)
            .append(&VERSION_FIELD, self.version.version())
            .append(&OP_FIELD, self.get_type().oplog_name());

        let builder = match &self.payload {
            OplogPayload::Insert(insert) => builder
                .append(&NS_FIELD, self.namespace(&insert.collection))
                .append(&OBJECT_FIELD, insert.document.clone()),
            OplogPayload::Update(update) => {
                let builder = builder
                    .append(&NS_FIELD, self.namespace(&update.collection))
                    .append(&OBJECT_FIELD, update.modification.clone())
                    .append(&QUERY_FIELD, update.filter.clone());
                append_flag(builder, update.upsert)
            }
            OplogPayload::Delete(delete) => {
                let builder = builder
                    .append(&NS_FIELD, self.namespace(&delete.collection))
                    .append(&OBJECT_FIELD, delete.filter.clone());
                append_flag(builder, delete.just_one)
            }
            OplogPayload::Command(command) => builder
                .append(&NS_FIELD, self.namespace(COMMAND_COLLECTION))
                .append(&OBJECT_FIELD, command.command.clone()),
            OplogPayload::Noop(noop) => builder
                .append(&NS_FIELD, "")
                .append_opt(&OBJECT_FIELD, noop.message.clone()),
        };

        if self.from_migrate {
            builder.append(&FROM_MIGRATE_FIELD, true).build()
        } else {
            builder.build()
        }
    }

    /// Parse a descriptive document back into an operation
    ///
    /// `ts` may be a timestamp or a date; `v` defaults to 2 and
    /// `fromMigrate` to false. A no-op's empty namespace leaves the database
    /// empty.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let op_time = get_op_time(doc, &TS_FIELD)?;
        let hash = reader::get(doc, &HASH_FIELD)?;
        let version = match reader::get_opt(doc, &VERSION_FIELD)? {
            Some(version) => OplogVersion::from_version(version)?,
            None => OplogVersion::default(),
        };
        let op_type = OplogOperationType::from_oplog_name(&reader::get(doc, &OP_FIELD)?)?;
        let namespace = reader::get(doc, &NS_FIELD)?;
        let from_migrate = reader::get_or(doc, &FROM_MIGRATE_FIELD, false)?;

        let (database, collection) = split_namespace(&namespace);

        let payload = match op_type {
            OplogOperationType::Insert => OplogPayload::Insert(InsertPayload {
                collection: require_collection(&namespace, collection)?,
                document: reader::get(doc, &OBJECT_FIELD)?,
            }),
            OplogOperationType::Update => OplogPayload::Update(UpdatePayload {
                collection: require_collection(&namespace, collection)?,
                filter: reader::get(doc, &QUERY_FIELD)?,
                modification: reader::get(doc, &OBJECT_FIELD)?,
                upsert: reader::get_or(doc, &FLAG_FIELD, false)?,
            }),
            OplogOperationType::Delete => OplogPayload::Delete(DeletePayload {
                collection: require_collection(&namespace, collection)?,
                filter: reader::get(doc, &OBJECT_FIELD)?,
                just_one: reader::get_or(doc, &FLAG_FIELD, false)?,
            }),
            OplogOperationType::Command => {
                if collection != Some(COMMAND_COLLECTION) {
                    return Err(WireError::BadValue(format!(
                        "Command operation on non-command namespace {}",
                        namespace
                    )));
                }
                OplogPayload::Command(CommandPayload {
                    command: reader::get(doc, &OBJECT_FIELD)?,
                })
            }
            OplogOperationType::Noop => OplogPayload::Noop(NoopPayload {
                message: reader::get_opt(doc, &OBJECT_FIELD)?,
            }),
        };

        Ok(Self::new(database, op_time, hash, version, from_migrate, payload))
    }

    fn namespace(&self, collection: &str) -> String {
        format!("{}.{}", self.database, collection)
    }
}

impl fmt::Display for OplogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_descriptive_document())
    }
}

fn append_flag(builder: DocumentBuilder, flag: bool) -> DocumentBuilder {
    if flag {
        builder.append(&FLAG_FIELD, true)
    } else {
        builder
    }
}

/// `db.coll.sub` splits at the first dot into `db` and `coll.sub`
fn split_namespace(namespace: &str) -> (&str, Option<&str>) {
    match namespace.split_once('.') {
        Some((database, collection)) => (database, Some(collection)),
        None => (namespace, None),
    }
}

fn require_collection(namespace: &str, collection: Option<&str>) -> Result<String> {
    match collection {
        Some(collection) if !collection.is_empty() => Ok(collection.to_string()),
        _ => Err(WireError::BadValue(format!(
            "Namespace {} does not name a collection",
            namespace
        ))),
    }
}
