//! Heartbeat command
//!
//! The periodic liveness/status exchange between replica set members.
//!
//! ## Wire Shapes
//! ```text
//! argument: { replSetHeartbeat: String, pv: Int64, v: Int64, from: String,
//!             fromId: Int64?, checkEmpty: Bool? }
//! success:  { ok: 1.0, opTime?, time?, electionTime, config?, e, rs,
//!             stateDisagreement, state?, v, hbmsg, set?, syncingTo?, hasData? }
//! failure:  { ok: 0.0, code, errmsg }
//! mismatch: { ok: 0.0, mismatch: true }
//! ```
//!
//! Reply decoding carries the compatibility rules for older peers; the order
//! in which fields are inspected matters and is documented on
//! [`ReplSetHeartbeatReply::from_document`].

use crate::bson::{
    reader, BooleanField, DocField, Document, DocumentBuilder, HostAndPortField, IntField,
    LongField, Number, StringField, TimestampField,
};
use crate::command::{Command, CODE_FIELD, ERR_MSG_FIELD, KO, OK, OK_FIELD};
use crate::error::{with_context, ErrorCode, Result, WireError};

use super::optime::{get_op_time, get_op_time_opt};
use super::{HostAndPort, MemberState, OpTime, ReplSetProtocolVersion, ReplicaSetConfig};

/// Origin attached to type mismatches found in heartbeat replies
const REPLY_CONTEXT: &str = "response to replSetHeartbeat";

/// The `replSetHeartbeat` command
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplSetHeartbeatCommand;

impl Command for ReplSetHeartbeatCommand {
    type Arg = ReplSetHeartbeatArgument;
    type Reply = ReplSetHeartbeatReply;

    fn name(&self) -> &'static str {
        SET_NAME_FIELD.name()
    }

    fn unmarshall_arg(&self, doc: &Document) -> Result<ReplSetHeartbeatArgument> {
        ReplSetHeartbeatArgument::from_document(doc)
    }

    fn marshall_arg(&self, arg: &ReplSetHeartbeatArgument) -> Document {
        arg.to_document()
    }

    fn unmarshall_result(&self, doc: &Document) -> Result<ReplSetHeartbeatReply> {
        ReplSetHeartbeatReply::from_document(doc)
    }

    fn marshall_result(&self, reply: &ReplSetHeartbeatReply) -> Document {
        reply.to_document()
    }

    /// A failure is final at once; a status may still be waiting on data
    fn is_ready_to_reply_result(&self, reply: &ReplSetHeartbeatReply) -> bool {
        !reply.error_code().is_ok()
    }
}

// =============================================================================
// Argument
// =============================================================================

const CHECK_EMPTY_FIELD: BooleanField = BooleanField::new("checkEmpty");
const PROTOCOL_VERSION_FIELD: LongField = LongField::new("pv");
const CONFIG_VERSION_FIELD: LongField = LongField::new("v");
const SENDER_ID_FIELD: LongField = LongField::new("fromId");
const SET_NAME_FIELD: StringField = StringField::new("replSetHeartbeat");
const SENDER_HOST_FIELD: HostAndPortField = HostAndPortField::new("from");

const VALID_ARGUMENT_FIELDS: [&str; 6] = [
    "checkEmpty",
    "pv",
    "v",
    "fromId",
    "replSetHeartbeat",
    "from",
];

/// Wire value of `fromId` meaning "no id"; a real id of -1 cannot be sent
const ABSENT_SENDER_ID: i64 = -1;

/// Arguments of a heartbeat request
#[derive(Debug, Clone, PartialEq)]
pub struct ReplSetHeartbeatArgument {
    pub check_empty: bool,
    pub protocol_version: ReplSetProtocolVersion,
    pub config_version: i64,
    pub sender_id: Option<i32>,
    pub set_name: String,
    pub sender_host: Option<HostAndPort>,
}

impl ReplSetHeartbeatArgument {
    pub fn builder(
        protocol_version: ReplSetProtocolVersion,
        set_name: impl Into<String>,
    ) -> HeartbeatArgumentBuilder {
        HeartbeatArgumentBuilder {
            arg: ReplSetHeartbeatArgument {
                check_empty: false,
                protocol_version,
                config_version: 0,
                sender_id: None,
                set_name: set_name.into(),
                sender_host: None,
            },
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        reader::check_only_has_fields("ReplSetHeartbeatArgs", doc, &VALID_ARGUMENT_FIELDS)?;

        let check_empty = reader::get_or(doc, &CHECK_EMPTY_FIELD, false)?;
        let protocol_version =
            ReplSetProtocolVersion::from_version_id(reader::get(doc, &PROTOCOL_VERSION_FIELD)?)?;
        let config_version = reader::get(doc, &CONFIG_VERSION_FIELD)?;

        let sender_id = match reader::get_or(doc, &SENDER_ID_FIELD, ABSENT_SENDER_ID)? {
            ABSENT_SENDER_ID => None,
            raw => Some(
                i32::try_from(raw)
                    .ok()
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| {
                        WireError::BadValue(format!(
                            "Value for \"{}\" is out of range: {}",
                            SENDER_ID_FIELD, raw
                        ))
                    })?,
            ),
        };

        let set_name = reader::get(doc, &SET_NAME_FIELD)?;
        let sender_host = reader::get_opt(doc, &SENDER_HOST_FIELD)?;

        Ok(Self {
            check_empty,
            protocol_version,
            config_version,
            sender_id,
            set_name,
            sender_host,
        })
    }

    pub fn to_document(&self) -> Document {
        let builder = DocumentBuilder::with_capacity(VALID_ARGUMENT_FIELDS.len())
            .append(&SET_NAME_FIELD, self.set_name.as_str())
            .append(&PROTOCOL_VERSION_FIELD, self.protocol_version.version_id())
            .append(&CONFIG_VERSION_FIELD, self.config_version);

        let builder = match &self.sender_host {
            Some(host) => builder.append(&SENDER_HOST_FIELD, host.clone()),
            None => builder.append_value(SENDER_HOST_FIELD.name(), ""),
        };

        let builder = builder.append_opt(&SENDER_ID_FIELD, self.sender_id.map(i64::from));

        if self.check_empty {
            builder.append(&CHECK_EMPTY_FIELD, true).build()
        } else {
            builder.build()
        }
    }
}

/// Builder for ReplSetHeartbeatArgument
pub struct HeartbeatArgumentBuilder {
    arg: ReplSetHeartbeatArgument,
}

impl HeartbeatArgumentBuilder {
    pub fn protocol_version(mut self, protocol_version: ReplSetProtocolVersion) -> Self {
        self.arg.protocol_version = protocol_version;
        self
    }

    pub fn config_version(mut self, config_version: i64) -> Self {
        self.arg.config_version = config_version;
        self
    }

    pub fn sender_id(mut self, sender_id: i32) -> Self {
        self.arg.sender_id = Some(sender_id);
        self
    }

    pub fn set_name(mut self, set_name: impl Into<String>) -> Self {
        self.arg.set_name = set_name.into();
        self
    }

    pub fn sender_host(mut self, sender_host: HostAndPort) -> Self {
        self.arg.sender_host = Some(sender_host);
        self
    }

    pub fn check_empty(mut self, check_empty: bool) -> Self {
        self.arg.check_empty = check_empty;
        self
    }

    pub fn build(self) -> ReplSetHeartbeatArgument {
        self.arg
    }
}

// =============================================================================
// Reply
// =============================================================================

const CONFIG_FIELD: DocField = DocField::new("config");
const REPLY_CONFIG_VERSION_FIELD: LongField = LongField::new("v");
const ELECTION_TIME_FIELD: TimestampField = TimestampField::new("electionTime");
const HAS_DATA_FIELD: BooleanField = BooleanField::new("hasData");
const STATE_DISAGREEMENT_FIELD: BooleanField = BooleanField::new("stateDisagreement");
const HB_MESSAGE_FIELD: StringField = StringField::new("hbmsg");
const IS_ELECTABLE_FIELD: BooleanField = BooleanField::new("e");
const IS_REPL_SET_FIELD: BooleanField = BooleanField::new("rs");
const MEMBER_STATE_FIELD: IntField = IntField::new("state");
const MISMATCH_FIELD: BooleanField = BooleanField::new("mismatch");
const OP_TIME_FIELD: TimestampField = TimestampField::new("opTime");
const REPL_SET_FIELD: StringField = StringField::new("set");
const SYNC_SOURCE_FIELD: HostAndPortField = HostAndPortField::new("syncingTo");
const TIME_FIELD: LongField = LongField::new("time");

/// A heartbeat answered with an error
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatFailure {
    pub error_code: ErrorCode,
    pub message: String,
    /// The peers disagree on the replica set name
    pub mismatch: bool,
}

/// A heartbeat answered with the sender's status
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatStatus {
    pub election_time: OpTime,
    /// Sender's wall clock, in seconds
    pub time: Option<i64>,
    pub op_time: Option<OpTime>,
    pub electable: bool,
    pub has_data: Option<bool>,
    pub is_repl_set: bool,
    pub state_disagreement: bool,
    pub state: Option<MemberState>,
    pub config_version: i64,
    pub set_name: Option<String>,
    pub hbmsg: String,
    pub syncing_to: Option<HostAndPort>,
    /// Present when the sender's config is newer than the requester's
    pub config: Option<ReplicaSetConfig>,
}

impl HeartbeatStatus {
    pub fn builder(
        election_time: OpTime,
        set_name: impl Into<String>,
        hbmsg: impl Into<String>,
    ) -> HeartbeatStatusBuilder {
        HeartbeatStatusBuilder {
            status: HeartbeatStatus {
                election_time,
                time: None,
                op_time: None,
                electable: false,
                has_data: None,
                is_repl_set: false,
                state_disagreement: false,
                state: None,
                config_version: 0,
                set_name: Some(set_name.into()),
                hbmsg: hbmsg.into(),
                syncing_to: None,
                config: None,
            },
        }
    }

    /// Continue editing a copy of this status
    pub fn to_builder(&self) -> HeartbeatStatusBuilder {
        HeartbeatStatusBuilder {
            status: self.clone(),
        }
    }
}

/// Builder for HeartbeatStatus
pub struct HeartbeatStatusBuilder {
    status: HeartbeatStatus,
}

impl HeartbeatStatusBuilder {
    pub fn election_time(mut self, election_time: OpTime) -> Self {
        self.status.election_time = election_time;
        self
    }

    pub fn time(mut self, time: i64) -> Self {
        self.status.time = Some(time);
        self
    }

    pub fn op_time(mut self, op_time: OpTime) -> Self {
        self.status.op_time = Some(op_time);
        self
    }

    pub fn electable(mut self, electable: bool) -> Self {
        self.status.electable = electable;
        self
    }

    pub fn has_data(mut self, has_data: bool) -> Self {
        self.status.has_data = Some(has_data);
        self
    }

    pub fn is_repl_set(mut self, is_repl_set: bool) -> Self {
        self.status.is_repl_set = is_repl_set;
        self
    }

    pub fn state_disagreement(mut self, state_disagreement: bool) -> Self {
        self.status.state_disagreement = state_disagreement;
        self
    }

    pub fn state(mut self, state: MemberState) -> Self {
        self.status.state = Some(state);
        self
    }

    pub fn config_version(mut self, config_version: i64) -> Self {
        self.status.config_version = config_version;
        self
    }

    pub fn hbmsg(mut self, hbmsg: impl Into<String>) -> Self {
        self.status.hbmsg = hbmsg.into();
        self
    }

    pub fn syncing_to(mut self, syncing_to: HostAndPort) -> Self {
        self.status.syncing_to = Some(syncing_to);
        self
    }

    pub fn config(mut self, config: ReplicaSetConfig) -> Self {
        self.status.config = Some(config);
        self
    }

    pub fn build(self) -> HeartbeatStatus {
        self.status
    }
}

/// Reply to a heartbeat
#[derive(Debug, Clone, PartialEq)]
pub enum ReplSetHeartbeatReply {
    Failure(HeartbeatFailure),
    Success(HeartbeatStatus),
}

impl From<HeartbeatStatus> for ReplSetHeartbeatReply {
    fn from(status: HeartbeatStatus) -> Self {
        ReplSetHeartbeatReply::Success(status)
    }
}

impl ReplSetHeartbeatReply {
    pub fn failure(error_code: ErrorCode, message: impl Into<String>) -> Self {
        ReplSetHeartbeatReply::Failure(HeartbeatFailure {
            error_code,
            message: message.into(),
            mismatch: false,
        })
    }

    /// Reply telling the requester its set name differs from ours
    pub fn mismatch() -> Self {
        ReplSetHeartbeatReply::Failure(HeartbeatFailure {
            error_code: ErrorCode::InconsistentReplicaSetNames,
            message: String::new(),
            mismatch: true,
        })
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            ReplSetHeartbeatReply::Failure(failure) => failure.error_code,
            ReplSetHeartbeatReply::Success(_) => ErrorCode::Ok,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ReplSetHeartbeatReply::Failure(failure) if failure.mismatch)
    }

    pub fn status(&self) -> Option<&HeartbeatStatus> {
        match self {
            ReplSetHeartbeatReply::Success(status) => Some(status),
            ReplSetHeartbeatReply::Failure(_) => None,
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            ReplSetHeartbeatReply::Failure(failure) if failure.mismatch => DocumentBuilder::with_capacity(2)
                .append(&OK_FIELD, KO)
                .append(&MISMATCH_FIELD, true)
                .build(),
            ReplSetHeartbeatReply::Failure(failure) => DocumentBuilder::with_capacity(3)
                .append(&OK_FIELD, KO)
                .append(&CODE_FIELD, failure.error_code.code())
                .append(&ERR_MSG_FIELD, failure.message.as_str())
                .build(),
            ReplSetHeartbeatReply::Success(status) => DocumentBuilder::with_capacity(16)
                .append(&OK_FIELD, OK)
                .append_opt(&OP_TIME_FIELD, status.op_time)
                .append_opt(&TIME_FIELD, status.time)
                .append(&ELECTION_TIME_FIELD, status.election_time)
                .append_opt(&CONFIG_FIELD, status.config.as_ref().map(ReplicaSetConfig::to_document))
                .append(&IS_ELECTABLE_FIELD, status.electable)
                .append(&IS_REPL_SET_FIELD, status.is_repl_set)
                .append(&STATE_DISAGREEMENT_FIELD, status.state_disagreement)
                .append_opt(&MEMBER_STATE_FIELD, status.state.map(MemberState::id))
                .append(&REPLY_CONFIG_VERSION_FIELD, status.config_version)
                .append(&HB_MESSAGE_FIELD, status.hbmsg.as_str())
                .append_opt(&REPL_SET_FIELD, status.set_name.clone())
                .append_opt(&SYNC_SOURCE_FIELD, status.syncing_to.clone())
                .append_opt(&HAS_DATA_FIELD, status.has_data)
                .build(),
        }
    }

    /// Decode a reply, applying the legacy-peer rules in order:
    ///
    /// 1. `mismatch: true` fails with `InconsistentReplicaSetNames` before
    ///    anything else is looked at.
    /// 2. `set` is read leniently (absent is fine).
    /// 3. The reply is ok when `ok == 1` or `set` is present; old peers
    ///    sometimes send a set name alongside `ok: 0`.
    /// 4. Not ok: only `errmsg` and `code` are read.
    /// 5. Ok: the status fields are read; `v` is required only once the
    ///    sender reports an `opTime`.
    pub fn from_document(doc: &Document) -> Result<Self> {
        // Old versions set this even though they returned not "ok"
        if reader::get_or(doc, &MISMATCH_FIELD, false)? {
            return Err(WireError::InconsistentReplicaSetNames);
        }

        let set_name = with_context(reader::get_opt(doc, &REPL_SET_FIELD), REPLY_CONTEXT)?;

        let ok_value = reader::get_number_opt(doc, &OK_FIELD)?.map(Number::as_f64);
        if ok_value != Some(OK) && set_name.is_none() {
            return Self::failure_from_document(doc);
        }

        let has_data = reader::get_opt(doc, &HAS_DATA_FIELD)?;
        let election_time = with_context(get_op_time(doc, &ELECTION_TIME_FIELD), REPLY_CONTEXT)?;
        let time = reader::get_number_opt(doc, &TIME_FIELD)?.map(Number::as_i64);
        let is_repl_set = reader::get_or(doc, &IS_REPL_SET_FIELD, false)?;
        let op_time = with_context(get_op_time_opt(doc, &OP_TIME_FIELD), REPLY_CONTEXT)?;
        let electable = reader::get_or(doc, &IS_ELECTABLE_FIELD, false)?;

        let state = match reader::get_number_opt(doc, &MEMBER_STATE_FIELD)? {
            Some(id) => Some(
                i32::try_from(id.as_i64())
                    .ok()
                    .and_then(MemberState::from_id)
                    .ok_or_else(|| {
                        WireError::BadValue(format!(
                            "Value for \"{}\" in {} is out of range; legal values are \
                             non-negative and no more than {}",
                            MEMBER_STATE_FIELD,
                            REPLY_CONTEXT,
                            MemberState::MAX.id()
                        ))
                    })?,
            ),
            None => None,
        };

        let state_disagreement = reader::get_or(doc, &STATE_DISAGREEMENT_FIELD, false)?;

        let config_version = match with_context(
            reader::get_number_opt(doc, &REPLY_CONFIG_VERSION_FIELD),
            REPLY_CONTEXT,
        )? {
            Some(version) => version.as_i64(),
            None if op_time.is_some() => {
                return Err(WireError::NoSuchKey {
                    key: REPLY_CONFIG_VERSION_FIELD.name().to_string(),
                    reason: Some(format!(
                        "Response to replSetHeartbeat missing required \"{}\" field even though initialized",
                        REPLY_CONFIG_VERSION_FIELD
                    )),
                })
            }
            None => 0,
        };

        let hbmsg = with_context(reader::get_or(doc, &HB_MESSAGE_FIELD, ""), REPLY_CONTEXT)?;
        let syncing_to = with_context(reader::get_opt(doc, &SYNC_SOURCE_FIELD), REPLY_CONTEXT)?;
        let config = with_context(reader::get_opt(doc, &CONFIG_FIELD), REPLY_CONTEXT)?
            .map(|config_doc| ReplicaSetConfig::from_document(&config_doc))
            .transpose()?;

        Ok(ReplSetHeartbeatReply::Success(HeartbeatStatus {
            election_time,
            time,
            op_time,
            electable,
            has_data,
            is_repl_set,
            state_disagreement,
            state,
            config_version,
            set_name,
            hbmsg,
            syncing_to,
            config,
        }))
    }

    fn failure_from_document(doc: &Document) -> Result<Self> {
        let message = reader::get_or(doc, &ERR_MSG_FIELD, "")?;

        let error_code = match reader::get_number_opt(doc, &CODE_FIELD) {
            Ok(Some(code)) => match code.exact_i32() {
                Some(code) => ErrorCode::from_code(code),
                None => {
                    return Err(WireError::BadValue(format!(
                        "{} is not a 32-bit integer: {:?}",
                        CODE_FIELD, code
                    )))
                }
            },
            // Peer failed without saying why
            Ok(None) => ErrorCode::UnknownError,
            Err(WireError::TypesMismatch(_)) => {
                return Err(WireError::BadValue(format!("{} is not a number", CODE_FIELD)))
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Heartbeat failed on peer with {}: {}", error_code, message);

        Ok(ReplSetHeartbeatReply::Failure(HeartbeatFailure {
            error_code,
            message,
            mismatch: false,
        }))
    }
}
