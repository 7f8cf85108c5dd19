//! Replica set configuration documents
//!
//! `MemberConfig` travels alone inside legacy handshakes; `ReplicaSetConfig`
//! is embedded in heartbeat replies when the sender's config is newer.

use std::collections::HashSet;

use crate::bson::{
    reader, ArrayField, BooleanField, DocField, Document, DocumentBuilder, DoubleField,
    HostAndPortField, IntField, LongField, Number, NumberField, StringField, Value,
};
use crate::error::{Result, WireError};

use super::{HostAndPort, ReplSetProtocolVersion};

// =============================================================================
// Member Configuration
// =============================================================================

const MEMBER_ID_FIELD: IntField = IntField::new("_id");
const HOST_FIELD: HostAndPortField = HostAndPortField::new("host");
const ARBITER_ONLY_FIELD: BooleanField = BooleanField::new("arbiterOnly");
const BUILD_INDEXES_FIELD: BooleanField = BooleanField::new("buildIndexes");
const HIDDEN_FIELD: BooleanField = BooleanField::new("hidden");
const PRIORITY_FIELD: DoubleField = DoubleField::new("priority");
const TAGS_FIELD: DocField = DocField::new("tags");
const SLAVE_DELAY_FIELD: LongField = LongField::new("slaveDelay");
const VOTES_FIELD: IntField = IntField::new("votes");

const MEMBER_FIELD_NAMES: [&str; 9] = [
    "_id",
    "host",
    "arbiterOnly",
    "buildIndexes",
    "hidden",
    "priority",
    "tags",
    "slaveDelay",
    "votes",
];

/// Configuration of a single replica set member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberConfig {
    pub id: i32,
    pub host: HostAndPort,
    pub arbiter_only: bool,
    pub build_indexes: bool,
    pub hidden: bool,
    pub priority: f64,
    /// Seconds this member deliberately lags behind
    pub slave_delay: i64,
    pub votes: i32,
    pub tags: Vec<(String, String)>,
}

impl MemberConfig {
    /// A voting, electable data-bearing member
    pub fn new(id: i32, host: HostAndPort) -> Self {
        Self {
            id,
            host,
            arbiter_only: false,
            build_indexes: true,
            hidden: false,
            priority: 1.0,
            slave_delay: 0,
            votes: 1,
            tags: Vec::new(),
        }
    }

    pub fn is_electable(&self) -> bool {
        !self.arbiter_only && !self.hidden && self.priority > 0.0
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        reader::check_only_has_fields("replica set member configuration", doc, &MEMBER_FIELD_NAMES)?;

        let id = reader::get_i32_number(doc, &MEMBER_ID_FIELD)?;
        let host = reader::get(doc, &HOST_FIELD)?;
        let arbiter_only = reader::get_or(doc, &ARBITER_ONLY_FIELD, false)?;
        let build_indexes = reader::get_or(doc, &BUILD_INDEXES_FIELD, true)?;
        let hidden = reader::get_or(doc, &HIDDEN_FIELD, false)?;
        // Arbiters never stand for election unless told otherwise
        let default_priority = if arbiter_only { 0.0 } else { 1.0 };
        let priority = reader::get_or(doc, &PRIORITY_FIELD, default_priority)?;
        let slave_delay = reader::get_number_opt(doc, &SLAVE_DELAY_FIELD)?
            .map(Number::as_i64)
            .unwrap_or(0);
        let votes = reader::get_i32_number_opt(doc, &VOTES_FIELD)?.unwrap_or(1);

        let tags = match reader::get_opt(doc, &TAGS_FIELD)? {
            Some(tags_doc) => parse_tags(&tags_doc)?,
            None => Vec::new(),
        };

        Ok(Self {
            id,
            host,
            arbiter_only,
            build_indexes,
            hidden,
            priority,
            slave_delay,
            votes,
            tags,
        })
    }

    pub fn to_document(&self) -> Document {
        let tags = self
            .tags
            .iter()
            .fold(DocumentBuilder::with_capacity(self.tags.len()), |builder, (k, v)| {
                builder.append_value(k, v.as_str())
            })
            .build();

        DocumentBuilder::with_capacity(MEMBER_FIELD_NAMES.len())
            .append(&MEMBER_ID_FIELD, self.id)
            .append(&HOST_FIELD, self.host.clone())
            .append(&ARBITER_ONLY_FIELD, self.arbiter_only)
            .append(&BUILD_INDEXES_FIELD, self.build_indexes)
            .append(&HIDDEN_FIELD, self.hidden)
            .append(&PRIORITY_FIELD, self.priority)
            .append(&TAGS_FIELD, tags)
            .append(&SLAVE_DELAY_FIELD, self.slave_delay)
            .append(&VOTES_FIELD, self.votes)
            .build()
    }
}

fn parse_tags(doc: &Document) -> Result<Vec<(String, String)>> {
    doc.iter()
        .map(|(key, value)| match value {
            Value::String(tag) => Ok((key.to_string(), tag.clone())),
            other => Err(WireError::FailedToParse(format!(
                "Member tag \"{}\" must be a string, found {}",
                key,
                other.value_type()
            ))),
        })
        .collect()
}

// =============================================================================
// Replica Set Configuration
// =============================================================================

const SET_NAME_FIELD: StringField = StringField::new("_id");
const VERSION_FIELD: NumberField = NumberField::new("version");
const PROTOCOL_VERSION_FIELD: LongField = LongField::new("protocolVersion");
const MEMBERS_FIELD: ArrayField = ArrayField::new("members");
const SETTINGS_FIELD: DocField = DocField::new("settings");

const CONFIG_FIELD_NAMES: [&str; 5] = ["_id", "version", "protocolVersion", "members", "settings"];

const CHAINING_ALLOWED_FIELD: BooleanField = BooleanField::new("chainingAllowed");
const HEARTBEAT_TIMEOUT_FIELD: NumberField = NumberField::new("heartbeatTimeoutSecs");
const GET_LAST_ERROR_DEFAULTS_FIELD: DocField = DocField::new("getLastErrorDefaults");
const GET_LAST_ERROR_MODES_FIELD: DocField = DocField::new("getLastErrorModes");

const SETTINGS_FIELD_NAMES: [&str; 4] = [
    "chainingAllowed",
    "heartbeatTimeoutSecs",
    "getLastErrorDefaults",
    "getLastErrorModes",
];

/// Set-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaSetSettings {
    pub chaining_allowed: bool,
    pub heartbeat_timeout_secs: i64,
    pub get_last_error_defaults: Option<Document>,
    pub get_last_error_modes: Option<Document>,
}

impl Default for ReplicaSetSettings {
    fn default() -> Self {
        Self {
            chaining_allowed: true,
            heartbeat_timeout_secs: 10,
            get_last_error_defaults: None,
            get_last_error_modes: None,
        }
    }
}

impl ReplicaSetSettings {
    fn from_document(doc: &Document) -> Result<Self> {
        reader::check_only_has_fields("replica set settings", doc, &SETTINGS_FIELD_NAMES)?;

        Ok(Self {
            chaining_allowed: reader::get_or(doc, &CHAINING_ALLOWED_FIELD, true)?,
            heartbeat_timeout_secs: reader::get_number_opt(doc, &HEARTBEAT_TIMEOUT_FIELD)?
                .map(Number::as_i64)
                .unwrap_or(10),
            get_last_error_defaults: reader::get_opt(doc, &GET_LAST_ERROR_DEFAULTS_FIELD)?,
            get_last_error_modes: reader::get_opt(doc, &GET_LAST_ERROR_MODES_FIELD)?,
        })
    }

    fn to_document(&self) -> Document {
        DocumentBuilder::new()
            .append(&CHAINING_ALLOWED_FIELD, self.chaining_allowed)
            .append(&HEARTBEAT_TIMEOUT_FIELD, Number::compact(self.heartbeat_timeout_secs))
            .append_opt(&GET_LAST_ERROR_DEFAULTS_FIELD, self.get_last_error_defaults.clone())
            .append_opt(&GET_LAST_ERROR_MODES_FIELD, self.get_last_error_modes.clone())
            .build()
    }
}

/// A full replica set configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaSetConfig {
    pub set_name: String,
    pub version: i64,
    pub protocol_version: Option<ReplSetProtocolVersion>,
    pub members: Vec<MemberConfig>,
    pub settings: ReplicaSetSettings,
}

impl ReplicaSetConfig {
    pub fn new(set_name: impl Into<String>, version: i64, members: Vec<MemberConfig>) -> Self {
        Self {
            set_name: set_name.into(),
            version,
            protocol_version: None,
            members,
            settings: ReplicaSetSettings::default(),
        }
    }

    pub fn find_member(&self, id: i32) -> Option<&MemberConfig> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        reader::check_only_has_fields("replica set configuration", doc, &CONFIG_FIELD_NAMES)?;

        let set_name = reader::get(doc, &SET_NAME_FIELD)?;
        let version = reader::get_number(doc, &VERSION_FIELD)?.as_i64();
        let protocol_version = reader::get_opt(doc, &PROTOCOL_VERSION_FIELD)?
            .map(ReplSetProtocolVersion::from_version_id)
            .transpose()?;

        let raw_members = reader::get(doc, &MEMBERS_FIELD)?;
        let mut members = Vec::with_capacity(raw_members.len());
        let mut seen_ids = HashSet::with_capacity(raw_members.len());
        for (i, raw) in raw_members.iter().enumerate() {
            let member_doc = match raw {
                Value::Document(member_doc) => member_doc,
                other => {
                    return Err(WireError::FailedToParse(format!(
                        "Expected type object for members.{}, found {}",
                        i,
                        other.value_type()
                    )))
                }
            };
            let member = MemberConfig::from_document(member_doc)?;
            if !seen_ids.insert(member.id) {
                return Err(WireError::BadValue(format!(
                    "Found two member configurations with same _id field: {}",
                    member.id
                )));
            }
            members.push(member);
        }

        let settings = match reader::get_opt(doc, &SETTINGS_FIELD)? {
            Some(settings_doc) => ReplicaSetSettings::from_document(&settings_doc)?,
            None => ReplicaSetSettings::default(),
        };

        Ok(Self {
            set_name,
            version,
            protocol_version,
            members,
            settings,
        })
    }

    pub fn to_document(&self) -> Document {
        let members = self
            .members
            .iter()
            .map(|m| Value::Document(m.to_document()))
            .collect::<Vec<_>>();

        DocumentBuilder::with_capacity(CONFIG_FIELD_NAMES.len())
            .append(&SET_NAME_FIELD, self.set_name.as_str())
            .append(&VERSION_FIELD, Number::compact(self.version))
            .append_opt(&PROTOCOL_VERSION_FIELD, self.protocol_version.map(|pv| pv.version_id()))
            .append(&MEMBERS_FIELD, members)
            .append(&SETTINGS_FIELD, self.settings.to_document())
            .build()
    }
}
