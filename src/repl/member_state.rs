//! Member state and protocol version enumerations

use std::fmt;

use crate::error::{Result, WireError};

/// The role/status a replica set member reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MemberState {
    Startup = 0,
    Primary = 1,
    Secondary = 2,
    Recovering = 3,
    Startup2 = 5,
    Unknown = 6,
    Arbiter = 7,
    Down = 8,
    Rollback = 9,
    Removed = 10,
}

impl MemberState {
    /// Highest legal state id
    pub const MAX: MemberState = MemberState::Removed;

    /// Id 4 was retired and is no longer a legal state
    pub fn from_id(id: i32) -> Option<Self> {
        let state = match id {
            0 => MemberState::Startup,
            1 => MemberState::Primary,
            2 => MemberState::Secondary,
            3 => MemberState::Recovering,
            5 => MemberState::Startup2,
            6 => MemberState::Unknown,
            7 => MemberState::Arbiter,
            8 => MemberState::Down,
            9 => MemberState::Rollback,
            10 => MemberState::Removed,
            _ => return None,
        };
        Some(state)
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            MemberState::Startup => "STARTUP",
            MemberState::Primary => "PRIMARY",
            MemberState::Secondary => "SECONDARY",
            MemberState::Recovering => "RECOVERING",
            MemberState::Startup2 => "STARTUP2",
            MemberState::Unknown => "UNKNOWN",
            MemberState::Arbiter => "ARBITER",
            MemberState::Down => "DOWN",
            MemberState::Rollback => "ROLLBACK",
            MemberState::Removed => "REMOVED",
        }
    }

    /// Readable states serve queries
    pub fn is_readable(self) -> bool {
        matches!(self, MemberState::Primary | MemberState::Secondary)
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replication wire-protocol revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplSetProtocolVersion {
    V0,
    V1,
}

impl ReplSetProtocolVersion {
    pub fn from_version_id(id: i64) -> Result<Self> {
        match id {
            0 => Ok(ReplSetProtocolVersion::V0),
            1 => Ok(ReplSetProtocolVersion::V1),
            other => Err(WireError::BadValue(format!(
                "Unknown replication protocol version {}",
                other
            ))),
        }
    }

    pub fn version_id(self) -> i64 {
        match self {
            ReplSetProtocolVersion::V0 => 0,
            ReplSetProtocolVersion::V1 => 1,
        }
    }
}
