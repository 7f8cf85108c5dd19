//! Replication Module
//!
//! Value types and command codecs spoken between replica set members.
//!
//! ## Responsibilities
//! - Logical clock (`OpTime`) and addressing (`HostAndPort`)
//! - Member states and protocol versions
//! - Replica set configuration documents
//! - `handshake` and `replSetHeartbeat` commands

mod host_and_port;
mod optime;
mod member_state;
mod config;
mod handshake;
mod heartbeat;

pub use host_and_port::HostAndPort;
pub use optime::{get_op_time, get_op_time_opt, OpTime};
pub use member_state::{MemberState, ReplSetProtocolVersion};
pub use config::{MemberConfig, ReplicaSetConfig, ReplicaSetSettings};
pub use handshake::{HandshakeArgument, HandshakeCommand};
pub use heartbeat::{
    HeartbeatArgumentBuilder, HeartbeatFailure, HeartbeatStatus, HeartbeatStatusBuilder,
    ReplSetHeartbeatArgument, ReplSetHeartbeatCommand, ReplSetHeartbeatReply,
};
