//! Tests for command execution
//!
//! These tests verify:
//! - Successful replies gain `ok: 1` when missing
//! - Unmarshalling and handler failures become `{ok: 0, errmsg, code}`
//! - Error codes reported for each error kind

use mongowire::bson::{DocumentBuilder, Value};
use mongowire::command::{self, error_reply, Command};
use mongowire::repl::{
    HeartbeatStatus, HostAndPort, OpTime, ReplSetHeartbeatArgument, ReplSetHeartbeatCommand,
    ReplSetHeartbeatReply,
};
use mongowire::{ErrorCode, WireError};

fn heartbeat_request() -> mongowire::Document {
    DocumentBuilder::new()
        .append_value("replSetHeartbeat", "rs0")
        .append_value("pv", 1i64)
        .append_value("v", 2i64)
        .append_value("from", "h1:27017")
        .build()
}

#[test]
fn test_execute_success() {
    let reply = command::execute(&ReplSetHeartbeatCommand, &heartbeat_request(), |arg| {
        assert_eq!(arg.set_name, "rs0");
        assert_eq!(arg.sender_host, Some(HostAndPort::new("h1", 27017)));
        Ok(HeartbeatStatus::builder(OpTime::EPOCH, arg.set_name, "")
            .config_version(arg.config_version)
            .build()
            .into())
    });

    assert_eq!(reply.first_key(), Some("ok"));
    assert_eq!(reply.get("ok"), Some(&Value::Double(1.0)));
    assert_eq!(reply.get("v"), Some(&Value::Int64(2)));
}

#[test]
fn test_execute_handler_failure_reply() {
    let reply = command::execute(&ReplSetHeartbeatCommand, &heartbeat_request(), |_arg| {
        Err(WireError::NotYetInitialized)
    });

    assert_eq!(reply.get("ok"), Some(&Value::Double(0.0)));
    assert_eq!(reply.get("code"), Some(&Value::Int32(94)));
    assert_eq!(
        reply.get("errmsg"),
        Some(&Value::from("Replication is not yet initialized"))
    );
}

#[test]
fn test_execute_unmarshall_failure_skips_handler() {
    let request = DocumentBuilder::new()
        .append_value("replSetHeartbeat", "rs0")
        .append_value("bogus", true)
        .build();

    let reply = command::execute(
        &ReplSetHeartbeatCommand,
        &request,
        |_arg: ReplSetHeartbeatArgument| -> mongowire::Result<ReplSetHeartbeatReply> {
            panic!("handler must not run")
        },
    );

    assert_eq!(reply.get("ok"), Some(&Value::Double(0.0)));
    assert_eq!(reply.get("code"), Some(&Value::Int32(2)));
}

#[test]
fn test_execute_keeps_reply_ok_field() {
    let reply = command::execute(&ReplSetHeartbeatCommand, &heartbeat_request(), |_arg| {
        Ok(ReplSetHeartbeatReply::failure(ErrorCode::UnknownError, "busy"))
    });

    let keys: Vec<&str> = reply.keys().collect();
    assert_eq!(keys, vec!["ok", "code", "errmsg"]);
    assert_eq!(reply.get("ok"), Some(&Value::Double(0.0)));
    assert_eq!(
        ReplSetHeartbeatCommand
            .unmarshall_result(&reply)
            .unwrap()
            .error_code(),
        ErrorCode::UnknownError
    );
}

#[test]
fn test_error_codes() {
    assert_eq!(WireError::no_such_key("x").code(), ErrorCode::NoSuchKey);
    assert_eq!(WireError::BadValue(String::new()).code().code(), 2);
    assert_eq!(
        WireError::InvalidMessage(String::new()).code(),
        ErrorCode::ProtocolError
    );
    assert_eq!(
        WireError::OplogStartMissing {
            sync_source: HostAndPort::new("h1", 27017)
        }
        .code()
        .code(),
        120
    );
    assert_eq!(ErrorCode::from_code(108), ErrorCode::InconsistentReplicaSetNames);
    assert_eq!(ErrorCode::from_code(12345), ErrorCode::Other(12345));
    assert_eq!(ErrorCode::Other(12345).code(), 12345);
}

#[test]
fn test_error_reply_message() {
    let err = WireError::OplogStartMissing {
        sync_source: HostAndPort::new("h2", 27017),
    };
    let reply = error_reply(&err);

    assert_eq!(
        reply.get("errmsg"),
        Some(&Value::from("Oplog start missing on sync source h2:27017"))
    );
    assert_eq!(reply.get("code"), Some(&Value::Int32(120)));
}
