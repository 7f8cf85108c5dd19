//! Tests for the query command registry
//!
//! These tests verify:
//! - Every standard command is registered
//! - Dispatch routes to the matching processor call
//! - Admin-only enforcement and unknown commands
//! - getLog log-type handling

use std::net::{IpAddr, Ipv4Addr};

use mongowire::bson::{Document, DocumentBuilder};
use mongowire::command::{
    CommandGroup, CommandRegistry, GetLogType, ProcessorCaller, QueryCommand,
};
use mongowire::wire::{OpCode, RequestBaseMessage};
use mongowire::{ErrorCode, Result, WireError};

// =============================================================================
// Helper Functions
// =============================================================================

/// Records every processor call made by a handler
struct RecordingCaller {
    database: String,
    calls: Vec<String>,
}

impl RecordingCaller {
    fn on(database: &str) -> Self {
        Self {
            database: database.to_string(),
            calls: Vec::new(),
        }
    }
}

impl ProcessorCaller for RecordingCaller {
    fn database(&self) -> &str {
        &self.database
    }

    fn build_info(&mut self) -> Result<()> {
        self.calls.push("buildInfo".to_string());
        Ok(())
    }

    fn get_log(&mut self, log_type: GetLogType) -> Result<()> {
        self.calls.push(format!("getLog:{}", log_type.log_name()));
        Ok(())
    }

    fn list_databases(&mut self) -> Result<()> {
        self.calls.push("listDatabases".to_string());
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        self.calls.push("ping".to_string());
        Ok(())
    }

    fn validate(&mut self, database: &str, query: &Document) -> Result<()> {
        self.calls.push(format!("validate:{}:{}", database, query.len()));
        Ok(())
    }

    fn whatsmyuri(&mut self, client_address: IpAddr, client_port: u16) -> Result<()> {
        self.calls.push(format!("whatsmyuri:{}:{}", client_address, client_port));
        Ok(())
    }

    fn unimplemented(&mut self, command: &QueryCommand) -> Result<()> {
        self.calls.push(format!("unimplemented:{}", command.key()));
        Ok(())
    }

    fn reply_failure(&mut self, code: ErrorCode, message: &str) -> Result<()> {
        self.calls.push(format!("failure:{}:{}", code.code(), message));
        Ok(())
    }
}

fn request() -> RequestBaseMessage {
    RequestBaseMessage::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 9)), 51000, 1, OpCode::Query)
}

fn query(key: &str, value: &str) -> Document {
    DocumentBuilder::new().append_value(key, value).build()
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_standard_registry_contents() {
    let registry = CommandRegistry::standard();
    assert_eq!(registry.len(), 30);

    let get_log = registry.lookup("getLog").unwrap();
    assert!(get_log.is_admin_only());
    assert_eq!(get_log.group(), CommandGroup::Diagnostic);

    let ping = registry.lookup("ping").unwrap();
    assert!(!ping.is_admin_only());

    let create_user = registry.lookup("createUser").unwrap();
    assert_eq!(create_user.group(), CommandGroup::UserManagement);

    assert!(registry.lookup("shutdown").is_none());
    assert!(CommandRegistry::new().is_empty());
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn test_dispatch_ping() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    registry.dispatch(&request(), &query("ping", "1"), &mut caller).unwrap();
    assert_eq!(caller.calls, vec!["ping"]);
}

#[test]
fn test_dispatch_whatsmyuri_uses_envelope() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    registry.dispatch(&request(), &query("whatsmyuri", "1"), &mut caller).unwrap();
    assert_eq!(caller.calls, vec!["whatsmyuri:192.168.1.9:51000"]);
}

#[test]
fn test_dispatch_validate_uses_current_database() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("shop");

    registry.dispatch(&request(), &query("validate", "orders"), &mut caller).unwrap();
    assert_eq!(caller.calls, vec!["validate:shop:1"]);
}

#[test]
fn test_dispatch_unimplemented_command() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    registry.dispatch(&request(), &query("dbStats", "1"), &mut caller).unwrap();
    registry.dispatch(&request(), &query("usersInfo", "bob"), &mut caller).unwrap();
    assert_eq!(
        caller.calls,
        vec!["unimplemented:dbStats", "unimplemented:usersInfo"]
    );
}

#[test]
fn test_admin_only_outside_admin() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    registry.dispatch(&request(), &query("listDatabases", "1"), &mut caller).unwrap();
    assert_eq!(
        caller.calls,
        vec!["failure:13:listDatabases may only be run against the admin database."]
    );

    let mut admin = RecordingCaller::on("admin");
    registry.dispatch(&request(), &query("listDatabases", "1"), &mut admin).unwrap();
    assert_eq!(admin.calls, vec!["listDatabases"]);
}

#[test]
fn test_get_log_types() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("admin");

    registry.dispatch(&request(), &query("getLog", "*"), &mut caller).unwrap();
    registry.dispatch(&request(), &query("getLog", "startupWarnings"), &mut caller).unwrap();
    registry.dispatch(&request(), &query("getLog", "nope"), &mut caller).unwrap();

    assert_eq!(
        caller.calls,
        vec![
            "getLog:*",
            "getLog:startupWarnings",
            "failure:2:no RamLog named: nope",
        ]
    );
}

#[test]
fn test_unknown_command() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    match registry.dispatch(&request(), &query("shutdown", "1"), &mut caller) {
        Err(WireError::Mongo { code, message }) => {
            assert_eq!(code, ErrorCode::CommandNotFound);
            assert_eq!(message, "no such cmd: shutdown");
        }
        other => panic!("Expected CommandNotFound, got {:?}", other),
    }
    assert!(caller.calls.is_empty());
}

#[test]
fn test_empty_command_document() {
    let registry = CommandRegistry::standard();
    let mut caller = RecordingCaller::on("test");

    assert!(matches!(
        registry.dispatch(&request(), &Document::new(), &mut caller),
        Err(WireError::BadValue(_))
    ));
}

#[test]
fn test_register_replaces_existing() {
    fn custom_ping(
        _command: &QueryCommand,
        _request: &RequestBaseMessage,
        _query: &Document,
        caller: &mut dyn ProcessorCaller,
    ) -> Result<()> {
        caller.reply_failure(ErrorCode::Other(999), "custom")
    }

    let mut registry = CommandRegistry::standard();
    let replaced = registry.register(QueryCommand::new(
        "ping",
        false,
        CommandGroup::Diagnostic,
        custom_ping,
    ));
    assert!(replaced.is_some());

    let mut caller = RecordingCaller::on("test");
    registry.dispatch(&request(), &query("ping", "1"), &mut caller).unwrap();
    assert_eq!(caller.calls, vec!["failure:999:custom"]);
}
