//! Query command registry
//!
//! Diagnostic and user-management commands arrive as query documents whose
//! first key names the command. Each command is a small stateless handler
//! value in a lookup table; handlers forward to a [`ProcessorCaller`]
//! supplied by the server.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use crate::bson::Document;
use crate::error::{ErrorCode, Result, WireError};
use crate::wire::RequestBaseMessage;

/// Database admin-only commands must run against
pub const ADMIN_DATABASE: &str = "admin";

/// Server-side operations the command handlers delegate to
pub trait ProcessorCaller {
    /// Database the current request targets
    fn database(&self) -> &str;

    fn build_info(&mut self) -> Result<()>;

    fn get_log(&mut self, log_type: GetLogType) -> Result<()>;

    fn list_databases(&mut self) -> Result<()>;

    fn ping(&mut self) -> Result<()>;

    fn validate(&mut self, database: &str, query: &Document) -> Result<()>;

    fn whatsmyuri(&mut self, client_address: IpAddr, client_port: u16) -> Result<()>;

    /// Reply for commands this server recognizes but does not implement
    fn unimplemented(&mut self, command: &QueryCommand) -> Result<()>;

    fn reply_failure(&mut self, code: ErrorCode, message: &str) -> Result<()>;
}

/// Logs a `getLog` command may name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetLogType {
    /// `*`: list the available logs
    Asterisk,
    Global,
    ReplicaSet,
    StartupWarnings,
}

impl GetLogType {
    pub fn from_log(log: &str) -> Option<Self> {
        match log {
            "*" => Some(GetLogType::Asterisk),
            "global" => Some(GetLogType::Global),
            "rs" => Some(GetLogType::ReplicaSet),
            "startupWarnings" => Some(GetLogType::StartupWarnings),
            _ => None,
        }
    }

    pub fn log_name(self) -> &'static str {
        match self {
            GetLogType::Asterisk => "*",
            GetLogType::Global => "global",
            GetLogType::ReplicaSet => "rs",
            GetLogType::StartupWarnings => "startupWarnings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Diagnostic,
    UserManagement,
}

type Handler =
    fn(&QueryCommand, &RequestBaseMessage, &Document, &mut dyn ProcessorCaller) -> Result<()>;

/// A registered query command
#[derive(Clone, Copy)]
pub struct QueryCommand {
    key: &'static str,
    admin_only: bool,
    group: CommandGroup,
    handler: Handler,
}

impl QueryCommand {
    pub const fn new(
        key: &'static str,
        admin_only: bool,
        group: CommandGroup,
        handler: Handler,
    ) -> Self {
        Self {
            key,
            admin_only,
            group,
            handler,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn is_admin_only(&self) -> bool {
        self.admin_only
    }

    pub fn group(&self) -> CommandGroup {
        self.group
    }

    pub fn call(
        &self,
        request: &RequestBaseMessage,
        query: &Document,
        caller: &mut dyn ProcessorCaller,
    ) -> Result<()> {
        (self.handler)(self, request, query, caller)
    }
}

impl fmt::Debug for QueryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCommand")
            .field("key", &self.key)
            .field("admin_only", &self.admin_only)
            .field("group", &self.group)
            .finish()
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn unimplemented_command(
    command: &QueryCommand,
    _request: &RequestBaseMessage,
    _query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    caller.unimplemented(command)
}

fn build_info(
    _command: &QueryCommand,
    _request: &RequestBaseMessage,
    _query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    caller.build_info()
}

fn get_log(
    command: &QueryCommand,
    _request: &RequestBaseMessage,
    query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    let log = query
        .get(command.key())
        .and_then(|value| value.as_str().ok())
        .unwrap_or_default();

    match GetLogType::from_log(log) {
        Some(log_type) => caller.get_log(log_type),
        None => caller.reply_failure(ErrorCode::BadValue, &format!("no RamLog named: {}", log)),
    }
}

fn list_databases(
    _command: &QueryCommand,
    _request: &RequestBaseMessage,
    _query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    caller.list_databases()
}

fn ping(
    _command: &QueryCommand,
    _request: &RequestBaseMessage,
    _query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    caller.ping()
}

fn validate(
    _command: &QueryCommand,
    _request: &RequestBaseMessage,
    query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    let database = caller.database().to_string();
    caller.validate(&database, query)
}

fn whatsmyuri(
    _command: &QueryCommand,
    request: &RequestBaseMessage,
    _query: &Document,
    caller: &mut dyn ProcessorCaller,
) -> Result<()> {
    caller.whatsmyuri(request.client_address, request.client_port)
}

// =============================================================================
// Command Tables
// =============================================================================

const fn diagnostic(key: &'static str, admin_only: bool, handler: Handler) -> QueryCommand {
    QueryCommand::new(key, admin_only, CommandGroup::Diagnostic, handler)
}

const fn user_management(key: &'static str) -> QueryCommand {
    QueryCommand::new(key, false, CommandGroup::UserManagement, unimplemented_command)
}

const DIAGNOSTIC_COMMANDS: [QueryCommand; 23] = [
    diagnostic("availableQueryOptions", false, unimplemented_command),
    diagnostic("buildInfo", false, build_info),
    diagnostic("collStats", false, unimplemented_command),
    diagnostic("connPoolStats", false, unimplemented_command),
    diagnostic("cursorInfo", false, unimplemented_command),
    diagnostic("dataSize", false, unimplemented_command),
    diagnostic("dbHash", false, unimplemented_command),
    diagnostic("dbStats", false, unimplemented_command),
    diagnostic("diagLogging", true, unimplemented_command),
    diagnostic("driverOIDTest", false, unimplemented_command),
    diagnostic("features", false, unimplemented_command),
    diagnostic("getCmdLineOpts", true, unimplemented_command),
    diagnostic("getLog", true, get_log),
    diagnostic("hostInfo", false, unimplemented_command),
    diagnostic("listCommands", false, unimplemented_command),
    diagnostic("listDatabases", true, list_databases),
    diagnostic("ping", false, ping),
    diagnostic("profile", false, unimplemented_command),
    diagnostic("serverStatus", false, unimplemented_command),
    diagnostic("shardConnPoolStats", false, unimplemented_command),
    diagnostic("top", true, unimplemented_command),
    diagnostic("validate", false, validate),
    diagnostic("whatsmyuri", false, whatsmyuri),
];

const USER_MANAGEMENT_COMMANDS: [QueryCommand; 7] = [
    user_management("createUser"),
    user_management("dropAllUsersFromDatabase"),
    user_management("dropUser"),
    user_management("grantRolesToUser"),
    user_management("revokeRolesFromUser"),
    user_management("updateUser"),
    user_management("usersInfo"),
];

// =============================================================================
// Registry
// =============================================================================

/// Name → handler lookup for query commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, QueryCommand>,
}

impl CommandRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every diagnostic and user-management command
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for command in DIAGNOSTIC_COMMANDS.into_iter().chain(USER_MANAGEMENT_COMMANDS) {
            registry.register(command);
        }
        registry
    }

    /// Add a command, returning the one it replaced
    pub fn register(&mut self, command: QueryCommand) -> Option<QueryCommand> {
        self.commands.insert(command.key(), command)
    }

    pub fn lookup(&self, key: &str) -> Option<&QueryCommand> {
        self.commands.get(key)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Route `query` to the command named by its first key
    ///
    /// Admin-only commands issued against another database are answered
    /// with an `Unauthorized` failure instead of being run.
    pub fn dispatch(
        &self,
        request: &RequestBaseMessage,
        query: &Document,
        caller: &mut dyn ProcessorCaller,
    ) -> Result<()> {
        let key = query
            .first_key()
            .ok_or_else(|| WireError::BadValue("Empty command document".to_string()))?;

        let command = self.lookup(key).ok_or_else(|| WireError::Mongo {
            code: ErrorCode::CommandNotFound,
            message: format!("no such cmd: {}", key),
        })?;

        if command.is_admin_only() && caller.database() != ADMIN_DATABASE {
            tracing::debug!(
                "Rejecting {} on database {}: admin only",
                key,
                caller.database()
            );
            let message = format!("{} may only be run against the admin database.", key);
            return caller.reply_failure(ErrorCode::Unauthorized, &message);
        }

        tracing::trace!("Dispatching {} from {}", key, request.client_address);
        command.call(request, query, caller)
    }
}
