//! Error types for mongowire
//!
//! Provides a unified error type for every decode, marshalling and framing
//! operation, plus the numeric error codes that travel on the wire.

use std::fmt;

use thiserror::Error;

use crate::bson::{Expected, ValueType};
use crate::repl::HostAndPort;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// Unified error type for mongowire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // Document Errors
    // -------------------------------------------------------------------------
    #[error("{}", no_such_key_message(.key, .reason))]
    NoSuchKey { key: String, reason: Option<String> },

    #[error(transparent)]
    TypesMismatch(#[from] TypesMismatch),

    #[error("Bad value: {0}")]
    BadValue(String),

    #[error("Failed to parse: {0}")]
    FailedToParse(String),

    // -------------------------------------------------------------------------
    // Replication Errors
    // -------------------------------------------------------------------------
    #[error("Replica set names do not match")]
    InconsistentReplicaSetNames,

    #[error("Unknown error")]
    UnknownError,

    #[error("Replication is not yet initialized")]
    NotYetInitialized,

    #[error("Oplog start missing on sync source {sync_source}")]
    OplogStartMissing { sync_source: HostAndPort },

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Command failed with {code}: {message}")]
    Mongo { code: ErrorCode, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn no_such_key_message(key: &str, reason: &Option<String>) -> String {
    match reason {
        Some(reason) => reason.clone(),
        None => format!("No such key: \"{}\"", key),
    }
}

impl WireError {
    /// Shorthand for a missing-key error without a custom reason
    pub fn no_such_key(key: impl Into<String>) -> Self {
        WireError::NoSuchKey {
            key: key.into(),
            reason: None,
        }
    }

    /// The numeric code reported to peers for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            WireError::NoSuchKey { .. } => ErrorCode::NoSuchKey,
            WireError::TypesMismatch(_) => ErrorCode::TypeMismatch,
            WireError::BadValue(_) => ErrorCode::BadValue,
            WireError::FailedToParse(_) => ErrorCode::FailedToParse,
            WireError::InconsistentReplicaSetNames => ErrorCode::InconsistentReplicaSetNames,
            WireError::UnknownError => ErrorCode::UnknownError,
            WireError::NotYetInitialized => ErrorCode::NotYetInitialized,
            WireError::OplogStartMissing { .. } => ErrorCode::OplogStartMissing,
            WireError::InvalidMessage(_) => ErrorCode::ProtocolError,
            WireError::Mongo { code, .. } => *code,
            WireError::Io(_) => ErrorCode::InternalError,
        }
    }
}

// =============================================================================
// Type Mismatch
// =============================================================================

/// A field was present but held a value of the wrong kind
///
/// Carries the structured facts; the human-readable text is produced by
/// `Display` so callers can attach the command context without rewriting
/// messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesMismatch {
    pub field: String,
    pub expected: Expected,
    pub found: ValueType,
    /// Where the document came from, e.g. "response to replSetHeartbeat"
    pub context: Option<&'static str>,
}

impl TypesMismatch {
    pub fn new(field: impl Into<String>, expected: Expected, found: ValueType) -> Self {
        Self {
            field: field.into(),
            expected,
            found,
            context: None,
        }
    }

    /// Attach the origin of the offending document
    pub fn in_context(mut self, context: &'static str) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Display for TypesMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(context) => write!(
                f,
                "Expected \"{}\" field in {} to have type {}, but found {}",
                self.field, context, self.expected, self.found
            ),
            None => write!(
                f,
                "Expected \"{}\" field to have type {}, but found {}",
                self.field, self.expected, self.found
            ),
        }
    }
}

impl std::error::Error for TypesMismatch {}

/// Re-tag a type mismatch with the document's origin, leaving other errors alone
pub(crate) fn with_context<T>(result: Result<T>, context: &'static str) -> Result<T> {
    result.map_err(|e| match e {
        WireError::TypesMismatch(mismatch) => {
            WireError::TypesMismatch(mismatch.in_context(context))
        }
        other => other,
    })
}

// =============================================================================
// Error Codes
// =============================================================================

/// Numeric error codes exchanged with peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    InternalError,
    BadValue,
    NoSuchKey,
    UnknownError,
    FailedToParse,
    Unauthorized,
    TypeMismatch,
    ProtocolError,
    CommandNotFound,
    NotYetInitialized,
    InconsistentReplicaSetNames,
    OplogStartMissing,
    /// A code this crate does not enumerate, preserved verbatim
    Other(i32),
}

impl ErrorCode {
    const KNOWN: [ErrorCode; 13] = [
        ErrorCode::Ok,
        ErrorCode::InternalError,
        ErrorCode::BadValue,
        ErrorCode::NoSuchKey,
        ErrorCode::UnknownError,
        ErrorCode::FailedToParse,
        ErrorCode::Unauthorized,
        ErrorCode::TypeMismatch,
        ErrorCode::ProtocolError,
        ErrorCode::CommandNotFound,
        ErrorCode::NotYetInitialized,
        ErrorCode::InconsistentReplicaSetNames,
        ErrorCode::OplogStartMissing,
    ];

    /// Map a wire code to its enumerated form
    pub fn from_code(code: i32) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|known| known.code() == code)
            .unwrap_or(ErrorCode::Other(code))
    }

    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::InternalError => 1,
            ErrorCode::BadValue => 2,
            ErrorCode::NoSuchKey => 4,
            ErrorCode::UnknownError => 8,
            ErrorCode::FailedToParse => 9,
            ErrorCode::Unauthorized => 13,
            ErrorCode::TypeMismatch => 14,
            ErrorCode::ProtocolError => 17,
            ErrorCode::CommandNotFound => 59,
            ErrorCode::NotYetInitialized => 94,
            ErrorCode::InconsistentReplicaSetNames => 108,
            ErrorCode::OplogStartMissing => 120,
            ErrorCode::Other(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::BadValue => "BadValue",
            ErrorCode::NoSuchKey => "NoSuchKey",
            ErrorCode::UnknownError => "UnknownError",
            ErrorCode::FailedToParse => "FailedToParse",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::TypeMismatch => "TypeMismatch",
            ErrorCode::ProtocolError => "ProtocolError",
            ErrorCode::CommandNotFound => "CommandNotFound",
            ErrorCode::NotYetInitialized => "NotYetInitialized",
            ErrorCode::InconsistentReplicaSetNames => "InconsistentReplicaSetNames",
            ErrorCode::OplogStartMissing => "OplogStartMissing",
            ErrorCode::Other(_) => "Location",
        }
    }

    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Other(code) => write!(f, "Location{}", code),
            known => write!(f, "{}({})", known.name(), known.code()),
        }
    }
}
