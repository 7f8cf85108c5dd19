//! # mongowire
//!
//! Wire-protocol codecs for a document database server:
//! - Typed binary documents with fail-fast field extraction
//! - A marshalling contract for named commands
//! - Request frame decoding (OP_QUERY, OP_GET_MORE, OP_KILL_CURSORS)
//! - Replica set `handshake` and `replSetHeartbeat` codecs
//! - The replicated operation (oplog) model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Transport (not part of this crate)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      wire                                    │
//! │          (frame split, header, request decoders)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Document
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     command                                  │
//! │        (Command contract, query command registry)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    repl     │          │    oplog    │
//!   │ (handshake, │          │ (operations,│
//!   │  heartbeat) │          │  visitor)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌─────────────┐
//!               │    bson     │
//!               │ (documents) │
//!               └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bson;
pub mod command;
pub mod wire;
pub mod repl;
pub mod oplog;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorCode, Result, TypesMismatch, WireError};
pub use config::Config;
pub use bson::{Document, DocumentBuilder, Value};
pub use command::Command;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mongowire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
