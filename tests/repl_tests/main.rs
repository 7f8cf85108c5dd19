//! Replication Tests
//!
//! Value types, configuration documents, handshake and heartbeat codecs.
