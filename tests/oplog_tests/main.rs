//! Oplog Tests
//!
//! Replicated operation kinds, their descriptive documents and visitors.
