//! Command Tests
//!
//! The command execution helper and the query command registry.

mod execute_tests;
mod registry_tests;
