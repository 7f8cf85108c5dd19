//! Wire Tests
//!
//! Header parsing, request body decoders and frame extraction.

mod frame_tests;
