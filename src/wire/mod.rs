//! Wire Module
//!
//! Frame decoding for requests arriving from the (external) transport.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬────────────┬─────────────────┬─────────────┬──────────────┐
//! │ Len (4)  │ ReqId (4)  │ ResponseTo (4)  │ OpCode (4)  │    Body      │
//! └──────────┴────────────┴─────────────────┴─────────────┴──────────────┘
//! ```
//! All integers are little-endian.
//!
//! ### Supported Requests
//! - 2004: OP_QUERY
//! - 2005: OP_GET_MORE
//! - 2007: OP_KILL_CURSORS

mod header;
mod message;
mod decoder;
mod frame;

pub use header::{MessageHeader, OpCode, RequestBaseMessage, HEADER_SIZE};
pub use message::{
    GetMoreMessage, KillCursorsMessage, QueryFlags, QueryMessage, RequestMessage,
};
pub use decoder::{
    GetMoreMessageDecoder, KillCursorsMessageDecoder, MessageDecoder, QueryMessageDecoder,
    RequestDecoder,
};
pub use frame::{read_frame, split_frame, Frame};
