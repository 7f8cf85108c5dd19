//! Request decoders
//!
//! Decoding functions for request bodies. Each decoder consumes fields in
//! their fixed order from a cursor already positioned past the header and
//! fails with `InvalidMessage` if the buffer runs out first.
//!
//! ## Body Formats
//!
//! ### OP_GET_MORE
//! ```text
//! ┌──────────┬──────────────────┬────────────┬───────────────┐
//! │ ZERO (4) │ Collection (cstr)│ Return (4) │ Cursor id (8) │
//! └──────────┴──────────────────┴────────────┴───────────────┘
//! ```
//!
//! ### OP_KILL_CURSORS
//! ```text
//! ┌──────────┬───────────┬──────────────────────┐
//! │ ZERO (4) │ Count (4) │ Cursor ids (8 each)  │
//! └──────────┴───────────┴──────────────────────┘
//! ```
//!
//! ### OP_QUERY
//! ```text
//! ┌───────────┬──────────────────┬──────────┬────────────┬───────┬─────────────┐
//! │ Flags (4) │ Collection (cstr)│ Skip (4) │ Return (4) │ Query │ [Selector]  │
//! └───────────┴──────────────────┴──────────┴────────────┴───────┴─────────────┘
//! ```

use std::net::IpAddr;

use bytes::Buf;

use crate::bson::codec::{decode_document, read_cstring};
use crate::config::Config;
use crate::error::{Result, WireError};

use super::frame::Frame;
use super::message::{GetMoreMessage, KillCursorsMessage, QueryFlags, QueryMessage, RequestMessage};
use super::{OpCode, RequestBaseMessage};

/// Turns a request body into a structured message
pub trait MessageDecoder {
    type Message;

    fn decode<B: Buf>(&self, buffer: &mut B, base: RequestBaseMessage) -> Result<Self::Message>;
}

// =============================================================================
// Positional readers
// =============================================================================

fn ensure<B: Buf>(buf: &B, needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(WireError::InvalidMessage(format!(
            "Incomplete {}: expected {} bytes, got {}",
            what,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn skip<B: Buf>(buf: &mut B, count: usize, what: &str) -> Result<()> {
    ensure(buf, count, what)?;
    buf.advance(count);
    Ok(())
}

fn read_i32<B: Buf>(buf: &mut B, what: &str) -> Result<i32> {
    ensure(buf, 4, what)?;
    Ok(buf.get_i32_le())
}

fn read_i64<B: Buf>(buf: &mut B, what: &str) -> Result<i64> {
    ensure(buf, 8, what)?;
    Ok(buf.get_i64_le())
}

// =============================================================================
// Decoders
// =============================================================================

/// OP_GET_MORE
#[derive(Debug, Clone, Copy, Default)]
pub struct GetMoreMessageDecoder;

impl MessageDecoder for GetMoreMessageDecoder {
    type Message = GetMoreMessage;

    fn decode<B: Buf>(&self, buffer: &mut B, base: RequestBaseMessage) -> Result<GetMoreMessage> {
        // Reserved; not validated
        skip(buffer, 4, "getMore reserved field")?;
        let full_collection_name = read_cstring(buffer)?;
        let number_to_return = read_i32(buffer, "getMore numberToReturn")?;
        let cursor_id = read_i64(buffer, "getMore cursorID")?;

        Ok(GetMoreMessage {
            base,
            full_collection_name,
            number_to_return,
            cursor_id,
        })
    }
}

/// OP_KILL_CURSORS
#[derive(Debug, Clone, Copy, Default)]
pub struct KillCursorsMessageDecoder;

impl MessageDecoder for KillCursorsMessageDecoder {
    type Message = KillCursorsMessage;

    fn decode<B: Buf>(&self, buffer: &mut B, base: RequestBaseMessage) -> Result<KillCursorsMessage> {
        skip(buffer, 4, "killCursors reserved field")?;
        let count = read_i32(buffer, "killCursors numberOfCursorIDs")?;
        if count < 0 {
            return Err(WireError::InvalidMessage(format!(
                "Negative cursor count: {}",
                count
            )));
        }

        // Checked up front so a bogus count cannot drive a huge allocation
        ensure(buffer, count as usize * 8, "killCursors cursorIDs")?;
        let cursor_ids = (0..count).map(|_| buffer.get_i64_le()).collect();

        Ok(KillCursorsMessage { base, cursor_ids })
    }
}

/// OP_QUERY
#[derive(Debug, Clone, Copy)]
pub struct QueryMessageDecoder {
    max_document_size: usize,
}

impl QueryMessageDecoder {
    pub fn new(max_document_size: usize) -> Self {
        Self { max_document_size }
    }
}

impl MessageDecoder for QueryMessageDecoder {
    type Message = QueryMessage;

    fn decode<B: Buf>(&self, buffer: &mut B, base: RequestBaseMessage) -> Result<QueryMessage> {
        let flags = QueryFlags(read_i32(buffer, "query flags")? as u32);
        let full_collection_name = read_cstring(buffer)?;
        let number_to_skip = read_i32(buffer, "query numberToSkip")?;
        let number_to_return = read_i32(buffer, "query numberToReturn")?;
        let query = decode_document(buffer, self.max_document_size)?;
        let return_fields_selector = if buffer.has_remaining() {
            Some(decode_document(buffer, self.max_document_size)?)
        } else {
            None
        };

        Ok(QueryMessage {
            base,
            flags,
            full_collection_name,
            number_to_skip,
            number_to_return,
            query,
            return_fields_selector,
        })
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Picks the decoder matching a request's op code
#[derive(Debug, Clone)]
pub struct RequestDecoder {
    get_more: GetMoreMessageDecoder,
    kill_cursors: KillCursorsMessageDecoder,
    query: QueryMessageDecoder,
}

impl RequestDecoder {
    pub fn new(config: &Config) -> Self {
        Self {
            get_more: GetMoreMessageDecoder,
            kill_cursors: KillCursorsMessageDecoder,
            query: QueryMessageDecoder::new(config.max_document_size),
        }
    }

    /// Decode a body whose envelope is already known
    pub fn decode<B: Buf>(&self, buffer: &mut B, base: RequestBaseMessage) -> Result<RequestMessage> {
        let message = match base.op_code {
            OpCode::GetMore => RequestMessage::GetMore(self.get_more.decode(buffer, base)?),
            OpCode::KillCursors => {
                RequestMessage::KillCursors(self.kill_cursors.decode(buffer, base)?)
            }
            OpCode::Query => RequestMessage::Query(self.query.decode(buffer, base)?),
            other => {
                return Err(WireError::InvalidMessage(format!(
                    "Unsupported request op code: {:?} ({})",
                    other,
                    other.code()
                )))
            }
        };
        Ok(message)
    }

    /// Decode a whole frame received from `client_address:client_port`
    pub fn decode_frame(&self, frame: Frame, client_address: IpAddr, client_port: u16) -> Result<RequestMessage> {
        let base = RequestBaseMessage::from_header(&frame.header, client_address, client_port)?;
        let mut body = frame.body;
        let message = self.decode(&mut body, base)?;

        if body.has_remaining() {
            tracing::warn!(
                "Ignoring {} trailing bytes in request {}",
                body.remaining(),
                frame.header.request_id
            );
        }
        tracing::trace!("Decoded request {}: {:?}", frame.header.request_id, message.op_code());
        Ok(message)
    }
}
