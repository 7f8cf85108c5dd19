//! Frame extraction
//!
//! Splits a header plus body off a stream or an in-memory buffer.

use std::io::Read;

use bytes::{Buf, Bytes, BytesMut};

use crate::config::Config;
use crate::error::{Result, WireError};

use super::{MessageHeader, HEADER_SIZE};

/// One complete frame: parsed header plus raw body
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: MessageHeader,
    pub body: Bytes,
}

impl Frame {
    /// Re-encode the frame, header included
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.body.len());
        self.header.encode(&mut buf);
        buf.extend_from_slice(&self.body);
        buf.freeze()
    }
}

fn validate_length(header: &MessageHeader, config: &Config) -> Result<usize> {
    let length = header.message_length;
    if length < HEADER_SIZE as i32 {
        return Err(WireError::InvalidMessage(format!(
            "Message length {} is smaller than the header",
            length
        )));
    }
    if length as usize > config.max_message_size {
        return Err(WireError::InvalidMessage(format!(
            "Message too large: {} bytes (max {})",
            length, config.max_message_size
        )));
    }
    Ok(header.body_length())
}

/// Read a complete frame from a stream
///
/// Blocks until the frame is complete or the stream fails.
pub fn read_frame<R: Read>(reader: &mut R, config: &Config) -> Result<Frame> {
    // Read header first
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;
    let header = MessageHeader::decode(&mut &header_bytes[..])?;

    let body_len = validate_length(&header, config)?;

    let mut body = vec![0u8; body_len];
    if body_len > 0 {
        reader.read_exact(&mut body)?;
    }

    Ok(Frame {
        header,
        body: Bytes::from(body),
    })
}

/// Split one frame off the front of `buf`
///
/// Returns `Ok(None)` and leaves `buf` untouched when the frame is not yet
/// complete.
pub fn split_frame(buf: &mut BytesMut, config: &Config) -> Result<Option<Frame>> {
    if buf.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = MessageHeader::decode(&mut &buf[..HEADER_SIZE])?;
    let body_len = validate_length(&header, config)?;
    if buf.len() < HEADER_SIZE + body_len {
        return Ok(None);
    }

    buf.advance(HEADER_SIZE);
    let body = buf.split_to(body_len).freeze();
    Ok(Some(Frame { header, body }))
}
