//! Message header definitions
//!
//! Every frame starts with the same 16-byte little-endian header.

use std::net::IpAddr;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, WireError};

/// Header size: length (4) + request id (4) + response to (4) + op code (4)
pub const HEADER_SIZE: usize = 16;

/// Operation codes carried in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum OpCode {
    Reply = 1,
    Update = 2001,
    Insert = 2002,
    Query = 2004,
    GetMore = 2005,
    Delete = 2006,
    KillCursors = 2007,
    Command = 2010,
    CommandReply = 2011,
    Msg = 2013,
}

impl OpCode {
    pub fn from_code(code: i32) -> Option<Self> {
        let op_code = match code {
            1 => OpCode::Reply,
            2001 => OpCode::Update,
            2002 => OpCode::Insert,
            2004 => OpCode::Query,
            2005 => OpCode::GetMore,
            2006 => OpCode::Delete,
            2007 => OpCode::KillCursors,
            2010 => OpCode::Command,
            2011 => OpCode::CommandReply,
            2013 => OpCode::Msg,
            _ => return None,
        };
        Some(op_code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// The fixed header at the front of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Total frame size, this header included
    pub message_length: i32,
    pub request_id: i32,
    /// Request id being answered; zero on requests
    pub response_to: i32,
    /// Raw op code, kept unparsed so unknown codes can be reported
    pub op_code: i32,
}

impl MessageHeader {
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < HEADER_SIZE {
            return Err(WireError::InvalidMessage(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                buf.remaining()
            )));
        }

        Ok(Self {
            message_length: buf.get_i32_le(),
            request_id: buf.get_i32_le(),
            response_to: buf.get_i32_le(),
            op_code: buf.get_i32_le(),
        })
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.message_length);
        buf.put_i32_le(self.request_id);
        buf.put_i32_le(self.response_to);
        buf.put_i32_le(self.op_code);
    }

    /// Bytes following the header
    pub fn body_length(&self) -> usize {
        (self.message_length as usize).saturating_sub(HEADER_SIZE)
    }
}

/// Envelope shared by every decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBaseMessage {
    pub client_address: IpAddr,
    pub client_port: u16,
    pub request_id: i32,
    pub op_code: OpCode,
}

impl RequestBaseMessage {
    pub fn new(client_address: IpAddr, client_port: u16, request_id: i32, op_code: OpCode) -> Self {
        Self {
            client_address,
            client_port,
            request_id,
            op_code,
        }
    }

    /// Build the envelope from a parsed header, rejecting unknown op codes
    pub fn from_header(header: &MessageHeader, client_address: IpAddr, client_port: u16) -> Result<Self> {
        let op_code = OpCode::from_code(header.op_code).ok_or_else(|| {
            WireError::InvalidMessage(format!("Unknown op code: {}", header.op_code))
        })?;
        Ok(Self::new(client_address, client_port, header.request_id, op_code))
    }

    pub fn client_address_string(&self) -> String {
        self.client_address.to_string()
    }
}
