//! Binary document codec
//!
//! Encoding and decoding of documents in the little-endian binary format.
//!
//! ## Document Layout
//! ```text
//! ┌──────────┬──────────────────────────────────────┬──────┐
//! │ Len (4)  │ Elements...                          │ 0x00 │
//! └──────────┴──────────────────────────────────────┴──────┘
//! ```
//!
//! ### Element
//! ```text
//! ┌──────────┬────────────────────┬───────────────────────┐
//! │ Type (1) │ Key (cstring)      │ Value (type-specific) │
//! └──────────┴────────────────────┴───────────────────────┘
//! ```
//!
//! Arrays are documents keyed "0", "1", ...
//!
//! Keys are NUL-terminated, so a key holding a NUL byte cannot be encoded.
//! Decoding stops at [`MAX_NESTING_DEPTH`] levels of embedded documents.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, WireError};

use super::{DateTime, Document, DocumentBuilder, ObjectId, Timestamp, Value, ValueType};

/// Smallest possible document: length prefix plus terminator
pub const MIN_DOCUMENT_SIZE: usize = 5;

/// Deepest chain of documents accepted by the decoder, the outermost included
pub const MAX_NESTING_DEPTH: usize = 100;

// Element type bytes
const TYPE_DOUBLE: u8 = 0x01;
const TYPE_STRING: u8 = 0x02;
const TYPE_DOCUMENT: u8 = 0x03;
const TYPE_ARRAY: u8 = 0x04;
const TYPE_OBJECT_ID: u8 = 0x07;
const TYPE_BOOLEAN: u8 = 0x08;
const TYPE_DATE_TIME: u8 = 0x09;
const TYPE_NULL: u8 = 0x0A;
const TYPE_INT32: u8 = 0x10;
const TYPE_TIMESTAMP: u8 = 0x11;
const TYPE_INT64: u8 = 0x12;

fn element_type(value_type: ValueType) -> u8 {
    match value_type {
        ValueType::Double => TYPE_DOUBLE,
        ValueType::String => TYPE_STRING,
        ValueType::Document => TYPE_DOCUMENT,
        ValueType::Array => TYPE_ARRAY,
        ValueType::ObjectId => TYPE_OBJECT_ID,
        ValueType::Boolean => TYPE_BOOLEAN,
        ValueType::DateTime => TYPE_DATE_TIME,
        ValueType::Null => TYPE_NULL,
        ValueType::Int32 => TYPE_INT32,
        ValueType::Timestamp => TYPE_TIMESTAMP,
        ValueType::Int64 => TYPE_INT64,
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a document to bytes
pub fn encode_document(doc: &Document) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(64);
    write_document(&mut buf, doc)?;
    Ok(buf.freeze())
}

/// Append the encoding of `doc` to `buf`
///
/// On error `buf` is left as it was.
pub fn write_document(buf: &mut BytesMut, doc: &Document) -> Result<()> {
    let start = buf.len();
    let result = write_elements(buf, doc.iter());
    if result.is_err() {
        buf.truncate(start);
    }
    result
}

fn write_elements<'a>(
    buf: &mut BytesMut,
    elements: impl Iterator<Item = (&'a str, &'a Value)>,
) -> Result<()> {
    let start = buf.len();
    // Length placeholder, patched once the elements are written
    buf.put_i32_le(0);

    for (key, value) in elements {
        buf.put_u8(element_type(value.value_type()));
        write_key(buf, key)?;
        write_value(buf, value)?;
    }
    buf.put_u8(0);

    let len = (buf.len() - start) as i32;
    buf[start..start + 4].copy_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_value(buf: &mut BytesMut, value: &Value) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Boolean(v) => buf.put_u8(*v as u8),
        Value::Int32(v) => buf.put_i32_le(*v),
        Value::Int64(v) => buf.put_i64_le(*v),
        Value::Double(v) => buf.put_f64_le(*v),
        Value::String(s) => {
            buf.put_i32_le(s.len() as i32 + 1);
            buf.put_slice(s.as_bytes());
            buf.put_u8(0);
        }
        // Increment occupies the low four bytes on the wire
        Value::Timestamp(ts) => buf.put_u64_le(ts.to_u64()),
        Value::DateTime(dt) => buf.put_i64_le(dt.millis()),
        Value::ObjectId(oid) => buf.put_slice(&oid.bytes()),
        Value::Document(doc) => return write_elements(buf, doc.iter()),
        Value::Array(items) => {
            let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
            return write_elements(buf, keys.iter().map(String::as_str).zip(items.iter()));
        }
    }
    Ok(())
}

fn write_key(buf: &mut BytesMut, key: &str) -> Result<()> {
    if key.as_bytes().contains(&0) {
        return Err(WireError::BadValue(format!(
            "Key {:?} contains a NUL byte and cannot be encoded",
            key
        )));
    }
    buf.put_slice(key.as_bytes());
    buf.put_u8(0);
    Ok(())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a single document from the front of `buf`
///
/// Consumes exactly the bytes of the document. `max_size` bounds the length
/// prefix before any allocation happens.
pub fn decode_document<B: Buf>(buf: &mut B, max_size: usize) -> Result<Document> {
    decode_nested(buf, max_size, 1)
}

fn decode_nested<B: Buf>(buf: &mut B, max_size: usize, depth: usize) -> Result<Document> {
    let body = take_document_body(buf, max_size)?;
    parse_elements(body, max_size, depth)
}

/// Split off one length-prefixed document, returning its elements + terminator
fn take_document_body<B: Buf>(buf: &mut B, max_size: usize) -> Result<Bytes> {
    if buf.remaining() < 4 {
        return Err(WireError::InvalidMessage(format!(
            "Incomplete document: expected length prefix, got {} bytes",
            buf.remaining()
        )));
    }

    let len = buf.get_i32_le();
    if len < MIN_DOCUMENT_SIZE as i32 {
        return Err(WireError::FailedToParse(format!(
            "Invalid document length: {}",
            len
        )));
    }
    let len = len as usize;
    if len > max_size {
        return Err(WireError::FailedToParse(format!(
            "Document too large: {} bytes (max {})",
            len, max_size
        )));
    }
    if buf.remaining() < len - 4 {
        return Err(WireError::InvalidMessage(format!(
            "Incomplete document: expected {} bytes, got {}",
            len - 4,
            buf.remaining()
        )));
    }

    Ok(buf.copy_to_bytes(len - 4))
}

fn parse_elements(mut body: Bytes, max_size: usize, depth: usize) -> Result<Document> {
    let mut builder = DocumentBuilder::new();

    loop {
        if !body.has_remaining() {
            return Err(WireError::FailedToParse(
                "Document is missing its terminator".to_string(),
            ));
        }

        let type_byte = body.get_u8();
        if type_byte == 0 {
            break;
        }

        let key = read_cstring(&mut body)?;
        let value = read_value(&mut body, type_byte, &key, max_size, depth)?;
        builder = builder.append_value(&key, value);
    }

    if body.has_remaining() {
        return Err(WireError::FailedToParse(format!(
            "{} trailing bytes after document terminator",
            body.remaining()
        )));
    }

    Ok(builder.build())
}

fn read_value(
    buf: &mut Bytes,
    type_byte: u8,
    key: &str,
    max_size: usize,
    depth: usize,
) -> Result<Value> {
    if (type_byte == TYPE_DOCUMENT || type_byte == TYPE_ARRAY) && depth >= MAX_NESTING_DEPTH {
        return Err(WireError::FailedToParse(format!(
            "Document nested too deeply at \"{}\" (max depth {})",
            key, MAX_NESTING_DEPTH
        )));
    }

    let value = match type_byte {
        TYPE_DOUBLE => Value::Double(f64::from_bits(read_u64(buf, key)?)),
        TYPE_STRING => Value::String(read_string(buf, key)?),
        TYPE_DOCUMENT => Value::Document(decode_nested(buf, max_size, depth + 1)?),
        TYPE_ARRAY => {
            let doc = decode_nested(buf, max_size, depth + 1)?;
            Value::Array(doc.iter().map(|(_, v)| v.clone()).collect())
        }
        TYPE_OBJECT_ID => {
            ensure(buf, 12, key)?;
            let mut bytes = [0u8; 12];
            buf.copy_to_slice(&mut bytes);
            Value::ObjectId(ObjectId::from_bytes(bytes))
        }
        TYPE_BOOLEAN => {
            ensure(buf, 1, key)?;
            match buf.get_u8() {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => {
                    return Err(WireError::FailedToParse(format!(
                        "Invalid boolean byte 0x{:02x} for \"{}\"",
                        other, key
                    )))
                }
            }
        }
        TYPE_DATE_TIME => Value::DateTime(DateTime::from_millis(read_u64(buf, key)? as i64)),
        TYPE_NULL => Value::Null,
        TYPE_INT32 => {
            ensure(buf, 4, key)?;
            Value::Int32(buf.get_i32_le())
        }
        TYPE_TIMESTAMP => Value::Timestamp(Timestamp::from_u64(read_u64(buf, key)?)),
        TYPE_INT64 => Value::Int64(read_u64(buf, key)? as i64),
        other => {
            return Err(WireError::FailedToParse(format!(
                "Unsupported element type 0x{:02x} for \"{}\"",
                other, key
            )))
        }
    };
    Ok(value)
}

fn ensure(buf: &Bytes, needed: usize, key: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(WireError::InvalidMessage(format!(
            "Incomplete value for \"{}\": expected {} bytes, got {}",
            key,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn read_u64(buf: &mut Bytes, key: &str) -> Result<u64> {
    ensure(buf, 8, key)?;
    Ok(buf.get_u64_le())
}

fn read_string(buf: &mut Bytes, key: &str) -> Result<String> {
    ensure(buf, 4, key)?;
    let len = buf.get_i32_le();
    if len < 1 {
        return Err(WireError::FailedToParse(format!(
            "Invalid string length {} for \"{}\"",
            len, key
        )));
    }
    let len = len as usize;
    ensure(buf, len, key)?;

    let raw = buf.copy_to_bytes(len);
    if raw[len - 1] != 0 {
        return Err(WireError::FailedToParse(format!(
            "String for \"{}\" is not NUL-terminated",
            key
        )));
    }
    String::from_utf8(raw[..len - 1].to_vec())
        .map_err(|_| WireError::FailedToParse(format!("String for \"{}\" is not UTF-8", key)))
}

/// Read a NUL-terminated UTF-8 string
pub fn read_cstring<B: Buf>(buf: &mut B) -> Result<String> {
    let mut raw = Vec::new();
    loop {
        if !buf.has_remaining() {
            return Err(WireError::InvalidMessage(
                "Unterminated string: buffer exhausted before NUL".to_string(),
            ));
        }
        match buf.get_u8() {
            0 => break,
            byte => raw.push(byte),
        }
    }
    String::from_utf8(raw)
        .map_err(|_| WireError::InvalidMessage("String is not valid UTF-8".to_string()))
}
