//! Tests for frame extraction
//!
//! These tests verify:
//! - Reading frames from streams and files
//! - Incremental splitting of partially received buffers
//! - Length validation

use std::fs::File;
use std::io::{Cursor, Write};
use std::net::{IpAddr, Ipv6Addr};

use bytes::{BufMut, BytesMut};
use mongowire::config::Config;
use mongowire::wire::{
    read_frame, split_frame, MessageHeader, OpCode, RequestDecoder, RequestMessage, HEADER_SIZE,
};
use mongowire::WireError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn kill_cursors_frame(request_id: i32, cursor_ids: &[i64]) -> BytesMut {
    let body_len = 8 + cursor_ids.len() * 8;
    let header = MessageHeader {
        message_length: (HEADER_SIZE + body_len) as i32,
        request_id,
        response_to: 0,
        op_code: OpCode::KillCursors.code(),
    };

    let mut buf = BytesMut::new();
    header.encode(&mut buf);
    buf.put_i32_le(0);
    buf.put_i32_le(cursor_ids.len() as i32);
    for id in cursor_ids {
        buf.put_i64_le(*id);
    }
    buf
}

// =============================================================================
// Stream Reading
// =============================================================================

#[test]
fn test_read_frame_from_stream() {
    let raw = kill_cursors_frame(7, &[1, 2]);
    let mut stream = Cursor::new(raw.to_vec());

    let frame = read_frame(&mut stream, &Config::default()).unwrap();
    assert_eq!(frame.header.request_id, 7);
    assert_eq!(frame.body.len(), 24);
    assert_eq!(frame.to_bytes(), raw.freeze());
}

#[test]
fn test_read_frame_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("capture.bin");
    let mut file = File::create(&path).unwrap();
    file.write_all(&kill_cursors_frame(9, &[5])).unwrap();
    drop(file);

    let mut file = File::open(&path).unwrap();
    let config = Config::default();
    let frame = read_frame(&mut file, &config).unwrap();

    let decoder = RequestDecoder::new(&config);
    let message = decoder
        .decode_frame(frame, IpAddr::V6(Ipv6Addr::LOCALHOST), 27017)
        .unwrap();

    match message {
        RequestMessage::KillCursors(kill) => {
            assert_eq!(kill.cursor_ids, vec![5]);
            assert_eq!(kill.base.request_id, 9);
            assert_eq!(kill.base.client_address_string(), "::1");
        }
        other => panic!("Expected KillCursors, got {:?}", other),
    }
}

#[test]
fn test_read_frame_truncated_stream() {
    let raw = kill_cursors_frame(1, &[1]);
    let mut stream = Cursor::new(raw[..raw.len() - 2].to_vec());

    assert!(matches!(
        read_frame(&mut stream, &Config::default()),
        Err(WireError::Io(_))
    ));
}

#[test]
fn test_read_frame_too_large() {
    let raw = kill_cursors_frame(1, &[1, 2, 3]);
    let config = Config::builder().max_message_size(20).build();

    match read_frame(&mut Cursor::new(raw.to_vec()), &config) {
        Err(WireError::InvalidMessage(message)) => assert!(message.contains("too large")),
        other => panic!("Expected InvalidMessage, got {:?}", other),
    }
}

#[test]
fn test_frame_length_below_header() {
    let header = MessageHeader {
        message_length: 4,
        request_id: 1,
        response_to: 0,
        op_code: OpCode::Query.code(),
    };
    let mut buf = BytesMut::new();
    header.encode(&mut buf);

    assert!(matches!(
        split_frame(&mut buf, &Config::default()),
        Err(WireError::InvalidMessage(_))
    ));
}

// =============================================================================
// Incremental Splitting
// =============================================================================

#[test]
fn test_split_frame_waits_for_complete_frame() {
    let full = kill_cursors_frame(3, &[10, 20]);
    let config = Config::default();

    let mut buf = BytesMut::new();
    buf.extend_from_slice(&full[..10]);
    assert!(split_frame(&mut buf, &config).unwrap().is_none());
    assert_eq!(buf.len(), 10);

    buf.extend_from_slice(&full[10..full.len() - 1]);
    assert!(split_frame(&mut buf, &config).unwrap().is_none());

    buf.extend_from_slice(&full[full.len() - 1..]);
    let frame = split_frame(&mut buf, &config).unwrap().unwrap();
    assert_eq!(frame.header.request_id, 3);
    assert!(buf.is_empty());
}

#[test]
fn test_split_frame_leaves_next_frame() {
    let mut buf = kill_cursors_frame(1, &[1]);
    buf.extend_from_slice(&kill_cursors_frame(2, &[2]));
    let config = Config::default();

    let first = split_frame(&mut buf, &config).unwrap().unwrap();
    let second = split_frame(&mut buf, &config).unwrap().unwrap();

    assert_eq!(first.header.request_id, 1);
    assert_eq!(second.header.request_id, 2);
    assert!(split_frame(&mut buf, &config).unwrap().is_none());
}
