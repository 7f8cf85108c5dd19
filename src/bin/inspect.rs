//! mongowire Inspect Binary
//!
//! Decodes a captured request frame or a raw document and prints it,
//! optionally interpreted as one of the replication messages.

use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mongowire::bson::codec::decode_document;
use mongowire::command::Command;
use mongowire::oplog::OplogOperation;
use mongowire::repl::{HandshakeCommand, ReplSetHeartbeatCommand};
use mongowire::wire::{read_frame, RequestDecoder, RequestMessage};
use mongowire::{Config, Document, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// What the input file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// A complete request frame, header included
    Frame,
    /// A single binary document
    Document,
}

/// How to read the decoded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Interpretation {
    Raw,
    HeartbeatArg,
    HeartbeatReply,
    Handshake,
    Oplog,
}

/// mongowire Inspect
#[derive(Parser, Debug)]
#[command(name = "mongowire-inspect")]
#[command(about = "Decode wire frames and documents")]
#[command(version)]
struct Args {
    /// File to decode
    input: PathBuf,

    /// Input format
    #[arg(short, long, value_enum, default_value = "frame")]
    format: InputFormat,

    /// Interpret the (query) document as a replication message
    #[arg(short = 'a', long = "as", value_enum, default_value = "raw")]
    interpretation: Interpretation,

    /// Client address recorded in the request envelope
    #[arg(long, default_value = "127.0.0.1")]
    client_address: IpAddr,

    /// Client port recorded in the request envelope
    #[arg(long, default_value = "0")]
    client_port: u16,

    /// Maximum frame size in MB
    #[arg(short = 'm', long, default_value = "48")]
    max_message_mb: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mongowire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("mongowire inspect v{}", mongowire::VERSION);
    tracing::info!("Input: {}", args.input.display());

    let config = Config::builder()
        .max_message_size(args.max_message_mb * 1_000_000)
        .build();

    if let Err(e) = run(&args, &config) {
        tracing::error!("Failed to decode {}: {}", args.input.display(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let mut file = File::open(&args.input)?;

    let doc = match args.format {
        InputFormat::Frame => {
            let frame = read_frame(&mut file, config)?;
            tracing::debug!(
                "Frame: request {} op code {} ({} body bytes)",
                frame.header.request_id,
                frame.header.op_code,
                frame.body.len()
            );

            let decoder = RequestDecoder::new(config);
            let message = decoder.decode_frame(frame, args.client_address, args.client_port)?;
            println!("{:#?}", message);

            match message {
                RequestMessage::Query(query) => query.query,
                _ => return Ok(()),
            }
        }
        InputFormat::Document => {
            let mut raw = Vec::new();
            file.read_to_end(&mut raw)?;
            decode_document(&mut &raw[..], config.max_document_size)?
        }
    };

    println!("{}", doc);
    interpret(&doc, args.interpretation, config)
}

fn interpret(doc: &Document, interpretation: Interpretation, config: &Config) -> Result<()> {
    match interpretation {
        Interpretation::Raw => {}
        Interpretation::HeartbeatArg => {
            let arg = ReplSetHeartbeatCommand.unmarshall_arg(doc)?;
            if let Some(host) = &arg.sender_host {
                println!("sender: {}", host.with_default_port(config.default_port));
            }
            println!("{:#?}", arg);
        }
        Interpretation::HeartbeatReply => {
            let reply = ReplSetHeartbeatCommand.unmarshall_result(doc)?;
            println!("{:#?}", reply);
        }
        Interpretation::Handshake => {
            let arg = HandshakeCommand.unmarshall_arg(doc)?;
            println!("{:#?}", arg);
        }
        Interpretation::Oplog => {
            let op = OplogOperation::from_document(doc)?;
            println!("{:?} on {}: {:#?}", op.get_type(), op.database, op.payload);
        }
    }
    Ok(())
}
