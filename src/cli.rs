//! Command line interface for the `wsframe` binary.
//!
//! The binary reassembles a captured frame stream and prints one line per
//! message. The definition is shared with `build.rs` for man page
//! generation, so it depends on `clap` alone.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `wsframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "wsframe",
    version,
    about = "Reassemble a captured WebSocket frame stream into messages"
)]
pub struct Cli {
    /// File holding the raw frame bytes; standard input when omitted.
    pub input: Option<PathBuf>,

    /// Largest accepted frame or message payload, in bytes.
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    pub max_payload_size: usize,

    /// Bytes requested from the input per read.
    #[arg(long, default_value_t = 8 * 1024)]
    pub chunk_size: usize,

    /// Treat frames with the compression bit as protocol violations.
    #[arg(long)]
    pub no_compression: bool,

    /// Keep the DEFLATE window between messages.
    #[arg(long, conflicts_with = "no_compression")]
    pub context_takeover: bool,

    /// Reject control frames that arrive inside a fragmented message.
    #[arg(long)]
    pub strict: bool,

    /// Number of payload bytes shown for each message.
    #[arg(long, default_value_t = 32)]
    pub preview: usize,
}
