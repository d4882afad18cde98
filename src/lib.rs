#![doc(html_root_url = "https://docs.rs/wsframe/latest")]
//! WebSocket framing and message reassembly.
//!
//! The crate turns an incrementally arriving byte stream into whole
//! application messages and turns application payloads back into frames:
//!
//! - [`codec`]: header parsing, masking and length encoding behind `tokio_util`'s `Decoder` and
//!   `Encoder` traits.
//! - [`reader`]: fragment reassembly with single-message backpressure, cancellable reads and
//!   per-message DEFLATE.
//! - [`writer`]: fragmentation, compression and masking of outbound messages.
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use wsframe::{Reader, ReaderConfig};
//!
//! # async fn run(socket: impl tokio::io::AsyncRead + Unpin) -> wsframe::Result<()> {
//! let mut reader = Reader::with_config(socket, ReaderConfig::default());
//! let cancel = CancellationToken::new();
//! while let Some(mut message) = reader.read(&cancel).await? {
//!     let payload = message.raw_data().read_all();
//!     println!("{:?}: {} bytes", message.opcode(), payload.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod byte_order;
pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod fragmenter;
pub mod frame;
pub mod mask;
pub mod message;
pub mod metrics;
pub mod reader;
pub mod writer;

pub use codec::{CodecError, FrameCodec, ProtocolViolation};
pub use config::{Compression, ReaderConfig, WriterConfig};
pub use error::{ReaderError, Result};
pub use fragmenter::Fragmenter;
pub use frame::{Fin, Frame, Opcode};
pub use message::{Message, RawData};
pub use metrics::{Direction, ERRORS_TOTAL, FRAMES_TOTAL, MESSAGES_TOTAL};
pub use reader::{Reader, ReaderState};
pub use writer::MessageWriter;
