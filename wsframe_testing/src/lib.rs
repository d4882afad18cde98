//! Test utilities for the `wsframe` crate.
//!
//! Provides in-memory transports that deliver bytes in scripted chunks, a
//! builder for encoded frame streams, and a serialised handle to the global
//! `log` capture.
//!
//! ```rust
//! use wsframe::frame::{Fin, Frame};
//! use wsframe_testing::{ChunkedReader, FrameStream};
//!
//! let wire = FrameStream::new()
//!     .frame(Frame::text("Hel").with_fin(Fin::More))
//!     .frame(Frame::continuation("lo"))
//!     .close()
//!     .into_bytes();
//! let transport = ChunkedReader::new(wire).chunk_size(1);
//! # let _ = transport;
//! ```

pub mod frames;
pub mod logging;
pub mod transport;

pub use frames::FrameStream;
pub use logging::{LoggerHandle, logger};
pub use transport::ChunkedReader;
