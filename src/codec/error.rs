//! Error types for the frame codec.
//!
//! # Error Categories
//!
//! - [`ProtocolViolation`]: the bytes on the wire break a framing rule (reserved bits, unknown
//!   opcodes, fragmented or oversized control frames, disallowed fragmentation patterns).
//! - [`CodecError`]: top-level codec failure wrapping protocol violations, oversized frames,
//!   truncated input and transport I/O errors.
//!
//! Every [`CodecError`] is fatal for the stream it came from: once framing is
//! lost there is no way to find the next frame boundary.

use std::io;

use thiserror::Error;

use crate::frame::Opcode;

/// Reason a frame or frame sequence was rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The opcode nibble holds a reserved value.
    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),

    /// RSV2 or RSV3 is set; no negotiated extension defines them.
    #[error("reserved header bits set: {0:#05b}")]
    ReservedBitsSet(u8),

    /// A control frame arrived with `fin` cleared.
    #[error("fragmented {0:?} control frame")]
    FragmentedControlFrame(Opcode),

    /// A control frame carried more than 125 payload bytes.
    #[error("{opcode:?} control frame payload of {len} bytes exceeds 125")]
    ControlFrameTooLarge {
        /// Control opcode of the offending frame.
        opcode: Opcode,
        /// Declared payload length.
        len: usize,
    },

    /// RSV1 was set on a control frame.
    #[error("compressed {0:?} control frame")]
    CompressedControlFrame(Opcode),

    /// RSV1 was set on a continuation frame; only the first frame may carry it.
    #[error("compression flag set on continuation frame")]
    CompressedContinuation,

    /// RSV1 was set but compression is disabled for this stream.
    #[error("compressed frame received with compression disabled")]
    UnexpectedCompression,

    /// The 64-bit length has its most significant bit set.
    #[error("invalid 64-bit payload length {0:#x}")]
    InvalidLength(u64),

    /// A continuation frame arrived with no fragmented message open.
    #[error("continuation frame without an open fragmented message")]
    UnexpectedContinuation,

    /// A non-continuation frame arrived while a fragmented message was still
    /// open. Control frames only trigger this when interleaving is disabled.
    #[error("{found:?} frame interleaved with open fragmented {open:?} message")]
    InterleavedFrame {
        /// Opcode of the message being accumulated.
        open: Opcode,
        /// Opcode of the frame that interrupted it.
        found: Opcode,
    },
}

/// Top-level codec error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame violates the wire protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// The declared payload length exceeds the configured maximum.
    #[error("frame payload of {actual} bytes exceeds limit of {limit}")]
    FrameTooLarge {
        /// Configured maximum payload size.
        limit: usize,
        /// Declared payload size.
        actual: u64,
    },

    /// The transport ended in the middle of a frame.
    #[error("stream truncated with {buffered} bytes of an incomplete frame buffered")]
    Truncated {
        /// Bytes of the incomplete frame that did arrive.
        buffered: usize,
        /// Total frame size, when the header was complete.
        expected: Option<usize>,
    },

    /// Transport I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of: `"protocol"`, `"too_large"`, `"truncated"` or `"io"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol",
            Self::FrameTooLarge { .. } => "too_large",
            Self::Truncated { .. } => "truncated",
            Self::Io(_) => "io",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Truncated { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            CodecError::Protocol(_) | CodecError::FrameTooLarge { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
        }
    }
}
