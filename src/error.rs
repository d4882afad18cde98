//! Canonical error and result types for the crate.
//!
//! [`ReaderError`] is returned by [`Reader::read`](crate::reader::Reader::read).
//! Every variant except [`ReaderError::Canceled`] is fatal: the reader moves
//! to a permanent failed state and the connection layer is expected to tear
//! the transport down.

use std::io;

use thiserror::Error;

use crate::{
    codec::{CodecError, ProtocolViolation},
    compression::InflateError,
};

/// Error surfaced by the message reader.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Malformed header or disallowed frame sequence.
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),

    /// A frame, accumulated message or inflated message exceeded the limit.
    #[error("payload of {actual} bytes exceeds limit of {limit}")]
    FrameTooLarge {
        /// Configured payload limit.
        limit: usize,
        /// Size that was declared or reached.
        actual: u64,
    },

    /// The transport ended mid-frame or mid-message.
    #[error("transport ended with {buffered} bytes of an incomplete frame or message")]
    Truncated {
        /// Bytes of the incomplete unit that did arrive.
        buffered: usize,
        /// Expected frame size, when known.
        expected: Option<usize>,
    },

    /// A compressed message could not be inflated.
    #[error("decompression failed: {0}")]
    DecompressionFailure(#[source] flate2::DecompressError),

    /// The transport reported an I/O error.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The caller's cancellation signal fired; the reader is unchanged.
    #[error("read canceled")]
    Canceled,

    /// A previous read failed fatally.
    #[error("reader already failed")]
    Failed,
}

impl ReaderError {
    /// `false` only for [`ReaderError::Canceled`].
    #[must_use]
    pub fn is_fatal(&self) -> bool { !matches!(self, Self::Canceled) }

    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ProtocolViolation(_) => "protocol",
            Self::FrameTooLarge { .. } => "too_large",
            Self::Truncated { .. } => "truncated",
            Self::DecompressionFailure(_) => "decompression",
            Self::Io(_) => "io",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }
}

impl From<CodecError> for ReaderError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Protocol(violation) => Self::ProtocolViolation(violation),
            CodecError::FrameTooLarge { limit, actual } => Self::FrameTooLarge { limit, actual },
            CodecError::Truncated { buffered, expected } => Self::Truncated { buffered, expected },
            CodecError::Io(e) => Self::Io(e),
        }
    }
}

impl From<InflateError> for ReaderError {
    fn from(err: InflateError) -> Self {
        match err {
            InflateError::Corrupt(e) => Self::DecompressionFailure(e),
            InflateError::LimitExceeded { limit } => Self::FrameTooLarge {
                limit,
                actual: limit as u64 + 1,
            },
        }
    }
}

/// Result alias used by reader APIs.
pub type Result<T> = std::result::Result<T, ReaderError>;

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::ReaderError;
    use crate::codec::{CodecError, ProtocolViolation};

    #[rstest]
    #[case(ReaderError::Canceled, false)]
    #[case(ReaderError::Failed, true)]
    #[case(ReaderError::Truncated { buffered: 3, expected: None }, true)]
    #[case(ReaderError::ProtocolViolation(ProtocolViolation::UnexpectedContinuation), true)]
    fn only_cancellation_is_recoverable(#[case] err: ReaderError, #[case] fatal: bool) {
        assert_eq!(err.is_fatal(), fatal);
    }

    #[test]
    fn codec_errors_map_onto_reader_taxonomy() {
        let err = ReaderError::from(CodecError::FrameTooLarge {
            limit: 10,
            actual: 11,
        });
        assert!(matches!(
            err,
            ReaderError::FrameTooLarge {
                limit: 10,
                actual: 11
            }
        ));

        let err = ReaderError::from(CodecError::Io(io::Error::other("reset")));
        assert_eq!(err.error_type(), "io");
        assert_eq!(err.to_string(), "transport error: reset");
    }
}
