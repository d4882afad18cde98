//! Per-message DEFLATE.
//!
//! Compressed messages carry a raw DEFLATE stream (no zlib header) flushed
//! with a sync flush, minus the trailing `00 00 FF FF` marker. The marker is
//! appended again before inflating.

use bytes::Bytes;
use flate2::{
    Compress,
    CompressError,
    Decompress,
    DecompressError,
    FlushCompress,
    FlushDecompress,
    Status,
};
use thiserror::Error;

/// Empty stored block emitted by a sync flush and stripped on the wire.
pub const DEFLATE_TRAILER: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

/// Output growth step while inflating or deflating.
const CHUNK: usize = 16 * 1024;

/// Failure while inflating a message.
#[derive(Debug, Error)]
pub enum InflateError {
    /// The payload is not a valid DEFLATE stream.
    #[error("corrupt deflate stream: {0}")]
    Corrupt(#[from] DecompressError),

    /// The inflated payload grew beyond the configured limit.
    #[error("inflated payload exceeds limit of {limit} bytes")]
    LimitExceeded {
        /// Configured limit.
        limit: usize,
    },
}

/// Inflates compressed message payloads.
#[derive(Debug)]
pub struct Inflater {
    decompress: Decompress,
    context_takeover: bool,
}

impl Inflater {
    /// Create an inflater; with `context_takeover` the window survives
    /// between messages.
    #[must_use]
    pub fn new(context_takeover: bool) -> Self {
        Self {
            decompress: Decompress::new(false),
            context_takeover,
        }
    }

    /// Inflate one whole message payload.
    ///
    /// # Errors
    ///
    /// Returns [`InflateError::Corrupt`] for invalid input and
    /// [`InflateError::LimitExceeded`] once output passes `limit` bytes.
    pub fn inflate(&mut self, payload: &[u8], limit: usize) -> Result<Bytes, InflateError> {
        let mut output = Vec::with_capacity(payload.len().saturating_mul(2).clamp(64, CHUNK));
        let result = self
            .feed(payload, &mut output, limit)
            .and_then(|ended| {
                if ended {
                    Ok(true)
                } else {
                    self.feed(&DEFLATE_TRAILER, &mut output, limit)
                }
            });

        match result {
            Ok(ended) => {
                if ended || !self.context_takeover {
                    self.decompress.reset(false);
                }
                Ok(Bytes::from(output))
            }
            Err(err) => {
                self.decompress.reset(false);
                Err(err)
            }
        }
    }

    /// Feed `input` through the decompressor; `Ok(true)` when the stream
    /// carried a final block.
    fn feed(
        &mut self,
        mut input: &[u8],
        output: &mut Vec<u8>,
        limit: usize,
    ) -> Result<bool, InflateError> {
        loop {
            if output.len() == output.capacity() {
                output.reserve(CHUNK);
            }
            let before_in = self.decompress.total_in();
            let before_out = output.len();
            let status = self
                .decompress
                .decompress_vec(input, output, FlushDecompress::Sync)?;
            let consumed = progress(before_in, self.decompress.total_in());
            input = &input[consumed..];

            if output.len() > limit {
                return Err(InflateError::LimitExceeded { limit });
            }
            if status == Status::StreamEnd {
                return Ok(true);
            }
            let has_room = output.len() < output.capacity();
            let stalled = consumed == 0 && output.len() == before_out;
            if (input.is_empty() && has_room) || (stalled && has_room) {
                return Ok(false);
            }
        }
    }
}

/// Deflates outbound message payloads.
#[derive(Debug)]
pub struct Deflater {
    compress: Compress,
    context_takeover: bool,
}

impl Deflater {
    /// Create a deflater at the default compression level.
    #[must_use]
    pub fn new(context_takeover: bool) -> Self {
        Self {
            compress: Compress::new(flate2::Compression::default(), false),
            context_takeover,
        }
    }

    /// Compress one whole message payload, stripping the sync-flush trailer.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`CompressError`] if compression fails.
    pub fn deflate(&mut self, payload: &[u8]) -> Result<Bytes, CompressError> {
        let mut output = Vec::with_capacity(payload.len() / 2 + 64);
        let mut input = payload;
        loop {
            if output.len() == output.capacity() {
                output.reserve(CHUNK);
            }
            let before_in = self.compress.total_in();
            self.compress
                .compress_vec(input, &mut output, FlushCompress::Sync)?;
            input = &input[progress(before_in, self.compress.total_in())..];
            if input.is_empty() && output.len() < output.capacity() {
                break;
            }
        }

        if output.ends_with(&DEFLATE_TRAILER) {
            output.truncate(output.len() - DEFLATE_TRAILER.len());
        }
        if !self.context_takeover {
            self.compress.reset();
        }
        Ok(Bytes::from(output))
    }
}

fn progress(before: u64, after: u64) -> usize {
    usize::try_from(after.saturating_sub(before)).unwrap_or(usize::MAX)
}
