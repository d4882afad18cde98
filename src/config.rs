//! Reader and writer configuration.
//!
//! Payload limits are taken exactly as given: a reader built with a limit of
//! ten bytes rejects an eleven-byte Ping just as it rejects an eleven-byte
//! Text frame.

use std::num::NonZeroUsize;

/// Payload limit used when none is given (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Capacity reserved in the read window before each transport read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Fragment size used by the outbound fragmenter when none is given.
pub const DEFAULT_MAX_FRAGMENT_SIZE: usize = 64 * 1024;

/// Per-message DEFLATE setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Frames with RSV1 set are a protocol violation.
    Disabled,
    /// Messages whose first frame has RSV1 set are inflated.
    Enabled {
        /// Keep the LZ77 window between messages instead of resetting it.
        context_takeover: bool,
    },
}

impl Default for Compression {
    fn default() -> Self {
        Self::Enabled {
            context_takeover: false,
        }
    }
}

impl Compression {
    /// `true` unless compression is disabled.
    #[must_use]
    pub const fn is_enabled(self) -> bool { matches!(self, Self::Enabled { .. }) }
}

/// Settings for a [`Reader`](crate::reader::Reader).
///
/// # Examples
///
/// ```
/// use wsframe::config::{Compression, ReaderConfig};
///
/// let config = ReaderConfig::new(1024 * 1024)
///     .compression(Compression::Disabled)
///     .control_interleaving(false);
/// assert_eq!(config.max_payload_size(), 1024 * 1024);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ReaderConfig {
    max_payload_size: usize,
    read_chunk_size: NonZeroUsize,
    compression: Compression,
    control_interleaving: bool,
}

impl ReaderConfig {
    /// Configuration with the given payload limit and defaults elsewhere.
    ///
    /// The limit bounds a single frame, an accumulated fragmented message and
    /// the inflated size of a compressed message.
    #[must_use]
    pub fn new(max_payload_size: usize) -> Self {
        Self {
            max_payload_size,
            ..Self::default()
        }
    }

    /// Capacity reserved in the window before each transport read.
    #[must_use]
    pub fn read_chunk_size(mut self, size: NonZeroUsize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Per-message compression handling.
    #[must_use]
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Allow control frames between the fragments of a data message.
    #[must_use]
    pub fn control_interleaving(mut self, allow: bool) -> Self {
        self.control_interleaving = allow;
        self
    }

    /// Payload limit.
    #[must_use]
    pub const fn max_payload_size(&self) -> usize { self.max_payload_size }

    /// Effective read chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> usize { self.read_chunk_size.get() }

    /// Compression setting.
    #[must_use]
    pub const fn compression_mode(&self) -> Compression { self.compression }

    /// Whether control frames may interleave with fragments.
    #[must_use]
    pub const fn allows_control_interleaving(&self) -> bool { self.control_interleaving }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            read_chunk_size: NonZeroUsize::new(DEFAULT_READ_CHUNK_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            compression: Compression::default(),
            control_interleaving: true,
        }
    }
}

/// Settings for a [`MessageWriter`](crate::writer::MessageWriter).
#[derive(Clone, Copy, Debug)]
pub struct WriterConfig {
    max_fragment_size: NonZeroUsize,
    mask: bool,
    compress: bool,
}

impl WriterConfig {
    /// Configuration splitting data messages into fragments of at most
    /// `max_fragment_size` payload bytes.
    #[must_use]
    pub fn new(max_fragment_size: NonZeroUsize) -> Self {
        Self {
            max_fragment_size,
            ..Self::default()
        }
    }

    /// Mask every outbound frame, as a client must.
    #[must_use]
    pub fn mask(mut self, mask: bool) -> Self {
        self.mask = mask;
        self
    }

    /// Deflate outbound data messages and flag them with RSV1.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Largest payload placed in a single fragment.
    #[must_use]
    pub const fn max_fragment_size(&self) -> NonZeroUsize { self.max_fragment_size }

    /// Whether frames are masked.
    #[must_use]
    pub const fn masks_frames(&self) -> bool { self.mask }

    /// Whether data messages are compressed.
    #[must_use]
    pub const fn compresses(&self) -> bool { self.compress }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_fragment_size: NonZeroUsize::new(DEFAULT_MAX_FRAGMENT_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            mask: false,
            compress: false,
        }
    }
}
