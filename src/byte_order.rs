//! Network byte-order helpers and the frame payload length encoding.
//!
//! The frame header carries its payload length in one of three forms: a 7-bit
//! inline value, a 16-bit extension (marker `126`) or a 64-bit extension
//! (marker `127`). Both extensions are big-endian. These helpers keep the
//! Clippy expectations scoped to the conversion points.

use bytes::BufMut;

/// Largest payload length that fits in the 7-bit inline field.
pub const MAX_INLINE_LEN: u8 = 125;
/// Marker announcing a 16-bit extended length.
pub const EXTENDED_16_MARKER: u8 = 126;
/// Marker announcing a 64-bit extended length.
pub const EXTENDED_64_MARKER: u8 = 127;

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use wsframe::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Extended payload lengths are transmitted big-endian."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use wsframe::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x01, 0x00]), 256);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Extended payload lengths are transmitted big-endian."
    )]
    u16::from_be_bytes(bytes)
}

/// Serialise a `u64` in network byte order (big-endian).
#[must_use]
pub fn write_network_u64(value: u64) -> [u8; 8] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Extended payload lengths are transmitted big-endian."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u64` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use wsframe::byte_order::read_network_u64;
///
/// assert_eq!(read_network_u64([0, 0, 0, 0, 0, 0x01, 0x00, 0x00]), 65_536);
/// ```
#[must_use]
pub fn read_network_u64(bytes: [u8; 8]) -> u64 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Extended payload lengths are transmitted big-endian."
    )]
    u64::from_be_bytes(bytes)
}

/// Minimal on-wire representation of a payload length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadLength {
    /// Fits in the 7-bit field (`0..=125`).
    Inline(u8),
    /// Marker `126` followed by a 16-bit length.
    Extended16(u16),
    /// Marker `127` followed by a 64-bit length.
    Extended64(u64),
}

impl PayloadLength {
    /// Choose the smallest encoding able to carry `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wsframe::byte_order::PayloadLength;
    ///
    /// assert_eq!(PayloadLength::for_len(125), PayloadLength::Inline(125));
    /// assert_eq!(PayloadLength::for_len(126), PayloadLength::Extended16(126));
    /// assert_eq!(PayloadLength::for_len(70_000), PayloadLength::Extended64(70_000));
    /// ```
    #[must_use]
    pub fn for_len(len: usize) -> Self {
        if let Some(inline) = u8::try_from(len).ok().filter(|l| *l <= MAX_INLINE_LEN) {
            return Self::Inline(inline);
        }
        match u16::try_from(len) {
            Ok(short) => Self::Extended16(short),
            Err(_) => Self::Extended64(len as u64),
        }
    }

    /// Value stored in the 7-bit length field.
    #[must_use]
    pub fn marker(self) -> u8 {
        match self {
            Self::Inline(len) => len,
            Self::Extended16(_) => EXTENDED_16_MARKER,
            Self::Extended64(_) => EXTENDED_64_MARKER,
        }
    }

    /// Number of bytes following the second header byte for this encoding.
    #[must_use]
    pub fn extension_len(self) -> usize {
        match self {
            Self::Inline(_) => 0,
            Self::Extended16(_) => 2,
            Self::Extended64(_) => 8,
        }
    }

    /// Write the extension bytes (if any) to `dst`.
    pub fn put_extension(self, dst: &mut impl BufMut) {
        match self {
            Self::Inline(_) => {}
            Self::Extended16(len) => dst.put_slice(&write_network_u16(len)),
            Self::Extended64(len) => dst.put_slice(&write_network_u64(len)),
        }
    }
}

/// Extension bytes implied by a 7-bit length marker.
#[must_use]
pub fn extension_len_for_marker(marker: u8) -> usize {
    match marker {
        EXTENDED_16_MARKER => 2,
        EXTENDED_64_MARKER => 8,
        _ => 0,
    }
}
