//! Frame codec for the WebSocket wire format.
//!
//! [`FrameCodec`] plugs into `tokio_util`'s [`Decoder`]/[`Encoder`] traits so
//! it can drive a `FramedRead`/`FramedWrite` or be fed a growing [`BytesMut`]
//! window by hand, as the [`Reader`](crate::reader::Reader) does.
//!
//! Decoding is resumable: while the window holds only part of a frame the
//! decoder returns `Ok(None)` and keeps any parsed header, so the caller can
//! append more bytes from the transport and try again.
//!
//! # Error Handling
//!
//! All failures are reported as [`CodecError`]. See the [`error`] module for
//! the taxonomy.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    byte_order::{extension_len_for_marker, read_network_u16, read_network_u64},
    frame::{
        FIN_BIT,
        Fin,
        Frame,
        LENGTH_BITS,
        MASK_BIT,
        OPCODE_BITS,
        Opcode,
        RSV1_BIT,
        RSV2_RSV3_BITS,
        validate_header,
    },
    mask::apply_mask,
};

pub mod error;

pub use error::{CodecError, ProtocolViolation};

/// Header fields of a frame whose payload has not fully arrived yet.
#[derive(Clone, Copy, Debug)]
struct PendingHeader {
    fin: Fin,
    opcode: Opcode,
    compressed: bool,
    mask: Option<[u8; 4]>,
    payload_len: usize,
}

/// Stateful encoder/decoder for individual frames.
#[derive(Clone, Debug)]
pub struct FrameCodec {
    max_payload_size: usize,
    allow_compressed: bool,
    pending: Option<PendingHeader>,
}

impl FrameCodec {
    /// Construct a codec rejecting payloads above `max_payload_size`.
    #[must_use]
    pub fn new(max_payload_size: usize) -> Self {
        Self {
            max_payload_size,
            allow_compressed: true,
            pending: None,
        }
    }

    /// Accept or reject frames with the RSV1 compression flag.
    #[must_use]
    pub fn with_compression(mut self, allow: bool) -> Self {
        self.allow_compressed = allow;
        self
    }

    /// Maximum payload length accepted by this codec.
    #[must_use]
    pub fn max_payload_size(&self) -> usize { self.max_payload_size }

    /// `true` while a header has been consumed but its payload is incomplete.
    #[must_use]
    pub fn is_mid_frame(&self) -> bool { self.pending.is_some() }

    fn parse_header(&self, src: &mut BytesMut) -> Result<Option<PendingHeader>, CodecError> {
        let &[first, second, ..] = src.as_ref() else {
            return Ok(None);
        };

        let reserved = first & RSV2_RSV3_BITS;
        if reserved != 0 {
            return Err(ProtocolViolation::ReservedBitsSet(reserved >> 4).into());
        }
        let opcode = Opcode::try_from(first & OPCODE_BITS)?;
        let fin = Fin::from(first & FIN_BIT != 0);
        let compressed = first & RSV1_BIT != 0;
        let masked = second & MASK_BIT != 0;
        let marker = second & LENGTH_BITS;

        let extension = extension_len_for_marker(marker);
        let mask_len = if masked { 4 } else { 0 };
        let header_len = 2 + extension + mask_len;
        if src.len() < header_len {
            return Ok(None);
        }

        let declared = match extension {
            0 => u64::from(marker),
            2 => u64::from(read_network_u16(array_at(src, 2))),
            _ => read_network_u64(array_at(src, 2)),
        };
        if declared >> 63 != 0 {
            return Err(ProtocolViolation::InvalidLength(declared).into());
        }
        let too_large = || CodecError::FrameTooLarge {
            limit: self.max_payload_size,
            actual: declared,
        };
        let payload_len = usize::try_from(declared).map_err(|_| too_large())?;

        validate_header(fin, opcode, compressed, payload_len)?;
        if compressed && !self.allow_compressed {
            return Err(ProtocolViolation::UnexpectedCompression.into());
        }
        if payload_len > self.max_payload_size {
            return Err(too_large());
        }

        let mask = masked.then(|| array_at(src, 2 + extension));
        let _ = src.split_to(header_len);
        Ok(Some(PendingHeader {
            fin,
            opcode,
            compressed,
            mask,
            payload_len,
        }))
    }
}

impl Default for FrameCodec {
    fn default() -> Self { Self::new(crate::config::DEFAULT_MAX_PAYLOAD_SIZE) }
}

/// Copy `N` bytes starting at `offset`; callers check the length first.
fn array_at<const N: usize>(src: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0_u8; N];
    out.copy_from_slice(&src[offset..offset + N]);
    out
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match self.pending.take() {
            Some(header) => header,
            None => match self.parse_header(src)? {
                Some(header) => header,
                None => return Ok(None),
            },
        };

        if src.len() < header.payload_len {
            src.reserve(header.payload_len - src.len());
            self.pending = Some(header);
            return Ok(None);
        }

        let mut payload = src.split_to(header.payload_len);
        if let Some(key) = header.mask {
            apply_mask(&mut payload, key);
        }
        let frame = Frame::new(header.fin, header.opcode, payload.freeze())
            .with_compressed(header.compressed)
            .with_mask(header.mask);
        Ok(Some(frame))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() && self.pending.is_none() {
            return Ok(None);
        }

        let expected = self.pending.map(|header| header.payload_len);
        tracing::debug!(
            buffered = src.len(),
            ?expected,
            "transport ended inside a frame"
        );
        Err(CodecError::Truncated {
            buffered: src.len(),
            expected,
        })
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.validate()?;
        let len = item.payload().len();
        if len > self.max_payload_size {
            return Err(CodecError::FrameTooLarge {
                limit: self.max_payload_size,
                actual: len as u64,
            });
        }
        item.encode_into(dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
