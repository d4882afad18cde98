//! Wire frames.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |         (16 or 64 bits)       |
//! |N|V|V|V|       |S|             |                               |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                 Masking-key, if MASK set to 1                 |
//! +---------------------------------------------------------------+
//! :                         Payload Data                          :
//! +---------------------------------------------------------------+
//! ```
//!
//! A [`Frame`] always holds its payload unmasked. The mask key is kept so a
//! decoded frame re-encodes to the same bytes.

mod opcode;

use bytes::{BufMut, Bytes, BytesMut};
pub use opcode::{Fin, Opcode};

use crate::{
    byte_order::{MAX_INLINE_LEN, PayloadLength, write_network_u16},
    codec::ProtocolViolation,
    mask::{apply_mask, generate_mask_key},
};

pub(crate) const FIN_BIT: u8 = 0b1000_0000;
pub(crate) const RSV1_BIT: u8 = 0b0100_0000;
pub(crate) const RSV2_RSV3_BITS: u8 = 0b0011_0000;
pub(crate) const OPCODE_BITS: u8 = 0b0000_1111;
pub(crate) const MASK_BIT: u8 = 0b1000_0000;
pub(crate) const LENGTH_BITS: u8 = 0b0111_1111;

/// Largest payload a control frame may carry.
pub const MAX_CONTROL_PAYLOAD: usize = MAX_INLINE_LEN as usize;

/// Largest possible header: 2 fixed bytes, 8 length bytes, 4 mask bytes.
pub const MAX_HEADER_LEN: usize = 14;

/// One wire unit: header flags plus an (unmasked) payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    fin: Fin,
    opcode: Opcode,
    compressed: bool,
    mask: Option<[u8; 4]>,
    payload: Bytes,
}

impl Frame {
    /// Construct an unmasked, uncompressed frame.
    #[must_use]
    pub fn new(fin: Fin, opcode: Opcode, payload: impl Into<Bytes>) -> Self {
        Self {
            fin,
            opcode,
            compressed: false,
            mask: None,
            payload: payload.into(),
        }
    }

    /// Final text frame.
    #[must_use]
    pub fn text(payload: impl Into<Bytes>) -> Self { Self::new(Fin::Final, Opcode::Text, payload) }

    /// Final binary frame.
    #[must_use]
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(Fin::Final, Opcode::Binary, payload)
    }

    /// Final continuation frame; use [`with_fin`](Self::with_fin) for middle fragments.
    #[must_use]
    pub fn continuation(payload: impl Into<Bytes>) -> Self {
        Self::new(Fin::Final, Opcode::Continuation, payload)
    }

    /// Close frame with a raw payload.
    #[must_use]
    pub fn close(payload: impl Into<Bytes>) -> Self { Self::new(Fin::Final, Opcode::Close, payload) }

    /// Close frame carrying a status code and UTF-8 reason.
    ///
    /// The reason is truncated at a character boundary so the payload stays
    /// within the control frame limit.
    #[must_use]
    pub fn close_with_code(code: u16, reason: &str) -> Self {
        let mut end = reason.len().min(MAX_CONTROL_PAYLOAD - 2);
        while !reason.is_char_boundary(end) {
            end -= 1;
        }
        let mut payload = BytesMut::with_capacity(2 + end);
        payload.put_slice(&write_network_u16(code));
        payload.put_slice(&reason.as_bytes()[..end]);
        Self::close(payload.freeze())
    }

    /// Ping frame.
    #[must_use]
    pub fn ping(payload: impl Into<Bytes>) -> Self { Self::new(Fin::Final, Opcode::Ping, payload) }

    /// Pong frame.
    #[must_use]
    pub fn pong(payload: impl Into<Bytes>) -> Self { Self::new(Fin::Final, Opcode::Pong, payload) }

    /// Replace the FIN flag.
    #[must_use]
    pub fn with_fin(mut self, fin: Fin) -> Self {
        self.fin = fin;
        self
    }

    /// Set or clear the RSV1 (per-message compression) flag.
    #[must_use]
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Use an explicit mask key when encoding; `None` sends the frame unmasked.
    #[must_use]
    pub fn with_mask(mut self, mask: Option<[u8; 4]>) -> Self {
        self.mask = mask;
        self
    }

    /// Mask the frame with a freshly generated key.
    #[must_use]
    pub fn masked(self) -> Self { self.with_mask(Some(generate_mask_key())) }

    /// FIN flag.
    #[must_use]
    pub const fn fin(&self) -> Fin { self.fin }

    /// Frame opcode.
    #[must_use]
    pub const fn opcode(&self) -> Opcode { self.opcode }

    /// RSV1 flag; on the first frame of a message it marks a deflated payload.
    #[must_use]
    pub const fn is_compressed(&self) -> bool { self.compressed }

    /// `true` when the frame is (or will be) masked on the wire.
    #[must_use]
    pub const fn is_masked(&self) -> bool { self.mask.is_some() }

    /// Mask key, present iff the frame is masked.
    #[must_use]
    pub const fn mask(&self) -> Option<[u8; 4]> { self.mask }

    /// Unmasked payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// Consume the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Check the per-frame invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolViolation`] for fragmented, oversized or compressed
    /// control frames and for compressed continuation frames.
    pub fn validate(&self) -> Result<(), ProtocolViolation> {
        validate_header(self.fin, self.opcode, self.compressed, self.payload.len())
    }

    /// Number of bytes [`encode_into`](Self::encode_into) will write.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let length = PayloadLength::for_len(self.payload.len());
        let mask_len = if self.mask.is_some() { 4 } else { 0 };
        2 + length.extension_len() + mask_len + self.payload.len()
    }

    /// Append the wire representation of this frame to `dst`.
    ///
    /// The header uses the smallest length encoding; when a mask key is set
    /// the payload is masked on the way out.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());

        let mut first = self.opcode.as_u8();
        if self.fin.is_final() {
            first |= FIN_BIT;
        }
        if self.compressed {
            first |= RSV1_BIT;
        }
        dst.put_u8(first);

        let length = PayloadLength::for_len(self.payload.len());
        let mut second = length.marker();
        if self.mask.is_some() {
            second |= MASK_BIT;
        }
        dst.put_u8(second);
        length.put_extension(dst);

        match self.mask {
            Some(key) => {
                dst.put_slice(&key);
                let start = dst.len();
                dst.put_slice(&self.payload);
                apply_mask(&mut dst[start..], key);
            }
            None => dst.put_slice(&self.payload),
        }
    }

    /// Encode this frame into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}

/// Header-level invariants shared by the encoder and the decoder.
pub(crate) fn validate_header(
    fin: Fin,
    opcode: Opcode,
    compressed: bool,
    len: usize,
) -> Result<(), ProtocolViolation> {
    if opcode.is_control() {
        if !fin.is_final() {
            return Err(ProtocolViolation::FragmentedControlFrame(opcode));
        }
        if compressed {
            return Err(ProtocolViolation::CompressedControlFrame(opcode));
        }
        if len > MAX_CONTROL_PAYLOAD {
            return Err(ProtocolViolation::ControlFrameTooLarge { opcode, len });
        }
    } else if compressed && opcode == Opcode::Continuation {
        return Err(ProtocolViolation::CompressedContinuation);
    }
    Ok(())
}
