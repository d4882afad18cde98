//! Outbound helper that splits message payloads into frames.
//!
//! [`Fragmenter`] chunks a data payload into fixed-size pieces: the first
//! frame carries the message opcode, every later one is a continuation, and
//! only the last has `fin` set. Control messages always travel as a single
//! frame.

use std::num::NonZeroUsize;

use bytes::Bytes;

use crate::{
    codec::ProtocolViolation,
    frame::{Fin, Frame, MAX_CONTROL_PAYLOAD, Opcode},
};

/// Splits message payloads into frame-sized pieces.
#[derive(Clone, Copy, Debug)]
pub struct Fragmenter {
    max_fragment_size: NonZeroUsize,
}

impl Fragmenter {
    /// Create a fragmenter that caps frame payloads at `max_fragment_size` bytes.
    #[must_use]
    pub const fn new(max_fragment_size: NonZeroUsize) -> Self { Self { max_fragment_size } }

    /// Return the maximum frame payload size in bytes.
    #[must_use]
    pub const fn max_fragment_size(&self) -> NonZeroUsize { self.max_fragment_size }

    /// Split `payload` into the frames of one `opcode` message.
    ///
    /// `compressed` marks the payload as already deflated; only the first
    /// frame carries the flag. Slicing shares the payload buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnexpectedContinuation`] for a
    /// `Continuation` opcode, and the matching control-frame violation when a
    /// control payload exceeds 125 bytes or `compressed` is set on it.
    pub fn fragment(
        &self,
        opcode: Opcode,
        payload: Bytes,
        compressed: bool,
    ) -> Result<Vec<Frame>, ProtocolViolation> {
        if opcode == Opcode::Continuation {
            return Err(ProtocolViolation::UnexpectedContinuation);
        }
        if opcode.is_control() {
            if compressed {
                return Err(ProtocolViolation::CompressedControlFrame(opcode));
            }
            if payload.len() > MAX_CONTROL_PAYLOAD {
                return Err(ProtocolViolation::ControlFrameTooLarge {
                    opcode,
                    len: payload.len(),
                });
            }
            return Ok(vec![Frame::new(Fin::Final, opcode, payload)]);
        }

        let max = self.max_fragment_size.get();
        if payload.len() <= max {
            return Ok(vec![
                Frame::new(Fin::Final, opcode, payload).with_compressed(compressed),
            ]);
        }

        let total = payload.len();
        let mut frames = Vec::with_capacity(total.div_ceil(max));
        let mut offset = 0usize;
        while offset < total {
            let end = (offset + max).min(total);
            let fin = Fin::from(end == total);
            let frame = if offset == 0 {
                Frame::new(fin, opcode, payload.slice(offset..end)).with_compressed(compressed)
            } else {
                Frame::new(fin, Opcode::Continuation, payload.slice(offset..end))
            };
            frames.push(frame);
            offset = end;
        }
        Ok(frames)
    }
}
