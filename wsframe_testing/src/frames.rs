//! Builder for encoded frame streams.

use bytes::{Bytes, BytesMut};
use wsframe::{
    compression::Deflater,
    frame::{Fin, Frame, Opcode},
};

/// Accumulates the wire bytes of a sequence of frames.
///
/// Frames are encoded exactly as given, so invalid sequences (a stray
/// continuation, an interleaved data frame) can be produced on purpose.
#[derive(Debug, Default)]
pub struct FrameStream {
    wire: BytesMut,
}

impl FrameStream {
    /// Start an empty stream.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append one frame.
    #[must_use]
    pub fn frame(mut self, frame: Frame) -> Self {
        frame.encode_into(&mut self.wire);
        self
    }

    /// Append every frame from `frames`.
    #[must_use]
    pub fn frames(self, frames: impl IntoIterator<Item = Frame>) -> Self {
        frames.into_iter().fold(self, Self::frame)
    }

    /// Append a data message split into frames of `fragment_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `fragment_size` is zero.
    #[must_use]
    pub fn fragmented(self, opcode: Opcode, payload: &[u8], fragment_size: usize) -> Self {
        assert!(fragment_size > 0, "fragment size must be non-zero");
        let chunks: Vec<&[u8]> = if payload.is_empty() {
            vec![payload]
        } else {
            payload.chunks(fragment_size).collect()
        };
        let last = chunks.len() - 1;
        let frames = chunks.into_iter().enumerate().map(|(i, chunk)| {
            let opcode = if i == 0 { opcode } else { Opcode::Continuation };
            let fin = Fin::from(i == last);
            Frame::new(fin, opcode, Bytes::copy_from_slice(chunk))
        });
        self.frames(frames.collect::<Vec<_>>())
    }

    /// Append a single-frame message deflated with a fresh context.
    ///
    /// # Panics
    ///
    /// Panics if compression fails.
    #[must_use]
    pub fn compressed(self, opcode: Opcode, payload: &[u8]) -> Self {
        let deflated = Deflater::new(false)
            .deflate(payload)
            .expect("deflate should succeed");
        self.frame(Frame::new(Fin::Final, opcode, deflated).with_compressed(true))
    }

    /// Append an empty Close frame.
    #[must_use]
    pub fn close(self) -> Self { self.frame(Frame::close(Bytes::new())) }

    /// Append raw bytes, typically a malformed or partial frame.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.wire.extend_from_slice(bytes);
        self
    }

    /// Encoded length so far.
    #[must_use]
    pub fn len(&self) -> usize { self.wire.len() }

    /// `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.wire.is_empty() }

    /// Finish the stream.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.wire.freeze() }
}
