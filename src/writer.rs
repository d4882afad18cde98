//! Outbound message writer.
//!
//! [`MessageWriter`] turns whole application payloads into frames and writes
//! them through a [`FramedWrite`] driven by [`FrameCodec`]. Data messages are
//! optionally deflated (RSV1 on the first frame only) and split by the
//! [`Fragmenter`]; every frame is masked when the writer acts as a client.

use std::io;

use bytes::Bytes;
use futures::SinkExt;
use log::{debug, trace};
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use crate::{
    codec::{CodecError, FrameCodec},
    compression::Deflater,
    config::WriterConfig,
    fragmenter::Fragmenter,
    frame::{Frame, MAX_CONTROL_PAYLOAD, Opcode},
    metrics::{self, Direction},
};

/// Writes whole messages as frames to `W`.
#[derive(Debug)]
pub struct MessageWriter<W> {
    framed: FramedWrite<W, FrameCodec>,
    fragmenter: Fragmenter,
    deflater: Option<Deflater>,
    config: WriterConfig,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a writer with default settings: no masking, no compression.
    #[must_use]
    pub fn new(transport: W) -> Self { Self::with_config(transport, WriterConfig::default()) }

    /// Create a writer from an explicit configuration.
    #[must_use]
    pub fn with_config(transport: W, config: WriterConfig) -> Self {
        // Control frames are never split, so they may exceed the fragment size.
        let limit = config.max_fragment_size().get().max(MAX_CONTROL_PAYLOAD);
        let codec = FrameCodec::new(limit);
        Self {
            framed: FramedWrite::new(transport, codec),
            fragmenter: Fragmenter::new(config.max_fragment_size()),
            deflater: config.compresses().then(|| Deflater::new(false)),
            config,
        }
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &WriterConfig { &self.config }

    /// Send a text message.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if compression or the transport fails.
    pub async fn send_text(&mut self, text: &str) -> Result<(), CodecError> {
        self.send(Opcode::Text, Bytes::copy_from_slice(text.as_bytes()))
            .await
    }

    /// Send a binary message.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if compression or the transport fails.
    pub async fn send_binary(&mut self, payload: impl Into<Bytes>) -> Result<(), CodecError> {
        self.send(Opcode::Binary, payload.into()).await
    }

    /// Send a Close frame with a status code and reason.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the transport fails.
    pub async fn send_close(&mut self, code: u16, reason: &str) -> Result<(), CodecError> {
        let payload = Frame::close_with_code(code, reason).into_payload();
        self.send(Opcode::Close, payload).await
    }

    /// Send a Ping frame.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the payload exceeds 125 bytes or the
    /// transport fails.
    pub async fn send_ping(&mut self, payload: impl Into<Bytes>) -> Result<(), CodecError> {
        self.send(Opcode::Ping, payload.into()).await
    }

    /// Send a Pong frame.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the payload exceeds 125 bytes or the
    /// transport fails.
    pub async fn send_pong(&mut self, payload: impl Into<Bytes>) -> Result<(), CodecError> {
        self.send(Opcode::Pong, payload.into()).await
    }

    /// Send one message with an arbitrary opcode.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for invalid messages (continuation opcode,
    /// oversized control payload), compression failures and transport errors.
    pub async fn send(&mut self, opcode: Opcode, payload: Bytes) -> Result<(), CodecError> {
        let (payload, compressed) = match self.deflater.as_mut() {
            Some(deflater) if opcode.is_data() && !payload.is_empty() => {
                let deflated = deflater.deflate(&payload).map_err(io::Error::other)?;
                trace!("deflated {} bytes to {}", payload.len(), deflated.len());
                (deflated, true)
            }
            _ => (payload, false),
        };

        let frames = self.fragmenter.fragment(opcode, payload, compressed)?;
        debug!("sending {opcode:?} message as {} frame(s)", frames.len());
        for frame in frames {
            let frame = if self.config.masks_frames() {
                frame.masked()
            } else {
                frame
            };
            self.framed.feed(frame).await?;
            metrics::inc_frames(Direction::Outbound);
        }
        self.framed.flush().await?;
        metrics::inc_messages(opcode);
        Ok(())
    }

    /// Return the underlying transport.
    pub fn into_inner(self) -> W { self.framed.into_inner() }
}
