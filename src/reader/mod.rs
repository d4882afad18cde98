//! Stream reader and message reassembler.
//!
//! [`Reader`] owns the read side of a transport positioned at the first frame
//! byte. Each [`read`](Reader::read) decodes frames from a growing receive
//! window until one completes a message, pulling more bytes from the
//! transport as needed.
//!
//! Two rules shape the loop:
//!
//! - **Backpressure**: the previously returned [`Message`] must be drained, consumed or dropped
//!   before the next frame is parsed. A `read` issued earlier suspends until that happens or the
//!   caller cancels.
//! - **Cancellation**: the caller's [`CancellationToken`] is observed whenever the reader suspends.
//!   Bytes already received stay in the window and fragments already accepted stay buffered, so a
//!   later `read` with a fresh token resumes where this one stopped.
//!
//! Fatal errors (everything except [`ReaderError::Canceled`]) move the reader to
//! [`ReaderState::Failed`]; later reads return [`ReaderError::Failed`].

mod assembly;
mod backpressure;

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::{codec::Decoder, sync::CancellationToken};

use self::assembly::{Assembled, Assembler};
pub(crate) use self::backpressure::DrainGate;
use crate::{
    codec::{FrameCodec, ProtocolViolation},
    compression::Inflater,
    config::{Compression, ReaderConfig},
    error::{ReaderError, Result},
    frame::{Frame, Opcode},
    message::Message,
    metrics::{self, Direction},
};

/// Observable reader state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    /// No message open, nothing outstanding.
    Idle,
    /// A fragmented data message is being accumulated.
    Accumulating {
        /// Opcode of the first fragment.
        opcode: Opcode,
        /// Whether the first fragment carried the compression flag.
        compressed: bool,
        /// Payload bytes accumulated so far.
        buffered_bytes: usize,
    },
    /// The last delivered message has not been drained yet.
    MessageReady,
    /// A delivered Close message was drained or the transport ended cleanly.
    Closed,
    /// A fatal error occurred.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Open,
    /// A Close message was delivered; the reader closes once it is drained.
    Closing,
    Closed,
    Failed,
}

/// Reassembles frames read from `T` into [`Message`]s.
#[derive(Debug)]
pub struct Reader<T> {
    transport: T,
    window: BytesMut,
    codec: FrameCodec,
    assembler: Assembler,
    inflater: Option<Inflater>,
    config: ReaderConfig,
    outstanding: Option<Arc<DrainGate>>,
    phase: Phase,
}

impl<T> Reader<T>
where
    T: AsyncRead + Unpin,
{
    /// Create a reader enforcing `max_payload_size` with default settings.
    #[must_use]
    pub fn new(transport: T, max_payload_size: usize) -> Self {
        Self::with_config(transport, ReaderConfig::new(max_payload_size))
    }

    /// Create a reader from an explicit configuration.
    #[must_use]
    pub fn with_config(transport: T, config: ReaderConfig) -> Self {
        Self::with_prefix(transport, Bytes::new(), config)
    }

    /// Create a reader whose window starts with `leftover`.
    ///
    /// Use this when the handshake layer read past the end of the upgrade
    /// response: those bytes are the start of the frame stream.
    #[must_use]
    pub fn with_prefix(transport: T, leftover: Bytes, config: ReaderConfig) -> Self {
        let codec = FrameCodec::new(config.max_payload_size())
            .with_compression(config.compression_mode().is_enabled());
        let inflater = match config.compression_mode() {
            Compression::Enabled { context_takeover } => Some(Inflater::new(context_takeover)),
            Compression::Disabled => None,
        };
        let mut window = BytesMut::with_capacity(config.chunk_size().max(leftover.len()));
        window.extend_from_slice(&leftover);

        Self {
            transport,
            window,
            codec,
            assembler: Assembler::new(
                config.max_payload_size(),
                config.allows_control_interleaving(),
            ),
            inflater,
            config,
            outstanding: None,
            phase: Phase::Open,
        }
    }

    /// Read the next message.
    ///
    /// Returns `Ok(None)` once the stream is closed, either after a delivered
    /// Close message has been drained or when the transport ended at a frame
    /// boundary with no message open. Closed readers keep returning
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Canceled`] if `cancel` fires while the reader is
    /// suspended; the reader is left usable. Any other error is fatal, see
    /// [`ReaderError`].
    pub async fn read(&mut self, cancel: &CancellationToken) -> Result<Option<Message>> {
        match self.phase {
            Phase::Closed => return Ok(None),
            Phase::Failed => return Err(ReaderError::Failed),
            Phase::Open | Phase::Closing => {}
        }

        self.wait_for_drain(cancel).await?;
        self.outstanding = None;
        if self.phase == Phase::Closing {
            debug!("close message drained; reader closed");
            self.phase = Phase::Closed;
            return Ok(None);
        }

        match self.next_message(cancel).await {
            Err(ReaderError::Canceled) => {
                debug!("read canceled; reader state preserved");
                Err(ReaderError::Canceled)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
            Ok(message) => Ok(message),
        }
    }

    /// Current state of the reassembly state machine.
    #[must_use]
    pub fn state(&self) -> ReaderState {
        match self.phase {
            Phase::Closed => return ReaderState::Closed,
            Phase::Failed => return ReaderState::Failed,
            Phase::Open | Phase::Closing => {}
        }
        if self
            .outstanding
            .as_ref()
            .is_some_and(|gate| !gate.is_drained())
        {
            return ReaderState::MessageReady;
        }
        if self.phase == Phase::Closing {
            return ReaderState::Closed;
        }
        match self.assembler.open() {
            Some(open) => ReaderState::Accumulating {
                opcode: open.opcode,
                compressed: open.compressed,
                buffered_bytes: open.buffered_bytes,
            },
            None => ReaderState::Idle,
        }
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &ReaderConfig { &self.config }

    /// Return the transport together with any received but unparsed bytes.
    pub fn into_inner(self) -> (T, BytesMut) { (self.transport, self.window) }

    /// Adapt the reader into a stream of messages.
    ///
    /// The stream ends after the reader reports `None` or after yielding an
    /// error. Each message must be drained or dropped before the stream is
    /// polled again, otherwise polling suspends until `cancel` fires.
    pub fn into_stream(self, cancel: CancellationToken) -> impl Stream<Item = Result<Message>> {
        futures::stream::unfold(Some(self), move |reader| {
            let cancel = cancel.clone();
            async move {
                let mut reader = reader?;
                match reader.read(&cancel).await {
                    Ok(Some(message)) => Some((Ok(message), Some(reader))),
                    Ok(None) => None,
                    Err(err) => Some((Err(err), None)),
                }
            }
        })
    }

    async fn wait_for_drain(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(gate) = self.outstanding.as_ref() else {
            return Ok(());
        };
        if gate.is_drained() {
            return Ok(());
        }
        debug!("previous message not drained; waiting before parsing the next frame");
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ReaderError::Canceled),
            () = gate.wait_drained() => Ok(()),
        }
    }

    async fn next_message(&mut self, cancel: &CancellationToken) -> Result<Option<Message>> {
        let mut at_eof = false;
        loop {
            let decoded = if at_eof {
                self.codec.decode_eof(&mut self.window)?
            } else {
                self.codec.decode(&mut self.window)?
            };

            match decoded {
                Some(frame) => {
                    if let Some(message) = self.accept(frame)? {
                        return Ok(Some(message));
                    }
                }
                None if at_eof => return self.end_of_stream(),
                None => at_eof = !self.fill(cancel).await?,
            }
        }
    }

    /// Pull more bytes into the window; `Ok(false)` at end of stream.
    async fn fill(&mut self, cancel: &CancellationToken) -> Result<bool> {
        self.window.reserve(self.config.chunk_size());
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ReaderError::Canceled),
            read = self.transport.read_buf(&mut self.window) => read?,
        };
        trace!("read {read} bytes from transport");
        Ok(read > 0)
    }

    fn accept(&mut self, frame: Frame) -> Result<Option<Message>> {
        metrics::inc_frames(Direction::Inbound);
        trace!(
            "frame decoded: opcode={:?} fin={:?} len={}",
            frame.opcode(),
            frame.fin(),
            frame.payload().len()
        );

        let Assembled::Complete {
            opcode,
            compressed,
            payload,
        } = self.assembler.accept(frame)?
        else {
            return Ok(None);
        };

        let payload = if compressed {
            self.inflate(&payload)?
        } else {
            payload
        };

        if opcode == Opcode::Close {
            debug!("close frame received; closing once drained");
            self.phase = Phase::Closing;
        }

        let gate = Arc::new(DrainGate::default());
        self.outstanding = Some(Arc::clone(&gate));
        metrics::inc_messages(opcode);
        Ok(Some(Message::new(opcode, payload, gate)))
    }

    fn inflate(&mut self, payload: &[u8]) -> Result<Bytes> {
        let limit = self.config.max_payload_size();
        let inflater = self
            .inflater
            .as_mut()
            .ok_or(ProtocolViolation::UnexpectedCompression)?;
        let inflated = inflater.inflate(payload, limit)?;
        trace!(
            "inflated {} compressed bytes to {}",
            payload.len(),
            inflated.len()
        );
        Ok(inflated)
    }

    fn end_of_stream(&mut self) -> Result<Option<Message>> {
        if let Some(open) = self.assembler.open() {
            let buffered = self.assembler.clear();
            debug!("transport closed inside a fragmented {:?} message", open.opcode);
            return Err(ReaderError::Truncated {
                buffered,
                expected: None,
            });
        }
        debug!("transport closed at a frame boundary");
        self.phase = Phase::Closed;
        Ok(None)
    }

    fn fail(&mut self, err: &ReaderError) {
        warn!("reader failed: {err}");
        metrics::inc_errors(err.error_type());
        self.phase = Phase::Failed;
        self.assembler.clear();
    }
}
