//! Fragment accumulation.
//!
//! [`Assembler`] turns decoded frames into complete message payloads. At most
//! one fragmented data message is open at a time; continuation frames are
//! appended in arrival order and the final one closes the message. The size
//! of the accumulated payload is capped by the reader's payload limit.

use bytes::{Bytes, BytesMut};

use crate::{
    codec::ProtocolViolation,
    error::ReaderError,
    frame::{Frame, Opcode},
};

/// Fragmented message still waiting for its final frame.
#[derive(Debug)]
struct PartialMessage {
    opcode: Opcode,
    compressed: bool,
    buffer: BytesMut,
}

impl PartialMessage {
    fn new(opcode: Opcode, compressed: bool, first: &[u8]) -> Self {
        Self {
            opcode,
            compressed,
            buffer: BytesMut::from(first),
        }
    }

    fn push(&mut self, payload: &[u8], limit: usize) -> Result<(), ReaderError> {
        let attempted = self
            .buffer
            .len()
            .checked_add(payload.len())
            .unwrap_or(usize::MAX);
        if attempted > limit {
            return Err(ReaderError::FrameTooLarge {
                limit,
                actual: attempted as u64,
            });
        }
        self.buffer.extend_from_slice(payload);
        Ok(())
    }

    fn into_payload(self) -> Bytes { self.buffer.freeze() }
}

/// Outcome of feeding one frame to the [`Assembler`].
#[derive(Debug)]
pub(super) enum Assembled {
    /// More fragments are needed.
    Pending,
    /// A whole message is available.
    Complete {
        opcode: Opcode,
        compressed: bool,
        payload: Bytes,
    },
}

/// Snapshot of an open fragmented message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct OpenAssembly {
    pub(super) opcode: Opcode,
    pub(super) compressed: bool,
    pub(super) buffered_bytes: usize,
}

/// Frame-to-message state machine.
#[derive(Debug)]
pub(super) struct Assembler {
    max_message_size: usize,
    control_interleaving: bool,
    partial: Option<PartialMessage>,
}

impl Assembler {
    pub(super) fn new(max_message_size: usize, control_interleaving: bool) -> Self {
        Self {
            max_message_size,
            control_interleaving,
            partial: None,
        }
    }

    /// Feed one decoded frame.
    ///
    /// Control frames never touch an open accumulation: when interleaving is
    /// allowed they complete as standalone messages, otherwise they are a
    /// violation like any other non-continuation frame.
    pub(super) fn accept(&mut self, frame: Frame) -> Result<Assembled, ReaderError> {
        let opcode = frame.opcode();
        let fin = frame.fin();
        let compressed = frame.is_compressed();

        let Some(partial) = self.partial.as_mut() else {
            return match opcode {
                Opcode::Continuation => Err(ProtocolViolation::UnexpectedContinuation.into()),
                _ if fin.is_final() => Ok(Assembled::Complete {
                    opcode,
                    compressed,
                    payload: frame.into_payload(),
                }),
                _ => {
                    self.partial = Some(PartialMessage::new(opcode, compressed, frame.payload()));
                    Ok(Assembled::Pending)
                }
            };
        };

        match opcode {
            Opcode::Continuation => {
                partial.push(frame.payload(), self.max_message_size)?;
                if !fin.is_final() {
                    return Ok(Assembled::Pending);
                }
                let Some(done) = self.partial.take() else {
                    return Ok(Assembled::Pending);
                };
                Ok(Assembled::Complete {
                    opcode: done.opcode,
                    compressed: done.compressed,
                    payload: done.into_payload(),
                })
            }
            _ if opcode.is_control() && self.control_interleaving => Ok(Assembled::Complete {
                opcode,
                compressed,
                payload: frame.into_payload(),
            }),
            found => Err(ProtocolViolation::InterleavedFrame {
                open: partial.opcode,
                found,
            }
            .into()),
        }
    }

    /// Currently open fragmented message, if any.
    pub(super) fn open(&self) -> Option<OpenAssembly> {
        self.partial.as_ref().map(|partial| OpenAssembly {
            opcode: partial.opcode,
            compressed: partial.compressed,
            buffered_bytes: partial.buffer.len(),
        })
    }

    /// Drop any partial state, returning how many bytes were buffered.
    pub(super) fn clear(&mut self) -> usize {
        self.partial
            .take()
            .map_or(0, |partial| partial.buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{Assembled, Assembler, OpenAssembly};
    use crate::{
        codec::ProtocolViolation,
        error::ReaderError,
        frame::{Fin, Frame, Opcode},
    };

    #[fixture]
    fn assembler() -> Assembler { Assembler::new(16, true) }

    fn complete(outcome: Assembled) -> (Opcode, Vec<u8>) {
        match outcome {
            Assembled::Complete {
                opcode, payload, ..
            } => (opcode, payload.to_vec()),
            Assembled::Pending => panic!("expected a complete message"),
        }
    }

    #[rstest]
    fn single_final_frame_completes_immediately(mut assembler: Assembler) {
        let outcome = assembler.accept(Frame::text("hi")).expect("accepted");
        assert_eq!(complete(outcome), (Opcode::Text, b"hi".to_vec()));
        assert!(assembler.open().is_none());
    }

    #[rstest]
    fn fragments_concatenate_in_arrival_order(mut assembler: Assembler) {
        let first = Frame::binary(vec![1_u8, 2]).with_fin(Fin::More);
        let middle = Frame::continuation(vec![3_u8]).with_fin(Fin::More);
        let last = Frame::continuation(vec![4_u8, 5]);

        assert!(matches!(
            assembler.accept(first).expect("first"),
            Assembled::Pending
        ));
        assert!(matches!(
            assembler.accept(middle).expect("middle"),
            Assembled::Pending
        ));
        assert_eq!(
            assembler.open(),
            Some(OpenAssembly {
                opcode: Opcode::Binary,
                compressed: false,
                buffered_bytes: 3,
            })
        );
        let outcome = assembler.accept(last).expect("last");
        assert_eq!(complete(outcome), (Opcode::Binary, vec![1, 2, 3, 4, 5]));
        assert!(assembler.open().is_none());
    }

    #[rstest]
    fn continuation_without_open_message_is_rejected(mut assembler: Assembler) {
        let err = assembler
            .accept(Frame::continuation("x"))
            .expect_err("must be rejected");
        assert!(matches!(
            err,
            ReaderError::ProtocolViolation(ProtocolViolation::UnexpectedContinuation)
        ));
    }

    #[rstest]
    fn new_data_frame_mid_fragmentation_is_rejected(mut assembler: Assembler) {
        assembler
            .accept(Frame::text("a").with_fin(Fin::More))
            .expect("first");
        let err = assembler
            .accept(Frame::binary("b"))
            .expect_err("must be rejected");
        assert!(matches!(
            err,
            ReaderError::ProtocolViolation(ProtocolViolation::InterleavedFrame {
                open: Opcode::Text,
                found: Opcode::Binary,
            })
        ));
    }

    #[rstest]
    fn control_frames_interleave_without_disturbing_accumulation(mut assembler: Assembler) {
        assembler
            .accept(Frame::text("ab").with_fin(Fin::More))
            .expect("first");
        let ping = assembler.accept(Frame::ping("p")).expect("ping");
        assert_eq!(complete(ping), (Opcode::Ping, b"p".to_vec()));
        assert_eq!(assembler.open().map(|open| open.buffered_bytes), Some(2));

        let outcome = assembler.accept(Frame::continuation("cd")).expect("last");
        assert_eq!(complete(outcome), (Opcode::Text, b"abcd".to_vec()));
    }

    #[test]
    fn strict_mode_rejects_interleaved_control_frames() {
        let mut strict = Assembler::new(16, false);
        strict
            .accept(Frame::text("ab").with_fin(Fin::More))
            .expect("first");
        let err = strict.accept(Frame::ping("")).expect_err("must be rejected");
        assert!(matches!(
            err,
            ReaderError::ProtocolViolation(ProtocolViolation::InterleavedFrame {
                open: Opcode::Text,
                found: Opcode::Ping,
            })
        ));
    }

    #[rstest]
    fn accumulated_size_is_capped(mut assembler: Assembler) {
        assembler
            .accept(Frame::binary(vec![0_u8; 10]).with_fin(Fin::More))
            .expect("first");
        let err = assembler
            .accept(Frame::continuation(vec![0_u8; 7]))
            .expect_err("limit exceeded");
        assert!(matches!(
            err,
            ReaderError::FrameTooLarge {
                limit: 16,
                actual: 17
            }
        ));
        assert_eq!(assembler.clear(), 10);
    }
}
