//! Messages delivered by the [`Reader`](crate::reader::Reader).
//!
//! A [`Message`] exposes its payload as [`RawData`], a forward-only,
//! drain-once view. Single-frame payloads are slices of the reader's receive
//! window rather than copies. The reader will not parse the next frame until
//! the current message has been drained, consumed or dropped.

use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, ReadBuf};

use crate::{frame::Opcode, reader::DrainGate};

/// Sequential view over a reassembled, decompressed payload.
///
/// Implements [`io::Read`], [`io::BufRead`] and [`AsyncRead`]. Reaching the
/// end of the data releases the reader's backpressure gate.
#[derive(Debug)]
pub struct RawData {
    data: Bytes,
    gate: Arc<DrainGate>,
}

impl RawData {
    pub(crate) fn new(data: Bytes, gate: Arc<DrainGate>) -> Self {
        if data.is_empty() {
            gate.release();
        }
        Self { data, gate }
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() }

    /// `true` once every byte has been read.
    #[must_use]
    pub fn is_drained(&self) -> bool { self.data.is_empty() }

    /// Take all unread bytes at once, draining the view.
    pub fn read_all(&mut self) -> Bytes {
        let rest = std::mem::take(&mut self.data);
        self.gate.release();
        rest
    }

    fn advance(&mut self, n: usize) {
        self.data.advance(n.min(self.data.len()));
        if self.data.is_empty() {
            self.gate.release();
        }
    }

    fn copy_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.data.len());
        dst[..n].copy_from_slice(&self.data[..n]);
        self.advance(n);
        n
    }
}

impl io::Read for RawData {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { Ok(self.copy_into(buf)) }
}

impl io::BufRead for RawData {
    fn fill_buf(&mut self) -> io::Result<&[u8]> { Ok(&self.data) }

    fn consume(&mut self, amt: usize) { self.advance(amt); }
}

impl AsyncRead for RawData {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let n = buf.remaining().min(self.data.len());
        buf.put_slice(&self.data[..n]);
        self.advance(n);
        Poll::Ready(Ok(()))
    }
}

impl Drop for RawData {
    fn drop(&mut self) { self.gate.release(); }
}

/// One application-level message.
#[derive(Debug)]
pub struct Message {
    opcode: Opcode,
    len: usize,
    raw_data: RawData,
}

impl Message {
    pub(crate) fn new(opcode: Opcode, payload: Bytes, gate: Arc<DrainGate>) -> Self {
        Self {
            opcode,
            len: payload.len(),
            raw_data: RawData::new(payload, gate),
        }
    }

    /// Opcode of the message: `Text`, `Binary`, `Close`, `Ping` or `Pong`.
    #[must_use]
    pub const fn opcode(&self) -> Opcode { self.opcode }

    /// Total payload length, independent of how much has been read.
    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    /// `true` for an empty payload.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    /// Payload reader.
    pub fn raw_data(&mut self) -> &mut RawData { &mut self.raw_data }

    /// Consume the message, keeping only its payload reader.
    #[must_use]
    pub fn into_raw_data(self) -> RawData { self.raw_data }

    /// Discard unread payload bytes, returning how many were skipped.
    ///
    /// This satisfies the reader's backpressure gate.
    pub fn consume(&mut self) -> usize { self.raw_data.read_all().len() }
}
