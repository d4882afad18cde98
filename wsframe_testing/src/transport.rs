//! In-memory transports with scripted delivery.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, ReadBuf};

/// [`AsyncRead`] over a fixed byte sequence, delivered in small chunks.
///
/// Each read returns at most `chunk_size` bytes. Once the data is exhausted
/// the reader reports end of stream, or stays pending forever when built with
/// [`hold_open`](Self::hold_open) to model a peer that has gone quiet.
#[derive(Debug)]
pub struct ChunkedReader {
    data: Bytes,
    chunk_size: usize,
    hold_open: bool,
    reads: usize,
}

impl ChunkedReader {
    /// Deliver `data` in one read.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk_size: usize::MAX,
            hold_open: false,
            reads: 0,
        }
    }

    /// A transport with no data that never completes a read.
    #[must_use]
    pub fn pending() -> Self { Self::new(Bytes::new()).hold_open() }

    /// Cap every read at `chunk_size` bytes (minimum one).
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Stay pending instead of reporting end of stream.
    #[must_use]
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Bytes not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() }

    /// Number of reads that delivered data.
    #[must_use]
    pub fn reads(&self) -> usize { self.reads }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.data.is_empty() {
            if self.hold_open {
                return Poll::Pending;
            }
            return Poll::Ready(Ok(()));
        }
        let n = self.chunk_size.min(self.data.len()).min(buf.remaining());
        buf.put_slice(&self.data[..n]);
        self.data.advance(n);
        self.reads += 1;
        Poll::Ready(Ok(()))
    }
}
