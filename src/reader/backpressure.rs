//! Single-outstanding-message gate.
//!
//! Each delivered [`Message`](crate::message::Message) shares a [`DrainGate`]
//! with the reader. The gate opens once the message payload has been read to
//! the end, consumed or dropped; the reader waits on it before parsing the
//! next frame, so at most one message is ever undrained.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Drained flag plus a wakeup for the single waiting reader.
#[derive(Debug, Default)]
pub(crate) struct DrainGate {
    drained: AtomicBool,
    notify: Notify,
}

impl DrainGate {
    /// Open the gate. Idempotent.
    pub(crate) fn release(&self) {
        if !self.drained.swap(true, Ordering::AcqRel) {
            // A stored permit covers a reader that checks the flag just before
            // this store and parks just after.
            self.notify.notify_one();
        }
    }

    pub(crate) fn is_drained(&self) -> bool { self.drained.load(Ordering::Acquire) }

    /// Suspend until [`release`](Self::release) has been called.
    ///
    /// Cancel-safe: dropping the future leaves the gate untouched.
    pub(crate) async fn wait_drained(&self) {
        while !self.is_drained() {
            self.notify.notified().await;
        }
    }
}
