//! Metric helpers for `wsframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper compiles to a no-op.

use crate::frame::Opcode;

/// Name of the counter tracking decoded and encoded frames.
pub const FRAMES_TOTAL: &str = "wsframe_frames_total";
/// Name of the counter tracking delivered and sent messages.
pub const MESSAGES_TOTAL: &str = "wsframe_messages_total";
/// Name of the counter tracking fatal reader and writer errors.
pub const ERRORS_TOTAL: &str = "wsframe_errors_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames read from the transport.
    Inbound,
    /// Frames written to the transport.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

fn opcode_label(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::Continuation => "continuation",
        Opcode::Text => "text",
        Opcode::Binary => "binary",
        Opcode::Close => "close",
        Opcode::Ping => "ping",
        Opcode::Pong => "pong",
    }
}

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    ::metrics::counter!(FRAMES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a complete message with its opcode.
pub fn inc_messages(opcode: Opcode) {
    #[cfg(feature = "metrics")]
    ::metrics::counter!(MESSAGES_TOTAL, "opcode" => opcode_label(opcode)).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = opcode_label(opcode);
}

/// Record a fatal error of the given category.
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    ::metrics::counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
