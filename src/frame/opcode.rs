//! Opcode and FIN tags carried in the first header byte.

use crate::codec::ProtocolViolation;

/// Purpose of a frame.
///
/// Wire values follow RFC 6455: `0x0` continuation, `0x1` text, `0x2` binary,
/// `0x8` close, `0x9` ping, `0xA` pong. Every other nibble is reserved and
/// rejected when decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Non-initial fragment of a fragmented data message.
    Continuation,
    /// UTF-8 text data.
    Text,
    /// Arbitrary binary data.
    Binary,
    /// Connection close.
    Close,
    /// Liveness probe.
    Ping,
    /// Reply to a ping.
    Pong,
}

impl Opcode {
    /// `true` for `Close`, `Ping` and `Pong`.
    #[must_use]
    pub const fn is_control(self) -> bool { matches!(self, Self::Close | Self::Ping | Self::Pong) }

    /// `true` for `Text` and `Binary`, the opcodes that may start a message.
    #[must_use]
    pub const fn is_data(self) -> bool { matches!(self, Self::Text | Self::Binary) }

    /// Wire value of the opcode.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Continuation => 0x0,
            Self::Text => 0x1,
            Self::Binary => 0x2,
            Self::Close => 0x8,
            Self::Ping => 0x9,
            Self::Pong => 0xA,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolViolation;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Self::Continuation),
            0x1 => Ok(Self::Text),
            0x2 => Ok(Self::Binary),
            0x8 => Ok(Self::Close),
            0x9 => Ok(Self::Ping),
            0xA => Ok(Self::Pong),
            other => Err(ProtocolViolation::UnknownOpcode(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self { opcode.as_u8() }
}

/// Whether a frame ends its message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fin {
    /// Last frame of the message.
    Final,
    /// More fragments follow.
    More,
}

impl Fin {
    /// `true` for [`Fin::Final`].
    #[must_use]
    pub const fn is_final(self) -> bool { matches!(self, Self::Final) }
}

impl From<bool> for Fin {
    fn from(fin: bool) -> Self { if fin { Self::Final } else { Self::More } }
}
