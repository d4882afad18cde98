//! Tests for Display implementations on error types.

use rstest::rstest;
use wsframe::{CodecError, Opcode, ProtocolViolation, ReaderError};

#[rstest]
#[case(ProtocolViolation::UnknownOpcode(0x3), "unknown opcode 0x3")]
#[case(
    ProtocolViolation::ControlFrameTooLarge { opcode: Opcode::Ping, len: 200 },
    "Ping control frame payload of 200 bytes exceeds 125"
)]
#[case(
    ProtocolViolation::InterleavedFrame { open: Opcode::Text, found: Opcode::Binary },
    "Binary frame interleaved with open fragmented Text message"
)]
fn protocol_violation_messages(#[case] violation: ProtocolViolation, #[case] expected: &str) {
    assert_eq!(violation.to_string(), expected);
}

#[test]
fn reader_error_messages() {
    let too_large = ReaderError::FrameTooLarge {
        limit: 10,
        actual: 11,
    };
    assert_eq!(too_large.to_string(), "payload of 11 bytes exceeds limit of 10");
    assert_eq!(ReaderError::Canceled.to_string(), "read canceled");

    let io = ReaderError::from(CodecError::Io(std::io::Error::other("socket closed")));
    assert_eq!(io.to_string(), "transport error: socket closed");
}
