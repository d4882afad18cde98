//! Unit tests for the WebSocket frame codec.
//!
//! Covers decoding of reference frames, resumable partial decoding, every
//! header-level rejection, EOF handling and encoder validation.

use bytes::{BufMut, BytesMut};
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use super::*;

mod property;

fn decode_one(codec: &mut FrameCodec, bytes: &[u8]) -> Result<Option<Frame>, CodecError> {
    let mut buf = BytesMut::from(bytes);
    codec.decode(&mut buf)
}

#[rstest]
#[case::unmasked_text(&[0x81, 0x05, b'H', b'e', b'l', b'l', b'o'], Fin::Final, Opcode::Text, b"Hello".as_slice())]
#[case::masked_text(
    &[0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58],
    Fin::Final,
    Opcode::Text,
    b"Hello".as_slice()
)]
#[case::first_fragment(&[0x01, 0x03, b'H', b'e', b'l'], Fin::More, Opcode::Text, b"Hel".as_slice())]
#[case::last_fragment(&[0x80, 0x02, b'l', b'o'], Fin::Final, Opcode::Continuation, b"lo".as_slice())]
#[case::empty_close(&[0x88, 0x00], Fin::Final, Opcode::Close, b"".as_slice())]
fn decodes_reference_frames(
    #[case] wire: &[u8],
    #[case] fin: Fin,
    #[case] opcode: Opcode,
    #[case] payload: &[u8],
) {
    let mut codec = FrameCodec::default();
    let frame = decode_one(&mut codec, wire)
        .expect("decode should succeed")
        .expect("expected a frame");
    assert_eq!(frame.fin(), fin);
    assert_eq!(frame.opcode(), opcode);
    assert_eq!(frame.payload().as_ref(), payload);
}

#[rstest]
#[case(256, &[0x82, 0x7e, 0x01, 0x00])]
#[case(65_536, &[0x82, 0x7f, 0, 0, 0, 0, 0, 0x01, 0x00, 0x00])]
fn decodes_extended_lengths(#[case] len: usize, #[case] header: &[u8]) {
    let mut wire = BytesMut::from(header);
    wire.put_bytes(0xab, len);

    let frame = FrameCodec::default()
        .decode(&mut wire)
        .expect("decode should succeed")
        .expect("expected a frame");
    assert_eq!(frame.opcode(), Opcode::Binary);
    assert_eq!(frame.payload().len(), len);
    assert!(wire.is_empty());
}

#[test]
fn byte_at_a_time_decoding_is_resumable() {
    let wire = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
    let mut codec = FrameCodec::default();
    let mut window = BytesMut::new();

    for (i, byte) in wire.iter().enumerate() {
        window.put_u8(*byte);
        let decoded = codec.decode(&mut window).expect("decode should succeed");
        if i + 1 < wire.len() {
            assert!(decoded.is_none(), "frame emitted early at byte {i}");
            continue;
        }
        let frame = decoded.expect("frame after last byte");
        assert_eq!(frame.payload().as_ref(), b"Hello");
        assert_eq!(frame.mask(), Some([0x37, 0xfa, 0x21, 0x3d]));
    }
    assert!(!codec.is_mid_frame());
}

#[test]
fn incomplete_header_consumes_nothing() {
    let mut codec = FrameCodec::default();
    let mut window = BytesMut::from(&[0x82, 0x7e, 0x01][..]);
    assert!(codec.decode(&mut window).expect("decode").is_none());
    assert_eq!(window.len(), 3);
    assert!(!codec.is_mid_frame());
}

#[test]
fn parsed_header_survives_partial_payload() {
    let mut codec = FrameCodec::default();
    let mut window = BytesMut::from(&[0x82, 0x04, 1, 2][..]);
    assert!(codec.decode(&mut window).expect("decode").is_none());
    assert!(codec.is_mid_frame());

    window.extend_from_slice(&[3, 4, 0x88, 0x00]);
    let frame = codec
        .decode(&mut window)
        .expect("decode")
        .expect("binary frame");
    assert_eq!(frame.payload().as_ref(), [1, 2, 3, 4]);
    let close = codec
        .decode(&mut window)
        .expect("decode")
        .expect("close frame");
    assert_eq!(close.opcode(), Opcode::Close);
}

#[rstest]
#[case::rsv2(&[0xa1, 0x00], ProtocolViolation::ReservedBitsSet(0b010))]
#[case::rsv3(&[0x91, 0x00], ProtocolViolation::ReservedBitsSet(0b001))]
#[case::reserved_data_opcode(&[0x83, 0x00], ProtocolViolation::UnknownOpcode(0x3))]
#[case::reserved_control_opcode(&[0x8b, 0x00], ProtocolViolation::UnknownOpcode(0xb))]
#[case::fragmented_ping(&[0x09, 0x00], ProtocolViolation::FragmentedControlFrame(Opcode::Ping))]
#[case::oversized_pong(
    &[0x8a, 0x7e, 0x00, 0x7e],
    ProtocolViolation::ControlFrameTooLarge { opcode: Opcode::Pong, len: 126 }
)]
#[case::compressed_close(&[0xc8, 0x00], ProtocolViolation::CompressedControlFrame(Opcode::Close))]
#[case::compressed_continuation(&[0x40, 0x00], ProtocolViolation::CompressedContinuation)]
#[case::invalid_length(
    &[0x82, 0x7f, 0x80, 0, 0, 0, 0, 0, 0, 0x01],
    ProtocolViolation::InvalidLength(0x8000_0000_0000_0001)
)]
fn malformed_headers_are_rejected(#[case] wire: &[u8], #[case] expected: ProtocolViolation) {
    let err = decode_one(&mut FrameCodec::default(), wire).expect_err("header must be rejected");
    match err {
        CodecError::Protocol(violation) => assert_eq!(violation, expected),
        other => panic!("expected protocol violation, got {other:?}"),
    }
}

#[test]
fn compression_flag_requires_compression_support() {
    let mut codec = FrameCodec::default().with_compression(false);
    let err = decode_one(&mut codec, &[0xc1, 0x00]).expect_err("must be rejected");
    assert!(matches!(
        err,
        CodecError::Protocol(ProtocolViolation::UnexpectedCompression)
    ));

    let mut codec = FrameCodec::default();
    let frame = decode_one(&mut codec, &[0xc1, 0x00])
        .expect("decode")
        .expect("frame");
    assert!(frame.is_compressed());
}

#[test]
fn oversized_frames_fail_before_payload_arrives() {
    let mut codec = FrameCodec::new(1000);
    let err = decode_one(&mut codec, &[0x82, 0x7e, 0x03, 0xe9]).expect_err("too large");
    assert!(matches!(
        err,
        CodecError::FrameTooLarge {
            limit: 1000,
            actual: 1001
        }
    ));
}

#[rstest]
#[case::at_limit(10, 10, true)]
#[case::one_over(10, 11, false)]
#[case::small_limit_large_frame(10, 100, false)]
#[case::zero_limit_empty_frame(0, 0, true)]
#[case::zero_limit(0, 1, false)]
fn payload_limit_is_exact(#[case] limit: usize, #[case] len: usize, #[case] accepted: bool) {
    let mut wire = BytesMut::new();
    Frame::binary(vec![0_u8; len]).encode_into(&mut wire);

    let mut codec = FrameCodec::new(limit);
    assert_eq!(codec.max_payload_size(), limit);
    match codec.decode(&mut wire) {
        Ok(Some(frame)) if accepted => assert_eq!(frame.payload().len(), len),
        Err(CodecError::FrameTooLarge { limit: l, actual }) if !accepted => {
            assert_eq!(l, limit);
            assert_eq!(actual, len as u64);
        }
        other => panic!("unexpected decode result for {len} bytes: {other:?}"),
    }
}

#[rstest]
#[case::partial_header(&[0x81], 1, None)]
#[case::partial_payload(&[0x81, 0x05, b'H', b'e'], 2, Some(5))]
fn eof_inside_a_frame_is_truncation(
    #[case] wire: &[u8],
    #[case] buffered: usize,
    #[case] expected: Option<usize>,
) {
    let mut codec = FrameCodec::default();
    let mut window = BytesMut::from(wire);
    let err = codec
        .decode_eof(&mut window)
        .expect_err("truncated input must fail");
    match err {
        CodecError::Truncated {
            buffered: b,
            expected: e,
        } => {
            assert_eq!(b, buffered);
            assert_eq!(e, expected);
        }
        other => panic!("expected truncation, got {other:?}"),
    }
}

#[test]
fn eof_at_frame_boundary_is_clean() {
    let mut codec = FrameCodec::default();
    let mut window = BytesMut::from(&[0x89, 0x00][..]);
    let ping = codec.decode_eof(&mut window).expect("decode");
    assert_eq!(ping.map(|f| f.opcode()), Some(Opcode::Ping));
    assert!(codec.decode_eof(&mut window).expect("decode").is_none());
}

#[test]
fn encoder_rejects_invalid_control_frames() {
    let mut codec = FrameCodec::default();
    let mut dst = BytesMut::new();
    let err = codec
        .encode(Frame::ping(vec![0_u8; 126]), &mut dst)
        .expect_err("oversized ping");
    assert!(matches!(
        err,
        CodecError::Protocol(ProtocolViolation::ControlFrameTooLarge { .. })
    ));
    assert!(dst.is_empty());
}

#[test]
fn encoder_enforces_payload_limit() {
    let mut codec = FrameCodec::new(64);
    let mut dst = BytesMut::new();
    let err = codec
        .encode(Frame::binary(vec![0_u8; 65]), &mut dst)
        .expect_err("oversized frame");
    let io_err = std::io::Error::from(err);
    assert_eq!(io_err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn encoder_output_matches_reference_masked_frame() {
    let mut codec = FrameCodec::default();
    let mut dst = BytesMut::new();
    codec
        .encode(
            Frame::text("Hello").with_mask(Some([0x37, 0xfa, 0x21, 0x3d])),
            &mut dst,
        )
        .expect("encode");
    assert_eq!(
        dst.as_ref(),
        [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58]
    );
}
