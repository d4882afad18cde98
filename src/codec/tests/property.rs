//! Generated round-trip checks for `FrameCodec`.
//!
//! Arbitrary frame sequences are encoded, then decoded from a window that is
//! fed in randomly sized chunks, exercising the resumable header path.

use bytes::BytesMut;
use proptest::{
    collection::vec,
    prelude::{Just, Strategy, any, prop_oneof},
    prop_assert, prop_assert_eq,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    codec::FrameCodec,
    frame::{Fin, Frame, MAX_CONTROL_PAYLOAD, Opcode},
};

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}

fn opcode_strategy() -> impl Strategy<Value = Opcode> {
    prop_oneof![
        Just(Opcode::Continuation),
        Just(Opcode::Text),
        Just(Opcode::Binary),
        Just(Opcode::Close),
        Just(Opcode::Ping),
        Just(Opcode::Pong),
    ]
}

fn frame_strategy(max_payload: usize) -> impl Strategy<Value = Frame> {
    (
        opcode_strategy(),
        any::<bool>(),
        any::<bool>(),
        proptest::option::of(any::<[u8; 4]>()),
        vec(any::<u8>(), 0..=max_payload),
    )
        .prop_map(|(opcode, fin, compressed, mask, mut payload)| {
            if opcode.is_control() {
                payload.truncate(MAX_CONTROL_PAYLOAD);
                return Frame::new(Fin::Final, opcode, payload).with_mask(mask);
            }
            Frame::new(Fin::from(fin), opcode, payload)
                .with_compressed(compressed && opcode != Opcode::Continuation)
                .with_mask(mask)
        })
}

#[rstest]
#[case(200, 64)]
#[case(70_000, 16)]
fn generated_frame_sequences_round_trip_through_chunked_windows(
    #[case] max_payload: usize,
    #[case] cases: u32,
) {
    let mut runner = deterministic_runner(cases);
    let strategy = (
        vec(frame_strategy(max_payload), 1..8),
        vec(1_usize..64, 1..16),
    );

    runner
        .run(&strategy, |(frames, chunk_sizes)| {
            let mut codec = FrameCodec::new(max_payload);
            let mut wire = BytesMut::new();
            for frame in &frames {
                codec
                    .encode(frame.clone(), &mut wire)
                    .map_err(|err| TestCaseError::fail(format!("encode failed: {err}")))?;
            }

            let mut window = BytesMut::new();
            let mut decoded = Vec::with_capacity(frames.len());
            let mut sizes = chunk_sizes.iter().cycle();
            while !wire.is_empty() {
                let step = sizes.next().copied().unwrap_or(1).min(wire.len());
                window.extend_from_slice(&wire.split_to(step));
                while let Some(frame) = codec
                    .decode(&mut window)
                    .map_err(|err| TestCaseError::fail(format!("decode failed: {err}")))?
                {
                    decoded.push(frame);
                }
            }

            prop_assert_eq!(&decoded, &frames);
            prop_assert!(window.is_empty());
            prop_assert!(!codec.is_mid_frame());
            Ok(())
        })
        .expect("generated frame sequences should round-trip");
}
