//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics, never yields oversized payloads, and
//! accepts bytes cleanly after a reset.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use wavesense::proto::codec::FrameDecoder;
use wavesense::proto::MAX_RX_PAYLOAD;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();

    for &byte in data {
        if let Some(Ok(packet)) = decoder.feed(byte) {
            assert!(
                packet.payload.len() <= MAX_RX_PAYLOAD,
                "payload exceeds the inbound buffer"
            );
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    for &byte in data {
        let _ = decoder.feed(byte);
    }
});
