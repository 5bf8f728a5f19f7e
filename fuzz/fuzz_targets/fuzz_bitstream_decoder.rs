//! Fuzz target: `BitstreamDecoder::on_clock_edge`
//!
//! Treats every input bit as one clock edge and asserts the decoder never
//! panics, keeps its bit counter below eight, hands out each frame once,
//! and comes back clean after a reset.
//!
//! cargo fuzz run fuzz_bitstream_decoder

#![no_main]

use hotplate::sensors::ir_decoder::BitstreamDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = BitstreamDecoder::new();

    for (i, byte) in data.iter().enumerate() {
        for bit in (0..8).rev() {
            decoder.on_clock_edge(byte & (1 << bit) != 0);
        }
        assert!(decoder.bit_count() == 0, "whole bytes leave no partial bits");

        // Interleave consumer reads the way the control loop would.
        if i % 3 == 0 && decoder.take_frame().is_some() {
            assert!(decoder.take_frame().is_none(), "frame handed out twice");
        }
        if i % 7 == 0 {
            let _ = decoder.take_latched_byte();
        }
    }

    decoder.reset();
    assert_eq!(decoder.byte_count(), 0);
    assert!(!decoder.is_frame_ready());
    assert_eq!(decoder.latched_byte(), None);
});
