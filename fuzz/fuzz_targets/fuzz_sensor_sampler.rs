//! Fuzz target: `SensorSampler::update`
//!
//! Input is a sequence of (gap, byte) pairs: the clock advances by `gap`
//! milliseconds (wrapping) and `byte` is clocked into the decoder before
//! each update.  The sampler must never panic and its readings must stay
//! within the range a 16-bit raw value can express.
//!
//! cargo fuzz run fuzz_sensor_sampler

#![no_main]

use hotplate::sensors::ir_decoder::BitstreamDecoder;
use hotplate::sensors::ir_sensor::SensorSampler;
use libfuzzer_sys::fuzz_target;

const MIN_C: f32 = -273.15;
const MAX_C: f32 = 65535.0 / 16.0 - 273.15;

fuzz_target!(|data: &[u8]| {
    let decoder = BitstreamDecoder::new();
    let mut now: u32 = u32::MAX - 5_000;
    let mut sampler = SensorSampler::new(&decoder, 1000, now);

    for pair in data.chunks_exact(2) {
        now = now.wrapping_add(u32::from(pair[0]) * 16);
        decoder.sim_clock_byte(pair[1]);
        sampler.update(now);

        let t = sampler.fresh_temp();
        assert!(t == -127.0 || (MIN_C..=MAX_C).contains(&t), "object {t}");
        let a = sampler.ambient_temp();
        assert!(a == -127.0 || (MIN_C..=MAX_C).contains(&a), "ambient {a}");
    }
});
