//! IR thermometer sampler.
//!
//! Polls the [`BitstreamDecoder`] once per tick, turns completed frames
//! into object/ambient temperatures, and resynchronises the decoder when
//! the sensor goes quiet.
//!
//! The only fault signal is [`SensorSampler::consecutive_timeouts`]: the
//! control loop compares it against its threshold to force the heater off.

use log::debug;

use crate::error::SensorError;

use super::ir_decoder::{BitstreamDecoder, Channel};

/// Reported until the first object frame arrives.
pub const TEMP_ERROR_VALUE: f32 = -127.0;

pub struct SensorSampler<'a> {
    decoder: &'a BitstreamDecoder,
    timeout_ms: u32,
    /// Reference point for the timeout; reset by frames and by timeouts.
    last_frame_ms: u32,
    consecutive_timeouts: u32,
    object_c: f32,
    ambient_c: f32,
    /// Value handed out by the last `fresh_temp()`.
    latest_c: f32,
    // Running sum of object readings, cleared by `fresh_temp()`.
    reading_sum: f32,
    reading_count: u32,
    discarded_frames: u32,
}

impl<'a> SensorSampler<'a> {
    pub fn new(decoder: &'a BitstreamDecoder, timeout_ms: u32, now_ms: u32) -> Self {
        Self {
            decoder,
            timeout_ms,
            last_frame_ms: now_ms,
            consecutive_timeouts: 0,
            object_c: TEMP_ERROR_VALUE,
            ambient_c: TEMP_ERROR_VALUE,
            latest_c: TEMP_ERROR_VALUE,
            reading_sum: 0.0,
            reading_count: 0,
            discarded_frames: 0,
        }
    }

    /// Run once per control tick.
    pub fn update(&mut self, now_ms: u32) {
        if let Some(frame) = self.decoder.take_frame() {
            self.last_frame_ms = now_ms;
            self.consecutive_timeouts = 0;
            match frame.channel() {
                Some(Channel::Object) => self.object_c = frame.celsius(),
                Some(Channel::Ambient) => self.ambient_c = frame.celsius(),
                None => {
                    self.discarded_frames = self.discarded_frames.wrapping_add(1);
                    debug!("ir: frame discarded: {}", SensorError::MalformedFrame(frame.tag()));
                }
            }
        }

        self.reading_sum += self.object_c;
        self.reading_count = self.reading_count.wrapping_add(1);

        if now_ms.wrapping_sub(self.last_frame_ms) > self.timeout_ms {
            self.decoder.reset();
            self.last_frame_ms = now_ms;
            self.consecutive_timeouts = self.consecutive_timeouts.saturating_add(1);
            debug!(
                "ir: {} ({} ms), decoder reset, {} consecutive",
                SensorError::Timeout, self.timeout_ms, self.consecutive_timeouts
            );
        }
    }

    /// Object temperature for the control variable.  Clears the running
    /// sum; call exactly once per PID update.
    pub fn fresh_temp(&mut self) -> f32 {
        self.latest_c = self.object_c;
        self.reading_sum = 0.0;
        self.reading_count = 0;
        self.latest_c
    }

    /// Value returned by the last [`fresh_temp`](Self::fresh_temp), for display.
    pub fn last_temp(&self) -> f32 {
        self.latest_c
    }

    pub fn ambient_temp(&self) -> f32 {
        self.ambient_c
    }

    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts
    }

    /// Frames dropped for an unknown channel tag.
    pub fn discarded_frames(&self) -> u32 {
        self.discarded_frames
    }

    /// Samples accumulated since the last `fresh_temp()`.
    pub fn pending_samples(&self) -> u32 {
        self.reading_count
    }

    /// Mean of the samples accumulated since the last `fresh_temp()`.
    pub fn running_mean(&self) -> Option<f32> {
        (self.reading_count > 0).then(|| self.reading_sum / self.reading_count as f32)
    }
}
