//! Millisecond clock adapter.
//!
//! - **`target_os = "espidf"`** — `esp_timer_get_time()` (µs since boot)
//!   scaled to milliseconds and truncated to `u32`, so it wraps every
//!   ~49.7 days.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` plus an
//!   optional start offset, so host runs can begin just short of a wrap.

use crate::app::ports::Clock;

pub struct MillisClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    offset_ms: u32,
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            offset_ms: 0,
        }
    }

    /// Host clock that reads `offset_ms` at construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn starting_at(offset_ms: u32) -> Self {
        Self {
            start: std::time::Instant::now(),
            offset_ms,
        }
    }
}

impl Clock for MillisClock {
    #[cfg(target_os = "espidf")]
    fn now_millis(&self) -> u32 {
        // SAFETY: esp_timer_get_time has no preconditions once the
        // scheduler is running.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        (us / 1000) as u32
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_millis(&self) -> u32 {
        let elapsed = self.start.elapsed().as_millis() as u32;
        self.offset_ms.wrapping_add(elapsed)
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn host_clock_is_monotonic() {
        let clock = MillisClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn offset_clock_wraps() {
        let clock = MillisClock::starting_at(u32::MAX);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.now_millis() < 1000);
    }
}
