//! Heater relay driver.
//!
//! Wraps any `embedded_hal` output pin as a [`HeaterOutput`].  On the board
//! that is an `esp-idf-hal` `PinDriver` on [`HEAT_RELAY_GPIO`](crate::pins::HEAT_RELAY_GPIO);
//! host tests use a recording pin.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::HeaterOutput;

pub struct RelayPin<P: OutputPin> {
    pin: P,
    write_errors: u32,
}

impl<P: OutputPin> RelayPin<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(mut pin: P) -> Self {
        let write_errors = u32::from(pin.set_low().is_err());
        Self { pin, write_errors }
    }

    /// Failed pin writes since construction.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterOutput for RelayPin<P> {
    fn set_heater(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            self.write_errors = self.write_errors.saturating_add(1);
            warn!("relay: pin write failed ({:?})", e.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Default)]
    struct MockPin {
        high: bool,
        writes: usize,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn starts_low_and_follows_commands() {
        let mut relay = RelayPin::new(MockPin {
            high: true,
            writes: 0,
        });
        relay.set_heater(true);
        relay.set_heater(false);
        relay.set_heater(true);
        let pin = relay.release();
        assert!(pin.high);
        assert_eq!(pin.writes, 4);
    }

    #[test]
    fn write_failures_are_counted() {
        let mut relay = RelayPin::new(BrokenPin);
        relay.set_heater(true);
        assert_eq!(relay.write_errors(), 2);
    }
}
