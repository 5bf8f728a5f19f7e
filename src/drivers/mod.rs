//! Board drivers: relay output, console input, watchdog, and one-shot
//! peripheral initialisation.

pub mod console;
pub mod hw_init;
pub mod relay;
pub mod watchdog;
