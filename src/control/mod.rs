//! Closed-loop heater control: the PID law and the windowed relay driver.

pub mod heater;
pub mod pid;
