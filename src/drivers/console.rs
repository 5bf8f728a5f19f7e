//! Operator console: non-blocking single-byte reads from the log UART.
//!
//! On the board the ESP-IDF UART driver is installed on UART0 with an RX
//! ring buffer only, so log output keeps flowing through the VFS console
//! while [`Console::poll_byte`] drains received command bytes.  On the host
//! bytes are queued with [`Console::sim_feed`].

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use super::hw_init::HwInitError;

pub struct Console {
    #[cfg(not(target_os = "espidf"))]
    pending: std::collections::VecDeque<u8>,
}

impl Console {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, HwInitError> {
        use crate::pins;
        // SAFETY: installs the driver once from main(); no TX buffer, no
        // event queue.
        let ret = unsafe {
            uart_driver_install(
                pins::CONSOLE_UART,
                pins::CONSOLE_RX_BUFFER,
                0,
                0,
                core::ptr::null_mut(),
                0,
            )
        };
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::UartInstallFailed(ret));
        }
        log::info!("Console: UART{} command input ready", pins::CONSOLE_UART);
        Ok(Self {})
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, HwInitError> {
        Ok(Self {
            pending: std::collections::VecDeque::new(),
        })
    }

    /// Next received byte, if any.  Never blocks.
    #[cfg(target_os = "espidf")]
    pub fn poll_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer on the stack; zero ticks to wait.
        let n = unsafe {
            uart_read_bytes(
                crate::pins::CONSOLE_UART,
                (&raw mut byte).cast(),
                1,
                0,
            )
        };
        (n == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn poll_byte(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }

    /// Queue bytes as if typed on the console.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_feed(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }
}
