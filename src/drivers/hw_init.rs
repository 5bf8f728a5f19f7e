//! One-shot hardware peripheral initialization.
//!
//! Configures the IR sensor inputs and registers the clock-line ISR using
//! raw ESP-IDF sys calls.  The heater relay is claimed separately through
//! `esp-idf-hal` so it can be wrapped as an `embedded_hal` pin.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrRegisterFailed(i32),
    UartInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrRegisterFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("peripheral initialisation failed")
    }
}

// ── IR sensor inputs ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_ir_inputs() -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the clock ISR is attached.
    unsafe {
        let data_cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pins::IR_DATA_GPIO,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = gpio_config(&data_cfg);
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

        let clk_cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pins::IR_CLK_GPIO,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        let ret = gpio_config(&clk_cfg);
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }
    info!("hw_init: IR clock/data inputs configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_ir_inputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): IR inputs skipped");
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ir_clock_gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let data_high = unsafe { gpio_get_level(pins::IR_DATA_GPIO) } != 0;
    crate::sensors::ir_clock_isr_handler(data_high);
}

/// Install the GPIO ISR service and attach the IR clock handler.
/// Call after [`init_ir_inputs`] and before the control loop starts.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  The handler only touches the static
    // decoder's atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        // IR clock: falling edge
        gpio_set_intr_type(pins::IR_CLK_GPIO, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        let ret = gpio_isr_handler_add(pins::IR_CLK_GPIO, Some(ir_clock_gpio_isr), core::ptr::null_mut());
        if ret != ESP_OK as i32 { return Err(HwInitError::IsrRegisterFailed(ret)); }
        gpio_intr_enable(pins::IR_CLK_GPIO);
    }
    info!("hw_init: ISR service installed (IR clock)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
