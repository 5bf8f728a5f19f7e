//! Hot plate controller firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  RelayPin        LogEventSink   EepromAdapter   MillisClock  │
//! │  (HeaterOutput)  (EventSink)    (SlotStorage)   (Clock)      │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │           ControlLoop (pure logic)                   │    │
//! │  │  Sampler · PID · Safety · Heater window              │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  IR clock ISR ──▶ static BitstreamDecoder (atomics)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::adapters::log_sink::LogEventSink;
use hotplate::adapters::time::MillisClock;
use hotplate::app::commands::AppCommand;
use hotplate::app::ports::Clock;
use hotplate::app::service::ControlLoop;
use hotplate::config::ControllerConfig;
use hotplate::drivers::console::Console;
use hotplate::drivers::hw_init;
use hotplate::drivers::relay::RelayPin;
use hotplate::drivers::watchdog::Watchdog;
use hotplate::sensors::IR_DECODER;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hot plate controller v{}         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = ControllerConfig::default();
    config.validate().map_err(|e| anyhow!("config: {e}"))?;

    // ── 2. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let mut relay = RelayPin::new(PinDriver::output(peripherals.pins.gpio13)?);

    hw_init::init_ir_inputs().map_err(|e| anyhow!("{e}"))?;
    hw_init::init_isr_service().map_err(|e| anyhow!("{e}"))?;
    let mut console = Console::new().map_err(|e| anyhow!("{e}"))?;
    let mut watchdog = Watchdog::new();

    // ── 3. Adapters + control loop ────────────────────────────
    let mut store = EepromAdapter::new();
    let clock = MillisClock::new();
    let mut sink = LogEventSink::new();

    let mut control = ControlLoop::new(config, &IR_DECODER, &store, clock.now_millis());
    control.start(&mut sink);

    // ── 4. Main loop ──────────────────────────────────────────
    loop {
        watchdog.feed();

        while let Some(byte) = console.poll_byte() {
            if let Some(cmd) = AppCommand::from_byte(byte) {
                control.handle_command(cmd, &mut store, &mut sink);
            }
        }

        control.tick(clock.now_millis(), &mut relay, &mut sink);

        // Yield so the idle task can run; the heater window has 1 ms
        // resolution.
        FreeRtos::delay_ms(1);
    }
}
