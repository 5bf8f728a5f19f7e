//! Integration tests for `ControlLoop` against mock adapters.

use hotplate::adapters::eeprom::EepromAdapter;
use hotplate::app::commands::AppCommand;
use hotplate::app::events::{AppEvent, StatusFormat};
use hotplate::app::service::{ControlLoop, MAX_DELTA, MIN_DELTA};
use hotplate::config::ControllerConfig;
use hotplate::error::SafetyFault;
use hotplate::sensors::ir_decoder::BitstreamDecoder;
use hotplate::sensors::ir_sensor::TEMP_ERROR_VALUE;

use super::mock_hw::{FailingStore, MockRelay, RecordingSink};

/// Object-channel frame reading 19.85 °C (raw 0x1250 = 4688 / 16 K).
const COLD_PLATE: [u8; 4] = [0x4c, 0x12, 0x50, 0x00];
const COLD_PLATE_C: f32 = 19.85;

fn setup<'a>(decoder: &'a BitstreamDecoder, store: &EepromAdapter, now: u32) -> ControlLoop<'a> {
    ControlLoop::new(ControllerConfig::default(), decoder, store, now)
}

fn send(ctl: &mut ControlLoop<'_>, bytes: &[u8], store: &mut EepromAdapter, sink: &mut RecordingSink) {
    for &b in bytes {
        if let Some(cmd) = AppCommand::from_byte(b) {
            ctl.handle_command(cmd, store, sink);
        }
    }
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn fresh_store_uses_factory_tunables() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let ctl = setup(&decoder, &store, 0);

    assert_eq!(ctl.target(), 200.0);
    assert_eq!(ctl.pid().proportional(), 30.0);
    assert_eq!(ctl.pid().integral(), 0.0);
    assert_eq!(ctl.pid().derivative(), 0.0);
    assert_eq!(ctl.delta(), 1.0);
    assert!(!ctl.auto_status());
    assert_eq!(ctl.power(), 0.0);
}

#[test]
fn start_emits_started() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut sink = RecordingSink::default();
    ctl.start(&mut sink);
    assert_eq!(sink.events, vec![AppEvent::Started]);
}

// ── PID cadence ──────────────────────────────────────────────

#[test]
fn pid_runs_every_interval() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    decoder.sim_clock_frame(&COLD_PLATE);
    for now in 1..=1000 {
        ctl.tick(now, &mut relay, &mut sink);
    }

    // Fires at 201, 401, 601, 801; the integrator counts the updates.
    let error = 200.0 - COLD_PLATE_C;
    assert!((ctl.pid().integral_state() - 4.0 * error).abs() < 0.01);
    assert!((ctl.sampler().last_temp() - COLD_PLATE_C).abs() < 1e-3);
    assert_eq!(ctl.power(), 1000.0, "large error saturates the heater");
}

#[test]
fn no_pid_step_before_first_interval() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    for now in 1..=200 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(ctl.power(), 0.0);
    assert_eq!(ctl.sampler().last_temp(), TEMP_ERROR_VALUE);

    ctl.tick(201, &mut relay, &mut sink);
    // Sensor never reported: the loop drives on the -127 sentinel.
    assert_eq!(ctl.sampler().last_temp(), TEMP_ERROR_VALUE);
    assert_eq!(ctl.power(), 1000.0);
}

#[test]
fn pid_cadence_survives_clock_wrap() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let start = u32::MAX - 500;
    let mut ctl = setup(&decoder, &store, start);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    decoder.sim_clock_frame(&COLD_PLATE);
    let mut now = start;
    for _ in 0..1500 {
        now = now.wrapping_add(1);
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(now, 999);

    // Two steps before the wrap, four after it.
    let error = 200.0 - COLD_PLATE_C;
    assert!((ctl.pid().integral_state() - 6.0 * error).abs() < 0.01);
}

// ── Heater window ────────────────────────────────────────────

#[test]
fn relay_follows_heater_window() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    // 2.5 °C under target with Kp 30 → 75 ms per window.
    ctl.set_target(COLD_PLATE_C + 2.5, &mut store).unwrap();
    let mut on_ms = 0;
    for now in 1..3000 {
        if now % 500 == 1 {
            decoder.sim_clock_frame(&COLD_PLATE);
        }
        ctl.tick(now, &mut relay, &mut sink);
        if (2000..3000).contains(&now) && relay.level {
            on_ms += 1;
        }
    }
    let expected = 30.0 * 2.5;
    assert!((ctl.power() - expected).abs() < 0.01);
    assert!((on_ms as f32 - expected).abs() <= 1.0, "on for {on_ms} ms");
}

// ── Safety interlock ─────────────────────────────────────────

#[test]
fn silent_sensor_forces_heater_off() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    decoder.sim_clock_frame(&COLD_PLATE);

    // Timeouts land at 1 + 1001·k; the 21st at 21022.
    for now in 1..=21021 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(ctl.sampler().consecutive_timeouts(), 20);
    assert_eq!(ctl.faults(), 0);
    assert_eq!(ctl.power(), 1000.0);
    assert!(relay.level);

    for now in 21022..=25000 {
        ctl.tick(now, &mut relay, &mut sink);
        assert_eq!(ctl.power(), 0.0, "t={now}");
        assert!(!relay.level, "t={now}");
    }
    assert!(ctl.sampler().consecutive_timeouts() > 20);
    assert_eq!(ctl.faults(), SafetyFault::SensorSilent.mask());
    // PID keeps asking for full power underneath the interlock.
    assert!(ctl.pid().terms().output() > 1000.0);

    let faults = sink.count(|e| matches!(e, AppEvent::SensorFault { .. }));
    assert_eq!(faults, 1, "fault is reported on the transition only");
    assert!(sink.events.contains(&AppEvent::SensorFault {
        consecutive_timeouts: 21
    }));
}

#[test]
fn interlock_releases_when_frames_resume() {
    let decoder = BitstreamDecoder::new();
    let store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    for now in 1..=25000 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_ne!(ctl.faults(), 0);

    decoder.sim_clock_frame(&COLD_PLATE);
    ctl.tick(25001, &mut relay, &mut sink);
    assert_eq!(ctl.faults(), 0);
    assert_eq!(sink.last(), Some(&AppEvent::SensorRecovered));

    // Power returns with the next PID step.
    for now in 25002..=25300 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(ctl.power(), 1000.0);
}

// ── Commands ─────────────────────────────────────────────────

#[test]
fn nudges_apply_delta_and_persist() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut sink = RecordingSink::default();
    {
        let mut ctl = setup(&decoder, &store, 0);
        send(&mut ctl, b"PPIdT+T", &mut store, &mut sink);
        assert_eq!(ctl.pid().proportional(), 32.0);
        assert_eq!(ctl.pid().integral(), 1.0);
        assert_eq!(ctl.pid().derivative(), -1.0);
        assert_eq!(ctl.target(), 211.0);
        assert_eq!(ctl.delta(), 10.0);
    }

    let reloaded = setup(&decoder, &store, 0);
    assert_eq!(reloaded.pid().proportional(), 32.0);
    assert_eq!(reloaded.pid().integral(), 1.0);
    assert_eq!(reloaded.pid().derivative(), -1.0);
    assert_eq!(reloaded.target(), 211.0);
    // Delta is session state.
    assert_eq!(reloaded.delta(), 1.0);
}

#[test]
fn delta_is_clamped() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut sink = RecordingSink::default();

    send(&mut ctl, b"+++++", &mut store, &mut sink);
    assert_eq!(ctl.delta(), MAX_DELTA);

    send(&mut ctl, b"--------", &mut store, &mut sink);
    assert_eq!(ctl.delta(), MIN_DELTA);
}

#[test]
fn reset_restores_factory_tunables() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut sink = RecordingSink::default();

    send(&mut ctl, b"+PPIIDDtt", &mut store, &mut sink);
    assert_ne!(ctl.pid().proportional(), 30.0);

    send(&mut ctl, b"R", &mut store, &mut sink);
    assert_eq!(ctl.pid().proportional(), 30.0);
    assert_eq!(ctl.pid().integral(), 0.0);
    assert_eq!(ctl.pid().derivative(), 0.0);
    assert_eq!(ctl.target(), 200.0);

    let reloaded = setup(&decoder, &store, 0);
    assert_eq!(reloaded.pid().gains(), ctl.pid().gains());
    assert_eq!(reloaded.target(), 200.0);
}

#[test]
fn target_round_trips_bit_exact() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    ctl.set_target(183.37, &mut store).unwrap();

    let reloaded = setup(&decoder, &store, 0);
    assert_eq!(reloaded.target().to_bits(), 183.37_f32.to_bits());
}

#[test]
fn storage_failure_keeps_in_memory_value() {
    let decoder = BitstreamDecoder::new();
    let mut store = FailingStore::default();
    let mut ctl = ControlLoop::new(ControllerConfig::default(), &decoder, &store, 0);
    let mut sink = RecordingSink::default();

    // Unreadable slots fall back to defaults.
    assert_eq!(ctl.target(), 200.0);
    assert_eq!(ctl.pid().proportional(), 30.0);

    ctl.handle_command(AppCommand::from_byte(b'T').unwrap(), &mut store, &mut sink);
    ctl.handle_command(AppCommand::from_byte(b'P').unwrap(), &mut store, &mut sink);
    assert_eq!(ctl.target(), 201.0);
    assert_eq!(ctl.pid().proportional(), 31.0);
    assert_eq!(store.write_attempts, 2);
}

#[test]
fn unknown_bytes_change_nothing() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut sink = RecordingSink::default();

    send(&mut ctl, b"xyz\r\n", &mut store, &mut sink);
    assert!(sink.events.is_empty());
    assert_eq!(ctl.target(), 200.0);
}

// ── Reporting ────────────────────────────────────────────────

#[test]
fn on_demand_reports() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut sink = RecordingSink::default();

    send(&mut ctl, b" ?b", &mut store, &mut sink);
    assert_eq!(sink.events.len(), 3);
    match &sink.events[0] {
        AppEvent::Status(s) => {
            assert_eq!(s.target_c, 200.0);
            assert_eq!(s.current_c, TEMP_ERROR_VALUE);
            assert_eq!(s.gains, ctl.pid().gains());
            assert_eq!(s.delta, 1.0);
            assert_eq!(s.power, 0.0);
            assert_eq!(s.format, StatusFormat::Human);
        }
        other => panic!("expected status, got {other:?}"),
    }
    assert_eq!(sink.events[1], AppEvent::Help);
    assert!(matches!(sink.events[2], AppEvent::PidDebug { power, .. } if power == 0.0));
}

#[test]
fn periodic_status_when_enabled() {
    let decoder = BitstreamDecoder::new();
    let mut store = EepromAdapter::new();
    let mut ctl = setup(&decoder, &store, 0);
    let mut relay = MockRelay::default();
    let mut sink = RecordingSink::default();

    for now in 1..=1000 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Status(_))), 0);

    send(&mut ctl, b"ug", &mut store, &mut sink);
    assert!(ctl.auto_status());
    assert_eq!(ctl.format(), StatusFormat::Graph);

    for now in 1001..=2000 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    let reports: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Status(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 5);
    assert!(reports.iter().all(|s| s.format == StatusFormat::Graph));

    send(&mut ctl, b"u", &mut store, &mut sink);
    sink.clear();
    for now in 2001..=3000 {
        ctl.tick(now, &mut relay, &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Status(_))), 0);
}
