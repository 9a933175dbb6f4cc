//! Integration tests for the MonitorService → FSM → LED pipeline.
//!
//! These run on the host (x86_64) and verify that full message
//! sequences flow from the queue through the state machine down to
//! LED calls and interval reports, without any real hardware.

use crate::mock_hw::{LedCall, MockHardware, RecordingSink};

use envnode::app::events::AppEvent;
use envnode::app::service::MonitorService;
use envnode::config::SystemConfig;
use envnode::events::Message;
use envnode::fsm::StateId;

fn make_service(config: SystemConfig) -> (MonitorService, MockHardware, RecordingSink) {
    let mut service = MonitorService::new(config);
    let mut sink = RecordingSink::new();
    service.start(&mut sink);
    (service, MockHardware::new(), sink)
}

// ── Tick-only sequences ──────────────────────────────────────

#[test]
fn ticks_alone_leave_state_and_leds_unchanged() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    for _ in 0..7 {
        service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    }

    assert_eq!(service.state(), StateId::Normal);
    assert_eq!(service.elapsed_sec(), 7);
    assert!(hw.calls.is_empty(), "no LED calls expected: {:?}", hw.calls);
    assert_eq!(hw.lit, 1);
    // Normal mode samples with the deviation-checked variant only.
    assert_eq!(hw.checked_hall_reads, 7);
    assert_eq!(hw.raw_hall_reads, 0);
}

// ── Interval reporting ───────────────────────────────────────

#[test]
fn report_carries_window_mean_and_resets() {
    let mut config = SystemConfig::default();
    config.hall_period_secs = 1;
    config.temp_period_secs = 1;
    config.show_period_secs = 5;
    let (mut service, _, mut sink) = make_service(config);
    let mut hw = MockHardware::new()
        .script_hall([10, 20, 30, 40, 50, 100, 100, 100, 100, 100])
        .script_temp([20.0, 21.0, 22.0, 23.0, 24.0]);

    for _ in 0..5 {
        service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    }

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].hall.samples, 5);
    assert!((reports[0].hall.mean.unwrap() - 30.0).abs() < f32::EPSILON);
    let temp = reports[0].temp.expect("temperature reported in normal mode");
    assert!((temp.mean.unwrap() - 22.0).abs() < 1e-4);

    // The second window must start from zero.
    for _ in 0..5 {
        service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    }
    let reports = sink.reports();
    assert_eq!(reports.len(), 2);
    assert!((reports[1].hall.mean.unwrap() - 100.0).abs() < f32::EPSILON);
}

// ── Degree steps and the LED bar ─────────────────────────────

#[test]
fn consecutive_temp_ups_light_n_more_leds() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    for _ in 0..3 {
        service.handle_message(Message::TempUp, &mut hw, &mut sink);
    }

    assert_eq!(hw.lit, 4);
    assert_eq!(
        hw.calls,
        vec![LedCall::TurnOnOne, LedCall::TurnOnOne, LedCall::TurnOnOne]
    );
}

#[test]
fn temp_up_then_down_cancels() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    service.handle_message(Message::TempUp, &mut hw, &mut sink);
    service.handle_message(Message::TempDown, &mut hw, &mut sink);

    assert_eq!(hw.lit, 1);
    assert_eq!(hw.calls, vec![LedCall::TurnOnOne, LedCall::TurnOffOne]);
}

#[test]
fn lit_count_has_no_upper_bound() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    // Far past the 4 physical LEDs — the counter must keep the excess
    // so later TempDown steps stay symmetric.
    for _ in 0..10 {
        service.handle_message(Message::TempUp, &mut hw, &mut sink);
    }
    assert_eq!(hw.lit, 11);
    for _ in 0..10 {
        service.handle_message(Message::TempDown, &mut hw, &mut sink);
    }
    assert_eq!(hw.lit, 1);
}

// ── Anomaly mode ─────────────────────────────────────────────

#[test]
fn anomaly_starts_blink_and_returns_when_hall_recovers() {
    let config = SystemConfig::default();
    let blink_ms = config.blink_period_ms;
    let (mut service, _, mut sink) = make_service(config);
    // 130 is outside |100 ± 20|; 80 is right on the inclusive edge.
    let mut hw = MockHardware::new().script_hall([130, 130, 80]);

    service.handle_message(Message::HallAnomaly { last_normal: 100 }, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::HallAltered);
    assert_eq!(hw.calls, vec![LedCall::StartBlink { period_ms: blink_ms }]);

    service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::HallAltered);

    service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Normal);
    assert_eq!(hw.calls.last(), Some(&LedCall::StopBlink));
    assert!(!hw.blinking);

    // Anomaly mode samples raw only; the checked variant was never used.
    assert_eq!(hw.raw_hall_reads, 3);
    assert_eq!(hw.checked_hall_reads, 0);

    // Both transitions were announced.
    assert_eq!(sink.mode_changes(), 2);
}

#[test]
fn anomaly_message_is_ignored_once_altered() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    service.handle_message(Message::HallAnomaly { last_normal: 100 }, &mut hw, &mut sink);
    service.handle_message(Message::HallAnomaly { last_normal: 55 }, &mut hw, &mut sink);

    assert_eq!(service.state(), StateId::HallAltered);
    assert_eq!(hw.blink_starts(), 1, "blink must not restart");
    assert_eq!(sink.mode_changes(), 1);
}

#[test]
fn degree_steps_are_ignored_while_altered() {
    let (mut service, mut hw, mut sink) = make_service(SystemConfig::default());

    service.handle_message(Message::HallAnomaly { last_normal: 100 }, &mut hw, &mut sink);
    service.handle_message(Message::TempUp, &mut hw, &mut sink);
    service.handle_message(Message::TempDown, &mut hw, &mut sink);

    assert_eq!(hw.lit, 1);
    assert_eq!(hw.calls, vec![LedCall::StartBlink { period_ms: 500 }]);
}

#[test]
fn altered_report_skips_temperature() {
    let mut config = SystemConfig::default();
    config.show_period_secs = 2;
    let (mut service, _, mut sink) = make_service(config);
    let mut hw = MockHardware::new().script_hall([300, 300]);

    service.handle_message(Message::HallAnomaly { last_normal: 100 }, &mut hw, &mut sink);
    service.handle_message(Message::TimeTick, &mut hw, &mut sink);
    service.handle_message(Message::TimeTick, &mut hw, &mut sink);

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].temp, None);
    assert_eq!(reports[0].hall.samples, 2);
    assert_eq!(hw.temp_reads, 0, "temperature is not sampled while altered");
}

// ── End-to-end with real sensors + bridge + queue ────────────

#[cfg(not(target_os = "espidf"))]
#[test]
fn sensor_notifications_round_trip_through_the_queue() {
    use envnode::adapters::hardware::HardwareAdapter;
    use envnode::drivers::led_bar::LedBar;
    use envnode::events::{EventBridge, message_queue};
    use envnode::sensors::hall::{HallSensor, sim_set_hall_raw};
    use envnode::sensors::si7021::{Si7021, sim_set_temp_celsius};
    use envnode::sensors::SensorHub;

    let config = SystemConfig::default();
    let (tx, rx) = message_queue(config.event_queue_depth);
    let bridge = EventBridge::new(tx, config.sensor_post_timeout_ms);

    sim_set_hall_raw(1000);
    sim_set_temp_celsius(25.0);
    let mut hub = SensorHub::new(
        Si7021::new(bridge.clone()),
        HallSensor::new(bridge.clone(), config.hall_deviation_ratio),
    );
    hub.seed_references();

    let mut leds = LedBar::new();
    leds.init();
    let mut hw = HardwareAdapter::new(hub, leds);
    let mut sink = RecordingSink::new();
    let mut service = MonitorService::new(config);
    service.start(&mut sink);

    // Tick 1: everything nominal, nothing queued behind the tick.
    bridge.post_tick().unwrap();
    service.handle_message(rx.recv().unwrap(), &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Normal);
    assert!(rx.is_empty());

    // Hall jumps 40%, temperature jumps 2.5 °C. The next tick's checked
    // reads post the anomaly first, then two degree steps — so by the
    // time the degree steps arrive the FSM is altered and ignores them.
    sim_set_hall_raw(1400);
    sim_set_temp_celsius(27.5);
    bridge.post_tick().unwrap();
    service.handle_message(rx.recv().unwrap(), &mut hw, &mut sink);

    let queued: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        queued,
        vec![
            Message::HallAnomaly { last_normal: 1000 },
            Message::TempUp,
            Message::TempUp,
        ]
    );
    for msg in queued {
        service.handle_message(msg, &mut hw, &mut sink);
    }
    assert_eq!(service.state(), StateId::HallAltered);
    assert_eq!(envnode::app::ports::LedPort::lit_count(&hw), 1);

    // Hall recovers to within 20% of the last-normal snapshot.
    sim_set_hall_raw(1100);
    bridge.post_tick().unwrap();
    service.handle_message(rx.recv().unwrap(), &mut hw, &mut sink);
    assert_eq!(service.state(), StateId::Normal);
    assert!(rx.is_empty(), "raw reads must not post notifications");
}

// ── Consumer loop lifecycle ──────────────────────────────────

#[test]
fn run_loop_drains_until_producers_disappear() {
    use envnode::events::{EventBridge, message_queue};

    let (tx, rx) = message_queue(10);
    let bridge = EventBridge::new(tx, 200);

    let mut service = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    service.start(&mut sink);

    let consumer = std::thread::spawn(move || {
        let mut hw = MockHardware::new();
        service.run(&rx, &mut hw, &mut sink);
        (service, hw)
    });

    bridge.post_sensor_event(Message::TempUp).unwrap();
    bridge.post_sensor_event(Message::TempUp).unwrap();
    bridge.post_tick().unwrap();
    // Dropping the last producer closes the queue and ends the loop.
    drop(bridge);

    let (service, hw) = consumer.join().expect("consumer loop must exit cleanly");
    assert_eq!(service.dispatch_count(), 3);
    assert_eq!(service.elapsed_sec(), 1);
    assert_eq!(hw.lit, 3);
}
