//! EnvNode Firmware — Main Entry Point
//!
//! Hexagonal architecture around a message-driven FSM:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter                LogEventSink                   │
//! │  (SensorHub + LedBar)           (EventSink)                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │            FSM · accumulators · reporting              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EventBridge ──▶ bounded queue ──▶ consumer loop (this task)   │
//! │  (tick timer, sensor notifiers)                                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod events;
mod pins;

pub mod app;
mod adapters;
mod drivers;
pub mod fsm;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::{Context, Result};
use log::info;

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use app::service::MonitorService;
use config::SystemConfig;
use drivers::led_bar::LedBar;
use events::{EventBridge, message_queue};
use sensors::SensorHub;
use sensors::hall::HallSensor;
use sensors::si7021::Si7021;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EnvNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().context("invalid system configuration")?;

    // ── 3. Peripherals ────────────────────────────────────────
    drivers::hw_init::init_peripherals().context("peripheral init failed")?;

    // ── 4. Message queue + bridge ─────────────────────────────
    // The queue is created here and its two ends handed out
    // explicitly: producers get EventBridge clones, the consumer
    // loop below gets the receiver.
    let (tx, rx) = message_queue(config.event_queue_depth);
    let bridge = EventBridge::new(tx, config.sensor_post_timeout_ms);

    // ── 5. Sensors + LED bar ──────────────────────────────────
    let mut sensor_hub = SensorHub::new(
        Si7021::new(bridge.clone()),
        HallSensor::new(bridge.clone(), config.hall_deviation_ratio),
    );
    // First readings give the delta checks something to compare against.
    sensor_hub.seed_references();

    let mut leds = LedBar::new();
    leds.init();

    let mut hw = HardwareAdapter::new(sensor_hub, leds);
    let mut sink = LogEventSink::new();

    // ── 6. Monitoring service ─────────────────────────────────
    let mut service = MonitorService::new(config.clone());
    service.start(&mut sink);

    // ── 7. Tick source ────────────────────────────────────────
    drivers::hw_timer::start_tick_timer(bridge.clone(), config.tick_period_ms);

    info!("System ready. Entering message loop.");

    // ── 8. Consumer loop (runs forever on this task) ──────────
    // Exactly one consumer: all FSM state and accumulators are owned
    // here, so no locking is needed anywhere in the domain.
    service.run(&rx, &mut hw, &mut sink);

    Ok(())
}
