//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, the LED bar, event sinks) implement these
//! traits. The [`MonitorService`](super::service::MonitorService) consumes
//! them via generics (and the FSM handlers via `&mut dyn SensorPort`), so
//! the domain core never touches hardware directly.

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the state machine calls this to obtain sensor data.
///
/// The checked variants have a notification side effect: threshold
/// crossings detected during the read are posted to the message queue
/// by the implementation, and come back to the state machine as
/// ordinary inputs.
pub trait SensorPort {
    /// Calibrated temperature in degrees Celsius, checksum-validated.
    /// May post zero or more degree-step notifications per call, one for
    /// each whole-degree boundary crossed since the previous check.
    fn read_temperature_checked(&mut self) -> f32;

    /// Raw hall reading. Posts an anomaly notification (carrying the
    /// previous reading) when the change versus the previous reading
    /// exceeds the configured deviation ratio.
    fn read_hall_checked(&mut self) -> i32;

    /// Raw hall reading with no notification side effect. Used while
    /// already in anomaly mode, where further notifications would be
    /// redundant.
    fn read_hall_raw(&mut self) -> i32;
}

// ───────────────────────────────────────────────────────────────
// LED port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the LED bar.
pub trait LedPort {
    /// Light one more LED.
    fn turn_on_one(&mut self);

    /// Turn one LED off.
    fn turn_off_one(&mut self);

    /// Start the blink override; supersedes the count display until
    /// stopped. `period_ms` is the toggle half-period.
    fn start_blink(&mut self, period_ms: u32);

    /// Stop the blink override and restore the count display.
    fn stop_blink(&mut self);

    /// Current lit-LED count (unclamped; see the driver).
    fn lit_count(&self) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, MQTT,
/// a display, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
