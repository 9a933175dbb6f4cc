//! Mock hardware adapter for integration tests.
//!
//! Records every LED call and serves scripted sensor readings so tests
//! can assert on the full command history without touching real
//! GPIO/ADC/I2C.

use std::collections::VecDeque;

use envnode::app::events::AppEvent;
use envnode::app::ports::{EventSink, LedPort, SensorPort};
use envnode::fsm::context::IntervalReport;

// ── LED call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCall {
    TurnOnOne,
    TurnOffOne,
    StartBlink { period_ms: u32 },
    StopBlink,
}

// ── MockHardware ──────────────────────────────────────────────

/// Scripted sensors + recording LED bar in one adapter, mirroring the
/// real `HardwareAdapter` shape.
pub struct MockHardware {
    /// Hall readings served in order; the last one repeats when the
    /// script runs out.
    hall_script: VecDeque<i32>,
    last_hall: i32,
    /// Temperature readings served the same way.
    temp_script: VecDeque<f32>,
    last_temp: f32,

    pub calls: Vec<LedCall>,
    pub lit: i32,
    pub blinking: bool,

    pub checked_hall_reads: usize,
    pub raw_hall_reads: usize,
    pub temp_reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            hall_script: VecDeque::new(),
            last_hall: 1000,
            temp_script: VecDeque::new(),
            last_temp: 20.0,
            calls: Vec::new(),
            lit: 1, // the driver boots with one LED on
            blinking: false,
            checked_hall_reads: 0,
            raw_hall_reads: 0,
            temp_reads: 0,
        }
    }

    pub fn script_hall(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.hall_script.extend(values);
        self
    }

    pub fn script_temp(mut self, values: impl IntoIterator<Item = f32>) -> Self {
        self.temp_script.extend(values);
        self
    }

    pub fn blink_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, LedCall::StartBlink { .. }))
            .count()
    }

    fn next_hall(&mut self) -> i32 {
        if let Some(v) = self.hall_script.pop_front() {
            self.last_hall = v;
        }
        self.last_hall
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature_checked(&mut self) -> f32 {
        self.temp_reads += 1;
        if let Some(t) = self.temp_script.pop_front() {
            self.last_temp = t;
        }
        self.last_temp
    }

    fn read_hall_checked(&mut self) -> i32 {
        self.checked_hall_reads += 1;
        self.next_hall()
    }

    fn read_hall_raw(&mut self) -> i32 {
        self.raw_hall_reads += 1;
        self.next_hall()
    }
}

impl LedPort for MockHardware {
    fn turn_on_one(&mut self) {
        self.lit += 1;
        self.calls.push(LedCall::TurnOnOne);
    }

    fn turn_off_one(&mut self) {
        self.lit -= 1;
        self.calls.push(LedCall::TurnOffOne);
    }

    fn start_blink(&mut self, period_ms: u32) {
        self.blinking = true;
        self.calls.push(LedCall::StartBlink { period_ms });
    }

    fn stop_blink(&mut self) {
        self.blinking = false;
        self.calls.push(LedCall::StopBlink);
    }

    fn lit_count(&self) -> i32 {
        self.lit
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that stores every emitted event for later assertions.
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn reports(&self) -> Vec<IntervalReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Report(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn mode_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::ModeChanged { .. }))
            .count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
