//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to. It carries the tick counter, the per-window accumulators,
//! the anomaly snapshot, configuration, and the per-dispatch outputs
//! (LED commands, interval report). Think of it as the "blackboard" in
//! a blackboard architecture.

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// Per-window statistics (output of a closed reporting window)
// ---------------------------------------------------------------------------

/// Mean and sample count for one closed reporting window.
///
/// `mean` is `None` when the window closed without a single sample —
/// the explicit guard against a zero-count division when the sampling
/// period is configured longer than the report period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: Option<f32>,
    pub samples: u32,
}

/// Statistics emitted when a reporting window closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReport {
    /// Hall statistics — collected in both modes.
    pub hall: WindowStats,
    /// Temperature statistics — `None` while in anomaly mode, where
    /// temperature is not sampled.
    pub temp: Option<WindowStats>,
}

// ---------------------------------------------------------------------------
// LED commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Blink override requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkAction {
    /// Start blinking with the given half-period in milliseconds.
    Start(u32),
    /// Stop blinking and restore the count display.
    Stop,
}

/// LED commands produced by one message dispatch.
/// Cleared before each dispatch; the service applies them after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedCommands {
    /// Net change to the lit LED count (+1 / −1 per degree step).
    pub step: i32,
    /// Blink override request, if any.
    pub blink: Option<BlinkAction>,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Seconds elapsed since start (monotonic tick counter).
    pub elapsed_sec: u32,

    // -- Accumulators (reset when a reporting window closes) --
    pub hall_sum: i64,
    pub hall_count: u32,
    pub temp_sum: f32,
    pub temp_count: u32,

    /// Last hall reading that was still normal before the anomaly.
    /// Only meaningful while in `HallAltered`; set from the anomaly
    /// message payload on entry.
    pub last_hall_normal: i32,

    // -- Per-dispatch outputs --
    pub commands: LedCommands,
    pub report: Option<IntervalReport>,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            elapsed_sec: 0,
            hall_sum: 0,
            hall_count: 0,
            temp_sum: 0.0,
            temp_count: 0,
            last_hall_normal: 0,
            commands: LedCommands::default(),
            report: None,
            config,
        }
    }

    /// Clear the per-dispatch outputs. Called by the service before
    /// each message is dispatched.
    pub fn begin_dispatch(&mut self) {
        self.commands = LedCommands::default();
        self.report = None;
    }

    /// Close the hall window: compute statistics without resetting.
    pub fn hall_window(&self) -> WindowStats {
        WindowStats {
            mean: (self.hall_count > 0)
                .then(|| self.hall_sum as f32 / self.hall_count as f32),
            samples: self.hall_count,
        }
    }

    /// Close the temperature window: compute statistics without resetting.
    pub fn temp_window(&self) -> WindowStats {
        WindowStats {
            mean: (self.temp_count > 0).then(|| self.temp_sum / self.temp_count as f32),
            samples: self.temp_count,
        }
    }

    pub fn reset_hall_window(&mut self) {
        self.hall_sum = 0;
        self.hall_count = 0;
    }

    pub fn reset_temp_window(&mut self) {
        self.temp_sum = 0.0;
        self.temp_count = 0;
    }

    /// Whether `value` lies within the configured deviation ratio of
    /// `reference` (the return-to-normal condition).
    pub fn within_deviation(&self, reference: i32, value: i32) -> bool {
        let diff = (i64::from(reference) - i64::from(value)).abs() as f32;
        diff <= self.config.hall_deviation_ratio * i64::from(reference).abs() as f32
    }
}
