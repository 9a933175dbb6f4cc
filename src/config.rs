//! System configuration parameters
//!
//! All tunable parameters for the EnvNode monitoring loop. The sampling
//! and reporting cadences are expressed in whole seconds and evaluated
//! with a modulo over the tick counter, so a period of 1 fires on every
//! tick.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sampling cadence ---
    /// Hall sensor sampling period (seconds).
    pub hall_period_secs: u32,
    /// Temperature sampling period (seconds).
    pub temp_period_secs: u32,
    /// Interval report period (seconds).
    pub show_period_secs: u32,

    // --- Anomaly detection ---
    /// Relative hall deviation that counts as an anomaly (0.20 = 20%).
    /// The same ratio gates the return to normal monitoring.
    pub hall_deviation_ratio: f32,

    // --- LED bar ---
    /// Blink half-period while in anomaly mode (milliseconds).
    pub blink_period_ms: u32,

    // --- Event delivery ---
    /// Capacity of the inbound message queue.
    pub event_queue_depth: usize,
    /// How long a sensor notification may wait on a full queue before
    /// being dropped (milliseconds). Ticks never wait.
    pub sensor_post_timeout_ms: u64,
    /// Tick source period (milliseconds).
    pub tick_period_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sampling
            hall_period_secs: 1,
            temp_period_secs: 2,
            show_period_secs: 10,

            // Anomaly detection
            hall_deviation_ratio: 0.20,

            // LED bar
            blink_period_ms: 500,

            // Event delivery
            event_queue_depth: 10,
            sensor_post_timeout_ms: 200,
            tick_period_ms: 1000, // 1 Hz
        }
    }
}

impl SystemConfig {
    /// Reject configurations the monitoring loop cannot run with.
    ///
    /// A show period that is not a multiple of the sampling periods is
    /// allowed (windows then carry however many samples landed inside
    /// them), but zero periods would stall the modulo cadence entirely.
    pub fn validate(&self) -> Result<()> {
        if self.hall_period_secs == 0 || self.temp_period_secs == 0 || self.show_period_secs == 0 {
            return Err(Error::Config("sampling/report periods must be non-zero"));
        }
        if self.event_queue_depth == 0 {
            return Err(Error::Config("event queue depth must be non-zero"));
        }
        if !(self.hall_deviation_ratio > 0.0 && self.hall_deviation_ratio < 1.0) {
            return Err(Error::Config("hall deviation ratio must be in (0, 1)"));
        }
        if self.blink_period_ms == 0 || self.tick_period_ms == 0 {
            return Err(Error::Config("timer periods must be non-zero"));
        }
        Ok(())
    }
}
