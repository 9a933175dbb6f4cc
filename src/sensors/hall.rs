//! Hall-effect sensor driver (ADC) with a deviation-check notifier.
//!
//! The checked read variant compares each raw reading against the
//! previous one and posts a `HallAnomaly` message when the change
//! exceeds the configured ratio. The message carries the *previous*
//! reading — the last value that was still normal — so the state
//! machine can recognise when readings return to that level. The raw
//! variant has no notification side effect and is what the anomaly
//! mode samples with.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC1 oneshot reads via `hw_init`. On host/test: reads a
//! static `AtomicI32` for injection.

use core::sync::atomic::AtomicI32;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use crate::events::{EventBridge, Message};

static SIM_HALL_RAW: AtomicI32 = AtomicI32::new(1000);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_hall_raw(value: i32) {
    SIM_HALL_RAW.store(value, Ordering::Relaxed);
}

pub struct HallSensor {
    bridge: EventBridge,
    /// Relative change versus the previous reading that counts as an
    /// anomaly (0.20 = 20%).
    deviation_ratio: f32,
    /// Previous reading, the comparison baseline for the next check.
    last_read: i32,
}

impl HallSensor {
    pub fn new(bridge: EventBridge, deviation_ratio: f32) -> Self {
        Self {
            bridge,
            deviation_ratio,
            last_read: 0,
        }
    }

    /// Take the boot-time reading so the first checked read has a
    /// predecessor to compare against.
    pub fn seed_reference(&mut self) {
        self.last_read = self.read_adc();
    }

    /// Read the sensor and check the variation against the previous
    /// reading; posts an anomaly notification on a breach.
    pub fn read_checked(&mut self) -> i32 {
        let value = self.read_adc();

        let diff = (i64::from(value) - i64::from(self.last_read)).abs() as f32;
        if diff > self.deviation_ratio * i64::from(self.last_read).abs() as f32 {
            let _ = self.bridge.post_sensor_event(Message::HallAnomaly {
                last_normal: self.last_read,
            });
        }

        self.last_read = value;
        value
    }

    /// Read the sensor with no variation check.
    pub fn read_raw(&self) -> i32 {
        self.read_adc()
    }

    // ── Internal ──────────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> i32 {
        i32::from(crate::drivers::hw_init::adc1_read(crate::pins::ADC1_CH_HALL))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> i32 {
        SIM_HALL_RAW.load(Ordering::Relaxed)
    }
}
