//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the LED bar driver, exposing them through
//! [`SensorPort`] and [`LedPort`]. This is the only module in the system
//! that touches actual hardware. On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use crate::app::ports::{LedPort, SensorPort};
use crate::drivers::led_bar::LedBar;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensors: SensorHub,
    leds: LedBar,
}

impl HardwareAdapter {
    pub fn new(sensors: SensorHub, leds: LedBar) -> Self {
        Self { sensors, leds }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_temperature_checked(&mut self) -> f32 {
        self.sensors.si7021.read_and_check_delta()
    }

    fn read_hall_checked(&mut self) -> i32 {
        self.sensors.hall.read_checked()
    }

    fn read_hall_raw(&mut self) -> i32 {
        self.sensors.hall.read_raw()
    }
}

// ── LedPort implementation ────────────────────────────────────

impl LedPort for HardwareAdapter {
    fn turn_on_one(&mut self) {
        self.leds.turn_on_one();
    }

    fn turn_off_one(&mut self) {
        self.leds.turn_off_one();
    }

    fn start_blink(&mut self, period_ms: u32) {
        self.leds.start_blink(period_ms);
    }

    fn stop_blink(&mut self) {
        self.leds.stop_blink();
    }

    fn lit_count(&self) -> i32 {
        self.leds.lit_count()
    }
}
