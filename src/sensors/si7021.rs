//! Si7021 temperature sensor driver (I2C) with a whole-degree delta notifier.
//!
//! Reads the Measure Temperature Hold Master command (0xE3) and converts
//! the 16-bit word with the datasheet formula. Reads can optionally
//! validate the CRC-8 checksum byte the sensor appends; a mismatch is
//! logged and the (possibly wrong) value is still used — the application
//! can keep running on one bad sample.
//!
//! The delta notifier compares each reading against a reference taken at
//! boot and posts one `TempUp`/`TempDown` message per whole degree
//! crossed since the previous check — several at once if the temperature
//! jumped multiple degrees between checks.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: I2C transactions via `hw_init`. On host/test: reads a
//! static `AtomicU16` raw word for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use log::{error, info};

#[cfg(target_os = "espidf")]
use super::crc::{SI7021_POLY, crc8};
use crate::error::Result;
#[cfg(target_os = "espidf")]
use crate::error::SensorError;
use crate::events::{EventBridge, Message};

/// Fixed I2C address of the Si7021.
#[cfg(target_os = "espidf")]
const SI7021_ADDR: u8 = 0x40;
/// Measure Temperature, Hold Master mode.
#[cfg(target_os = "espidf")]
const CMD_MEASURE_TEMP_HOLD: u8 = 0xE3;

// Raw word for host builds; ~25 °C by default.
static SIM_TEMP_RAW: AtomicU16 = AtomicU16::new(26800);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_raw(raw: u16) {
    SIM_TEMP_RAW.store(raw, Ordering::Relaxed);
}

/// Convenience for tests: inject a temperature in degrees Celsius.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_celsius(celsius: f32) {
    let raw = ((celsius + 46.85) / 175.72 * 65536.0 + 0.5) as u16;
    sim_set_temp_raw(raw);
}

pub struct Si7021 {
    bridge: EventBridge,
    /// Reference temperature taken at boot; degree steps are counted
    /// against this, not against the previous reading.
    ref_temp: f32,
    /// Whole-degree difference reported so far.
    last_degree_diff: i32,
}

impl Si7021 {
    pub fn new(bridge: EventBridge) -> Self {
        Self {
            bridge,
            ref_temp: 0.0,
            last_degree_diff: 0,
        }
    }

    /// Take the boot-time reference reading. Call once after the I2C
    /// bus is up, before the monitoring loop starts.
    pub fn seed_reference(&mut self) {
        self.ref_temp = self.read_temperature(true);
        self.last_degree_diff = 0;
        info!("Reference temperature set to {:.2} ºC", self.ref_temp);
    }

    /// One temperature reading, then check how many whole degrees we
    /// are away from the reference and post a message per step crossed.
    pub fn read_and_check_delta(&mut self) -> f32 {
        let temp = self.read_temperature(true);
        self.check_degree_diff(temp);
        temp
    }

    /// One temperature reading in degrees Celsius.
    pub fn read_temperature(&self, use_checksum: bool) -> f32 {
        let raw = match self.read_raw_word(use_checksum) {
            Ok(raw) => raw,
            Err(e) => {
                // A failed transaction degrades to a nonsense reading;
                // the deviation thresholds downstream are the only
                // defence the original design wants here.
                error!("si7021: {e}");
                0
            }
        };
        Self::raw_to_celsius(raw)
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_degree_diff(&mut self, temp: f32) {
        // Integer degrees away from the reference, truncated toward zero.
        let diff = (temp - self.ref_temp) as i32;

        // One message per whole degree gained since the last check…
        for _ in self.last_degree_diff..diff {
            let _ = self.bridge.post_sensor_event(Message::TempUp);
        }
        // …or lost.
        for _ in diff..self.last_degree_diff {
            let _ = self.bridge.post_sensor_event(Message::TempDown);
        }

        self.last_degree_diff = diff;
    }

    fn raw_to_celsius(raw: u16) -> f32 {
        // Datasheet conversion for the 16-bit temperature word.
        175.72 * f32::from(raw) / 65536.0 - 46.85
    }

    #[cfg(target_os = "espidf")]
    fn read_raw_word(&self, use_checksum: bool) -> Result<u16> {
        use crate::drivers::hw_init;
        use crate::pins;

        let mut buf = [0u8; 3];
        let len = if use_checksum { 3 } else { 2 };
        hw_init::i2c_write_read(
            pins::I2C_MASTER_PORT,
            SI7021_ADDR,
            &[CMD_MEASURE_TEMP_HOLD],
            &mut buf[..len],
        )
        .map_err(|rc| SensorError::I2cReadFailed(rc))?;

        if use_checksum {
            let computed = crc8(&buf[..2], SI7021_POLY);
            if computed != buf[2] {
                // Logged but not fatal: one wrong measurement is
                // tolerable, the next sample corrects the mean.
                error!(
                    "si7021: {}",
                    SensorError::ChecksumMismatch {
                        received: buf[2],
                        computed,
                    }
                );
            }
        }

        Ok(u16::from(buf[0]) << 8 | u16::from(buf[1]))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw_word(&self, _use_checksum: bool) -> Result<u16> {
        // The sim word carries no checksum byte.
        Ok(SIM_TEMP_RAW.load(Ordering::Relaxed))
    }
}
