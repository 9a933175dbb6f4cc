//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both sensor drivers and exposes the read variants the
//! state machine consumes through the
//! [`SensorPort`](crate::app::ports::SensorPort).

pub mod crc;
pub mod hall;
pub mod si7021;

use hall::HallSensor;
use si7021::Si7021;

/// Aggregates the sensor drivers behind one construction point.
pub struct SensorHub {
    pub si7021: Si7021,
    pub hall: HallSensor,
}

impl SensorHub {
    /// Construct a new hub. Pass in pre-built drivers (built in main
    /// where the event bridge handles are cloned out).
    pub fn new(si7021: Si7021, hall: HallSensor) -> Self {
        Self { si7021, hall }
    }

    /// Take the boot-time reference readings for both sensors. Call
    /// once after peripheral init, before the monitoring loop starts.
    pub fn seed_references(&mut self) {
        self.si7021.seed_reference();
        self.hall.seed_reference();
    }
}
