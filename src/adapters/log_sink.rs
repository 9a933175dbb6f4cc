//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future MQTT or display adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::fsm::context::WindowStats;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::Report(report) => {
                log_window("Mean hall", &report.hall);
                if let Some(temp) = &report.temp {
                    match temp.mean {
                        Some(mean) => info!("Mean temperature: {:.2} ºC", mean),
                        None => warn!("Mean temperature: no samples this interval"),
                    }
                }
            }
        }
    }
}

fn log_window(label: &str, stats: &WindowStats) {
    match stats.mean {
        Some(mean) => info!("{}: {:.1}", label, mean),
        None => warn!("{}: no samples this interval", label),
    }
}
