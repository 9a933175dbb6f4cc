//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, publish
//! over MQTT, update a display, etc.

use crate::fsm::StateId;
use crate::fsm::context::IntervalReport;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM switched monitoring modes.
    ModeChanged { from: StateId, to: StateId },

    /// A reporting window closed; carries the window statistics.
    Report(IntervalReport),
}
