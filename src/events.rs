//! Inbound message stream for the monitoring state machine.
//!
//! Three independent producers are normalised into one message type and
//! one bounded queue:
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ Tick timer   │────▶│               │     │              │
//! │ Temp sensor  │────▶│ Bounded queue │────▶│  FSM task    │
//! │ Hall sensor  │────▶│  (10 slots)   │     │  (consumer)  │
//! └──────────────┘     └───────────────┘     └──────────────┘
//! ```
//!
//! Producers never block for long on a full queue: ticks are posted with
//! zero wait (the next tick supersedes a lost one within a second), and
//! sensor notifications wait a bounded 200 ms before being dropped with a
//! logged error. Retrying a stale notification would be worse than losing
//! it. The consumer blocks indefinitely on an empty queue.
//!
//! Messages move by value through the channel: each one is enqueued once
//! and consumed exactly once.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, SendTimeoutError, TrySendError, bounded};
use log::{debug, error};

/// Messages consumed by the monitoring state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// One second elapsed on the tick timer.
    TimeTick,
    /// Temperature rose one whole degree past the reference.
    TempUp,
    /// Temperature fell one whole degree.
    TempDown,
    /// The hall reading deviated beyond the configured ratio.
    /// Carries the last reading that was still considered normal, so the
    /// state machine knows what "back to normal" means.
    HallAnomaly { last_normal: i32 },
}

/// Why a post did not reach the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostError {
    /// The queue stayed full for the allowed wait.
    QueueFull,
    /// The consumer is gone (only happens during test teardown).
    Closed,
}

/// Create the shared message queue.
///
/// Called once in `main`; the [`EventBridge`] (producer side) and the
/// receiver (consumer side) are then handed to their owners explicitly —
/// no process-wide queue handle exists.
pub fn message_queue(depth: usize) -> (Sender<Message>, Receiver<Message>) {
    bounded(depth)
}

/// Producer-side handle for the message queue.
///
/// Cheap to clone; every producer (tick timer, sensor notifiers) holds
/// its own clone.
#[derive(Clone)]
pub struct EventBridge {
    tx: Sender<Message>,
    post_timeout: Duration,
}

impl EventBridge {
    pub fn new(tx: Sender<Message>, post_timeout_ms: u64) -> Self {
        Self {
            tx,
            post_timeout: Duration::from_millis(post_timeout_ms),
        }
    }

    /// Post a tick with zero wait. A full queue drops the tick silently.
    pub fn post_tick(&self) -> Result<(), PostError> {
        match self.tx.try_send(Message::TimeTick) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(PostError::QueueFull),
            Err(TrySendError::Disconnected(_)) => {
                debug!("message queue closed, tick source stopping");
                Err(PostError::Closed)
            }
        }
    }

    /// Post a sensor notification, waiting up to the configured timeout
    /// for a queue slot. On timeout the message is dropped and the loss
    /// is logged — no retry.
    pub fn post_sensor_event(&self, msg: Message) -> Result<(), PostError> {
        match self.tx.send_timeout(msg, self.post_timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(lost)) => {
                error!(
                    "message queue full for {} ms, dropping {:?}",
                    self.post_timeout.as_millis(),
                    lost
                );
                Err(PostError::QueueFull)
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                debug!("message queue closed, dropping sensor event");
                Err(PostError::Closed)
            }
        }
    }
}
