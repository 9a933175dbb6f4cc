//! Application service — the hexagonal core.
//!
//! [`MonitorService`] owns the FSM and its context. It pulls messages
//! from the bounded queue, dispatches them into the state machine,
//! applies the resulting LED commands, and emits structured events.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     MonitorService     │
//!     LedPort ◀── │     FSM · reporting    │
//!                 └────────────────────────┘
//! ```

use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::events::Message;
use crate::fsm::context::{BlinkAction, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::AppEvent;
use super::ports::{EventSink, LedPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    fsm: Fsm,
    ctx: FsmContext,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Normal);
        Self { fsm, ctx }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Normal).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("MonitorService started in {:?}", self.fsm.current_state());
    }

    // ── Per-message orchestration ─────────────────────────────

    /// Process one inbound message: dispatch → apply LED commands →
    /// emit report / mode-change events.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`LedPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn handle_message(
        &mut self,
        msg: Message,
        hw: &mut (impl SensorPort + LedPort),
        sink: &mut impl EventSink,
    ) {
        let prev_state = self.fsm.current_state();

        // 1. Dispatch into the state machine (pure state logic; sensor
        //    reads happen through the port as the handlers decide).
        self.ctx.begin_dispatch();
        self.fsm.dispatch(&mut self.ctx, &msg, hw);

        // 2. Apply LED commands via LedPort
        self.apply_leds(hw);

        // 3. Emit the interval report if a window closed
        if let Some(report) = self.ctx.report.take() {
            if report.hall.samples == 0 {
                warn!("reporting window closed without a single hall sample");
            }
            sink.emit(&AppEvent::Report(report));
        }

        // 4. Emit mode change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::ModeChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    /// Blocking consumer loop: pull messages until every producer
    /// handle is gone. This is the single consumer — nothing else ever
    /// mutates the FSM state or accumulators.
    pub fn run(
        &mut self,
        rx: &Receiver<Message>,
        hw: &mut (impl SensorPort + LedPort),
        sink: &mut impl EventSink,
    ) {
        for msg in rx.iter() {
            self.handle_message(msg, hw, sink);
        }
        // Unreachable on the device; in tests this is the clean way out.
        info!("message queue closed, consumer loop ending");
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Messages dispatched since startup.
    pub fn dispatch_count(&self) -> u64 {
        self.fsm.dispatch_count()
    }

    /// Seconds of tick time observed so far.
    pub fn elapsed_sec(&self) -> u32 {
        self.ctx.elapsed_sec
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate per-dispatch LED commands into port calls.
    fn apply_leds(&self, hw: &mut impl LedPort) {
        let cmds = &self.ctx.commands;

        match cmds.step.cmp(&0) {
            core::cmp::Ordering::Greater => {
                for _ in 0..cmds.step {
                    hw.turn_on_one();
                }
            }
            core::cmp::Ordering::Less => {
                for _ in 0..-cmds.step {
                    hw.turn_off_one();
                }
            }
            core::cmp::Ordering::Equal => {}
        }

        match cmds.blink {
            Some(BlinkAction::Start(period_ms)) => hw.start_blink(period_ms),
            Some(BlinkAction::Stop) => hw.stop_blink(),
            None => {}
        }
    }
}
