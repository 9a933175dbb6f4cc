//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌─────────────┬───────────┬──────────┬─────────────────────┐  │
//! │  │ StateId      │ on_enter  │ on_exit  │ on_message          │  │
//! │  ├─────────────┼───────────┼──────────┼─────────────────────┤  │
//! │  │ Normal       │ —         │ —        │ fn(ctx,msg)->Opt<>  │  │
//! │  │ HallAltered  │ fn(ctx)   │ fn(ctx)  │ fn(ctx,msg)->Opt<>  │  │
//! │  └─────────────┴───────────┴──────────┴─────────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! For every dequeued message the engine calls `on_message` for the
//! **current** state. If it returns `Some(next_id)`, the engine runs
//! `on_exit` for the current state, then `on_enter` for the next, and
//! updates the current pointer. Handlers receive `&mut FsmContext`
//! (accumulators, config, per-dispatch outputs) and the sensor port —
//! which read variant gets used is a state decision.
//!
//! Exactly one task drives this engine; nothing here is shared.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

use crate::app::ports::SensorPort;
use crate::events::Message;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible monitoring modes.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Normal = 0,
    HallAltered = 1,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert a `u8` index back to `StateId`. Panics on out-of-range in
    /// debug builds; returns `Normal` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Normal,
            1 => Self::HallAltered,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Normal
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-message handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type MessageHandlerFn = fn(&mut FsmContext, &Message, &mut dyn SensorPort) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_message: MessageHandlerFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and dispatches
/// every dequeued message to the current state's handler.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Messages dispatched so far (wraps at u64::MAX).
    dispatch_count: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            dispatch_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Dispatch one message to the current state's handler.
    ///
    /// 1. Call `on_message` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn dispatch(&mut self, ctx: &mut FsmContext, msg: &Message, sensors: &mut dyn SensorPort) {
        self.dispatch_count = self.dispatch_count.wrapping_add(1);

        let next = (self.table[self.current].on_message)(ctx, msg, sensors);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Messages dispatched since startup.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer
        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
