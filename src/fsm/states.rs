//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no heap.
//! This is the classic embedded C FSM pattern expressed in safe Rust.
//!
//! ```text
//!  NORMAL ──[hall anomaly message]──▶ HALL ALTERED
//!    ▲                                     │
//!    └──[tick: raw hall back within 20%]───┘
//! ```
//!
//! In `Normal` the hall sensor is sampled with the deviation check (it
//! may post an anomaly message); in `HallAltered` the raw variant is
//! used instead — further anomaly notifications would be redundant
//! there, so they are simply never generated.

use log::info;

use super::context::{BlinkAction, FsmContext, IntervalReport};
use super::{StateDescriptor, StateId};
use crate::app::ports::SensorPort;
use crate::events::Message;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Normal
        StateDescriptor {
            id: StateId::Normal,
            name: "Normal",
            on_enter: None,
            on_exit: None,
            on_message: normal_on_message,
        },
        // Index 1 — HallAltered
        StateDescriptor {
            id: StateId::HallAltered,
            name: "HallAltered",
            on_enter: Some(hall_altered_enter),
            on_exit: Some(hall_altered_exit),
            on_message: hall_altered_on_message,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL state — full monitoring: hall + temperature + LED degree display
// ═══════════════════════════════════════════════════════════════════════════

fn normal_on_message(
    ctx: &mut FsmContext,
    msg: &Message,
    sensors: &mut dyn SensorPort,
) -> Option<StateId> {
    match msg {
        Message::TimeTick => {
            ctx.elapsed_sec += 1;

            // Checking divisibility by a period of 1 looks redundant but
            // keeps the cadence independent of the configured value.
            if ctx.elapsed_sec % ctx.config.hall_period_secs == 0 {
                // Deviation-checked read: may post an anomaly message
                // that arrives through the queue like any other input.
                let v = sensors.read_hall_checked();
                ctx.hall_sum += i64::from(v);
                ctx.hall_count += 1;
            }

            if ctx.elapsed_sec % ctx.config.temp_period_secs == 0 {
                let t = sensors.read_temperature_checked();
                ctx.temp_sum += t;
                ctx.temp_count += 1;
            }

            if ctx.elapsed_sec % ctx.config.show_period_secs == 0 {
                ctx.report = Some(IntervalReport {
                    hall: ctx.hall_window(),
                    temp: Some(ctx.temp_window()),
                });
                ctx.reset_hall_window();
                ctx.reset_temp_window();
            }
            None
        }

        Message::TempUp => {
            ctx.commands.step += 1;
            info!("One more degree");
            None
        }

        Message::TempDown => {
            ctx.commands.step -= 1;
            info!("One less degree");
            None
        }

        Message::HallAnomaly { last_normal } => {
            // Remember what "normal" looked like; the altered state
            // compares raw readings against this snapshot to decide
            // when to come back.
            ctx.last_hall_normal = *last_normal;
            Some(StateId::HallAltered)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  HALL ALTERED state — blink override, raw hall sampling only
// ═══════════════════════════════════════════════════════════════════════════

fn hall_altered_enter(ctx: &mut FsmContext) {
    ctx.commands.blink = Some(BlinkAction::Start(ctx.config.blink_period_ms));
    info!("Entering hall altered mode");
}

fn hall_altered_exit(ctx: &mut FsmContext) {
    // The LEDs go back to displaying the degree count kept before the
    // anomaly; the count itself was never touched in this mode.
    ctx.commands.blink = Some(BlinkAction::Stop);
    info!("Return to normal mode");
}

fn hall_altered_on_message(
    ctx: &mut FsmContext,
    msg: &Message,
    sensors: &mut dyn SensorPort,
) -> Option<StateId> {
    match msg {
        Message::TimeTick => {
            ctx.elapsed_sec += 1;
            let mut next = None;

            if ctx.elapsed_sec % ctx.config.hall_period_secs == 0 {
                let v = sensors.read_hall_raw();
                ctx.hall_sum += i64::from(v);
                ctx.hall_count += 1;

                if ctx.within_deviation(ctx.last_hall_normal, v) {
                    next = Some(StateId::Normal);
                }
            }

            if ctx.elapsed_sec % ctx.config.show_period_secs == 0 {
                ctx.report = Some(IntervalReport {
                    hall: ctx.hall_window(),
                    temp: None,
                });
                ctx.reset_hall_window();
            }
            next
        }

        // Degree steps are not displayed in this mode, and further
        // anomaly reports carry no new information.
        Message::TempUp | Message::TempDown | Message::HallAnomaly { .. } => None,
    }
}
