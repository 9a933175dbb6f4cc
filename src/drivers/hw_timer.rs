//! Tick source for the monitoring state machine.
//!
//! Creates a periodic esp_timer that posts a `TimeTick` through an
//! [`EventBridge`] handle passed in at start — the callback owns its own
//! clone of the bridge, no globals. On simulation targets a plain thread
//! approximates the timing.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! they can safely perform the zero-wait channel post.

use crate::events::EventBridge;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the Box<EventBridge> leaked in start_tick_timer();
    // it lives for the process lifetime and EventBridge posts are safe
    // from the esp_timer task context.
    let bridge = unsafe { &*(arg.cast::<EventBridge>()) };
    // A full queue drops the tick silently — the next one is a second away.
    let _ = bridge.post_tick();
}

/// Start the periodic tick timer.
///
/// The bridge handle is moved into the timer callback and lives for the
/// process lifetime.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(bridge: EventBridge, period_ms: u32) {
    let arg = Box::into_raw(Box::new(bridge)).cast::<core::ffi::c_void>();

    // SAFETY: TICK_TIMER is written here once at boot from the single
    // main-task context before any timer callbacks fire. The callback
    // only posts to the message queue.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"tick\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK {
            log::error!(
                "hw_timer: tick timer create failed (rc={}) — continuing without ticks",
                ret
            );
            return;
        }
        let ret = esp_timer_start_periodic(TICK_TIMER, u64::from(period_ms) * 1000);
        if ret != ESP_OK {
            log::error!("hw_timer: tick timer start failed (rc={})", ret);
            return;
        }
    }

    info!("hw_timer: tick source started ({} ms period)", period_ms);
}

/// Thread-based fallback for simulation targets. The thread exits when
/// the queue closes (consumer gone).
#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(bridge: EventBridge, period_ms: u32) {
    use crate::events::PostError;

    log::info!("hw_timer(sim): thread tick source ({} ms period)", period_ms);
    let spawned = std::thread::Builder::new().name("tick".into()).spawn(move || {
        loop {
            std::thread::sleep(std::time::Duration::from_millis(u64::from(period_ms)));
            if let Err(PostError::Closed) = bridge.post_tick() {
                break;
            }
        }
    });
    if let Err(e) = spawned {
        log::error!("hw_timer(sim): tick thread spawn failed: {e}");
    }
}

/// Stop the tick timer.
#[cfg(target_os = "espidf")]
pub fn stop_tick_timer() {
    // SAFETY: TICK_TIMER is a valid handle if start_tick_timer()
    // succeeded; null-check prevents stopping a never-created timer.
    unsafe {
        let t = TICK_TIMER;
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_tick_timer() {}
