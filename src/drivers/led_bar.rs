//! LED bar driver: four GPIO LEDs showing a lit count, with a blink
//! override for anomaly mode.
//!
//! The driver keeps a signed lit counter and drives each LED from the
//! rule `position < count`. The counter itself is **not clamped** —
//! counts above the physical bar light every LED and counts below one
//! light none, while the arithmetic stays exact so matched up/down
//! steps always cancel.
//!
//! The blink override toggles all four LEDs together (all-on/all-off)
//! on a periodic timer. Stopping the override rewrites the count
//! display. One LED is lit at boot, mirroring the initial one-degree
//! baseline of the display.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: GPIO writes via `hw_init`, blink via esp_timer.
//! On host/test: counter and blink flag tracked in-memory only.

use crate::drivers::hw_init;
use crate::pins;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
static mut BLINK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// Output level for the next blink toggle, flipped by the callback.
#[cfg(target_os = "espidf")]
static BLINK_LEVEL: AtomicBool = AtomicBool::new(false);

#[cfg(target_os = "espidf")]
unsafe extern "C" fn blink_cb(_arg: *mut core::ffi::c_void) {
    // All LEDs toggle together; no finer pattern is required.
    let level = BLINK_LEVEL.fetch_xor(true, Ordering::Relaxed);
    for &pin in &pins::LED_BAR_GPIOS {
        hw_init::gpio_write(pin, level);
    }
}

pub struct LedBar {
    /// Number of LEDs that should be lit; may leave the 0..=4 range.
    lit: i32,
    blinking: bool,
}

impl LedBar {
    pub fn new() -> Self {
        // One LED on at boot.
        Self {
            lit: 1,
            blinking: false,
        }
    }

    /// Create the blink timer and show the initial count.
    /// Call once after `hw_init::init_peripherals()`.
    pub fn init(&mut self) {
        #[cfg(target_os = "espidf")]
        // SAFETY: BLINK_TIMER is written here once at boot from the
        // single main-task context; the callback only writes GPIOs.
        unsafe {
            let args = esp_timer_create_args_t {
                callback: Some(blink_cb),
                arg: core::ptr::null_mut(),
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: b"blink\0".as_ptr() as *const _,
                skip_unhandled_events: false,
            };
            let ret = esp_timer_create(&args, &raw mut BLINK_TIMER);
            if ret != ESP_OK {
                log::error!(
                    "led_bar: blink timer create failed (rc={}) — blink override disabled",
                    ret
                );
            }
        }
        self.apply();
    }

    /// Light one more LED.
    pub fn turn_on_one(&mut self) {
        self.lit += 1;
        self.apply();
    }

    /// Turn one LED off.
    pub fn turn_off_one(&mut self) {
        self.lit -= 1;
        self.apply();
    }

    /// Current lit count (may lie outside the physical 0..=4 range).
    pub fn lit_count(&self) -> i32 {
        self.lit
    }

    /// Whether the blink override is active.
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    /// Start the blink override. `period_ms` is the toggle half-period.
    pub fn start_blink(&mut self, period_ms: u32) {
        self.blinking = true;
        #[cfg(target_os = "espidf")]
        // SAFETY: BLINK_TIMER was created in init(); esp_timer APIs are
        // thread-safe on a valid handle.
        unsafe {
            let t = BLINK_TIMER;
            if !t.is_null() {
                let ret = esp_timer_start_periodic(t, u64::from(period_ms) * 1000);
                if ret != ESP_OK {
                    log::error!("led_bar: blink start failed (rc={})", ret);
                }
            }
        }
        #[cfg(not(target_os = "espidf"))]
        let _ = period_ms;
    }

    /// Stop the blink override and restore the count display.
    pub fn stop_blink(&mut self) {
        self.blinking = false;
        #[cfg(target_os = "espidf")]
        // SAFETY: see start_blink().
        unsafe {
            let t = BLINK_TIMER;
            if !t.is_null() {
                esp_timer_stop(t);
            }
        }
        self.apply();
    }

    // ── Internal ──────────────────────────────────────────────

    /// Rewrite every LED from the lit counter.
    fn apply(&self) {
        for (position, &pin) in pins::LED_BAR_GPIOS.iter().enumerate() {
            hw_init::gpio_write(pin, (position as i32) < self.lit);
        }
    }
}
