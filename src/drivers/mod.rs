//! Peripheral initialisation, tick timer, and the LED bar driver.

pub mod hw_init;
pub mod hw_timer;
pub mod led_bar;
