//! Runtime configuration of the frame
//!
//! Panel geometry and wiring are compile-time constants in [`crate::gd7965`];
//! everything here can be tuned per build or per test.

use std::time::Duration;

/// Access point name, override with `PAPERFRAME_SSID` at build time
pub const DEFAULT_SSID: &str = match option_env!("PAPERFRAME_SSID") {
    Some(ssid) => ssid,
    None => "PaperFrame",
};

/// Lifecycle controller settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the open soft-AP the upload page is served on
    pub ssid: &'static str,
    /// Power down after this long without activity
    pub idle_timeout: Duration,
    /// Sleep between two iterations of the control loop
    pub poll_interval: Duration,
    /// Power down right after an image was shown instead of waiting for more uploads
    pub sleep_after_render: bool,
    /// Draw and show connection instructions when no stored image exists
    pub hint_on_blank: bool,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            ssid: DEFAULT_SSID,
            idle_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(10),
            sleep_after_render: false,
            hint_on_blank: false,
        }
    }

    pub const fn with_ssid(mut self, ssid: &'static str) -> Self {
        self.ssid = ssid;
        self
    }

    pub const fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub const fn with_sleep_after_render(mut self, sleep_after_render: bool) -> Self {
        self.sleep_after_render = sleep_after_render;
        self
    }

    pub const fn with_hint_on_blank(mut self, hint_on_blank: bool) -> Self {
        self.hint_on_blank = hint_on_blank;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Panel timing windows, all in milliseconds
///
/// The reset and settle windows come from the controller datasheet; shorter
/// values leave the panel unresponsive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Reset line held low
    pub reset_pulse_ms: u32,
    /// Wait after releasing reset
    pub reset_settle_ms: u32,
    /// Wait after power-on before polling busy
    pub power_on_settle_ms: u32,
    /// Wait after the refresh command before polling busy
    pub refresh_settle_ms: u32,
    /// Interval between two busy line checks
    pub busy_poll_ms: u32,
    /// Give up waiting for the busy line after this long, `None` waits forever
    pub busy_timeout_ms: Option<u32>,
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            reset_pulse_ms: 200,
            reset_settle_ms: 200,
            power_on_settle_ms: 100,
            refresh_settle_ms: 100,
            // one FreeRTOS tick at the default 100 Hz
            busy_poll_ms: 10,
            busy_timeout_ms: None,
        }
    }

    pub const fn with_busy_poll_ms(mut self, busy_poll_ms: u32) -> Self {
        self.busy_poll_ms = busy_poll_ms;
        self
    }

    pub const fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = Some(busy_timeout_ms);
        self
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}
