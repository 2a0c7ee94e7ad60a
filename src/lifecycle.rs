//! Control loop of the frame
//!
//! Reacts to uploaded images and to inactivity. An image is copied into the
//! framebuffer, saved, and rendered; after `Config::idle_timeout` without
//! activity the panel goes to deep sleep and the device is suspended.
//!
//! ```text
//! Idle --image--> ImagePending --> Rendering --> Idle
//!   |                                   |
//!   +--timeout / station left-----------+--(sleep_after_render)--> PowerSaving
//! ```

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::config::Config;
use crate::framebuffer::hint::draw_upload_hint;
use crate::framebuffer::{BlobStore, FrameStore, StoreError};
use crate::inbox::{Inbox, Signal};

/// Display operations the controller sequences
pub trait Panel {
    type Error: core::fmt::Display;

    fn init(&mut self) -> Result<(), Self::Error>;
    fn configure(&mut self) -> Result<(), Self::Error>;
    fn transfer(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
    fn refresh(&mut self) -> Result<(), Self::Error>;
    fn low_power_mode(&mut self) -> Result<(), Self::Error>;
}

/// Radio and CPU power collaborator
pub trait PowerControl {
    type Error: core::fmt::Debug;

    /// Stop the radio and suspend, on the device this does not return
    fn suspend(&mut self) -> Result<(), Self::Error>;
}

/// Time source of the control loop
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::time::Instant`
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Controller state, `PowerSaving` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    ImagePending,
    Rendering,
    PowerSaving,
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Suspended,
}

pub struct Controller<P, S, W, C> {
    panel: P,
    frames: FrameStore<S>,
    power: W,
    clock: C,
    inbox: Inbox,
    config: Config,
    state: State,
    last_activity: Duration,
}

impl<P, S, W, C> Controller<P, S, W, C>
where
    P: Panel,
    S: BlobStore,
    W: PowerControl,
    C: Clock,
{
    pub fn new(
        panel: P,
        frames: FrameStore<S>,
        power: W,
        clock: C,
        inbox: Inbox,
        config: Config,
    ) -> Self {
        let last_activity = clock.now();
        Self {
            panel,
            frames,
            power,
            clock,
            inbox,
            config,
            state: State::Idle,
            last_activity,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn frames(&self) -> &FrameStore<S> {
        &self.frames
    }

    /// Bring the panel lines up and reload the last image
    ///
    /// Nothing is rendered for a restored image, the panel still shows it.
    pub fn start(&mut self) {
        info!("Starting display controller");

        if let Err(e) = self.panel.init() {
            error!("Failed to initialize display: {}", e);
        }

        match self.frames.restore() {
            Ok(()) => info!("Restored framebuffer from storage"),
            Err(StoreError::Missing) => {
                info!("No stored image");
                self.blank();
            }
            Err(e) => {
                warn!("Failed to restore framebuffer: {}", e);
                self.blank();
            }
        }

        self.last_activity = self.clock.now();
    }

    fn blank(&mut self) {
        self.frames.clear();

        if self.config.hint_on_blank {
            if let Err(e) = draw_upload_hint(self.frames.frame_mut(), self.config.ssid) {
                warn!("Failed to draw upload hint: {}", e);
            }
            self.render();
            self.state = State::Idle;
        }
    }

    /// Handle everything queued since the last call, then check the idle timer
    pub fn step(&mut self) -> Flow {
        if self.state == State::PowerSaving {
            return Flow::Suspended;
        }

        while let Some(signal) = self.inbox.poll() {
            debug!("Signal: {}", signal);

            match signal {
                Signal::ImageReceived(image) => self.on_image(image),
                Signal::StationJoined => {
                    info!("Station joined, restarting idle timer");
                    self.last_activity = self.clock.now();
                }
                Signal::StationLeft => {
                    info!("Station left");
                    self.power_saving();
                }
            }

            if self.state == State::PowerSaving {
                return Flow::Suspended;
            }
        }

        let idle = self.clock.now().saturating_sub(self.last_activity);
        if idle >= self.config.idle_timeout {
            info!("No activity for {} s", idle.as_secs());
            self.power_saving();
            return Flow::Suspended;
        }

        Flow::Continue
    }

    /// Step until the controller powers down
    pub fn run(&mut self) {
        info!("Starting main loop");

        while self.step() == Flow::Continue {
            self.clock.sleep(self.config.poll_interval);
        }
    }

    fn on_image(&mut self, image: Vec<u8>) {
        self.state = State::ImagePending;
        self.last_activity = self.clock.now();

        let loaded = self.frames.load(&image);
        self.inbox.consumed(image);
        if let Err(e) = loaded {
            warn!("Dropping image: {}", e);
            self.state = State::Idle;
            return;
        }

        match self.frames.persist() {
            Ok(()) => info!("Framebuffer saved"),
            Err(e) => warn!("Failed to store framebuffer: {}", e),
        }

        if !self.render() {
            error!("Failed to set display");
        }

        if self.config.sleep_after_render {
            self.power_saving();
        } else {
            self.state = State::Idle;
        }
    }

    /// Configure, transfer and refresh, stopping at the first failure
    fn render(&mut self) -> bool {
        self.state = State::Rendering;

        if let Err(e) = self.panel.configure() {
            error!("Display configure failed: {}", e);
            return false;
        }
        if let Err(e) = self.panel.transfer(self.frames.buffer()) {
            error!("Display transfer failed: {}", e);
            return false;
        }
        if let Err(e) = self.panel.refresh() {
            error!("Display refresh failed: {}", e);
            return false;
        }

        true
    }

    fn power_saving(&mut self) {
        if self.state == State::PowerSaving {
            return;
        }

        if let Err(e) = self.panel.low_power_mode() {
            error!("Failed to put display to sleep: {}", e);
        }
        self.state = State::PowerSaving;

        info!("Going to deep sleep");
        if let Err(e) = self.power.suspend() {
            error!("Failed to suspend: {:?}", e);
        }
    }
}
