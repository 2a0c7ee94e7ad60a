//! PaperFrame display core
//!
//! Drives a 7.5" black/white/red GD7965 e-paper panel, keeps the last image in
//! flash, and powers the device down when nobody is around.
//!
//! The core only depends on `embedded-hal` traits and runs its tests on the
//! host. Everything ESP-IDF specific lives in [`platform`], which is only
//! compiled for the `espidf` target.

pub mod config;
pub mod framebuffer;
pub mod gd7965;
pub mod inbox;
pub mod lifecycle;

#[cfg(target_os = "espidf")]
pub mod platform;

#[cfg(test)]
mod testing;

pub use crate::config::{Config, Timing};
pub use crate::framebuffer::{BlobStore, FrameStore, Framebuffer, TriColor};
pub use crate::gd7965::driver::Gd7965;
pub use crate::gd7965::pins::Pins;
pub use crate::inbox::{Inbox, Signal, Uploader};
pub use crate::lifecycle::{Clock, Controller, MonotonicClock, Panel, PowerControl, State};
