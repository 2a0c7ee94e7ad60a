//! GD7965 ePaper Display Driver
//!
//! Used in the 7.5" 800x480 black/white/red panels (Waveshare 7.5" B and clones).
//!
//! This driver is losely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers but only
//! implements the single full-refresh flow this frame needs.
//!
//! ### Usage
//! The driver does not own the framebuffer. To display something you:
//!
//! 1. bring the control lines to their idle levels with [`driver::Gd7965::init`]
//! 1. reset and program the controller with [`driver::Gd7965::configure`]
//! 1. send both planes with [`driver::Gd7965::transfer`]
//! 1. kick off the refresh with [`driver::Gd7965::refresh`]
//! 1. park the panel with [`driver::Gd7965::low_power_mode`]
#![deny(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

pub mod driver;
pub mod interface;
pub mod pins;

mod cmd;
pub(crate) mod flag;

pub use display_interface::DisplayError;

/// Display height, pixels vertically
pub const HEIGHT: u16 = 480;

/// Display width, pixels horizontally
pub const WIDTH: u16 = 800;

/// Bytes in one bit-plane (8 pixels per byte)
pub const PLANE_SIZE: usize = WIDTH as usize * HEIGHT as usize / 8;

/// Bytes in the full framebuffer: black/white plane followed by the red plane
pub const FRAMEBUFFER_SIZE: usize = 2 * PLANE_SIZE;

/// Everything that can go wrong while talking to the panel
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// SPI transfer or control line failure
    #[error("panel interface error: {0:?}")]
    Interface(DisplayError),
    /// Data phase attempted with no command session open
    #[error("data phase without an open command session")]
    SessionClosed,
    /// The controller did not report the expected revision code
    #[error("unexpected controller revision {found:#04x}, expected {expected:#04x}")]
    RevisionMismatch {
        /// Revision the driver was written for
        expected: u8,
        /// Revision read back from the panel
        found: u8,
    },
    /// Busy line could not be read
    #[error("busy line read failed")]
    BusyLine,
    /// Busy line stayed asserted past the configured timeout
    #[error("panel still busy after {0} ms")]
    BusyTimeout(u32),
    /// Framebuffer handed to the driver has the wrong length
    #[error("framebuffer is {found} bytes, panel expects {expected}")]
    FrameLength {
        /// Required length
        expected: usize,
        /// Supplied length
        found: usize,
    },
    /// Driver used before `init`
    #[error("panel driver used before init")]
    NotInitialized,
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Interface(e)
    }
}
