//! GD7965 Display Driver Implementation
//!
//! Register-level protocol for the controller: reset and bring-up, frame
//! transfer, refresh and deep sleep.
//!
//! ## Sequence
//!
//! - `init()` - control lines to idle levels
//! - `configure()` - hardware reset, revision check, power and panel registers
//! - `transfer()` - black/white plane then red plane
//! - `refresh()` - full refresh, blocks for the panel's update time
//! - `low_power_mode()` - power off and deep sleep
//!
//! ## Critical Implementation Details
//!
//! ### BUSY Pin Polarity
//!
//! The GD7965 pulls BUSY **low** while it is working. The driver polls until
//! the line reads high again, sleeping `Timing::busy_poll_ms` between reads.
//! There is no timeout unless `Timing::busy_timeout_ms` is set.
//!
//! ### Deep Sleep
//!
//! The deep sleep command is only accepted together with the check byte
//! `0xA5`. The panel does not answer; only a hardware reset wakes it up,
//! which is why `configure()` always starts with one.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::config::Timing;
use crate::gd7965::interface::DisplayInterface;
use crate::gd7965::{
    cmd::Cmd, flag::Flag, DisplayError, Error, FRAMEBUFFER_SIZE, HEIGHT, PLANE_SIZE, WIDTH,
};
use crate::lifecycle::Panel;

/// Where the driver is in the bring-up/render/sleep sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Control lines not yet driven
    Uninitialized,
    /// Lines idle, controller not programmed
    Ready,
    /// Registers programmed, panel powered
    Configured,
    /// Both planes sent
    Loaded,
    /// Refresh finished
    Shown,
    /// Powered off and in deep sleep, needs `configure()` again
    Sleeping,
}

/// GD7965 E-Paper Display Driver
///
/// ## Type Parameters
///
/// - `SPI` - SPI bus, chip select is driven by the driver
/// - `CS` - Chip select output pin
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `BSY` - BUSY input pin (LOW while the display is busy)
/// - `DELAY` - Delay provider for timing
pub struct Gd7965<SPI, CS, DC, RST, BSY, DELAY> {
    interface: DisplayInterface<SPI, CS, DC>,
    rst: RST,
    busy: BSY,
    delay: DELAY,
    timing: Timing,
    state: PanelState,
}

impl<SPI, CS, DC, RST, BSY, DELAY> Gd7965<SPI, CS, DC, RST, BSY, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Create the driver, nothing is sent until [`Self::init`]
    pub fn new(
        spi: SPI,
        cs: CS,
        dc: DC,
        rst: RST,
        busy: BSY,
        delay: DELAY,
        timing: Timing,
    ) -> Self {
        Gd7965 {
            interface: DisplayInterface::new(spi, cs, dc),
            rst,
            busy,
            delay,
            timing,
            state: PanelState::Uninitialized,
        }
    }

    /// Current position in the panel sequence
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Drive CS, RST and D/C to their idle levels
    pub fn init(&mut self) -> Result<(), Error> {
        log::info!("Initializing display control lines");

        self.interface.idle()?;
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;

        self.state = PanelState::Ready;
        Ok(())
    }

    /// Reset the controller and send the full configuration flow
    ///
    /// Fails without sending any register if the controller does not report
    /// the expected revision.
    pub fn configure(&mut self) -> Result<(), Error> {
        log::info!("Configuring display");
        self.ensure_initialized()?;

        self.reset()?;
        self.check_revision()?;

        self.cmd_with_data(Cmd::POWER_SETTING, &Flag::POWER_SETTING)?;

        self.interface.write_command(Cmd::POWER_ON, false)?;
        self.delay.delay_ms(self.timing.power_on_settle_ms);
        self.wait_until_idle()?;

        self.cmd_with_data(Cmd::PANEL_SETTING, &Flag::PANEL_SETTING_KWR)?;
        self.cmd_with_data(Cmd::RESOLUTION, &resolution())?;
        self.cmd_with_data(Cmd::VCOM_DATA_INTERVAL, &Flag::VCOM_DATA_INTERVAL)?;
        self.cmd_with_data(Cmd::TCON, &Flag::TCON_NON_OVERLAP)?;
        self.cmd_with_data(Cmd::GATE_SOURCE_START, &Flag::GATE_SOURCE_ORIGIN)?;

        // Partial mode disabled, every refresh repaints the whole panel
        self.interface.write_command(Cmd::PARTIAL_OUT, false)?;

        self.state = PanelState::Configured;
        Ok(())
    }

    /// Send the black/white plane then the red plane
    ///
    /// A failure after the first plane leaves the controller RAM half
    /// written; run the whole configure/transfer/refresh sequence again.
    pub fn transfer(&mut self, frame: &[u8]) -> Result<(), Error> {
        log::info!("Transferring framebuffer");
        self.ensure_initialized()?;

        if frame.len() != FRAMEBUFFER_SIZE {
            return Err(Error::FrameLength {
                expected: FRAMEBUFFER_SIZE,
                found: frame.len(),
            });
        }

        let (black_white, red) = frame.split_at(PLANE_SIZE);
        self.cmd_with_data(Cmd::START_TRANSMISSION_1, black_white)?;
        self.cmd_with_data(Cmd::START_TRANSMISSION_2, red)?;

        self.state = PanelState::Loaded;
        Ok(())
    }

    /// Show the transferred frame, blocks until the panel is done
    pub fn refresh(&mut self) -> Result<(), Error> {
        log::info!("Refreshing display");
        self.ensure_initialized()?;

        self.interface.write_command(Cmd::DISPLAY_REFRESH, false)?;
        self.delay.delay_ms(self.timing.refresh_settle_ms);
        self.wait_until_idle()?;

        self.state = PanelState::Shown;
        Ok(())
    }

    /// Power off and put the controller into deep sleep
    ///
    /// The panel does not acknowledge deep sleep, success only means that
    /// every transfer went out.
    pub fn low_power_mode(&mut self) -> Result<(), Error> {
        log::info!("Putting display into deep sleep mode");
        self.ensure_initialized()?;

        self.interface.write_command(Cmd::POWER_OFF, false)?;
        self.wait_until_idle()?;

        self.cmd_with_data(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_CHECK])?;

        self.state = PanelState::Sleeping;
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), Error> {
        match self.state {
            PanelState::Uninitialized => Err(Error::NotInitialized),
            _ => Ok(()),
        }
    }

    fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.interface.write_command(command, true)?;
        self.interface.write_data(data)
    }

    /// Hardware reset, both windows have to be honoured
    fn reset(&mut self) -> Result<(), Error> {
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(self.timing.reset_pulse_ms);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(self.timing.reset_settle_ms);
        Ok(())
    }

    fn check_revision(&mut self) -> Result<(), Error> {
        let mut revision = [0u8; Flag::REVISION_LEN];
        self.interface.write_command(Cmd::REVISION, true)?;
        self.interface.read_data(&mut revision)?;

        let found = revision[Flag::REVISION_LEN - 1];
        if found != Flag::REVISION_CODE {
            log::error!(
                "Display controller revision 0x{:02X}, expected 0x{:02X}",
                found,
                Flag::REVISION_CODE
            );
            return Err(Error::RevisionMismatch {
                expected: Flag::REVISION_CODE,
                found,
            });
        }

        log::debug!("Display controller revision 0x{:02X}", found);
        Ok(())
    }

    /// Wait for the BUSY line to go back high
    fn wait_until_idle(&mut self) -> Result<(), Error> {
        log::info!("Waiting for display to be ready");

        let poll_ms = self.timing.busy_poll_ms.max(1);
        let mut waited_ms: u32 = 0;

        loop {
            self.delay.delay_ms(poll_ms);
            waited_ms = waited_ms.saturating_add(poll_ms);

            if self.busy.is_high().map_err(|_| Error::BusyLine)? {
                break;
            }

            if let Some(limit) = self.timing.busy_timeout_ms {
                if waited_ms >= limit {
                    log::error!("Display still busy after {} ms", waited_ms);
                    return Err(Error::BusyTimeout(waited_ms));
                }
            }
        }

        log::debug!("Display ready after {} ms", waited_ms);
        Ok(())
    }
}

/// Resolution register payload, width then height, MSB first
fn resolution() -> [u8; 4] {
    [
        (WIDTH >> 8) as u8,
        (WIDTH & 0xFF) as u8,
        (HEIGHT >> 8) as u8,
        (HEIGHT & 0xFF) as u8,
    ]
}

impl<SPI, CS, DC, RST, BSY, DELAY> Panel for Gd7965<SPI, CS, DC, RST, BSY, DELAY>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    type Error = Error;

    fn init(&mut self) -> Result<(), Error> {
        Gd7965::init(self)
    }

    fn configure(&mut self) -> Result<(), Error> {
        Gd7965::configure(self)
    }

    fn transfer(&mut self, frame: &[u8]) -> Result<(), Error> {
        Gd7965::transfer(self, frame)
    }

    fn refresh(&mut self) -> Result<(), Error> {
        Gd7965::refresh(self)
    }

    fn low_power_mode(&mut self) -> Result<(), Error> {
        Gd7965::low_power_mode(self)
    }
}
