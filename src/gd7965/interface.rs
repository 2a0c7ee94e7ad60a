//! Display interface using a 3-wire half-duplex SPI bus
//!
//! The GD7965 expects chip-select to stay asserted between a command byte and
//! the data bytes belonging to it, with the data/command line switched in
//! between. `SpiDevice` cannot express that, so the interface drives a raw
//! [`SpiBus`] and owns the chip-select line itself.
use crate::gd7965::{DisplayError, Error};
use embedded_hal::{digital::OutputPin, spi::SpiBus};

/// Largest single SPI write, matches the DMA transfer size configured on the device
const CHUNK_SIZE: usize = 4096;

/// Level of the data/command line for one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// D/C low
    Command,
    /// D/C high
    Data,
}

/// Command/data framing on top of the SPI bus
///
/// A session is opened by [`DisplayInterface::write_command`] with
/// `keep_session_open` set and closed by the next data phase. Data phases
/// outside a session are refused without touching the bus.
pub struct DisplayInterface<SPI, CS, DC> {
    /// SPI bus, exclusively owned
    spi: SPI,
    /// Chip select, low while a session is active
    cs: CS,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// A command left the bus acquired for a following data phase
    session_open: bool,
}

impl<SPI, CS, DC> DisplayInterface<SPI, CS, DC> {
    /// Create the interface, lines are not touched until [`Self::idle`]
    pub fn new(spi: SPI, cs: CS, dc: DC) -> Self {
        DisplayInterface {
            spi,
            cs,
            dc,
            session_open: false,
        }
    }

    /// Whether a command is waiting for its data phase
    pub fn is_session_open(&self) -> bool {
        self.session_open
    }
}

impl<SPI, CS, DC> DisplayInterface<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Drive chip-select and data/command to their idle levels
    pub fn idle(&mut self) -> Result<(), Error> {
        self.session_open = false;
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        Ok(())
    }

    /// Send one command byte
    ///
    /// With `keep_session_open` the bus stays acquired for a following
    /// [`Self::write_data`] or [`Self::read_data`]. A failed transfer always
    /// releases the bus.
    pub fn write_command(&mut self, command: u8, keep_session_open: bool) -> Result<(), Error> {
        self.acquire()?;

        match self.write(Phase::Command, &[command]) {
            Ok(()) if keep_session_open => {
                self.session_open = true;
                Ok(())
            }
            Ok(()) => self.release(),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {}", command, e);
                self.release().ok();
                Err(e)
            }
        }
    }

    /// Send the data belonging to the open command, then release the bus
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), Error> {
        if !self.session_open {
            return Err(Error::SessionClosed);
        }

        let sent = self.write(Phase::Data, data);
        let released = self.release();
        sent.and(released)
    }

    /// Clock in `buffer.len()` bytes answering the open command, then release the bus
    pub fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        if !self.session_open {
            return Err(Error::SessionClosed);
        }

        let received = self.read(Phase::Data, buffer);
        let released = self.release();
        received.and(released)
    }

    /// Release chip-select and drop any open session
    pub fn release(&mut self) -> Result<(), Error> {
        self.session_open = false;
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        Ok(())
    }

    fn acquire(&mut self) -> Result<(), Error> {
        if self.session_open {
            log::warn!("Previous command session was never completed, releasing it");
            self.release()?;
        }
        self.cs.set_low().map_err(|_| DisplayError::CSError)?;
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase) -> Result<(), Error> {
        match phase {
            Phase::Command => self.dc.set_low(),
            Phase::Data => self.dc.set_high(),
        }
        .map_err(|_| Error::from(DisplayError::DCError))
    }

    fn write(&mut self, phase: Phase, bytes: &[u8]) -> Result<(), Error> {
        self.set_phase(phase)?;

        let total_chunks = bytes.len().div_ceil(CHUNK_SIZE);
        for (chunk_idx, chunk) in bytes.chunks(CHUNK_SIZE).enumerate() {
            if total_chunks > 1 {
                log::debug!("Writing chunk {}/{}", chunk_idx + 1, total_chunks);
            }
            self.spi.write(chunk).map_err(|e| {
                log::error!("SPI write error ({:?} phase): {:?}", phase, e);
                DisplayError::BusWriteError
            })?;
        }

        self.spi
            .flush()
            .map_err(|_| Error::from(DisplayError::BusWriteError))
    }

    fn read(&mut self, phase: Phase, buffer: &mut [u8]) -> Result<(), Error> {
        self.set_phase(phase)?;

        self.spi.read(buffer).map_err(|e| {
            log::error!("SPI read error: {:?}", e);
            DisplayError::BusWriteError
        })?;

        self.spi
            .flush()
            .map_err(|_| Error::from(DisplayError::BusWriteError))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FakeBus, FakePin, Hardware};

    fn interface(hw: &Hardware) -> DisplayInterface<FakeBus, FakePin, FakePin> {
        let mut interface = DisplayInterface::new(hw.bus(), hw.cs(), hw.dc());
        interface.idle().unwrap();
        hw.clear();
        interface
    }

    #[test]
    fn data_without_session_is_refused_before_touching_the_bus() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);

        assert!(matches!(interface.write_data(&[1, 2]), Err(Error::SessionClosed)));
        let mut buf = [0u8; 2];
        assert!(matches!(interface.read_data(&mut buf), Err(Error::SessionClosed)));
        assert!(hw.events().is_empty());
    }

    #[test]
    fn command_without_session_releases_chip_select() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);

        interface.write_command(0x12, false).unwrap();

        assert_eq!(
            hw.events(),
            vec![
                Event::Cs(false),
                Event::Dc(false),
                Event::Write(vec![0x12]),
                Event::Cs(true),
            ]
        );
        assert!(!interface.is_session_open());
    }

    #[test]
    fn session_keeps_chip_select_until_data_phase() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);

        interface.write_command(0x50, true).unwrap();
        assert!(interface.is_session_open());
        interface.write_data(&[0x11, 0x07]).unwrap();

        assert_eq!(
            hw.events(),
            vec![
                Event::Cs(false),
                Event::Dc(false),
                Event::Write(vec![0x50]),
                Event::Dc(true),
                Event::Write(vec![0x11, 0x07]),
                Event::Cs(true),
            ]
        );
        assert!(!interface.is_session_open());
    }

    #[test]
    fn second_data_phase_fails() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);

        interface.write_command(0x07, true).unwrap();
        interface.write_data(&[0xA5]).unwrap();
        hw.clear();

        assert!(matches!(interface.write_data(&[0xA5]), Err(Error::SessionClosed)));
        assert!(hw.events().is_empty());
    }

    #[test]
    fn read_clocks_in_requested_length() {
        let hw = Hardware::new();
        hw.queue_read(&[0xAA, 0xBB, 0xCC]);
        let mut interface = interface(&hw);

        interface.write_command(0x70, true).unwrap();
        let mut buf = [0u8; 3];
        interface.read_data(&mut buf).unwrap();

        assert_eq!(buf, [0xAA, 0xBB, 0xCC]);
        assert!(hw.events().contains(&Event::Read(3)));
        assert_eq!(hw.events().last(), Some(&Event::Cs(true)));
    }

    #[test]
    fn second_read_phase_fails() {
        let hw = Hardware::new();
        hw.queue_read(&[0x01, 0x02]);
        let mut interface = interface(&hw);

        interface.write_command(0x70, true).unwrap();
        let mut buf = [0u8; 1];
        interface.read_data(&mut buf).unwrap();
        hw.clear();

        assert!(matches!(interface.read_data(&mut buf), Err(Error::SessionClosed)));
        assert_eq!(buf, [0x01]);
        assert!(hw.events().is_empty());
    }

    #[test]
    fn read_after_a_command_without_session_is_refused() {
        let hw = Hardware::new();
        hw.queue_read(&[0xAA]);
        let mut interface = interface(&hw);

        interface.write_command(0x70, false).unwrap();
        hw.clear();

        let mut buf = [0u8; 1];
        assert!(matches!(interface.read_data(&mut buf), Err(Error::SessionClosed)));
        assert_eq!(buf, [0x00]);
        assert!(hw.events().is_empty());
    }

    #[test]
    fn failed_command_closes_the_session() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);
        hw.fail_writes(true);

        assert!(matches!(
            interface.write_command(0x10, true),
            Err(Error::Interface(DisplayError::BusWriteError))
        ));
        assert!(!interface.is_session_open());
        assert_eq!(hw.events().last(), Some(&Event::Cs(true)));

        hw.fail_writes(false);
        assert!(matches!(interface.write_data(&[0xFF]), Err(Error::SessionClosed)));
    }

    #[test]
    fn large_payloads_are_chunked_inside_one_session() {
        let hw = Hardware::new();
        let mut interface = interface(&hw);
        let payload = vec![0x5A; CHUNK_SIZE * 2 + 10];

        interface.write_command(0x10, true).unwrap();
        interface.write_data(&payload).unwrap();

        let writes: Vec<usize> = hw
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.len()),
                _ => None,
            })
            .collect();
        assert_eq!(writes, vec![1, CHUNK_SIZE, CHUNK_SIZE, 10]);
        assert_eq!(hw.commands(), vec![(0x10, payload)]);
    }
}
