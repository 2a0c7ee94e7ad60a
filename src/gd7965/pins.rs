//! Pin definitions for the GD7965 e-paper display
//!
//! GPIO assignments of the ESP32 board the frame is built on.

/// Pin configuration constants for the GD7965 display
pub struct Pins;

impl Pins {
    /// SPI data, MOSI and MISO share this line (3-wire half-duplex)
    pub const SDA: u8 = 14;
    /// SPI Clock pin
    pub const SCK: u8 = 13;
    /// Chip Select pin, idle high
    pub const CS: u8 = 15;
    /// Data/Command control pin (High for data, Low for command), idle low
    pub const DC: u8 = 27;
    /// Reset pin for display, idle high
    pub const RST: u8 = 26;
    /// Busy status pin (Low while the controller is busy)
    pub const BSY: u8 = 25;

    /// Bus clock in Hz
    pub const SPI_CLOCK_HZ: u32 = 1_000_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_display_line_has_its_own_gpio() {
        let mut pins = [Pins::SDA, Pins::SCK, Pins::CS, Pins::DC, Pins::RST, Pins::BSY];
        pins.sort_unstable();
        assert!(pins.windows(2).all(|w| w[0] != w[1]));
    }
}
