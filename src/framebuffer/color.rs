//! Pixel colours of the black/white/red panel

use embedded_graphics::pixelcolor::PixelColor;

/// One pixel of the tri-colour panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriColor {
    /// Black ink
    Black,
    /// No ink, the blank state
    #[default]
    White,
    /// Red ink, wins over black/white
    Red,
}

impl PixelColor for TriColor {
    type Raw = ();
}

impl TriColor {
    /// Bit in the black/white plane and bit in the red plane
    pub(crate) fn plane_bits(self) -> (bool, bool) {
        match self {
            TriColor::Black => (false, false),
            TriColor::White => (true, false),
            TriColor::Red => (true, true),
        }
    }
}
