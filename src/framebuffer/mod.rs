//! Framebuffer and its persistent copy
//!
//! The framebuffer holds two bit-planes back to back: black/white first
//! (bit set = white), red second (bit set = red). One byte covers 8
//! horizontally adjacent pixels, most significant bit leftmost.
//!
//! [`FrameStore`] owns the buffer together with a [`BlobStore`] and always
//! saves or restores the whole buffer as a single blob.

use std::convert::Infallible;

use embedded_graphics::prelude::*;

use crate::gd7965::flag::Flag;
use crate::gd7965::{FRAMEBUFFER_SIZE, HEIGHT, PLANE_SIZE, WIDTH};

pub mod color;
pub mod hint;

pub use color::TriColor;

/// Namespace of the blob in the key/value store
pub const STORAGE_NAMESPACE: &str = "storage";

/// Key of the framebuffer blob
pub const FRAMEBUFFER_KEY: &str = "framebuffer";

const BYTES_PER_ROW: usize = WIDTH as usize / 8;

/// Upload does not fit the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("image of {len} bytes does not fit the {capacity} byte framebuffer")]
pub struct Oversized {
    pub len: usize,
    pub capacity: usize,
}

/// Saving or restoring the framebuffer failed
#[derive(Debug, thiserror::Error)]
pub enum StoreError<E: core::fmt::Debug> {
    #[error("blob store failure: {0:?}")]
    Backend(E),
    #[error("no framebuffer stored yet")]
    Missing,
    #[error("stored framebuffer is {found} bytes, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Key/value store holding binary blobs
pub trait BlobStore {
    type Error: core::fmt::Debug;

    /// Length of the blob under `key`, `None` if it was never written
    fn blob_len(&mut self, key: &str) -> Result<Option<usize>, Self::Error>;

    /// Read the blob under `key`, `buf` has exactly the blob's length
    fn read_blob(&mut self, key: &str, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Make previous writes durable
    fn commit(&mut self) -> Result<(), Self::Error>;
}

/// Pixel buffer in the panel's native two-plane format
pub struct Framebuffer {
    data: Box<[u8]>,
}

impl Framebuffer {
    /// Blank (white, no red) framebuffer
    pub fn new() -> Self {
        let mut frame = Framebuffer {
            data: vec![0u8; FRAMEBUFFER_SIZE].into_boxed_slice(),
        };
        frame.clear();
        frame
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Fixed length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All white, no red
    pub fn clear(&mut self) {
        let (black_white, red) = self.data.split_at_mut(PLANE_SIZE);
        black_white.fill(Flag::PLANE_ALL_WHITE);
        red.fill(Flag::PLANE_NO_RED);
    }

    /// Copy an upload to the start of the buffer
    ///
    /// A short upload only overwrites its own length, the rest of the buffer
    /// keeps what it held before.
    pub fn load(&mut self, image: &[u8]) -> Result<(), Oversized> {
        if image.len() > self.data.len() {
            return Err(Oversized {
                len: image.len(),
                capacity: self.data.len(),
            });
        }
        self.data[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Set one pixel, coordinates outside the panel are ignored
    pub fn set_pixel(&mut self, x: u16, y: u16, color: TriColor) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }

        let index = y as usize * BYTES_PER_ROW + x as usize / 8;
        let mask = 0x80 >> (x % 8);
        let (white, red) = color.plane_bits();

        set_bit(&mut self.data[index], mask, white);
        set_bit(&mut self.data[PLANE_SIZE + index], mask, red);
    }

    /// Colour of one pixel, `None` outside the panel
    pub fn pixel(&self, x: u16, y: u16) -> Option<TriColor> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }

        let index = y as usize * BYTES_PER_ROW + x as usize / 8;
        let mask = 0x80 >> (x % 8);

        let color = if self.data[PLANE_SIZE + index] & mask != 0 {
            TriColor::Red
        } else if self.data[index] & mask != 0 {
            TriColor::White
        } else {
            TriColor::Black
        };
        Some(color)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn set_bit(byte: &mut u8, mask: u8, on: bool) {
    if on {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH.into(), HEIGHT.into())
    }
}

impl DrawTarget for Framebuffer {
    type Color = TriColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

/// Owner of the framebuffer and its durable copy
pub struct FrameStore<S> {
    frame: Framebuffer,
    store: S,
}

impl<S: BlobStore> FrameStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            frame: Framebuffer::new(),
            store,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.frame.as_bytes_mut()
    }

    pub fn frame_mut(&mut self) -> &mut Framebuffer {
        &mut self.frame
    }

    pub fn size(&self) -> usize {
        self.frame.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clear(&mut self) {
        self.frame.clear();
    }

    pub fn load(&mut self, image: &[u8]) -> Result<(), Oversized> {
        self.frame.load(image)
    }

    /// Save the whole buffer and commit it
    pub fn persist(&mut self) -> Result<(), StoreError<S::Error>> {
        self.store
            .write_blob(FRAMEBUFFER_KEY, self.frame.as_bytes())
            .map_err(StoreError::Backend)?;
        self.store.commit().map_err(StoreError::Backend)?;

        log::debug!("Framebuffer saved, {} bytes", self.frame.len());
        Ok(())
    }

    /// Replace the buffer with the stored copy
    ///
    /// Only a blob of exactly the buffer's length is accepted. A backend
    /// failure during the read itself can leave the buffer partially
    /// overwritten.
    pub fn restore(&mut self) -> Result<(), StoreError<S::Error>> {
        let expected = self.frame.len();

        match self
            .store
            .blob_len(FRAMEBUFFER_KEY)
            .map_err(StoreError::Backend)?
        {
            None => Err(StoreError::Missing),
            Some(found) if found != expected => {
                log::warn!(
                    "Ignoring stored framebuffer of {} bytes, expected {}",
                    found,
                    expected
                );
                Err(StoreError::LengthMismatch { expected, found })
            }
            Some(_) => {
                self.store
                    .read_blob(FRAMEBUFFER_KEY, self.frame.as_bytes_mut())
                    .map_err(StoreError::Backend)?;
                log::debug!("Framebuffer restored, {} bytes", expected);
                Ok(())
            }
        }
    }
}
