//! Slice frame buffers
//!
//! A frame buffer holds one horizontal slice of the screen (`width` pixels by
//! `lines` rows), stored directly in wire byte order so it can be handed to
//! the bus without conversion.

use alloc::vec::Vec;

use crate::color::PixelColor;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Memory for a buffer could not be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocError;

/// RGB565 slice buffer in little-endian wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
    width: u16,
    lines: u16,
}

impl FrameBuffer {
    /// Allocate a zeroed (black) buffer
    ///
    /// Fails instead of aborting when the heap cannot hold the buffer.
    pub fn try_new(width: u16, lines: u16) -> Result<Self, AllocError> {
        let len = width as usize * lines as usize * BYTES_PER_PIXEL;
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|_| AllocError)?;
        bytes.resize(len, 0);
        Ok(Self {
            bytes,
            width,
            lines,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn lines(&self) -> u16 {
        self.lines
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.bytes.len() / BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel at a linear index
    #[inline]
    pub fn pixel(&self, index: usize) -> PixelColor {
        let i = index * BYTES_PER_PIXEL;
        PixelColor::from_le_bytes([self.bytes[i], self.bytes[i + 1]])
    }

    /// Overwrite the pixel at a linear index
    #[inline]
    pub fn set_pixel(&mut self, index: usize, color: PixelColor) {
        let i = index * BYTES_PER_PIXEL;
        self.bytes[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_le_bytes());
    }

    /// Pixel at a column and row within the slice
    pub fn pixel_at(&self, x: u16, y: u16) -> PixelColor {
        self.pixel(y as usize * self.width as usize + x as usize)
    }

    pub fn set_pixel_at(&mut self, x: u16, y: u16, color: PixelColor) {
        self.set_pixel(y as usize * self.width as usize + x as usize, color);
    }

    /// Replicate one color over the whole buffer
    pub fn fill(&mut self, color: PixelColor) {
        let bytes = color.to_le_bytes();
        for px in self.bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Raw wire bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
