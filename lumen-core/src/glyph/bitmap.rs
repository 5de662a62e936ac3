//! 2-bit coverage bitmaps
//!
//! Pixels are packed four to a byte, least significant pair first, with no
//! row padding: pixel `i` lives in byte `i >> 2` at bit `(i & 3) * 2`.

use super::rasterizer::CoverageRaster;

/// Number of coverage levels (0 = empty .. 3 = solid)
pub const LEVELS: u8 = 4;

/// Bytes needed for a packed `width` x `height` bitmap
pub const fn packed_len(width: u16, height: u16) -> usize {
    (width as usize * height as usize * 2).div_ceil(8)
}

/// Reduce 8-bit coverage to a 2-bit level
#[inline]
pub const fn quantize(coverage: u8) -> u8 {
    if coverage >= 160 {
        3
    } else if coverage >= 96 {
        2
    } else if coverage >= 32 {
        1
    } else {
        0
    }
}

/// Pack an 8-bit raster into `out`
///
/// `out` must hold at least [`packed_len`] bytes; bytes past the bitmap are
/// cleared so a reused slot carries no stale pixels.
pub(crate) fn compress(raster: &CoverageRaster<'_>, out: &mut [u8]) {
    out.fill(0);
    let mut pos = 0usize;
    for y in 0..raster.height as usize {
        for x in 0..raster.width as usize {
            out[pos >> 2] |= quantize(raster.coverage(x, y)) << ((pos & 0x03) << 1);
            pos += 1;
        }
    }
}

/// Borrowed 2-bit glyph bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageBitmap<'a> {
    width: u16,
    height: u16,
    data: &'a [u8],
}

impl<'a> CoverageBitmap<'a> {
    /// Wrap packed bitmap bytes
    ///
    /// Returns `None` if `data` is shorter than the bitmap.
    pub fn new(width: u16, height: u16, data: &'a [u8]) -> Option<Self> {
        if data.len() < packed_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Packed bytes covering exactly this bitmap
    pub fn data(&self) -> &'a [u8] {
        &self.data[..packed_len(self.width, self.height)]
    }

    /// Coverage level of the pixel at a linear index
    #[inline]
    pub fn level(&self, index: usize) -> u8 {
        (self.data[index >> 2] >> ((index & 0x03) << 1)) & 0x03
    }

    /// Coverage level at column `x`, row `y`
    pub fn level_at(&self, x: u16, y: u16) -> u8 {
        self.level(y as usize * self.width as usize + x as usize)
    }
}
