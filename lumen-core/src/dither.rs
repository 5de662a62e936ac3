//! Ordered dither noise
//!
//! One table of 256 random threshold bytes covers a 16x16 tile of the screen.
//! The table is regenerated once per frame, not per pixel: the noise is
//! coherent within a frame and changes between frames, so banding averages
//! out over time.
//!
//! Each threshold byte feeds all three channels from disjoint bits:
//!
//! ```text
//!  bit:   7 6 5 | 4 3 | 2 1 0
//!         blue  | grn | red
//! ```
//!
//! The table is an explicit context object rather than a global; it must be
//! refreshed between frames, never while a frame is being composited.
//!
//! The noise source is PCG32, which produces the same stream on every target,
//! so a seed reproduces the same frames on the host and on the device.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::color::{PixelColor, Rgb};

/// Seed used by [`Dither::new`]
///
/// A fixed seed makes every run produce bit-identical frames.
pub const DEFAULT_SEED: u64 = 0x5eed_1c0d_e565_0001;

/// Number of threshold entries (16x16 tile)
pub const TABLE_SIZE: usize = 256;

/// Per-frame dither threshold table and its noise source
#[derive(Debug, Clone)]
pub struct Dither {
    table: [u8; TABLE_SIZE],
    rng: Pcg32,
}

impl Default for Dither {
    fn default() -> Self {
        Self::new()
    }
}

impl Dither {
    /// Create a table seeded with [`DEFAULT_SEED`]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a table from an explicit seed and fill it once
    pub fn with_seed(seed: u64) -> Self {
        let mut dither = Self {
            table: [0; TABLE_SIZE],
            rng: Pcg32::seed_from_u64(seed),
        };
        dither.refresh();
        dither
    }

    /// Regenerate every threshold; call once per rendered frame
    pub fn refresh(&mut self) {
        self.rng.fill_bytes(&mut self.table);
    }

    /// Threshold byte for a pixel position
    #[inline]
    pub fn threshold(&self, x: usize, y: usize) -> u8 {
        self.table[((y & 0x0f) << 4) | (x & 0x0f)]
    }

    /// Pack a color with threshold noise added before truncation
    ///
    /// The replication bias of [`PixelColor::unpack`] is subtracted first, so
    /// the mean of the unpacked results over the table equals the input.
    #[inline]
    pub fn pack(&self, color: Rgb, x: usize, y: usize) -> PixelColor {
        let t = self.threshold(x, y);
        PixelColor::pack(
            add_noise(color.r, 5, t & 0x07),
            add_noise(color.g, 6, (t >> 3) & 0x03),
            add_noise(color.b, 5, t >> 5),
        )
    }
}

/// Add noise to one channel that will be truncated to `bits` bits
#[inline]
fn add_noise(value: u8, bits: u8, noise: u8) -> u8 {
    let debiased = value - (value >> bits);
    debiased.saturating_add(noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Mean unpacked color over `frames` full tables
    fn mean_dithered(dither: &mut Dither, color: Rgb, frames: usize) -> (f32, f32, f32) {
        let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
        let mut n = 0u32;
        for _ in 0..frames {
            dither.refresh();
            for y in 0..16 {
                for x in 0..16 {
                    let out = dither.pack(color, x, y).unpack();
                    r += out.r as u32;
                    g += out.g as u32;
                    b += out.b as u32;
                    n += 1;
                }
            }
        }
        let n = n as f32;
        (r as f32 / n, g as f32 / n, b as f32 / n)
    }

    #[test]
    fn test_dithering_beats_plain_truncation() {
        let mut dither = Dither::new();
        let color = Rgb::new(103, 103, 103);
        let (r, g, b) = mean_dithered(&mut dither, color, 16);

        assert!((r - 103.0).abs() < 1.0, "red mean {}", r);
        assert!((g - 103.0).abs() < 1.0, "green mean {}", g);
        assert!((b - 103.0).abs() < 1.0, "blue mean {}", b);

        // Plain truncation is stuck 4 below for the same input
        let plain = color.pack().unpack();
        assert_eq!(plain.r, 99);
        assert!((r - 103.0).abs() < (plain.r as f32 - 103.0).abs());
    }

    #[test]
    fn test_noise_stream_is_pcg32() {
        let dither = Dither::with_seed(7);
        let mut expected = [0u8; TABLE_SIZE];
        Pcg32::seed_from_u64(7).fill_bytes(&mut expected);
        assert_eq!(dither.table, expected);
    }

    proptest! {
        #[test]
        fn prop_dithering_converges_to_input(v in any::<u8>()) {
            let mut dither = Dither::with_seed(u64::from(v));
            let (r, g, b) = mean_dithered(&mut dither, Rgb::new(v, v, v), 64);
            let v = f32::from(v);

            prop_assert!((r - v).abs() < 1.0, "red mean {} for {}", r, v);
            prop_assert!((g - v).abs() < 1.0, "green mean {} for {}", g, v);
            prop_assert!((b - v).abs() < 1.0, "blue mean {} for {}", b, v);
        }
    }

    #[test]
    fn test_extremes_are_exact() {
        let dither = Dither::new();
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(dither.pack(Rgb::WHITE, x, y), PixelColor::WHITE);
                assert_eq!(dither.pack(Rgb::BLACK, x, y).unpack().g, 0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_noise() {
        let mut a = Dither::with_seed(42);
        let mut b = Dither::with_seed(42);
        for _ in 0..4 {
            a.refresh();
            b.refresh();
            assert_eq!(a.table, b.table);
        }

        let c = Dither::with_seed(43);
        assert_ne!(a.table, c.table);
    }

    #[test]
    fn test_refresh_changes_table() {
        let mut dither = Dither::new();
        let before = dither.table;
        dither.refresh();
        assert_ne!(before, dither.table);
    }

    #[test]
    fn test_threshold_tiles_every_16_pixels() {
        let dither = Dither::new();
        assert_eq!(dither.threshold(3, 5), dither.threshold(19, 21));
        assert_eq!(dither.threshold(0, 0), dither.threshold(240, 0));
    }

    #[test]
    fn test_noise_is_bounded() {
        assert_eq!(add_noise(255, 5, 7), 255);
        assert_eq!(add_noise(0, 5, 7), 7);
        // 7 never reaches the next 5-bit step from a multiple of 8
        assert_eq!(add_noise(8, 5, 7) >> 3, 1);
    }
}
