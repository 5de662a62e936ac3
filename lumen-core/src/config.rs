//! Configuration types
//!
//! Board-agnostic settings for the rendering core. The display crate
//! aggregates these into the device configuration file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on glyph cache entries
///
/// Eviction scans every entry on each access, so the cache is meant to stay
/// small.
pub const MAX_CACHE_CAPACITY: u16 = 64;

/// Glyph cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlyphCacheConfig {
    /// Target glyph height in pixels
    pub pixel_size: u16,
    /// Number of glyph slots
    pub capacity: u16,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self {
        Self {
            pixel_size: 32,
            capacity: 16,
        }
    }
}

impl GlyphCacheConfig {
    pub const fn new(pixel_size: u16, capacity: u16) -> Self {
        Self {
            pixel_size,
            capacity,
        }
    }

    /// Check that the cache can be built from this config
    pub fn is_valid(&self) -> bool {
        self.pixel_size > 0 && (1..=MAX_CACHE_CAPACITY).contains(&self.capacity)
    }
}
