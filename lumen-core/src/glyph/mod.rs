//! Glyph coverage cache
//!
//! Glyph outlines are rasterized by an external engine (see [`Rasterizer`]).
//! This module keeps a small, fixed number of those rasters in 2 bits per
//! pixel and decides which one to drop when a new glyph needs a slot.

pub mod bitmap;
pub mod cache;
pub mod rasterizer;

pub use bitmap::CoverageBitmap;
pub use cache::{CacheStats, Glyph, GlyphCache};
pub use rasterizer::{CoverageRaster, FaceBounds, RasterError, Rasterizer};

use crate::framebuffer::AllocError;

/// Placement metrics of a rendered glyph, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlyphMetrics {
    /// Horizontal pen advance
    pub advance: i16,
    /// Offset from the pen position to the left edge of the bitmap
    pub bearing_x: i16,
    /// Offset from the baseline up to the top edge of the bitmap
    pub bearing_y: i16,
    /// Bounding box width
    pub width: u16,
    /// Bounding box height
    pub height: u16,
}

/// Errors that can occur while loading a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GlyphError {
    /// The active font has no glyph for this code point
    GlyphNotFound,
    /// The rasterizer failed to produce a bitmap
    RasterizationFailure,
    /// Cache memory could not be reserved
    AllocationFailure,
    /// The rendered bitmap does not fit the cache slot
    ///
    /// The rasterizer is producing glyphs for a larger size than the cache
    /// was built for; call [`GlyphCache::rebuild`].
    SlotOverflow,
    /// Cache capacity or pixel size out of range
    InvalidConfig,
}

impl From<RasterError> for GlyphError {
    fn from(e: RasterError) -> Self {
        match e {
            RasterError::NotFound => GlyphError::GlyphNotFound,
            RasterError::Failed => GlyphError::RasterizationFailure,
        }
    }
}

impl From<AllocError> for GlyphError {
    fn from(_: AllocError) -> Self {
        GlyphError::AllocationFailure
    }
}
