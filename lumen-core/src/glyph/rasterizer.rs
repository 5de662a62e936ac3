//! Outline rasterizer interface
//!
//! The font engine is an external collaborator. It is owned by the caller
//! and lent to the cache for each lookup.

use super::GlyphMetrics;

/// Errors reported by a rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RasterError {
    /// Code point is absent from the font
    NotFound,
    /// Engine error while loading or rendering
    Failed,
}

/// Font-wide bounding box in font units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaceBounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
    pub units_per_em: u16,
}

impl FaceBounds {
    /// Largest bitmap any glyph can produce at `pixel_size`, in pixels
    ///
    /// One pixel is added to cover partial coverage at the edges.
    pub fn max_pixel_extent(&self, pixel_size: u16) -> (u16, u16) {
        let upem = i64::from(self.units_per_em.max(1));
        let scale = |span: i32| -> u16 {
            let px = i64::from(pixel_size) * i64::from(span.max(0)) / upem + 1;
            px.clamp(0, i64::from(u16::MAX)) as u16
        };
        (
            scale(self.x_max - self.x_min),
            scale(self.y_max - self.y_min),
        )
    }
}

/// 8-bit antialiased coverage produced by the rasterizer
#[derive(Debug, Clone, Copy)]
pub struct CoverageRaster<'a> {
    pub width: u16,
    pub height: u16,
    /// Bytes between the starts of consecutive rows
    pub pitch: usize,
    /// Coverage bytes, 0 = background, 255 = fully covered
    pub data: &'a [u8],
}

impl CoverageRaster<'_> {
    /// Coverage of the pixel at column `x`, row `y`
    #[inline]
    pub fn coverage(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.pitch + x]
    }

    /// Check that `data` holds every row described by the header
    pub fn is_well_formed(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return true;
        }
        let width = self.width as usize;
        self.pitch >= width && (self.height as usize - 1) * self.pitch + width <= self.data.len()
    }
}

/// Font engine that turns code points into coverage rasters
pub trait Rasterizer {
    /// Select the pixel size for subsequent metrics and renders
    fn set_target_size(&mut self, pixel_size: u16) -> Result<(), RasterError>;

    /// Bounding box covering every glyph of the face
    fn face_bounds(&self) -> FaceBounds;

    /// Advance and bounding box of a glyph at the current size
    fn metrics_for(&mut self, code_point: char) -> Result<GlyphMetrics, RasterError>;

    /// Render a glyph at the current size
    ///
    /// The raster borrows the engine's glyph slot and is valid until the next
    /// call into the rasterizer.
    fn render_coverage(&mut self, code_point: char) -> Result<CoverageRaster<'_>, RasterError>;
}
