//! Fixed-capacity glyph cache
//!
//! The cache owns one arena of `capacity` equally sized slots. Slot size is
//! derived once from the font bounding box at the configured pixel size, so
//! a cache only ever holds glyphs of one size. Rendering at another size
//! needs [`GlyphCache::rebuild`].
//!
//! # Eviction
//!
//! Every entry carries a 16-bit priority. On each access (hit or fill) all
//! resident priorities are decremented and the accessed entry is set to
//! `u16::MAX`. A miss takes the slot with the lowest priority, empty slots
//! first, lowest index on ties. This is approximate LRU at O(capacity) per
//! access; capacity is bounded by [`crate::config::MAX_CACHE_CAPACITY`] to
//! keep the scan short.

use alloc::vec::Vec;

use super::bitmap::{compress, packed_len, CoverageBitmap};
use super::rasterizer::Rasterizer;
use super::{GlyphError, GlyphMetrics};
use crate::config::GlyphCacheConfig;

/// Resident glyph record
#[derive(Debug, Clone, Copy)]
struct Entry {
    code_point: char,
    width: u16,
    height: u16,
    metrics: GlyphMetrics,
    priority: u16,
}

/// Cache counters since creation or the last [`GlyphCache::rebuild`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

/// A cached glyph: coverage bitmap plus placement metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub bitmap: CoverageBitmap<'a>,
    pub metrics: GlyphMetrics,
}

/// Bounded cache of 2bpp glyph bitmaps
#[derive(Debug)]
pub struct GlyphCache {
    pixel_size: u16,
    max_width: u16,
    max_height: u16,
    bytes_per_glyph: usize,
    arena: Vec<u8>,
    entries: Vec<Option<Entry>>,
    stats: CacheStats,
}

impl GlyphCache {
    /// Build a cache for glyphs at `config.pixel_size`
    pub fn new<R: Rasterizer>(
        rasterizer: &mut R,
        config: GlyphCacheConfig,
    ) -> Result<Self, GlyphError> {
        if !config.is_valid() {
            return Err(GlyphError::InvalidConfig);
        }

        let mut cache = Self {
            pixel_size: 0,
            max_width: 0,
            max_height: 0,
            bytes_per_glyph: 0,
            arena: Vec::new(),
            entries: Vec::new(),
            stats: CacheStats::default(),
        };
        cache
            .entries
            .try_reserve_exact(config.capacity as usize)
            .map_err(|_| GlyphError::AllocationFailure)?;
        cache.entries.resize(config.capacity as usize, None);
        cache.rebuild(rasterizer, config.pixel_size)?;
        Ok(cache)
    }

    /// Drop every glyph and resize the slots for a new pixel size
    ///
    /// On error the cache is left empty with its previous slot size.
    pub fn rebuild<R: Rasterizer>(
        &mut self,
        rasterizer: &mut R,
        pixel_size: u16,
    ) -> Result<(), GlyphError> {
        if pixel_size == 0 {
            return Err(GlyphError::InvalidConfig);
        }
        self.invalidate_all();

        rasterizer.set_target_size(pixel_size)?;
        let (max_width, max_height) = rasterizer.face_bounds().max_pixel_extent(pixel_size);
        let bytes_per_glyph = packed_len(max_width, max_height);
        let arena_len = bytes_per_glyph
            .checked_mul(self.entries.len())
            .ok_or(GlyphError::AllocationFailure)?;

        let mut arena = Vec::new();
        arena
            .try_reserve_exact(arena_len)
            .map_err(|_| GlyphError::AllocationFailure)?;
        arena.resize(arena_len, 0);

        self.arena = arena;
        self.pixel_size = pixel_size;
        self.max_width = max_width;
        self.max_height = max_height;
        self.bytes_per_glyph = bytes_per_glyph;
        self.stats = CacheStats::default();
        Ok(())
    }

    /// Forget every resident glyph
    pub fn invalidate_all(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    /// Return the glyph for `code_point`, rendering it on a miss
    ///
    /// A failed render leaves the cache untouched.
    pub fn ensure<R: Rasterizer>(
        &mut self,
        rasterizer: &mut R,
        code_point: char,
    ) -> Result<Glyph<'_>, GlyphError> {
        let slot = match self.find(code_point) {
            Some(slot) => {
                self.stats.hits += 1;
                slot
            }
            None => {
                self.stats.misses += 1;
                self.fill(rasterizer, code_point)?
            }
        };
        self.touch(slot);
        self.glyph(slot)
    }

    /// Metrics for `code_point` without changing the cache
    ///
    /// Resident glyphs are answered from the cache; otherwise the rasterizer
    /// is asked at this cache's pixel size.
    pub fn metrics<R: Rasterizer>(
        &self,
        rasterizer: &mut R,
        code_point: char,
    ) -> Result<GlyphMetrics, GlyphError> {
        if let Some(entry) = self.find(code_point).and_then(|slot| self.entries[slot]) {
            return Ok(entry.metrics);
        }
        rasterizer.set_target_size(self.pixel_size)?;
        Ok(rasterizer.metrics_for(code_point)?)
    }

    /// Check whether a glyph is resident
    pub fn contains(&self, code_point: char) -> bool {
        self.find(code_point).is_some()
    }

    /// Number of resident glyphs
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Pixel size the slots were sized for
    pub fn pixel_size(&self) -> u16 {
        self.pixel_size
    }

    /// Largest bitmap a slot can hold
    pub fn max_glyph_size(&self) -> (u16, u16) {
        (self.max_width, self.max_height)
    }

    /// Bytes per slot
    pub fn bytes_per_glyph(&self) -> usize {
        self.bytes_per_glyph
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn find(&self, code_point: char) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Some(entry) if entry.code_point == code_point))
    }

    /// Render `code_point` into the least valuable slot and return its index
    fn fill<R: Rasterizer>(
        &mut self,
        rasterizer: &mut R,
        code_point: char,
    ) -> Result<usize, GlyphError> {
        rasterizer.set_target_size(self.pixel_size)?;
        let metrics = rasterizer.metrics_for(code_point)?;
        let raster = rasterizer.render_coverage(code_point)?;

        if !raster.is_well_formed() {
            return Err(GlyphError::RasterizationFailure);
        }
        if packed_len(raster.width, raster.height) > self.bytes_per_glyph {
            return Err(GlyphError::SlotOverflow);
        }

        let slot = self.victim();
        if self.entries[slot].is_some() {
            self.stats.evictions += 1;
        }

        let start = slot * self.bytes_per_glyph;
        compress(&raster, &mut self.arena[start..start + self.bytes_per_glyph]);

        self.entries[slot] = Some(Entry {
            code_point,
            width: raster.width,
            height: raster.height,
            metrics,
            priority: 0,
        });
        Ok(slot)
    }

    /// First empty slot, else the slot with the lowest priority
    fn victim(&self) -> usize {
        if let Some(free) = self.entries.iter().position(Option::is_none) {
            return free;
        }
        let mut best = 0;
        let mut best_priority = u16::MAX;
        for (i, entry) in self.entries.iter().enumerate() {
            let priority = entry.map_or(0, |e| e.priority);
            // strict < keeps the lowest index on ties
            if i == 0 || priority < best_priority {
                best = i;
                best_priority = priority;
            }
        }
        best
    }

    fn touch(&mut self, slot: usize) {
        for entry in self.entries.iter_mut().flatten() {
            entry.priority = entry.priority.saturating_sub(1);
        }
        if let Some(entry) = self.entries[slot].as_mut() {
            entry.priority = u16::MAX;
        }
    }

    fn glyph(&self, slot: usize) -> Result<Glyph<'_>, GlyphError> {
        let entry = self.entries[slot].ok_or(GlyphError::GlyphNotFound)?;
        let start = slot * self.bytes_per_glyph;
        let data = &self.arena[start..start + self.bytes_per_glyph];
        let bitmap = CoverageBitmap::new(entry.width, entry.height, data)
            .ok_or(GlyphError::SlotOverflow)?;
        Ok(Glyph {
            bitmap,
            metrics: entry.metrics,
        })
    }
}
