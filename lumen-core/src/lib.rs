//! Board-agnostic rendering core for the Lumen display pipeline
//!
//! This crate contains everything that computes pixels, independent of the
//! bus that eventually carries them:
//!
//! - RGB565 packing and unpacking ([`color`])
//! - Per-frame ordered dither noise ([`dither`])
//! - Slice frame buffers in wire byte order ([`framebuffer`])
//! - 2bpp glyph coverage cache with approximate-LRU eviction ([`glyph`])
//! - Coverage-to-color blending ([`compositor`])
//! - Configuration type definitions ([`config`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod color;
pub mod compositor;
pub mod config;
pub mod dither;
pub mod framebuffer;
pub mod glyph;

pub use color::{PixelColor, Rgb};
pub use compositor::composite;
pub use config::GlyphCacheConfig;
pub use dither::Dither;
pub use framebuffer::{AllocError, FrameBuffer};
pub use glyph::{CoverageBitmap, Glyph, GlyphCache, GlyphError, GlyphMetrics, Rasterizer};
