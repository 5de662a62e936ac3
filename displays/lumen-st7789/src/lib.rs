//! ST7789 transport for the Lumen display pipeline
//!
//! This crate provides:
//! - [`St7789`], a double-buffered transport that streams RGB565 slices over
//!   a queued SPI bus while the next slice is being drawn
//! - The ST7789 command set and bring-up tables ([`command`])
//! - [`DisplayConfig`] and its TOML / postcard loader ([`config`])
//!
//! # Frame loop
//!
//! The panel is drawn one horizontal slice at a time. For every slice row in
//! [`St7789::slices`], the caller draws into [`St7789::active_buffer`]
//! (typically with [`lumen_core::composite`] and glyphs from a
//! [`lumen_core::GlyphCache`]) and then calls [`St7789::swap_buffers`], which
//! queues the slice and hands back the other buffer.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod error;
pub mod transport;

#[cfg(test)]
mod mock;

// Re-export key types
pub use command::{cmd, Command};
pub use config::{ConfigError, DisplayConfig, PanelConfig, PinConfig};
pub use error::TransportError;
pub use transport::{Rect, Slot, St7789};
