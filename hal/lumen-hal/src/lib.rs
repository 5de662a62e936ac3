//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the bus abstraction that chip-specific SPI drivers
//! implement so the display transport can stream pixels without knowing
//! which DMA engine sits underneath.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lumen-st7789 (transport, buffer pair)  │
//! └─────────────────────────────────────────┘
//!                     │  Transfer<B>
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SPI + DMA    │       │  host mock    │
//! │  (board)      │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::QueuedBus`] - Asynchronous, ownership-passing SPI write queue

#![no_std]
#![deny(unsafe_code)]

pub mod spi;

// Re-export key types at crate root for convenience
pub use spi::{BusPhase, Payload, QueuedBus, SpiConfig, Transfer, INLINE_CAPACITY};
