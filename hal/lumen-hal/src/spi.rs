//! SPI bus abstractions
//!
//! The display bus is write-only and half-duplex: every transfer is either a
//! command byte or a data burst, told apart by the D/C line. Transfers are
//! queued to hardware and complete later, so a queued transfer owns its
//! payload until the bus hands it back from [`QueuedBus::retire`].

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest command or parameter block carried inline in a [`Transfer`]
///
/// The longest ST7789 parameter list (gamma tables) is 14 bytes.
pub const INLINE_CAPACITY: usize = 16;

/// Which side of the D/C line a transfer is sent on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusPhase {
    /// D/C low: the byte is a command opcode
    Command,
    /// D/C high: the bytes are parameters or pixel data
    Data,
}

impl BusPhase {
    /// Level the D/C line must be driven to for this phase
    pub const fn dc_high(self) -> bool {
        matches!(self, BusPhase::Data)
    }
}

/// Bytes carried by a transfer
#[derive(Debug)]
pub enum Payload<B> {
    /// Small command or parameter block, copied into the descriptor
    Inline(Vec<u8, INLINE_CAPACITY>),
    /// Caller-owned buffer, moved into the queue for the transfer's lifetime
    Buffer(B),
}

impl<B: AsRef<[u8]>> Payload<B> {
    /// Full backing storage of the payload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Inline(bytes) => bytes,
            Payload::Buffer(buffer) => buffer.as_ref(),
        }
    }
}

/// Descriptor for one queued bus write
#[derive(Debug)]
pub struct Transfer<B> {
    /// D/C level this transfer is sent with
    pub phase: BusPhase,
    /// Bytes to send (only the first `len` are transmitted)
    pub payload: Payload<B>,
    /// Number of bytes to transmit from the start of the payload
    pub len: usize,
}

impl<B: AsRef<[u8]>> Transfer<B> {
    /// Create an inline transfer
    ///
    /// Returns `None` if `bytes` does not fit in [`INLINE_CAPACITY`].
    pub fn inline(phase: BusPhase, bytes: &[u8]) -> Option<Self> {
        let payload = Vec::from_slice(bytes).ok()?;
        Some(Self {
            phase,
            payload: Payload::Inline(payload),
            len: bytes.len(),
        })
    }

    /// Create a data transfer over the first `len` bytes of `buffer`
    ///
    /// `len` is clamped to the buffer size.
    pub fn buffer(buffer: B, len: usize) -> Self {
        let len = len.min(buffer.as_ref().len());
        Self {
            phase: BusPhase::Data,
            payload: Payload::Buffer(buffer),
            len,
        }
    }

    /// Bytes that go out on the wire
    pub fn bytes(&self) -> &[u8] {
        &self.payload.as_bytes()[..self.len]
    }
}

/// Asynchronous SPI write queue
///
/// Implementations start the transfer in [`submit`](QueuedBus::submit) and
/// return immediately (DMA, interrupt-driven FIFO, ...). Completed transfers
/// are handed back in submission order by [`retire`](QueuedBus::retire),
/// which blocks until the oldest outstanding transfer has finished.
///
/// The D/C line is not driven by the bus: the caller switches it while the
/// queue is empty, before submitting a transfer of a different phase.
pub trait QueuedBus<B: AsRef<[u8]>> {
    /// Error type for bus operations
    type Error;

    /// Bring up the bus and attach the display device
    ///
    /// `max_transfer` is the largest number of bytes a single transfer will
    /// ever carry, for sizing DMA descriptors.
    fn open(&mut self, config: &SpiConfig, max_transfer: usize) -> Result<(), Self::Error>;

    /// Queue a transfer to hardware without waiting for it to complete
    fn submit(&mut self, transfer: Transfer<B>) -> Result<(), Self::Error>;

    /// Block until the oldest outstanding transfer completes and return it
    fn retire(&mut self) -> Result<Transfer<B>, Self::Error>;
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock mode
    pub mode: Mode,
    /// Maximum number of transfers in flight (1 or 2)
    pub queue_size: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 40_000_000, // 40 MHz
            mode: Mode::Mode3,
            queue_size: 2,
        }
    }
}

/// SPI clock mode
///
/// Bus implementations translate this to their peripheral's CPOL/CPHA
/// setting in [`QueuedBus::open`]. The ST7789 samples on the rising edge
/// with the clock idling high, which is mode 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}
