//! Double-buffered ST7789 transport
//!
//! The transport owns two slice buffers, A and B. One of them is *active*
//! (free for the caller to draw into) while the other may be travelling to
//! the panel. Buffers are moved into the bus queue when submitted and only
//! come back when the bus retires their transfer, so an in-flight buffer is
//! simply missing from its slot until then.
//!
//! ```text
//!  draw into A ──► swap_buffers ──► A queued, draw into B ──► swap_buffers
//!                                   (B reclaimed first)       (A reclaimed)
//! ```
//!
//! At most two transfers are outstanding (fewer if the bus is configured
//! with a shallower queue); submitting a third retires the oldest first.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use heapless::Deque;

use lumen_core::framebuffer::BYTES_PER_PIXEL;
use lumen_core::{FrameBuffer, PixelColor};
use lumen_hal::{BusPhase, Payload, QueuedBus, Transfer, INLINE_CAPACITY};

use crate::command::{self, cmd, Command};
use crate::config::DisplayConfig;
use crate::error::TransportError;

/// Hard limit on outstanding transfers
pub const MAX_IN_FLIGHT: usize = 2;

/// Reset pulse width
pub const RESET_LOW_MS: u32 = 20;
/// Time the controller needs after reset before accepting commands
pub const RESET_SETTLE_MS: u32 = 130;

/// One of the two slice buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A,
    B,
}

impl Slot {
    const fn index(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
        }
    }

    /// The opposite buffer
    pub const fn other(self) -> Slot {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// What an outstanding transfer carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Inline,
    Frame(Slot),
}

/// Rectangle in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// ST7789 display transport
pub struct St7789<BUS, DC, RST, D> {
    bus: BUS,
    dc: DC,
    rst: RST,
    delay: D,
    width: u16,
    height: u16,
    slice_lines: u16,
    /// Allowed outstanding transfers, 1 or 2
    depth: usize,
    slots: [Option<FrameBuffer>; 2],
    active: Slot,
    /// Outstanding transfers, oldest first
    in_flight: Deque<InFlight, MAX_IN_FLIGHT>,
    /// Level currently driven on D/C, unknown until first driven
    phase: Option<BusPhase>,
}

impl<BUS, DC, RST, D> St7789<BUS, DC, RST, D>
where
    BUS: QueuedBus<FrameBuffer>,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Allocate the slice buffers and bring up the bus
    ///
    /// Nothing is sent to the panel yet; call [`reset`](Self::reset) and
    /// [`init_panel`](Self::init_panel) next.
    pub fn new(
        config: &DisplayConfig,
        mut bus: BUS,
        dc: DC,
        rst: RST,
        delay: D,
    ) -> Result<Self, TransportError<BUS::Error>> {
        config.validate()?;
        let panel = config.panel;

        let (a, b) = match (
            FrameBuffer::try_new(panel.width, panel.slice_lines),
            FrameBuffer::try_new(panel.width, panel.slice_lines),
        ) {
            (Ok(a), Ok(b)) => (a, b),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "Cannot allocate {}x{} slice buffers",
                    panel.width,
                    panel.slice_lines
                );
                return Err(TransportError::AllocationFailure);
            }
        };

        let max_transfer = panel.slice_pixels() * BYTES_PER_PIXEL;
        bus.open(&config.bus, max_transfer)
            .map_err(TransportError::BusInitFailure)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "ST7789 transport up: {}x{}, {} line slices, queue depth {}",
            panel.width,
            panel.height,
            panel.slice_lines,
            config.bus.queue_size
        );

        Ok(Self {
            bus,
            dc,
            rst,
            delay,
            width: panel.width,
            height: panel.height,
            slice_lines: panel.slice_lines,
            depth: usize::from(config.bus.queue_size).clamp(1, MAX_IN_FLIGHT),
            slots: [Some(a), Some(b)],
            active: Slot::A,
            in_flight: Deque::new(),
            phase: None,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Rows covered by one slice buffer
    pub fn slice_lines(&self) -> u16 {
        self.slice_lines
    }

    /// Pixels in one slice buffer
    pub fn slice_pixels(&self) -> usize {
        self.width as usize * self.slice_lines as usize
    }

    /// First panel row of every slice in a full-frame pass
    pub fn slices(&self) -> impl Iterator<Item = u16> {
        (0..self.height).step_by(usize::from(self.slice_lines))
    }

    /// Buffer the caller may draw into next
    pub fn active_slot(&self) -> Slot {
        self.active
    }

    /// Number of transfers submitted but not yet retired
    pub fn outstanding(&self) -> usize {
        self.in_flight.len()
    }

    /// Pulse the reset line and wait for the controller to come back
    pub fn reset(&mut self) -> Result<(), TransportError<BUS::Error>> {
        self.rst.set_low().map_err(|_| TransportError::Pin)?;
        self.delay.delay_ms(RESET_LOW_MS);
        self.rst.set_high().map_err(|_| TransportError::Pin)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    /// Send one command with optional parameters, then sleep `wait_ms`
    ///
    /// Blocks until both phases are on the wire.
    pub fn send_command(
        &mut self,
        code: u8,
        params: &[u8],
        wait_ms: u32,
    ) -> Result<(), TransportError<BUS::Error>> {
        if params.len() > INLINE_CAPACITY {
            return Err(TransportError::PayloadTooLarge);
        }

        self.wait_idle()?;
        let opcode = Transfer::inline(BusPhase::Command, &[code])
            .ok_or(TransportError::PayloadTooLarge)?;
        self.submit(opcode, InFlight::Inline)?;
        self.wait_idle()?;

        if !params.is_empty() {
            let data = Transfer::inline(BusPhase::Data, params)
                .ok_or(TransportError::PayloadTooLarge)?;
            self.submit(data, InFlight::Inline)?;
            self.wait_idle()?;
        }

        if wait_ms > 0 {
            self.delay.delay_ms(wait_ms);
        }
        Ok(())
    }

    /// Send a command table in order
    pub fn run_commands(
        &mut self,
        commands: &[Command<'_>],
    ) -> Result<(), TransportError<BUS::Error>> {
        for c in commands {
            self.send_command(c.code, c.params, c.wait_ms)?;
        }
        Ok(())
    }

    /// Configure the controller for RGB565 little-endian and turn it on
    ///
    /// The panel is cleared to black before the display is switched on and
    /// the window is left covering the whole panel.
    pub fn init_panel(&mut self) -> Result<(), TransportError<BUS::Error>> {
        let caset = command::address_range(0, self.width - 1);
        let raset = command::address_range(0, self.height - 1);

        #[cfg(feature = "defmt")]
        defmt::debug!("Running ST7789 init sequence");

        self.run_commands(&command::init_sequence(&caset, &raset))?;
        self.clear(PixelColor::BLACK)?;
        self.run_commands(&command::display_on_sequence(&caset, &raset))?;

        #[cfg(feature = "defmt")]
        defmt::info!("ST7789 initialized");
        Ok(())
    }

    /// Set the inclusive address window and start a memory write
    pub fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), TransportError<BUS::Error>> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(TransportError::InvalidWindow);
        }
        self.send_command(cmd::CASET, &command::address_range(x0, x1), 0)?;
        self.send_command(cmd::RASET, &command::address_range(y0, y1), 0)?;
        self.send_command(cmd::RAMWR, &[], 0)
    }

    /// Fill a rectangle with a solid color
    ///
    /// Both slice buffers are overwritten with `color` and streamed
    /// alternately until the rectangle is covered. Returns once everything
    /// has been sent. An empty rectangle sends nothing.
    pub fn fill_area(
        &mut self,
        color: PixelColor,
        rect: Rect,
    ) -> Result<(), TransportError<BUS::Error>> {
        if rect.is_empty() {
            return Ok(());
        }
        let x1 = u32::from(rect.x) + u32::from(rect.width) - 1;
        let y1 = u32::from(rect.y) + u32::from(rect.height) - 1;
        if x1 >= u32::from(self.width) || y1 >= u32::from(self.height) {
            return Err(TransportError::InvalidWindow);
        }

        self.wait_idle()?;
        for slot in &mut self.slots {
            slot.as_mut().ok_or(TransportError::QueueDesync)?.fill(color);
        }
        self.set_window(rect.x, rect.y, x1 as u16, y1 as u16)?;

        let chunk = self.slice_pixels() * BYTES_PER_PIXEL;
        let mut remaining = rect.pixel_count() * BYTES_PER_PIXEL;
        let mut slot = Slot::A;
        while remaining > 0 {
            let len = remaining.min(chunk);
            self.reclaim(slot)?;
            let buffer = self.slots[slot.index()]
                .take()
                .ok_or(TransportError::QueueDesync)?;
            self.submit(Transfer::buffer(buffer, len), InFlight::Frame(slot))?;
            remaining -= len;
            slot = slot.other();
        }
        self.wait_idle()
    }

    /// Fill the whole panel
    pub fn clear(&mut self, color: PixelColor) -> Result<(), TransportError<BUS::Error>> {
        self.fill_area(color, Rect::new(0, 0, self.width, self.height))
    }

    /// Queue the first `pixels` pixels of the active buffer
    ///
    /// Returns without waiting for the transfer unless the queue is full,
    /// in which case the oldest transfer is retired first. The active slot
    /// does not change; its buffer stays unavailable until the transfer is
    /// retired.
    pub fn queue_pixels(&mut self, pixels: usize) -> Result<(), TransportError<BUS::Error>> {
        let slot = self.active;
        self.reclaim(slot)?;
        let buffer = self.slots[slot.index()]
            .take()
            .ok_or(TransportError::QueueDesync)?;
        let len = pixels.min(buffer.len()) * BYTES_PER_PIXEL;
        self.submit(Transfer::buffer(buffer, len), InFlight::Frame(slot))
    }

    /// Block until every outstanding transfer has completed
    pub fn wait_idle(&mut self) -> Result<(), TransportError<BUS::Error>> {
        while !self.in_flight.is_empty() {
            self.retire_one()?;
        }
        Ok(())
    }

    /// Send the whole active buffer and switch to the other one
    ///
    /// The other buffer's previous transfer is retired before this returns,
    /// so the new active buffer is always safe to draw into.
    pub fn swap_buffers(&mut self) -> Result<(), TransportError<BUS::Error>> {
        self.queue_pixels(self.slice_pixels())?;
        self.active = self.active.other();
        self.reclaim(self.active)
    }

    /// The buffer to draw into, waiting for it if it is still in flight
    pub fn active_buffer(&mut self) -> Result<&mut FrameBuffer, TransportError<BUS::Error>> {
        self.reclaim(self.active)?;
        self.slots[self.active.index()]
            .as_mut()
            .ok_or(TransportError::QueueDesync)
    }

    /// Drain the queue and give back the bus and pins
    pub fn release(mut self) -> Result<(BUS, DC, RST, D), TransportError<BUS::Error>> {
        self.wait_idle()?;
        Ok((self.bus, self.dc, self.rst, self.delay))
    }

    /// Hand a transfer to the bus, switching D/C and applying backpressure
    fn submit(
        &mut self,
        transfer: Transfer<FrameBuffer>,
        owner: InFlight,
    ) -> Result<(), TransportError<BUS::Error>> {
        if self.phase != Some(transfer.phase) {
            // D/C may only change with the bus idle
            self.wait_idle()?;
            self.dc
                .set_state(PinState::from(transfer.phase.dc_high()))
                .map_err(|_| TransportError::Pin)?;
            self.phase = Some(transfer.phase);
        }

        while self.in_flight.len() >= self.depth {
            self.retire_one()?;
        }

        self.bus.submit(transfer).map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::error!("SPI submit failed");
            TransportError::Bus(e)
        })?;
        self.in_flight
            .push_back(owner)
            .map_err(|_| TransportError::QueueDesync)
    }

    /// Retire the oldest transfer, returning frame buffers to their slot
    fn retire_one(&mut self) -> Result<(), TransportError<BUS::Error>> {
        let owner = self
            .in_flight
            .pop_front()
            .ok_or(TransportError::QueueDesync)?;
        let transfer = self.bus.retire().map_err(TransportError::Bus)?;

        match (owner, transfer.payload) {
            (InFlight::Inline, Payload::Inline(_)) => Ok(()),
            (InFlight::Frame(slot), Payload::Buffer(buffer)) => {
                self.slots[slot.index()] = Some(buffer);
                Ok(())
            }
            _ => {
                #[cfg(feature = "defmt")]
                defmt::error!("Bus retired an unexpected transfer");
                Err(TransportError::QueueDesync)
            }
        }
    }

    /// Retire transfers until `slot` holds its buffer again
    fn reclaim(&mut self, slot: Slot) -> Result<(), TransportError<BUS::Error>> {
        while self.slots[slot.index()].is_none() {
            if self.in_flight.is_empty() {
                // Lost with a failed submit
                return Err(TransportError::QueueDesync);
            }
            self.retire_one()?;
        }
        Ok(())
    }
}
