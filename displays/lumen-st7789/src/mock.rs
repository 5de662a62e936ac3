//! Host-side doubles for the bus, pins, delay and font engine
//!
//! Every double writes into one shared event log so tests can assert on the
//! exact interleaving of D/C changes, transfers, retirements and sleeps.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use lumen_core::glyph::{CoverageRaster, FaceBounds, RasterError};
use lumen_core::{FrameBuffer, GlyphMetrics, Rasterizer};
use lumen_hal::spi::Mode;
use lumen_hal::{BusPhase, Payload, QueuedBus, SpiConfig, Transfer};

use crate::config::DisplayConfig;
use crate::transport::St7789;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open { max_transfer: usize, mode: Mode },
    Dc(bool),
    Reset(bool),
    Delay(u32),
    /// Inline transfer with its bytes
    Inline(BusPhase, Vec<u8>),
    /// Frame buffer transfer: length and first pixel bytes
    Frame { len: usize, head: [u8; 2] },
    Retire,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    Open,
    Submit,
    /// Retire with nothing outstanding
    Idle,
}

pub struct MockBus {
    log: Log,
    queue: VecDeque<Transfer<FrameBuffer>>,
    pub fail_open: bool,
    pub fail_submit: bool,
}

impl MockBus {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            queue: VecDeque::new(),
            fail_open: false,
            fail_submit: false,
        }
    }
}

impl QueuedBus<FrameBuffer> for MockBus {
    type Error = MockError;

    fn open(&mut self, config: &SpiConfig, max_transfer: usize) -> Result<(), MockError> {
        if self.fail_open {
            return Err(MockError::Open);
        }
        self.log.borrow_mut().push(Event::Open {
            max_transfer,
            mode: config.mode,
        });
        Ok(())
    }

    fn submit(&mut self, transfer: Transfer<FrameBuffer>) -> Result<(), MockError> {
        if self.fail_submit {
            return Err(MockError::Submit);
        }
        let event = match &transfer.payload {
            Payload::Inline(_) => Event::Inline(transfer.phase, transfer.bytes().to_vec()),
            Payload::Buffer(fb) => {
                let bytes = fb.as_bytes();
                Event::Frame {
                    len: transfer.len,
                    head: [bytes[0], bytes[1]],
                }
            }
        };
        self.log.borrow_mut().push(event);
        self.queue.push_back(transfer);
        Ok(())
    }

    fn retire(&mut self) -> Result<Transfer<FrameBuffer>, MockError> {
        let transfer = self.queue.pop_front().ok_or(MockError::Idle)?;
        self.log.borrow_mut().push(Event::Retire);
        Ok(transfer)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Line {
    Dc,
    Reset,
}

pub struct MockPin {
    log: Log,
    line: Line,
}

impl MockPin {
    pub fn new(log: &Log, line: Line) -> Self {
        Self {
            log: log.clone(),
            line,
        }
    }

    fn record(&mut self, high: bool) {
        let event = match self.line {
            Line::Dc => Event::Dc(high),
            Line::Reset => Event::Reset(high),
        };
        self.log.borrow_mut().push(event);
    }
}

impl ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

pub struct MockDelay {
    log: Log,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Delay(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::Delay(ms));
    }
}

pub type MockDisplay = St7789<MockBus, MockPin, MockPin, MockDelay>;

/// Transport on mocks, with the open event already cleared from the log
pub fn display(config: &DisplayConfig) -> (MockDisplay, Log) {
    let log: Log = Rc::default();
    let display = St7789::new(
        config,
        MockBus::new(&log),
        MockPin::new(&log, Line::Dc),
        MockPin::new(&log, Line::Reset),
        MockDelay { log: log.clone() },
    )
    .unwrap();
    log.borrow_mut().clear();
    (display, log)
}

pub fn mock_delay(log: &Log) -> MockDelay {
    MockDelay { log: log.clone() }
}

/// Highest number of transfers outstanding at any point in the log
pub fn peak_outstanding(log: &Log) -> usize {
    let mut current = 0usize;
    let mut peak = 0;
    for event in log.borrow().iter() {
        match event {
            Event::Inline(..) | Event::Frame { .. } => {
                current += 1;
                peak = peak.max(current);
            }
            Event::Retire => current -= 1,
            _ => {}
        }
    }
    peak
}

/// Frame transfer lengths in submission order
pub fn frames(log: &Log) -> Vec<usize> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Frame { len, .. } => Some(*len),
            _ => None,
        })
        .collect()
}

/// Commands as `(opcode, params)` pairs, in order
pub fn commands(log: &Log) -> Vec<(u8, Vec<u8>)> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    for event in log.borrow().iter() {
        match event {
            Event::Inline(BusPhase::Command, bytes) => out.push((bytes[0], Vec::new())),
            Event::Inline(BusPhase::Data, bytes) => {
                if let Some(last) = out.last_mut() {
                    last.1.extend_from_slice(bytes);
                }
            }
            _ => {}
        }
    }
    out
}

/// Square-block font: every uppercase letter is a filled square
///
/// The square side is half the pixel size. Other characters are missing.
pub struct SquareFont {
    size: u16,
    pub renders: usize,
    buffer: Vec<u8>,
}

impl SquareFont {
    pub fn new() -> Self {
        Self {
            size: 0,
            renders: 0,
            buffer: Vec::new(),
        }
    }

    fn side(&self) -> u16 {
        self.size / 2
    }
}

impl Rasterizer for SquareFont {
    fn set_target_size(&mut self, pixel_size: u16) -> Result<(), RasterError> {
        self.size = pixel_size;
        Ok(())
    }

    fn face_bounds(&self) -> FaceBounds {
        FaceBounds {
            x_min: 0,
            y_min: 0,
            x_max: 500,
            y_max: 500,
            units_per_em: 1000,
        }
    }

    fn metrics_for(&mut self, ch: char) -> Result<GlyphMetrics, RasterError> {
        if !ch.is_ascii_uppercase() {
            return Err(RasterError::NotFound);
        }
        let side = self.side();
        Ok(GlyphMetrics {
            advance: side as i16 + 2,
            bearing_x: 1,
            bearing_y: side as i16,
            width: side,
            height: side,
        })
    }

    fn render_coverage(&mut self, ch: char) -> Result<CoverageRaster<'_>, RasterError> {
        if !ch.is_ascii_uppercase() {
            return Err(RasterError::NotFound);
        }
        self.renders += 1;
        let side = self.side();
        self.buffer.clear();
        self.buffer.resize(side as usize * side as usize, 0xff);
        Ok(CoverageRaster {
            width: side,
            height: side,
            pitch: side as usize,
            data: &self.buffer,
        })
    }
}
