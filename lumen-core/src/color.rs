//! RGB565 color packing
//!
//! The panel takes 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.
//! Packing truncates; unpacking replicates the top bits into the low bits so
//! full white stays full white and the round-trip error is at most one
//! quantization step.

/// Bits dropped from the red and blue channels
const RB_SHIFT: u8 = 3;

/// Bits dropped from the green channel
const G_SHIFT: u8 = 2;

/// 8-bit-per-channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Truncate to the wire format
    pub const fn pack(self) -> PixelColor {
        PixelColor::pack(self.r, self.g, self.b)
    }
}

/// Packed RGB565 pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelColor(u16);

impl PixelColor {
    pub const BLACK: PixelColor = PixelColor(0x0000);
    pub const WHITE: PixelColor = PixelColor(0xffff);

    /// Wrap a raw 565 value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw 565 value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Pack 8-bit channels by dropping their low bits (no rounding)
    pub const fn pack(r: u8, g: u8, b: u8) -> Self {
        let r = (r >> RB_SHIFT) as u16;
        let g = (g >> G_SHIFT) as u16;
        let b = (b >> RB_SHIFT) as u16;
        Self((r << 11) | (g << 5) | b)
    }

    /// Expand back to 8-bit channels, replicating high bits into the low bits
    pub const fn unpack(self) -> Rgb {
        let r5 = ((self.0 >> 11) & 0x1f) as u8;
        let g6 = ((self.0 >> 5) & 0x3f) as u8;
        let b5 = (self.0 & 0x1f) as u8;
        Rgb {
            r: (r5 << 3) | (r5 >> 2),
            g: (g6 << 2) | (g6 >> 4),
            b: (b5 << 3) | (b5 >> 2),
        }
    }

    /// Byte order used on the wire (little-endian, see RAMCTRL)
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<Rgb> for PixelColor {
    fn from(rgb: Rgb) -> Self {
        rgb.pack()
    }
}

impl From<PixelColor> for Rgb {
    fn from(color: PixelColor) -> Self {
        color.unpack()
    }
}
