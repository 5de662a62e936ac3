//! ST7789 command set and initialization tables

/// ST7789 command opcodes
pub mod cmd {
    // System function command table 1
    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const RDDID: u8 = 0x04;
    pub const RDDST: u8 = 0x09;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const PTLON: u8 = 0x12;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const GAMSET: u8 = 0x26;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2a;
    pub const RASET: u8 = 0x2b;
    pub const RAMWR: u8 = 0x2c;
    pub const PTLAR: u8 = 0x30;
    pub const VSCRDEF: u8 = 0x33;
    pub const TEOFF: u8 = 0x34;
    pub const TEON: u8 = 0x35;
    pub const MADCTL: u8 = 0x36;
    pub const VSCRSADD: u8 = 0x37;
    pub const IDMOFF: u8 = 0x38;
    pub const IDMON: u8 = 0x39;
    pub const COLMOD: u8 = 0x3a;
    pub const RAMWRC: u8 = 0x3c;
    pub const WRDISBV: u8 = 0x51;

    // System function command table 2
    pub const RAMCTRL: u8 = 0xb0;
    pub const RGBCTRL: u8 = 0xb1;
    pub const PORCTRL: u8 = 0xb2;
    pub const FRCTRL1: u8 = 0xb3;
    pub const GCTRL: u8 = 0xb7;
    pub const VCOMS: u8 = 0xbb;
    pub const LCMCTRL: u8 = 0xc0;
    pub const VDVVRHEN: u8 = 0xc2;
    pub const VRHS: u8 = 0xc3;
    pub const VDVSET: u8 = 0xc4;
    pub const FRCTR2: u8 = 0xc6;
    pub const PWCTRL1: u8 = 0xd0;
    pub const PVGAMCTRL: u8 = 0xe0;
    pub const NVGAMCTRL: u8 = 0xe1;
}

/// One entry of a command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command<'a> {
    /// Opcode sent in the command phase
    pub code: u8,
    /// Parameters sent in the data phase (skipped when empty)
    pub params: &'a [u8],
    /// Settling time after the command, in milliseconds
    pub wait_ms: u32,
}

impl<'a> Command<'a> {
    pub const fn new(code: u8, params: &'a [u8], wait_ms: u32) -> Self {
        Self {
            code,
            params,
            wait_ms,
        }
    }
}

/// Big-endian start/end pair for CASET and RASET
pub const fn address_range(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}

/// Panel bring-up, up to the first clear
///
/// `caset` and `raset` span the full panel.
pub fn init_sequence<'a>(caset: &'a [u8; 4], raset: &'a [u8; 4]) -> [Command<'a>; 20] {
    [
        Command::new(cmd::SLPIN, &[], 10),
        Command::new(cmd::SWRESET, &[], 200),
        Command::new(cmd::SLPOUT, &[], 120),
        // Page / column address order
        Command::new(cmd::MADCTL, &[0x00], 0),
        // 16 bit RGB565
        Command::new(cmd::COLMOD, &[0x55], 0),
        Command::new(cmd::INVON, &[], 0),
        Command::new(cmd::CASET, caset, 0),
        Command::new(cmd::RASET, raset, 0),
        // Porch setting
        Command::new(cmd::PORCTRL, &[0x0c, 0x0c, 0x00, 0x33, 0x33], 0),
        // VGH 12.54V, VGL -9.6V
        Command::new(cmd::GCTRL, &[0x14], 0),
        // VCOM 1.475V
        Command::new(cmd::VCOMS, &[0x37], 0),
        Command::new(cmd::VDVVRHEN, &[0x01, 0xff], 0),
        // GVDD = 4.45 + (vcom + vcom offset + vdv)
        Command::new(cmd::VRHS, &[0x12], 0),
        // VDV 0V
        Command::new(cmd::VDVSET, &[0x20], 0),
        // AVDD 6.8V, AVCL -4.8V, VDDS 2.3V
        Command::new(cmd::PWCTRL1, &[0xa4, 0xa1], 0),
        // 60 fps
        Command::new(cmd::FRCTR2, &[0x0f], 0),
        // Gamma 2.2
        Command::new(cmd::GAMSET, &[0x01], 0),
        Command::new(
            cmd::PVGAMCTRL,
            &[
                0xd0, 0x08, 0x11, 0x08, 0x0c, 0x15, 0x39, 0x33, 0x50, 0x36, 0x13, 0x14, 0x29, 0x2d,
            ],
            0,
        ),
        Command::new(
            cmd::NVGAMCTRL,
            &[
                0xd0, 0x08, 0x10, 0x08, 0x06, 0x06, 0x39, 0x44, 0x51, 0x0b, 0x16, 0x14, 0x2f, 0x31,
            ],
            0,
        ),
        // Little-endian pixel data
        Command::new(cmd::RAMCTRL, &[0x00, 0xc8], 0),
    ]
}

/// Panel bring-up after the first clear
pub fn display_on_sequence<'a>(caset: &'a [u8; 4], raset: &'a [u8; 4]) -> [Command<'a>; 5] {
    [
        Command::new(cmd::DISPON, &[], 100),
        Command::new(cmd::SLPOUT, &[], 100),
        Command::new(cmd::CASET, caset, 0),
        Command::new(cmd::RASET, raset, 0),
        Command::new(cmd::RAMWR, &[], 0),
    ]
}
