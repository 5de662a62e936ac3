//! Display configuration
//!
//! Everything needed to bring up the panel and the text pipeline, loadable
//! from a TOML document or a postcard blob, with built-in defaults for a
//! 240x240 module.

use serde::{Deserialize, Serialize};

use lumen_core::GlyphCacheConfig;
use lumen_hal::SpiConfig;

/// Largest panel the ST7789 controller addresses
pub const MAX_WIDTH: u16 = 240;
pub const MAX_HEIGHT: u16 = 320;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML document is malformed or has wrong value types
    TomlParse,
    /// Postcard blob could not be decoded
    Deserialize,
    /// Output buffer too small for the postcard blob
    Serialize,
    /// Values out of range
    Invalid,
}

/// Panel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct PanelConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Lines per slice buffer
    pub slice_lines: u16,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            slice_lines: 20,
        }
    }
}

impl PanelConfig {
    /// Pixels in one slice buffer
    pub const fn slice_pixels(&self) -> usize {
        self.width as usize * self.slice_lines as usize
    }

    pub fn is_valid(&self) -> bool {
        (1..=MAX_WIDTH).contains(&self.width)
            && (1..=MAX_HEIGHT).contains(&self.height)
            && (1..=self.height).contains(&self.slice_lines)
    }
}

/// GPIO numbers of the display lines
///
/// Consumed by board bring-up code when it constructs the bus and pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct PinConfig {
    pub reset: u8,
    pub dc: u8,
    pub mosi: u8,
    pub sclk: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            reset: 19,
            dc: 22,
            mosi: 23,
            sclk: 18,
        }
    }
}

impl PinConfig {
    /// All four lines on distinct GPIOs
    pub fn is_valid(&self) -> bool {
        let pins = [self.reset, self.dc, self.mosi, self.sclk];
        pins.iter()
            .enumerate()
            .all(|(i, p)| !pins[i + 1..].contains(p))
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DisplayConfig {
    pub panel: PanelConfig,
    pub pins: PinConfig,
    pub bus: SpiConfig,
    pub glyph_cache: GlyphCacheConfig,
}

impl DisplayConfig {
    /// Check every section for out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bus_ok = self.bus.frequency > 0 && (1..=2).contains(&self.bus.queue_size);
        if self.panel.is_valid() && self.pins.is_valid() && bus_ok && self.glyph_cache.is_valid() {
            Ok(())
        } else {
            Err(ConfigError::Invalid)
        }
    }

    /// Parse and validate a TOML document
    ///
    /// Missing sections and keys take their default values.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("TOML parse error: {}", defmt::Debug2Format(&_e));
            ConfigError::TomlParse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Decode and validate a postcard blob
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode into `buf`, returning the number of bytes used
    pub fn to_postcard(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        postcard::to_slice(self, buf)
            .map(|used| used.len())
            .map_err(|_| ConfigError::Serialize)
    }
}

/// Resolve the configuration from whatever storage provides
///
/// Tries the TOML document first, then the postcard blob, then falls back
/// to [`DisplayConfig::default`]. Sources that are present but invalid are
/// skipped with a warning.
pub fn load(toml_source: Option<&str>, blob: Option<&[u8]>) -> DisplayConfig {
    if let Some(input) = toml_source {
        match DisplayConfig::from_toml(input) {
            Ok(config) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Loaded display configuration from TOML");
                return config;
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Failed to load TOML config: {:?}, trying binary", _e);
            }
        }
    }

    if let Some(bytes) = blob {
        match DisplayConfig::from_postcard(bytes) {
            Ok(config) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Loaded display configuration from binary");
                return config;
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Failed to load binary config: {:?}", _e);
            }
        }
    }

    #[cfg(feature = "defmt")]
    defmt::info!("Using default display configuration");
    DisplayConfig::default()
}
