// Configuration loading and persistence

pub mod error;
pub mod settings;
pub mod store;
pub mod theme;

pub use error::ConfigError;
pub use settings::Settings;
pub use store::{FileStore, MemoryStore, Store, StoreExt};
pub use theme::Theme;

/// Framework-agnostic RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Convert from hex u32 (0xRRGGBB)
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// 24-bit ANSI foreground escape sequence
    pub fn ansi_fg(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}
