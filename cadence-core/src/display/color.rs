//! RGB565 colors

/// 16-bit RGB565 pixel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    pub const YELLOW: Self = Self::from_rgb(255, 255, 0);
    pub const CYAN: Self = Self::from_rgb(0, 255, 255);
    pub const MAGENTA: Self = Self::from_rgb(255, 0, 255);
    pub const GREY: Self = Self::from_rgb(128, 128, 128);

    /// Pack 8-bit channels, dropping the low bits (5/6/5)
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Wire order expected by the panel (high byte first)
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primaries() {
        assert_eq!(Rgb565::RED.0, 0xF800);
        assert_eq!(Rgb565::GREEN.0, 0x07E0);
        assert_eq!(Rgb565::BLUE.0, 0x001F);
        assert_eq!(Rgb565::WHITE.0, 0xFFFF);
    }

    #[test]
    fn test_low_bits_truncated() {
        assert_eq!(Rgb565::from_rgb(7, 3, 7), Rgb565::BLACK);
    }

    #[test]
    fn test_big_endian_bytes() {
        assert_eq!(Rgb565(0x1234).to_be_bytes(), [0x12, 0x34]);
    }
}
