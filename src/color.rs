//! Color conversions between the descriptor, the controller and the drawing
//! surface.
//!
//! Descriptors carry colors as `"r,g,b"` triplets, controllers send them as a
//! packed integer with red in the low byte, and the drawing surface wants
//! `#RRGGBB`.

use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Decode the controller representation: low byte red, mid byte green,
    /// high byte blue. Bits above 24 are ignored.
    pub const fn from_packed(packed: u32) -> Self {
        Rgb {
            r: (packed & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: ((packed >> 16) & 0xFF) as u8,
        }
    }

    /// Encode into the controller representation
    pub const fn to_packed(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }

    /// `#RRGGBB`, upper-case, always six digits
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error for color strings that are neither `r,g,b` nor `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#RRGGBB`, `#RGB` and the descriptor's `r,g,b` triplet
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ColorParseError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(err)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
                [r1, r2, g1, g2, b1, b2] => {
                    Ok(Rgb::new(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
                }
                _ => Err(err()),
            };
        }

        let channels: Vec<u8> = s
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| err())?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

/// `"r,g,b"` → `#RRGGBB`
pub fn rgb_to_hex(rgb: &str) -> Result<String, ColorParseError> {
    Ok(rgb.parse::<Rgb>()?.to_hex())
}

/// `#RRGGBB` → `"r,g,b"`
pub fn hex_to_rgb(hex: &str) -> Result<String, ColorParseError> {
    let c = hex.parse::<Rgb>()?;
    Ok(format!("{},{},{}", c.r, c.g, c.b))
}

/// Controller packed integer → `#RRGGBB`.
///
/// The controller sends colors as plain numbers; fractional parts are
/// dropped and values outside the 24-bit range keep only their low 24 bits.
pub fn packed_to_hex(packed: f64) -> String {
    let raw = if packed.is_finite() { packed.trunc() as i64 } else { 0 };
    Rgb::from_packed((raw & 0x00FF_FFFF) as u32).to_hex()
}

/// `#RRGGBB` → controller packed integer
pub fn hex_to_packed(hex: &str) -> Result<u32, ColorParseError> {
    Ok(hex.parse::<Rgb>()?.to_packed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_triplet_to_hex_is_zero_padded() {
        assert_eq!(rgb_to_hex("0,0,0").unwrap(), "#000000");
        assert_eq!(rgb_to_hex("0,0,255").unwrap(), "#0000FF");
        assert_eq!(rgb_to_hex("255,128,1").unwrap(), "#FF8001");
        assert_eq!(rgb_to_hex(" 10, 20 ,30").unwrap(), "#0A141E");
    }

    #[test]
    fn hex_to_rgb_triplet() {
        assert_eq!(hex_to_rgb("#FF8001").unwrap(), "255,128,1");
        assert_eq!(hex_to_rgb("#ff8001").unwrap(), "255,128,1");
        assert_eq!(hex_to_rgb("#F00").unwrap(), "255,0,0");
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(rgb_to_hex("1,2").is_err());
        assert!(rgb_to_hex("256,0,0").is_err());
        assert!(hex_to_rgb("#12345").is_err());
        assert!(hex_to_rgb("#GG0000").is_err());
    }

    #[test]
    fn packed_byte_order_is_red_low() {
        assert_eq!(packed_to_hex(255.0), "#FF0000");
        assert_eq!(packed_to_hex(65280.0), "#00FF00");
        assert_eq!(packed_to_hex(16711680.0), "#0000FF");
        assert_eq!(packed_to_hex(0x00563412 as f64), "#123456");
    }

    #[test]
    fn packed_ignores_high_bits_and_non_finite() {
        assert_eq!(packed_to_hex((0x0100_00FF_u32) as f64), "#FF0000");
        assert_eq!(packed_to_hex(f64::NAN), "#000000");
    }

    #[test]
    fn hex_packed_round_trip() {
        for hex in ["#000000", "#FFFFFF", "#123456", "#A0B0C0", "#00FF00"] {
            let packed = hex_to_packed(hex).unwrap();
            assert_eq!(packed_to_hex(packed as f64), hex);
        }
    }
}
