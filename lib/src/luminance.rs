//! Luminance extraction and density alphabet quantization
//!
//! An alphabet is indexed from black (first character) to white (last
//! character). The presets below assume light glyphs on a dark background;
//! reverse an alphabet for dark-on-light output.

use crate::error::{Error, Result};
use image::Rgba;

/// Unicode shade blocks, the start-up default
pub const BLOCKS: &str = "░▒▓█";

/// Standard 10-level ramp from space to `@`
pub const STANDARD: &str = " .:-=+*#%@";

/// Four levels, less noisy
pub const MINIMAL: &str = " .:#";

/// Long ramp for large output widths
pub const DETAILED: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Named alphabets offered by the preset selector
pub const PRESETS: [(&str, &str); 4] = [
    ("Blocks", BLOCKS),
    ("Standard", STANDARD),
    ("Minimal", MINIMAL),
    ("Detailed", DETAILED),
];

/// Gray level of a pixel using the ITU-R 601 weights (0.299, 0.587, 0.114)
///
/// Channels are widened to 16 bits and combined in fixed point so the result
/// is exact for black (0) and white (255). Alpha is ignored.
pub fn gray_level(pixel: &Rgba<u8>) -> u8 {
    let r = pixel[0] as u64 * 257;
    let g = pixel[1] as u64 * 257;
    let b = pixel[2] as u64 * 257;

    ((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24) as u8
}

/// Normalized luminance of a pixel in `[0.0, 1.0]`
pub fn to_intensity(pixel: &Rgba<u8>) -> f32 {
    gray_level(pixel) as f32 / 255.0
}

/// Map an intensity onto an alphabet index
///
/// `index = floor((len - 1) * intensity)`, clamped into `[0, len - 1]`.
/// Black selects the first character and white the last.
///
/// # Arguments
/// * `intensity` - Normalized luminance; NaN counts as black
/// * `alphabet_len` - Number of characters in the alphabet
///
/// # Returns
/// Index into the alphabet, 0 for alphabets of length 0 or 1
pub fn quantize(intensity: f32, alphabet_len: usize) -> usize {
    if alphabet_len <= 1 {
        return 0;
    }
    let last = alphabet_len - 1;
    let intensity = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };

    ((last as f32 * intensity).floor() as usize).min(last)
}

/// Ordered character set used to represent luminance buckets
///
/// Guaranteed non-empty and not whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityAlphabet {
    chars: Vec<char>,
}

impl DensityAlphabet {
    /// Build an alphabet from user text
    ///
    /// Fails with [`Error::EmptyAlphabet`] when `text` is empty or contains
    /// only whitespace. Interior and edge spaces are kept, since a leading
    /// space is the usual "darkest" glyph.
    pub fn new(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::EmptyAlphabet);
        }
        Ok(Self {
            chars: text.chars().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the alphabet has no characters
    ///
    /// False for any alphabet built by [`new`](Self::new).
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character for a normalized intensity
    pub fn char_for(&self, intensity: f32) -> char {
        self.chars[quantize(intensity, self.chars.len())]
    }

    /// Character for a pixel
    pub fn char_for_pixel(&self, pixel: &Rgba<u8>) -> char {
        self.char_for(to_intensity(pixel))
    }
}

impl Default for DensityAlphabet {
    fn default() -> Self {
        Self {
            chars: BLOCKS.chars().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_level_extremes() {
        assert_eq!(gray_level(&Rgba([0, 0, 0, 255])), 0);
        assert_eq!(gray_level(&Rgba([255, 255, 255, 255])), 255);
    }

    #[test]
    fn test_gray_level_primaries() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(gray_level(&Rgba([255, 0, 0, 255])), 76);
        assert_eq!(gray_level(&Rgba([0, 255, 0, 255])), 150);
        assert_eq!(gray_level(&Rgba([0, 0, 255, 255])), 29);
    }

    #[test]
    fn test_gray_level_ignores_alpha() {
        assert_eq!(
            gray_level(&Rgba([90, 120, 30, 0])),
            gray_level(&Rgba([90, 120, 30, 255]))
        );
    }

    #[test]
    fn test_quantize_bounds() {
        assert_eq!(quantize(0.0, 4), 0);
        assert_eq!(quantize(1.0, 4), 3);
        assert_eq!(quantize(0.5, 4), 1);
        assert_eq!(quantize(0.99, 10), 8);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        assert_eq!(quantize(-0.5, 4), 0);
        assert_eq!(quantize(3.0, 4), 3);
        assert_eq!(quantize(f32::NAN, 4), 0);
    }

    #[test]
    fn test_quantize_single_character() {
        assert_eq!(quantize(0.0, 1), 0);
        assert_eq!(quantize(1.0, 1), 0);
    }

    #[test]
    fn test_alphabet_rejects_blank() {
        assert!(matches!(DensityAlphabet::new(""), Err(Error::EmptyAlphabet)));
        assert!(matches!(DensityAlphabet::new(" "), Err(Error::EmptyAlphabet)));
        assert!(matches!(
            DensityAlphabet::new(" \t "),
            Err(Error::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_alphabet_keeps_spaces() {
        let alphabet = DensityAlphabet::new(STANDARD).unwrap();
        assert_eq!(alphabet.len(), 10);
        assert_eq!(alphabet.char_for(0.0), ' ');
        assert_eq!(alphabet.char_for(1.0), '@');
    }

    #[test]
    fn test_alphabet_counts_unicode_chars() {
        let alphabet = DensityAlphabet::new(BLOCKS).unwrap();
        assert_eq!(alphabet.len(), 4);
        assert_eq!(alphabet.char_for_pixel(&Rgba([0, 0, 0, 255])), '░');
        assert_eq!(alphabet.char_for_pixel(&Rgba([255, 255, 255, 255])), '█');
    }

    #[test]
    fn test_presets_are_valid() {
        for (name, text) in PRESETS {
            assert!(DensityAlphabet::new(text).is_ok(), "preset {name}");
        }
    }
}
