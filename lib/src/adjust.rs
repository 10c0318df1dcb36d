//! Per-pixel colour adjustments
//!
//! These never look at neighbours, so each pixel is mapped independently in
//! parallel. Alpha is always preserved.

use crate::PixelBuffer;
use crate::luminance::gray_level;
use rayon::prelude::*;

/// Apply `f` to every RGBA pixel of a copy of `img`
pub(crate) fn map_pixels<F>(img: &PixelBuffer, f: F) -> PixelBuffer
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    let mut output = img.clone();
    output.par_chunks_mut(4).for_each(f);
    output
}

/// Apply a 256-entry lookup table to the RGB channels
fn apply_lut(img: &PixelBuffer, lut: &[u8; 256]) -> PixelBuffer {
    map_pixels(img, |px| {
        for c in &mut px[..3] {
            *c = lut[*c as usize];
        }
    })
}

fn build_lut(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = f(i as f64).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Scale every channel by `1 + change`; `change` is in `[-1, 1]`
pub fn brightness(img: &PixelBuffer, change: f64) -> PixelBuffer {
    if change == 0.0 {
        return img.clone();
    }
    apply_lut(img, &build_lut(|v| v * (1.0 + change)))
}

/// Stretch channels away from (or towards) mid-gray by `1 + change`
pub fn contrast(img: &PixelBuffer, change: f64) -> PixelBuffer {
    if change == 0.0 {
        return img.clone();
    }
    apply_lut(
        img,
        &build_lut(|v| ((v / 255.0 - 0.5) * (1.0 + change) + 0.5) * 255.0),
    )
}

/// Gamma correction `255 * (v / 255)^(1 / gamma)`; gamma must be positive
pub fn gamma(img: &PixelBuffer, gamma: f64) -> PixelBuffer {
    let exponent = 1.0 / gamma;
    apply_lut(img, &build_lut(|v| 255.0 * (v / 255.0).powf(exponent)))
}

/// Replace RGB with the pixel's gray level
pub fn grayscale(img: &PixelBuffer) -> PixelBuffer {
    map_pixels(img, |px| {
        let gray = gray_level(&image::Rgba([px[0], px[1], px[2], px[3]]));
        px[..3].fill(gray);
    })
}

/// Classic sepia tone matrix
pub fn sepia(img: &PixelBuffer) -> PixelBuffer {
    map_pixels(img, |px| {
        let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
        let out = [
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        ];
        for (c, v) in px[..3].iter_mut().zip(out) {
            *c = v.round().clamp(0.0, 255.0) as u8;
        }
    })
}

/// Invert RGB
pub fn invert(img: &PixelBuffer) -> PixelBuffer {
    map_pixels(img, |px| {
        for c in &mut px[..3] {
            *c = 255 - *c;
        }
    })
}

/// Binary segmentation: gray level at or above `level` becomes white
pub fn threshold(img: &PixelBuffer, level: u8) -> PixelBuffer {
    map_pixels(img, |px| {
        let gray = gray_level(&image::Rgba([px[0], px[1], px[2], px[3]]));
        let v = if gray >= level { 255 } else { 0 };
        px[..3].fill(v);
    })
}

/// Rotate hue by `degrees`
pub fn hue(img: &PixelBuffer, degrees: f64) -> PixelBuffer {
    let shift = degrees / 360.0;
    if shift.fract() == 0.0 {
        return img.clone();
    }
    map_pixels(img, |px| {
        let (h, s, l) = rgb_to_hsl(px[0], px[1], px[2]);
        let h = (h + shift).rem_euclid(1.0);
        let (r, g, b) = hsl_to_rgb(h, s, l);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    })
}

/// Scale HSL saturation by `1 + change`
pub fn saturation(img: &PixelBuffer, change: f64) -> PixelBuffer {
    if change == 0.0 {
        return img.clone();
    }
    map_pixels(img, |px| {
        let (h, s, l) = rgb_to_hsl(px[0], px[1], px[2]);
        let s = (s * (1.0 + change)).clamp(0.0, 1.0);
        let (r, g, b) = hsl_to_rgb(h, s, l);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    })
}

/// Convert 8-bit RGB to HSL, all components in `[0, 1]`
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = if l < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };

    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (sector / 6.0, s, l)
}

/// Convert HSL (all in `[0, 1]`) back to 8-bit RGB
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    (
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
    )
}
