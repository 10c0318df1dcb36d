//! Geometric transforms: mirrors and shears
//!
//! Flips keep the buffer dimensions. Shears grow the sheared axis so the
//! whole source fits; uncovered output pixels are fully transparent.

use crate::PixelBuffer;
use crate::filters::par_rows;
use image::imageops;

/// Largest shear factor `|tan(angle)|` honoured; angles near 90° saturate here
pub const MAX_SHEAR_FACTOR: f64 = 16.0;

/// Mirror left-right
pub fn flip_h(img: &PixelBuffer) -> PixelBuffer {
    imageops::flip_horizontal(img)
}

/// Mirror top-bottom
pub fn flip_v(img: &PixelBuffer) -> PixelBuffer {
    imageops::flip_vertical(img)
}

/// Shear factor for an angle in degrees, capped at [`MAX_SHEAR_FACTOR`]
pub fn shear_factor(degrees: f64) -> f64 {
    degrees
        .to_radians()
        .tan()
        .clamp(-MAX_SHEAR_FACTOR, MAX_SHEAR_FACTOR)
}

/// Length of the sheared axis for a given cross-axis length
fn sheared_extent(along: u32, across: u32, factor: f64) -> u32 {
    along + (across as f64 * factor.abs()).round() as u32
}

/// Output dimensions of [`shear_h`]
pub fn shear_h_dimensions(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    (sheared_extent(width, height, shear_factor(degrees)), height)
}

/// Output dimensions of [`shear_v`]
pub fn shear_v_dimensions(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    (width, sheared_extent(height, width, shear_factor(degrees)))
}

/// Horizontal shear about the image centre
///
/// Row `y` is displaced by `(y - cy) * tan(angle)` pixels.
pub fn shear_h(img: &PixelBuffer, degrees: f64) -> PixelBuffer {
    let (width, height) = img.dimensions();
    let factor = shear_factor(degrees);
    let (out_w, out_h) = shear_h_dimensions(width, height, degrees);

    let src_cx = width as f64 / 2.0;
    let dst_cx = out_w as f64 / 2.0;
    let cy = height as f64 / 2.0;

    par_rows(out_w, out_h, |y, row| {
        let dy = y as f64 + 0.5 - cy;
        for x in 0..out_w {
            let sx = (x as f64 + 0.5 - dst_cx) - dy * factor + src_cx;
            let sx = sx.floor();
            if sx < 0.0 || sx >= width as f64 {
                continue;
            }
            let idx = x as usize * 4;
            row[idx..idx + 4].copy_from_slice(&img.get_pixel(sx as u32, y).0);
        }
    })
}

/// Vertical shear about the image centre
///
/// Column `x` is displaced by `(x - cx) * tan(angle)` pixels.
pub fn shear_v(img: &PixelBuffer, degrees: f64) -> PixelBuffer {
    let (width, height) = img.dimensions();
    let factor = shear_factor(degrees);
    let (out_w, out_h) = shear_v_dimensions(width, height, degrees);

    let src_cy = height as f64 / 2.0;
    let dst_cy = out_h as f64 / 2.0;
    let cx = width as f64 / 2.0;

    par_rows(out_w, out_h, |y, row| {
        for x in 0..out_w {
            let dx = x as f64 + 0.5 - cx;
            let sy = (y as f64 + 0.5 - dst_cy) - dx * factor + src_cy;
            let sy = sy.floor();
            if sy < 0.0 || sy >= height as f64 {
                continue;
            }
            let idx = x as usize * 4;
            row[idx..idx + 4].copy_from_slice(&img.get_pixel(x, sy as u32).0);
        }
    })
}
