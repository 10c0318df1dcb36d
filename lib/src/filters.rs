//! Neighborhood filters: blurs, morphology and convolution kernels
//!
//! Every filter reads a source buffer and writes a fresh one of the same
//! dimensions. Rows are produced in parallel; out-of-bounds samples are
//! clamped to the nearest edge pixel.

use crate::PixelBuffer;
use crate::luminance::gray_level;
use image::Rgba;
use imageproc::filter as ip;
use rayon::prelude::*;

/// Build a new buffer by filling each row independently
///
/// `fill(y, row)` receives the output row as raw RGBA bytes.
pub(crate) fn par_rows<F>(width: u32, height: u32, fill: F) -> PixelBuffer
where
    F: Fn(u32, &mut [u8]) + Send + Sync,
{
    let mut output = PixelBuffer::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    output
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| fill(y as u32, row));

    output
}

/// Pixel at `(x, y)` with coordinates clamped into the image
#[inline]
fn clamped(img: &PixelBuffer, x: i64, y: i64) -> &Rgba<u8> {
    let (width, height) = img.dimensions();
    let x = x.clamp(0, width as i64 - 1) as u32;
    let y = y.clamp(0, height as i64 - 1) as u32;
    img.get_pixel(x, y)
}

/// Square convolution kernel with an odd side length
#[derive(Debug, Clone)]
pub(crate) struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from row-major weights
    ///
    /// # Panics
    /// Panics if `weights.len()` is not the square of an odd number.
    pub(crate) fn new(weights: Vec<f32>) -> Self {
        let size = (weights.len() as f64).sqrt() as usize;
        assert!(
            size * size == weights.len() && size % 2 == 1,
            "Kernel must be square with an odd side"
        );
        Self { size, weights }
    }

    fn radius(&self) -> i64 {
        (self.size / 2) as i64
    }
}

/// Convolve the RGB channels with `kernel`, adding `bias` to each sum
///
/// Alpha is copied from the source.
pub(crate) fn convolve(img: &PixelBuffer, kernel: &Kernel, bias: f32) -> PixelBuffer {
    let (width, height) = img.dimensions();
    let radius = kernel.radius();

    par_rows(width, height, |y, row| {
        for x in 0..width {
            let mut sum = [0.0f32; 3];

            for ky in 0..kernel.size {
                for kx in 0..kernel.size {
                    let weight = kernel.weights[ky * kernel.size + kx];
                    if weight == 0.0 {
                        continue;
                    }
                    let sample = clamped(
                        img,
                        x as i64 + kx as i64 - radius,
                        y as i64 + ky as i64 - radius,
                    );
                    for c in 0..3 {
                        sum[c] += sample[c] as f32 * weight;
                    }
                }
            }

            let idx = x as usize * 4;
            for c in 0..3 {
                row[idx + c] = (sum[c] + bias).round().clamp(0.0, 255.0) as u8;
            }
            row[idx + 3] = img.get_pixel(x, y)[3];
        }
    })
}

/// Gaussian blur with standard deviation `sigma`; non-positive sigma is a no-op
pub fn gaussian_blur(img: &PixelBuffer, sigma: f32) -> PixelBuffer {
    if sigma <= 0.0 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    ip::gaussian_blur_f32(img, sigma)
}

/// One pass of a box blur along a single axis
fn box_blur_pass(img: &PixelBuffer, radius: u32, horizontal: bool) -> PixelBuffer {
    let (width, height) = img.dimensions();
    let radius = radius as i64;
    let taps = (2 * radius + 1) as f32;

    par_rows(width, height, |y, row| {
        for x in 0..width {
            let mut sum = [0.0f32; 4];

            for offset in -radius..=radius {
                let sample = if horizontal {
                    clamped(img, x as i64 + offset, y as i64)
                } else {
                    clamped(img, x as i64, y as i64 + offset)
                };
                for c in 0..4 {
                    sum[c] += sample[c] as f32;
                }
            }

            let idx = x as usize * 4;
            for c in 0..4 {
                row[idx + c] = (sum[c] / taps).round() as u8;
            }
        }
    })
}

/// Mean over a `(2r+1)²` square, computed as two separable passes
pub fn box_blur(img: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 {
        return img.clone();
    }
    let temp = box_blur_pass(img, radius, true);
    box_blur_pass(&temp, radius, false)
}

/// Per-channel extremum over a disc of `radius`
fn morphology(img: &PixelBuffer, radius: u32, take_max: bool) -> PixelBuffer {
    if radius == 0 {
        return img.clone();
    }
    let (width, height) = img.dimensions();
    let r = radius as i64;
    let r_sq = r * r;

    par_rows(width, height, |y, row| {
        for x in 0..width {
            let mut acc = if take_max { [0u8; 4] } else { [255u8; 4] };

            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r_sq {
                        continue;
                    }
                    let sample = clamped(img, x as i64 + dx, y as i64 + dy);
                    for c in 0..4 {
                        acc[c] = if take_max {
                            acc[c].max(sample[c])
                        } else {
                            acc[c].min(sample[c])
                        };
                    }
                }
            }

            let idx = x as usize * 4;
            row[idx..idx + 4].copy_from_slice(&acc);
        }
    })
}

/// Morphological dilation: each channel takes the neighborhood maximum
pub fn dilate(img: &PixelBuffer, radius: u32) -> PixelBuffer {
    morphology(img, radius, true)
}

/// Morphological erosion: each channel takes the neighborhood minimum
pub fn erode(img: &PixelBuffer, radius: u32) -> PixelBuffer {
    morphology(img, radius, false)
}

/// Per-channel median over a `(2r+1)²` square
pub fn median(img: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    ip::median_filter(img, radius, radius)
}

/// Laplacian-style edge detector: all taps -1, centre `(2r+1)² - 1`
///
/// Flat regions go black; edges keep their intensity.
pub fn edge_detection(img: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 {
        return img.clone();
    }
    let size = 2 * radius as usize + 1;
    let mut weights = vec![-1.0; size * size];
    weights[size * size / 2] = (size * size - 1) as f32;

    convolve(img, &Kernel::new(weights), 0.0)
}

/// Emboss with a diagonal kernel over a mid-gray bias
pub fn emboss(img: &PixelBuffer) -> PixelBuffer {
    #[rustfmt::skip]
    let kernel = Kernel::new(vec![
        -1.0, -1.0, 0.0,
        -1.0,  0.0, 1.0,
         0.0,  1.0, 1.0,
    ]);
    convolve(img, &kernel, 128.0)
}

/// Five-point sharpening kernel
pub fn sharpen(img: &PixelBuffer) -> PixelBuffer {
    #[rustfmt::skip]
    let kernel = Kernel::new(vec![
         0.0, -1.0,  0.0,
        -1.0,  5.0, -1.0,
         0.0, -1.0,  0.0,
    ]);
    convolve(img, &kernel, 0.0)
}

/// Sobel gradient magnitude of the gray image, written to all RGB channels
pub fn sobel(img: &PixelBuffer) -> PixelBuffer {
    let (width, height) = img.dimensions();

    par_rows(width, height, |y, row| {
        let gray = |x: i64, y: i64| gray_level(clamped(img, x, y)) as f32;
        let yi = y as i64;

        for x in 0..width {
            let xi = x as i64;

            // Gx:            Gy:
            // [-1  0  1]     [-1 -2 -1]
            // [-2  0  2]     [ 0  0  0]
            // [-1  0  1]     [ 1  2  1]
            let nw = gray(xi - 1, yi - 1);
            let n = gray(xi, yi - 1);
            let ne = gray(xi + 1, yi - 1);
            let w = gray(xi - 1, yi);
            let e = gray(xi + 1, yi);
            let sw = gray(xi - 1, yi + 1);
            let s = gray(xi, yi + 1);
            let se = gray(xi + 1, yi + 1);

            let gx = -nw + ne - 2.0 * w + 2.0 * e - sw + se;
            let gy = -nw - 2.0 * n - ne + sw + 2.0 * s + se;
            let magnitude = (gx * gx + gy * gy).sqrt().round().clamp(0.0, 255.0) as u8;

            let idx = x as usize * 4;
            row[idx] = magnitude;
            row[idx + 1] = magnitude;
            row[idx + 2] = magnitude;
            row[idx + 3] = img.get_pixel(x, y)[3];
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    fn dot(size: u32) -> PixelBuffer {
        let mut img = PixelBuffer::from_pixel(size, size, Rgba([0, 0, 0, 255]));
        img.put_pixel(size / 2, size / 2, Rgba([255, 255, 255, 255]));
        img
    }

    #[test]
    #[should_panic(expected = "Kernel must be square with an odd side")]
    fn test_kernel_rejects_even_side() {
        Kernel::new(vec![0.0; 4]);
    }

    #[test]
    fn test_identity_kernel() {
        let img = checker(5, 4);
        let mut weights = vec![0.0; 9];
        weights[4] = 1.0;
        assert_eq!(convolve(&img, &Kernel::new(weights), 0.0), img);
    }

    #[test]
    fn test_box_blur_flat_image_unchanged() {
        let img = PixelBuffer::from_pixel(8, 8, Rgba([40, 80, 120, 255]));
        assert_eq!(box_blur(&img, 3), img);
    }

    #[test]
    fn test_box_blur_averages_checker() {
        let img = checker(9, 9);
        let out = box_blur(&img, 1);
        let centre = out.get_pixel(4, 4);
        // 5 of the 9 taps around a white centre are white: ~142
        assert!(centre[0] > 100 && centre[0] < 160);
        assert_eq!(centre[3], 255);
    }

    #[test]
    fn test_gaussian_zero_sigma_is_identity() {
        let img = checker(6, 6);
        assert_eq!(gaussian_blur(&img, 0.0), img);
        assert_eq!(gaussian_blur(&img, -2.0), img);
    }

    #[test]
    fn test_gaussian_preserves_dimensions() {
        let img = checker(12, 7);
        assert_eq!(gaussian_blur(&img, 1.5).dimensions(), (12, 7));
    }

    #[test]
    fn test_dilate_grows_dot() {
        let out = dilate(&dot(7), 1);
        assert_eq!(out.get_pixel(3, 3)[0], 255);
        assert_eq!(out.get_pixel(2, 3)[0], 255);
        assert_eq!(out.get_pixel(3, 4)[0], 255);
        // Diagonal neighbour lies outside the unit disc
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn test_erode_removes_dot() {
        let out = erode(&dot(7), 1);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_median_removes_salt() {
        let out = median(&dot(7), 1);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_edge_detection_flat_is_black() {
        let img = PixelBuffer::from_pixel(6, 6, Rgba([200, 100, 50, 255]));
        let out = edge_detection(&img, 1);
        assert!(out.pixels().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0 && p[3] == 255));
    }

    #[test]
    fn test_emboss_flat_is_mid_gray() {
        let img = PixelBuffer::from_pixel(5, 5, Rgba([10, 200, 90, 255]));
        let out = emboss(&img);
        assert!(out.pixels().all(|p| p[0] == 128 && p[1] == 128 && p[2] == 128));
    }

    #[test]
    fn test_sharpen_flat_is_identity() {
        let img = PixelBuffer::from_pixel(5, 5, Rgba([10, 200, 90, 77]));
        assert_eq!(sharpen(&img), img);
    }

    #[test]
    fn test_sobel_detects_vertical_step() {
        let img = PixelBuffer::from_fn(6, 3, |x, _| {
            if x < 3 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let out = sobel(&img);
        assert_eq!(out.get_pixel(0, 1)[0], 0);
        assert_eq!(out.get_pixel(2, 1)[0], 255);
        assert_eq!(out.get_pixel(5, 1)[0], 0);
    }

    #[test]
    fn test_filters_handle_empty_buffer() {
        let img = PixelBuffer::new(0, 0);
        assert_eq!(box_blur(&img, 2).dimensions(), (0, 0));
        assert_eq!(dilate(&img, 2).dimensions(), (0, 0));
        assert_eq!(median(&img, 2).dimensions(), (0, 0));
        assert_eq!(sobel(&img).dimensions(), (0, 0));
        assert_eq!(emboss(&img).dimensions(), (0, 0));
    }
}
