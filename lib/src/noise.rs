//! Synthetic noise layers and the blend modes used to composite them
//!
//! Noise is generated at the source's dimensions and blended underneath it:
//! uniform, Gaussian and Perlin noise use overlay, binary noise a 50% mix.

use crate::PixelBuffer;
use image::Rgba;
use rand::Rng;
use rand::seq::SliceRandom;

/// Standard deviation of the Gaussian noise around mid-gray
const GAUSSIAN_STD_DEV: f64 = 32.0;

/// Perlin octaves summed into one layer
const PERLIN_OCTAVES: u32 = 3;

/// Kind of noise layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    /// Independent uniform value per channel (coloured)
    Uniform,
    /// Black or white per pixel (monochrome)
    Binary,
    /// Normal distribution around mid-gray (monochrome)
    Gaussian,
    /// Fractal gradient noise (monochrome)
    Perlin,
}

/// Generate a noise layer of `width` x `height`
///
/// `frequency` only affects [`NoiseKind::Perlin`]: it scales pixel
/// coordinates into noise space, so `0.0` yields a flat mid-gray layer.
pub fn generate<R: Rng + ?Sized>(
    kind: NoiseKind,
    width: u32,
    height: u32,
    frequency: f64,
    rng: &mut R,
) -> PixelBuffer {
    match kind {
        NoiseKind::Uniform => PixelBuffer::from_fn(width, height, |_, _| {
            Rgba([
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                255,
            ])
        }),
        NoiseKind::Binary => PixelBuffer::from_fn(width, height, |_, _| {
            let v = if rng.gen_bool(0.5) { 255 } else { 0 };
            Rgba([v, v, v, 255])
        }),
        NoiseKind::Gaussian => PixelBuffer::from_fn(width, height, |_, _| {
            let v = (128.0 + standard_normal(rng) * GAUSSIAN_STD_DEV)
                .round()
                .clamp(0.0, 255.0) as u8;
            Rgba([v, v, v, 255])
        }),
        NoiseKind::Perlin => {
            let perlin = Perlin::new(rng);
            PixelBuffer::from_fn(width, height, |x, y| {
                let n = perlin.fractal(x as f64 * frequency, y as f64 * frequency);
                let v = ((n + 1.0) * 0.5 * 255.0).round().clamp(0.0, 255.0) as u8;
                Rgba([v, v, v, 255])
            })
        }
    }
}

/// Sample N(0, 1) with the Box-Muller transform
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Overlay `top` onto `base`, channel-wise on RGB; alpha comes from `top`
///
/// `base < 0.5 ? 2·base·top : 1 - 2·(1-base)·(1-top)` on normalized values.
pub(crate) fn overlay(base: &PixelBuffer, top: &PixelBuffer) -> PixelBuffer {
    blend(base, top, |b, t| {
        if b < 0.5 {
            2.0 * b * t
        } else {
            1.0 - 2.0 * (1.0 - b) * (1.0 - t)
        }
    })
}

/// Linear mix `base·(1-opacity) + top·opacity`; alpha comes from `top`
pub(crate) fn opacity(base: &PixelBuffer, top: &PixelBuffer, opacity: f64) -> PixelBuffer {
    let opacity = opacity.clamp(0.0, 1.0);
    blend(base, top, |b, t| b * (1.0 - opacity) + t * opacity)
}

fn blend(base: &PixelBuffer, top: &PixelBuffer, mode: impl Fn(f64, f64) -> f64) -> PixelBuffer {
    assert_eq!(
        base.dimensions(),
        top.dimensions(),
        "Blend layers must have equal dimensions"
    );

    PixelBuffer::from_fn(top.width(), top.height(), |x, y| {
        let b = base.get_pixel(x, y);
        let t = top.get_pixel(x, y);
        let mut out = [0u8; 4];
        for c in 0..3 {
            let v = mode(b[c] as f64 / 255.0, t[c] as f64 / 255.0);
            out[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        out[3] = t[3];
        Rgba(out)
    })
}

/// Generate `kind` noise matching `img` and composite it with the image
pub fn apply<R: Rng + ?Sized>(
    img: &PixelBuffer,
    kind: NoiseKind,
    frequency: f64,
    rng: &mut R,
) -> PixelBuffer {
    let layer = generate(kind, img.width(), img.height(), frequency, rng);
    match kind {
        NoiseKind::Binary => opacity(&layer, img, 0.5),
        NoiseKind::Uniform | NoiseKind::Gaussian | NoiseKind::Perlin => overlay(&layer, img),
    }
}

/// Improved Perlin gradient noise with a shuffled permutation table
struct Perlin {
    perm: [u8; 512],
}

impl Perlin {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Octave sum, each octave at double frequency and half amplitude,
    /// normalized back into `[-1, 1]`
    fn fractal(&self, x: f64, y: f64) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        let mut scale = 1.0;
        let mut norm = 0.0;

        for _ in 0..PERLIN_OCTAVES {
            sum += self.noise(x * scale, y * scale) * amplitude;
            norm += amplitude;
            amplitude /= 2.0;
            scale *= 2.0;
        }

        (sum / norm).clamp(-1.0, 1.0)
    }

    fn noise(&self, x: f64, y: f64) -> f64 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();

        let u = fade(xf);
        let v = fade(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi] as usize;
        let ab = p[p[xi] as usize + yi + 1] as usize;
        let ba = p[p[xi + 1] as usize + yi] as usize;
        let bb = p[p[xi + 1] as usize + yi + 1] as usize;

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);

        lerp(x1, x2, v)
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}
