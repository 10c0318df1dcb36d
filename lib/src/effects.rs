//! Effect catalog and dispatch
//!
//! Every effect is a pure function from one buffer to a new buffer. Unknown
//! identifiers parse to [`Effect::None`], which passes the input through.
//!
//! Intensities outside an effect's nominal domain are clamped (see
//! [`EffectSpec::effective_intensity`]); non-finite values fall back to the
//! effect's neutral value.

use crate::noise::{self, NoiseKind};
use crate::{PixelBuffer, adjust, filters, transform};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Largest radius accepted by the neighborhood filters
pub const MAX_RADIUS: f64 = 64.0;

/// Closed catalog of supported effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Effect {
    /// Passthrough
    #[default]
    None,
    GaussianBlur,
    Blur,
    Dilate,
    Erode,
    EdgeDetection,
    Emboss,
    Invert,
    Grayscale,
    Sepia,
    Sharpen,
    Sobel,
    Median,
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Gamma,
    Threshold,
    FlipH,
    FlipV,
    ShearH,
    ShearV,
    NoiseUniform,
    NoiseBinary,
    NoiseGaussian,
    NoisePerlin,
}

impl Effect {
    /// Every effect in selector order, starting with [`Effect::None`]
    pub const ALL: [Effect; 27] = [
        Effect::None,
        Effect::GaussianBlur,
        Effect::Blur,
        Effect::Dilate,
        Effect::Erode,
        Effect::EdgeDetection,
        Effect::Emboss,
        Effect::Invert,
        Effect::Grayscale,
        Effect::Sepia,
        Effect::Sharpen,
        Effect::Sobel,
        Effect::Median,
        Effect::Brightness,
        Effect::Contrast,
        Effect::Saturation,
        Effect::Hue,
        Effect::Gamma,
        Effect::Threshold,
        Effect::FlipH,
        Effect::FlipV,
        Effect::ShearH,
        Effect::ShearV,
        Effect::NoiseUniform,
        Effect::NoiseBinary,
        Effect::NoiseGaussian,
        Effect::NoisePerlin,
    ];

    /// Canonical identifier used by the configuration surface
    pub fn id(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::GaussianBlur => "gaussianBlur",
            Effect::Blur => "blur",
            Effect::Dilate => "dilate",
            Effect::Erode => "erode",
            Effect::EdgeDetection => "edgeDetection",
            Effect::Emboss => "emboss",
            Effect::Invert => "invert",
            Effect::Grayscale => "grayscale",
            Effect::Sepia => "sepia",
            Effect::Sharpen => "sharpen",
            Effect::Sobel => "sobel",
            Effect::Median => "median",
            Effect::Brightness => "brightness",
            Effect::Contrast => "contrast",
            Effect::Saturation => "saturation",
            Effect::Hue => "hue",
            Effect::Gamma => "gamma",
            Effect::Threshold => "threshold",
            Effect::FlipH => "flipH",
            Effect::FlipV => "flipV",
            Effect::ShearH => "shearH",
            Effect::ShearV => "shearV",
            Effect::NoiseUniform => "noiseUniform",
            Effect::NoiseBinary => "noiseBinary",
            Effect::NoiseGaussian => "noiseGaussian",
            Effect::NoisePerlin => "noisePerlin",
        }
    }

    /// Human-readable name for selectors
    pub fn label(&self) -> &'static str {
        match self {
            Effect::None => "None",
            Effect::GaussianBlur => "Gaussian blur",
            Effect::Blur => "Box blur",
            Effect::Dilate => "Dilate",
            Effect::Erode => "Erode",
            Effect::EdgeDetection => "Edge detection",
            Effect::Emboss => "Emboss",
            Effect::Invert => "Invert",
            Effect::Grayscale => "Grayscale",
            Effect::Sepia => "Sepia",
            Effect::Sharpen => "Sharpen",
            Effect::Sobel => "Sobel",
            Effect::Median => "Median",
            Effect::Brightness => "Brightness",
            Effect::Contrast => "Contrast",
            Effect::Saturation => "Saturation",
            Effect::Hue => "Hue",
            Effect::Gamma => "Gamma",
            Effect::Threshold => "Threshold",
            Effect::FlipH => "Flip horizontal",
            Effect::FlipV => "Flip vertical",
            Effect::ShearH => "Shear horizontal",
            Effect::ShearV => "Shear vertical",
            Effect::NoiseUniform => "Uniform noise",
            Effect::NoiseBinary => "Binary noise",
            Effect::NoiseGaussian => "Gaussian noise",
            Effect::NoisePerlin => "Perlin noise",
        }
    }

    /// Whether the output may differ in size from the input
    pub fn changes_dimensions(&self) -> bool {
        matches!(self, Effect::ShearH | Effect::ShearV)
    }

    /// Nominal intensity domain and the value used for non-finite input
    ///
    /// Effects that ignore intensity report `None`.
    fn domain(&self) -> Option<(f64, f64, f64)> {
        match self {
            Effect::GaussianBlur
            | Effect::Blur
            | Effect::Dilate
            | Effect::Erode
            | Effect::EdgeDetection
            | Effect::Median => Some((0.0, MAX_RADIUS, 0.0)),
            Effect::Brightness | Effect::Contrast | Effect::Saturation => Some((-1.0, 1.0, 0.0)),
            Effect::Hue => Some((-360.0, 360.0, 0.0)),
            Effect::Gamma => Some((0.01, 10.0, 1.0)),
            Effect::Threshold => Some((0.0, 255.0, 128.0)),
            Effect::ShearH | Effect::ShearV => Some((0.0, 180.0, 0.0)),
            Effect::NoisePerlin => Some((0.0, 1.0, 0.0)),
            _ => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Effect {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognized identifiers are the passthrough effect
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let effect = match s {
            "noiseUniformColored" => Effect::NoiseUniform,
            "noiseBinaryMonochrome" => Effect::NoiseBinary,
            "noiseGaussianMonochrome" => Effect::NoiseGaussian,
            _ => Effect::ALL
                .iter()
                .copied()
                .find(|e| e.id() == s)
                .unwrap_or_else(|| {
                    if !s.is_empty() {
                        log::debug!("unknown effect {s:?}, passing through");
                    }
                    Effect::None
                }),
        };
        Ok(effect)
    }
}

/// An effect together with its intensity parameter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectSpec {
    pub effect: Effect,
    pub intensity: f64,
}

impl EffectSpec {
    pub fn new(effect: Effect, intensity: f64) -> Self {
        Self { effect, intensity }
    }

    /// Intensity clamped into the effect's domain
    pub fn effective_intensity(&self) -> f64 {
        match self.effect.domain() {
            Some((min, max, neutral)) => {
                if self.intensity.is_finite() {
                    self.intensity.clamp(min, max)
                } else {
                    neutral
                }
            }
            None => 0.0,
        }
    }

    fn radius(&self) -> u32 {
        self.effective_intensity().round() as u32
    }
}

/// Apply `spec` to `buffer`, drawing noise from the thread-local generator
///
/// # Arguments
/// * `buffer` - Source image, left untouched
/// * `spec` - Effect and intensity; the intensity is clamped to the effect's domain
///
/// # Returns
/// A new buffer with the effect applied
pub fn apply(buffer: &PixelBuffer, spec: &EffectSpec) -> PixelBuffer {
    apply_with_rng(buffer, spec, &mut rand::thread_rng())
}

/// Apply `spec` to `buffer`, drawing noise from `rng`
///
/// Never panics for any buffer, including empty ones. The output has the
/// input's dimensions except for shears, whose sheared axis grows.
pub fn apply_with_rng<R: Rng + ?Sized>(
    buffer: &PixelBuffer,
    spec: &EffectSpec,
    rng: &mut R,
) -> PixelBuffer {
    if buffer.width() == 0 || buffer.height() == 0 {
        return buffer.clone();
    }

    let value = spec.effective_intensity();

    match spec.effect {
        Effect::None => buffer.clone(),
        Effect::GaussianBlur => filters::gaussian_blur(buffer, value as f32),
        Effect::Blur => filters::box_blur(buffer, spec.radius()),
        Effect::Dilate => filters::dilate(buffer, spec.radius()),
        Effect::Erode => filters::erode(buffer, spec.radius()),
        Effect::EdgeDetection => filters::edge_detection(buffer, spec.radius()),
        Effect::Median => filters::median(buffer, spec.radius()),
        Effect::Emboss => filters::emboss(buffer),
        Effect::Sharpen => filters::sharpen(buffer),
        Effect::Sobel => filters::sobel(buffer),
        Effect::Invert => adjust::invert(buffer),
        Effect::Grayscale => adjust::grayscale(buffer),
        Effect::Sepia => adjust::sepia(buffer),
        Effect::Brightness => adjust::brightness(buffer, value),
        Effect::Contrast => adjust::contrast(buffer, value),
        Effect::Saturation => adjust::saturation(buffer, value),
        Effect::Hue => adjust::hue(buffer, value),
        Effect::Gamma => adjust::gamma(buffer, value),
        Effect::Threshold => adjust::threshold(buffer, value.round() as u8),
        Effect::FlipH => transform::flip_h(buffer),
        Effect::FlipV => transform::flip_v(buffer),
        Effect::ShearH => transform::shear_h(buffer, value),
        Effect::ShearV => transform::shear_v(buffer, value),
        Effect::NoiseUniform => noise::apply(buffer, NoiseKind::Uniform, value, rng),
        Effect::NoiseBinary => noise::apply(buffer, NoiseKind::Binary, value, rng),
        Effect::NoiseGaussian => noise::apply(buffer, NoiseKind::Gaussian, value, rng),
        Effect::NoisePerlin => noise::apply(buffer, NoiseKind::Perlin, value, rng),
    }
}
