//! Bounds for the intensity control
//!
//! Purely a UI concern: the pipeline clamps on its own, this only decides
//! what the slider can produce for the selected effect.

use crate::effects::Effect;

/// Slider bounds and step for an effect's intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl IntensityRange {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Value the slider starts at after the effect changes: zero, pulled
    /// into range (gamma starts at 1)
    pub fn initial(&self) -> f64 {
        0.0_f64.clamp(self.min, self.max)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Radius-style effects
const RADIUS: IntensityRange = IntensityRange::new(0.0, 10.0, 1.0);
/// Signed linear adjustments
const SIGNED_UNIT: IntensityRange = IntensityRange::new(-1.0, 1.0, 0.1);
const HUE: IntensityRange = IntensityRange::new(-360.0, 360.0, 1.0);
const GAMMA: IntensityRange = IntensityRange::new(1.0, 5.0, 0.2);
const THRESHOLD: IntensityRange = IntensityRange::new(0.0, 200.0, 1.0);
const PERLIN: IntensityRange = IntensityRange::new(0.0, 1.0, 0.01);
const SHEAR: IntensityRange = IntensityRange::new(0.0, 180.0, 1.0);

/// Intensity bounds for `effect`, or `None` when it takes no intensity
pub fn range_for(effect: Effect) -> Option<IntensityRange> {
    match effect {
        Effect::GaussianBlur
        | Effect::Blur
        | Effect::Dilate
        | Effect::Erode
        | Effect::EdgeDetection
        | Effect::Median => Some(RADIUS),
        Effect::Brightness | Effect::Contrast | Effect::Saturation => Some(SIGNED_UNIT),
        Effect::Hue => Some(HUE),
        Effect::Gamma => Some(GAMMA),
        Effect::Threshold => Some(THRESHOLD),
        Effect::NoisePerlin => Some(PERLIN),
        Effect::ShearH | Effect::ShearV => Some(SHEAR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_family() {
        for effect in [
            Effect::GaussianBlur,
            Effect::Blur,
            Effect::Dilate,
            Effect::Erode,
            Effect::EdgeDetection,
            Effect::Median,
        ] {
            assert_eq!(range_for(effect), Some(RADIUS), "{effect}");
        }
    }

    #[test]
    fn test_specific_ranges() {
        assert_eq!(range_for(Effect::Contrast), Some(IntensityRange::new(-1.0, 1.0, 0.1)));
        assert_eq!(range_for(Effect::Hue), Some(IntensityRange::new(-360.0, 360.0, 1.0)));
        assert_eq!(range_for(Effect::Gamma), Some(IntensityRange::new(1.0, 5.0, 0.2)));
        assert_eq!(range_for(Effect::Threshold), Some(IntensityRange::new(0.0, 200.0, 1.0)));
        assert_eq!(range_for(Effect::NoisePerlin), Some(IntensityRange::new(0.0, 1.0, 0.01)));
        assert_eq!(range_for(Effect::ShearV), Some(IntensityRange::new(0.0, 180.0, 1.0)));
    }

    #[test]
    fn test_parameterless_effects_have_no_range() {
        for effect in [
            Effect::None,
            Effect::Emboss,
            Effect::Invert,
            Effect::Grayscale,
            Effect::Sepia,
            Effect::Sharpen,
            Effect::Sobel,
            Effect::FlipH,
            Effect::FlipV,
            Effect::NoiseUniform,
            Effect::NoiseBinary,
            Effect::NoiseGaussian,
        ] {
            assert_eq!(range_for(effect), None, "{effect}");
        }
    }

    #[test]
    fn test_initial_value() {
        assert_eq!(range_for(Effect::Gamma).unwrap().initial(), 1.0);
        assert_eq!(range_for(Effect::Hue).unwrap().initial(), 0.0);
        assert_eq!(range_for(Effect::Blur).unwrap().initial(), 0.0);
    }

    #[test]
    fn test_every_range_is_well_formed() {
        for effect in Effect::ALL {
            if let Some(range) = range_for(effect) {
                assert!(range.min < range.max, "{effect}");
                assert!(range.step > 0.0, "{effect}");
            }
        }
    }
}
