//! ASCII FX - image effects and ASCII art rendering
//!
//! This library applies a single effect (blur, colour adjustment, noise,
//! shear, ...) to an RGBA image and can render the result as ASCII art, either
//! plain or with every character annotated with its source colour.
//! [`ReactiveModel`] ties the pieces together for interactive front ends.
//!
//! # Example
//! ```no_run
//! use ascii_fx::{DensityAlphabet, Effect, EffectSpec, apply, ascii};
//!
//! let input = image::open("photo.jpg").unwrap().to_rgba8();
//! let blurred = apply(&input, &EffectSpec::new(Effect::GaussianBlur, 2.0));
//!
//! let alphabet = DensityAlphabet::new(" .:-=+*#%@").unwrap();
//! let art = ascii::convert(&blurred, &alphabet, 80).unwrap();
//! println!("{}", art.to_plain_text());
//! ```

pub mod adjust;
pub mod ascii;
pub mod config;
pub mod debounce;
pub mod decode;
pub mod effects;
pub mod error;
pub mod filters;
pub mod luminance;
pub mod model;
pub mod noise;
pub mod range;
pub mod resample;
pub mod transform;

/// Row-major 8-bit RGBA image, the currency of the whole pipeline
pub type PixelBuffer = image::RgbaImage;

// Re-export main types for convenience
pub use ascii::AsciiArt;
pub use config::RenderConfig;
pub use debounce::Debouncer;
pub use effects::{Effect, EffectSpec, apply};
pub use error::{Error, Result};
pub use luminance::DensityAlphabet;
pub use model::{Control, Output, ReactiveModel};
pub use range::{IntensityRange, range_for};
pub use resample::resize;
