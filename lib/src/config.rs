use crate::error::{Error, Result};
use std::time::Duration;

/// Output width (in characters) used until the user moves the width slider
pub const DEFAULT_OUTPUT_WIDTH: u32 = 100;

/// Bounds exposed by the width slider
pub const MIN_OUTPUT_WIDTH: u32 = 1;
pub const MAX_OUTPUT_WIDTH: u32 = 400;

/// Quiet period before a burst of slider drags or text edits recomputes
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(200);

/// Density alphabet selected at start-up
pub const DEFAULT_ALPHABET: &str = "░▒▓█";

/// Rendering configuration for a recomputation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Characters per row of ASCII output
    pub output_width: u32,
    /// Wrap each character in a colour-carrying markup fragment
    pub color_annotated: bool,
    /// Produce ASCII art instead of a filtered image
    pub ascii_mode: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            color_annotated: true,
            ascii_mode: false,
        }
    }
}

impl RenderConfig {
    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.output_width < MIN_OUTPUT_WIDTH {
            return Err(Error::InvalidDimension {
                width: self.output_width,
                height: 0,
            });
        }
        Ok(())
    }
}
