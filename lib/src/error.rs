use thiserror::Error;

/// Errors produced by the effect pipeline, the ASCII renderer and the model.
///
/// None of these are fatal: each one is local to a single recomputation and
/// leaves the view state usable for the next one.
#[derive(Debug, Error)]
pub enum Error {
    /// The source bytes could not be decoded into a pixel buffer
    #[error("unsupported image format{}", mime.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    UnsupportedFormat { mime: Option<String> },

    /// A resize target or source with a zero dimension
    #[error("invalid dimension {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// The density alphabet is empty or only whitespace
    #[error("density alphabet must contain at least one visible character")]
    EmptyAlphabet,

    /// Numeric UI input that failed to parse
    #[error("invalid number: {input:?}")]
    InvalidNumber { input: String },

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
