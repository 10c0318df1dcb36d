use crate::PixelBuffer;
use crate::error::{Error, Result};
use image::imageops::{self, FilterType};

/// Height that preserves the source aspect ratio at `target_width`
///
/// `round(height * target_width / width)`, never less than one row.
pub fn target_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = height as f64 * target_width as f64 / width as f64;
    (scaled.round() as u32).max(1)
}

/// Resample `buffer` to `target_width` columns with bilinear filtering
///
/// # Arguments
/// * `buffer` - Source image
/// * `target_width` - Output width in pixels, at least 1
///
/// # Returns
/// Buffer of `target_width` x [`target_height`] pixels
///
/// # Errors
/// [`Error::InvalidDimension`] when `target_width` is zero or the source has
/// no pixels.
pub fn resize(buffer: &PixelBuffer, target_width: u32) -> Result<PixelBuffer> {
    let (width, height) = buffer.dimensions();

    if target_width == 0 {
        return Err(Error::InvalidDimension {
            width: target_width,
            height: 0,
        });
    }
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension { width, height });
    }

    let target_height = target_height(width, height, target_width);
    if (target_width, target_height) == (width, height) {
        return Ok(buffer.clone());
    }

    // Triangle is the bilinear kernel
    Ok(imageops::resize(
        buffer,
        target_width,
        target_height,
        FilterType::Triangle,
    ))
}
