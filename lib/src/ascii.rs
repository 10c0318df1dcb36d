use crate::PixelBuffer;
use crate::error::Result;
use crate::luminance::DensityAlphabet;
use crate::resample::resize;
use rayon::prelude::*;
use std::fmt::Write;

/// One character of ASCII output together with the colour it was sampled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiCell {
    pub ch: char,
    pub rgb: [u8; 3],
}

/// A grid of characters, one per pixel of the (resampled) source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiArt {
    width: u32,
    height: u32,
    cells: Vec<AsciiCell>,
}

impl AsciiArt {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[AsciiCell] {
        &self.cells
    }

    /// Cells grouped by row, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[AsciiCell]> {
        // chunks() rejects a zero size; a zero-width grid has no cells anyway
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Characters only, each row terminated by `\n`
    pub fn to_plain_text(&self) -> String {
        let mut text = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            text.extend(row.iter().map(|cell| cell.ch));
            text.push('\n');
        }
        text
    }

    /// Every character wrapped in `<i style="color:rgb(r,g,b)">…</i>`,
    /// each row terminated by `\n`
    ///
    /// Characters that are significant in markup are escaped.
    pub fn to_markup(&self) -> String {
        // Roughly 35 bytes of markup per character
        let mut text = String::with_capacity(self.cells.len() * 36 + self.height as usize);
        for row in self.rows() {
            for cell in row {
                let [r, g, b] = cell.rgb;
                // Writing into a String cannot fail
                let _ = write!(text, "<i style=\"color:rgb({r},{g},{b})\">");
                push_escaped(&mut text, cell.ch);
                text.push_str("</i>");
            }
            text.push('\n');
        }
        text
    }

    /// Markup when `color_annotated`, plain text otherwise
    pub fn to_text(&self, color_annotated: bool) -> String {
        if color_annotated {
            self.to_markup()
        } else {
            self.to_plain_text()
        }
    }
}

fn push_escaped(text: &mut String, ch: char) {
    match ch {
        '<' => text.push_str("&lt;"),
        '>' => text.push_str("&gt;"),
        '&' => text.push_str("&amp;"),
        '"' => text.push_str("&quot;"),
        _ => text.push(ch),
    }
}

/// Map every pixel of `buffer` to an alphabet character
///
/// No resampling happens here: the grid has the buffer's dimensions.
pub fn render_art(buffer: &PixelBuffer, alphabet: &DensityAlphabet) -> AsciiArt {
    let (width, height) = buffer.dimensions();

    // Rows are independent, so map them in parallel
    let cells: Vec<AsciiCell> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..width).map(move |x| {
                let pixel = buffer.get_pixel(x, y);
                AsciiCell {
                    ch: alphabet.char_for_pixel(pixel),
                    rgb: [pixel[0], pixel[1], pixel[2]],
                }
            })
        })
        .collect();

    AsciiArt {
        width,
        height,
        cells,
    }
}

/// Render `buffer` as text, one line per pixel row
pub fn render(buffer: &PixelBuffer, alphabet: &DensityAlphabet, color_annotated: bool) -> String {
    render_art(buffer, alphabet).to_text(color_annotated)
}

/// Resample `buffer` to `output_width` columns and render it
///
/// # Arguments
/// * `buffer` - Filtered image to render
/// * `alphabet` - Characters ordered from black to white
/// * `output_width` - Characters per row
///
/// # Returns
/// Character grid with `output_width` columns and an aspect-preserving row count
///
/// # Errors
/// [`crate::Error::InvalidDimension`] when `output_width` is zero or the
/// buffer is empty.
pub fn convert(
    buffer: &PixelBuffer,
    alphabet: &DensityAlphabet,
    output_width: u32,
) -> Result<AsciiArt> {
    let resized = resize(buffer, output_width)?;
    Ok(render_art(&resized, alphabet))
}
