/// Basic example: filter a synthetic image and print it as ASCII art
///
/// This draws a test image with a few shapes, applies a Gaussian blur and
/// prints the result using the standard density alphabet.
use ascii_fx::{DensityAlphabet, Effect, EffectSpec, PixelBuffer, apply, ascii, decode};
use image::Rgba;

fn main() {
    println!("ASCII FX - Basic Example");
    println!("========================\n");

    // Create a simple 160x120 test image
    let width = 160;
    let height = 120;
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = 40.0;

    let img = PixelBuffer::from_fn(width, height, |x, y| {
        let dx = x as f32 - center_x;
        let dy = y as f32 - center_y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < radius {
            // Bright disc
            Rgba([240, 220, 120, 255])
        } else if x.abs_diff(y) < 3 {
            // Red diagonal
            Rgba([255, 0, 0, 255])
        } else {
            // Horizontal gradient background
            let gray = (x * 255 / width) as u8 / 2;
            Rgba([gray, gray, gray, 255])
        }
    });

    println!("Created test image: {}x{}", width, height);

    let spec = EffectSpec::new(Effect::GaussianBlur, 2.0);
    println!("Applying {} at intensity {}", spec.effect.label(), spec.intensity);
    let filtered = apply(&img, &spec);

    let alphabet = DensityAlphabet::new(ascii_fx::luminance::STANDARD).expect("valid alphabet");
    let art = ascii::convert(&filtered, &alphabet, 80).expect("non-zero width");

    println!("\n{}", art.to_plain_text());
    println!("{}x{} characters", art.width(), art.height());

    // Save the filtered image and the colour-annotated markup
    let png = decode::encode_png(&filtered).expect("Failed to encode output");
    std::fs::write("basic_output.png", png).expect("Failed to save output");
    std::fs::write("basic_output.html", art.to_markup()).expect("Failed to save markup");

    println!("✓ Saved filtered image to: basic_output.png");
    println!("✓ Saved markup to:         basic_output.html");
}
