/// Effects tour: run every effect over one gradient image
///
/// Prints each effect's output dimensions and timing, and the ASCII rendering
/// of a few of them. Noise is seeded so repeated runs print the same art.
use ascii_fx::effects::apply_with_rng;
use ascii_fx::{DensityAlphabet, Effect, EffectSpec, PixelBuffer, ascii, range_for};
use image::Rgba;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

fn main() {
    println!("ASCII FX - Effects Tour");
    println!("=======================\n");

    let img = PixelBuffer::from_fn(320, 200, |x, y| {
        Rgba([(x * 255 / 320) as u8, (y * 255 / 200) as u8, 96, 255])
    });
    let mut rng = StdRng::seed_from_u64(7);

    for effect in Effect::ALL {
        // Middle of the slider range, or no parameter at all
        let intensity = range_for(effect).map_or(0.0, |r| (r.min + r.max) / 2.0);
        let spec = EffectSpec::new(effect, intensity);

        let start = Instant::now();
        let output = apply_with_rng(&img, &spec, &mut rng);
        let ms = start.elapsed().as_secs_f64() * 1000.0;

        let (w, h) = output.dimensions();
        println!("{:<18} {:>7.1}  {}x{}  ({:.1} ms)", effect.label(), intensity, w, h, ms);
    }

    let alphabet = DensityAlphabet::default();
    for effect in [Effect::Sobel, Effect::NoisePerlin, Effect::ShearH] {
        let intensity = range_for(effect).map_or(0.0, |r| (r.min + r.max) / 4.0);
        let output = apply_with_rng(&img, &EffectSpec::new(effect, intensity), &mut rng);
        let art = ascii::convert(&output, &alphabet, 60).expect("non-zero width");
        println!("\n{} at {}:\n{}", effect.label(), intensity, art.to_plain_text());
    }
}
