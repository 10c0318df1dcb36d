//! Reactive view model
//!
//! Owns the single [`ViewState`] and decides when the pipeline reruns:
//!
//! - effect selection, alphabet presets and the ASCII/colour toggles
//!   recompute immediately;
//! - intensity and width drags and free-text alphabet edits go through a
//!   [`Debouncer`] and recompute once the input has been quiet for the delay.
//!
//! Nothing recomputes until an image is loaded. An empty or whitespace-only
//! alphabet skips recomputation and is reported through [`ReactiveModel::last_error`].

use crate::PixelBuffer;
use crate::ascii::{self, AsciiArt};
use crate::config::{DEBOUNCE_DELAY, DEFAULT_ALPHABET, RenderConfig};
use crate::debounce::Debouncer;
use crate::decode::{ImageLoader, mime_for_path};
use crate::effects::{self, Effect, EffectSpec};
use crate::error::{Error, Result};
use crate::luminance::DensityAlphabet;
use crate::range::{IntensityRange, range_for};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything the user can see and change
#[derive(Debug, Clone)]
pub struct ViewState {
    pub effect: EffectSpec,
    pub render: RenderConfig,
    /// Density alphabet as typed; validated at recomputation time
    pub alphabet_text: String,
    /// Most recently decoded source image
    pub source: Option<Arc<PixelBuffer>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            effect: EffectSpec::default(),
            render: RenderConfig::default(),
            alphabet_text: DEFAULT_ALPHABET.to_string(),
            source: None,
        }
    }
}

/// Result of the last successful recomputation
#[derive(Debug, Clone)]
pub enum Output {
    /// Character art, in ASCII mode
    Ascii(AsciiArt),
    /// Filtered image, to be encoded for display or download
    Image(PixelBuffer),
}

/// Which control armed the debounced recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Intensity,
    OutputWidth,
    AlphabetText,
}

/// A single change coming from the configuration surface
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Effect(Effect),
    Intensity(f64),
    OutputWidth(u32),
    /// Free-text alphabet edit
    AlphabetText(String),
    /// Alphabet picked from the preset list
    AlphabetPreset(String),
    AsciiMode(bool),
    ColorAnnotated(bool),
}

/// Owner of the view state and of the recomputation schedule
#[derive(Debug)]
pub struct ReactiveModel {
    state: ViewState,
    debouncer: Debouncer<Trigger>,
    loader: ImageLoader,
    /// Sequence number of the newest decode request
    latest_decode: u64,
    output: Option<Output>,
    /// Bumped on every new output
    generation: u64,
    last_error: Option<Error>,
    last_duration: Duration,
}

impl Default for ReactiveModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveModel {
    pub fn new() -> Self {
        Self::with_debounce_delay(DEBOUNCE_DELAY)
    }

    pub fn with_debounce_delay(delay: Duration) -> Self {
        Self {
            state: ViewState::default(),
            debouncer: Debouncer::new(delay),
            loader: ImageLoader::new(),
            latest_decode: 0,
            output: None,
            generation: 0,
            last_error: None,
            last_duration: Duration::ZERO,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// Changes whenever [`output`](Self::output) is replaced
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validation or decode error from the last attempt, cleared on success
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Wall time of the last successful recomputation
    pub fn last_duration(&self) -> Duration {
        self.last_duration
    }

    /// Bounds for the intensity control of the selected effect
    pub fn intensity_range(&self) -> Option<IntensityRange> {
        range_for(self.state.effect.effect)
    }

    /// Apply one change from the configuration surface
    pub fn handle(&mut self, control: Control) -> Result<()> {
        match control {
            Control::Effect(effect) => {
                self.select_effect(effect);
            }
            Control::Intensity(value) => self.set_intensity(value),
            Control::OutputWidth(width) => self.set_output_width(width)?,
            Control::AlphabetText(text) => self.set_alphabet_text(&text),
            Control::AlphabetPreset(text) => self.select_alphabet_preset(&text),
            Control::AsciiMode(on) => self.set_ascii_mode(on),
            Control::ColorAnnotated(on) => self.set_color_annotated(on),
        }
        Ok(())
    }

    /// Switch effect, reset the intensity and recompute immediately
    ///
    /// Returns the bounds the intensity control should now expose.
    pub fn select_effect(&mut self, effect: Effect) -> Option<IntensityRange> {
        let range = range_for(effect);
        self.state.effect = EffectSpec::new(effect, range.map_or(0.0, |r| r.initial()));
        self.recompute_now();
        range
    }

    /// Set the intensity; recomputes after the debounce delay
    pub fn set_intensity(&mut self, value: f64) {
        self.state.effect.intensity = value;
        self.debouncer.schedule(Trigger::Intensity);
    }

    /// Parse and set the intensity
    ///
    /// Unparsable or non-finite text keeps the current value.
    pub fn set_intensity_text(&mut self, text: &str) -> Result<()> {
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.set_intensity(value);
                Ok(())
            }
            _ => {
                log::warn!(
                    "ignoring intensity {text:?}, keeping {}",
                    self.state.effect.intensity
                );
                Err(Error::InvalidNumber {
                    input: text.to_string(),
                })
            }
        }
    }

    /// Set the ASCII output width; recomputes after the debounce delay
    ///
    /// A zero width is rejected and the current width kept.
    pub fn set_output_width(&mut self, width: u32) -> Result<()> {
        let render = RenderConfig {
            output_width: width,
            ..self.state.render
        };
        if let Err(e) = render.validate() {
            log::warn!("rejecting output width {width}");
            return Err(e);
        }
        self.state.render = render;
        self.debouncer.schedule(Trigger::OutputWidth);
        Ok(())
    }

    /// Parse and set the output width; bad text keeps the current width
    pub fn set_output_width_text(&mut self, text: &str) -> Result<()> {
        match text.trim().parse::<u32>() {
            Ok(width) => self.set_output_width(width),
            Err(_) => {
                log::warn!(
                    "ignoring output width {text:?}, keeping {}",
                    self.state.render.output_width
                );
                Err(Error::InvalidNumber {
                    input: text.to_string(),
                })
            }
        }
    }

    /// Free-text alphabet edit; recomputes after the debounce delay
    pub fn set_alphabet_text(&mut self, text: &str) {
        self.state.alphabet_text = text.to_string();
        self.debouncer.schedule(Trigger::AlphabetText);
    }

    /// Alphabet chosen from the preset list; recomputes immediately
    pub fn select_alphabet_preset(&mut self, text: &str) {
        self.state.alphabet_text = text.to_string();
        self.recompute_now();
    }

    pub fn set_ascii_mode(&mut self, on: bool) {
        self.state.render.ascii_mode = on;
        self.recompute_now();
    }

    pub fn set_color_annotated(&mut self, on: bool) {
        self.state.render.color_annotated = on;
        self.recompute_now();
    }

    /// Replace the source with an already decoded buffer and recompute
    ///
    /// Any decode still in flight becomes stale.
    pub fn set_source(&mut self, buffer: PixelBuffer) {
        self.latest_decode += 1;
        self.install_source(buffer);
    }

    /// Reserve a sequence number for a decode the caller runs itself
    pub fn begin_decode(&mut self) -> u64 {
        self.latest_decode += 1;
        self.latest_decode
    }

    /// Deliver a decode result
    ///
    /// Returns `false` and drops the result when a newer decode has been
    /// requested since `seq` was issued.
    pub fn finish_decode(&mut self, seq: u64, result: Result<PixelBuffer>) -> bool {
        if seq != self.latest_decode {
            log::debug!("dropping stale decode {seq} (latest is {})", self.latest_decode);
            return false;
        }

        match result {
            Ok(buffer) => self.install_source(buffer),
            Err(e) => {
                log::warn!("image load failed: {e}");
                self.last_error = Some(e);
            }
        }
        true
    }

    /// Decode `bytes` in the background; the result lands via
    /// [`poll_decoded`](Self::poll_decoded)
    pub fn load_bytes(&mut self, bytes: Vec<u8>, mime: Option<String>) -> u64 {
        let seq = self.begin_decode();
        self.loader.spawn(seq, bytes, mime);
        seq
    }

    /// Read `path` and decode it in the background, picking the decoder from
    /// the file extension
    pub fn load_file(&mut self, path: &Path) -> Result<u64> {
        let bytes = std::fs::read(path)?;
        log::info!("loading {} ({} bytes)", path.display(), bytes.len());
        Ok(self.load_bytes(bytes, mime_for_path(path)))
    }

    /// Apply every finished background decode; true if one was current
    pub fn poll_decoded(&mut self) -> bool {
        let mut applied = false;
        while let Some(decoded) = self.loader.try_recv() {
            applied |= self.finish_decode(decoded.seq, decoded.result);
        }
        applied
    }

    /// Block up to `timeout` for the next background decode
    pub fn wait_decoded(&mut self, timeout: Duration) -> bool {
        match self.loader.recv_timeout(timeout) {
            Some(decoded) => self.finish_decode(decoded.seq, decoded.result),
            None => false,
        }
    }

    /// Run the debounced recomputation if its quiet period is over
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(trigger) => {
                log::debug!("debounced recompute after {trigger:?} change");
                self.recompute()
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// When the event loop should next call [`tick`](Self::tick)
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    fn install_source(&mut self, buffer: PixelBuffer) {
        log::info!("loaded image {}x{}", buffer.width(), buffer.height());
        self.state.source = Some(Arc::new(buffer));
        self.last_error = None;
        self.recompute_now();
    }

    /// Immediate recomputation supersedes any pending debounced one
    fn recompute_now(&mut self) {
        self.debouncer.cancel();
        self.recompute();
    }

    /// Run the pipeline on the current state
    ///
    /// Returns true when a new output was produced. Without a source this is
    /// a silent no-op.
    pub fn recompute(&mut self) -> bool {
        let Some(source) = self.state.source.clone() else {
            return false;
        };

        let alphabet = match DensityAlphabet::new(&self.state.alphabet_text) {
            Ok(alphabet) => alphabet,
            Err(e) => {
                log::debug!("skipping recompute: {e}");
                self.last_error = Some(e);
                return false;
            }
        };

        let start = Instant::now();
        let filtered = effects::apply(&source, &self.state.effect);

        let output = if self.state.render.ascii_mode {
            match ascii::convert(&filtered, &alphabet, self.state.render.output_width) {
                Ok(art) => Output::Ascii(art),
                Err(e) => {
                    log::warn!("ascii conversion failed: {e}");
                    self.last_error = Some(e);
                    return false;
                }
            }
        } else {
            Output::Image(filtered)
        };

        self.last_duration = start.elapsed();
        log::debug!(
            "recomputed {} ({:.1} ms)",
            self.state.effect.effect,
            self.last_duration.as_secs_f64() * 1000.0
        );

        self.output = Some(output);
        self.generation += 1;
        self.last_error = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::encode_png;
    use image::Rgba;

    fn image(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 128, 255])
        })
    }

    /// A delay long enough that nothing fires unless the test says so
    fn model() -> ReactiveModel {
        ReactiveModel::with_debounce_delay(Duration::from_secs(3600))
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(7200)
    }

    #[test]
    fn test_defaults() {
        let m = ReactiveModel::new();
        let state = m.state();
        assert_eq!(state.effect.effect, Effect::None);
        assert_eq!(state.effect.intensity, 0.0);
        assert_eq!(state.render.output_width, 100);
        assert!(state.render.color_annotated);
        assert!(!state.render.ascii_mode);
        assert_eq!(state.alphabet_text, "░▒▓█");
        assert!(state.source.is_none());
        assert!(m.output().is_none());
    }

    #[test]
    fn test_nothing_happens_without_image() {
        let mut m = model();
        assert!(m.select_effect(Effect::Blur).is_some());
        m.set_ascii_mode(true);
        assert!(!m.recompute());
        assert!(m.output().is_none());
        assert!(m.last_error().is_none());
    }

    #[test]
    fn test_loading_source_recomputes() {
        let mut m = model();
        m.set_source(image(8, 4));
        assert_eq!(m.generation(), 1);
        assert!(matches!(m.output(), Some(Output::Image(img)) if img.dimensions() == (8, 4)));
    }

    #[test]
    fn test_effect_change_is_immediate_and_resets_intensity() {
        let mut m = model();
        m.set_source(image(8, 4));
        m.set_intensity(3.0);

        let range = m.select_effect(Effect::Gamma).unwrap();
        assert_eq!((range.min, range.max, range.step), (1.0, 5.0, 0.2));
        assert_eq!(m.state().effect.intensity, 1.0);
        assert_eq!(m.generation(), 2);
        // The pending intensity recompute was superseded
        assert!(!m.has_pending());

        assert_eq!(m.select_effect(Effect::Invert), None);
        assert_eq!(m.state().effect.intensity, 0.0);
    }

    #[test]
    fn test_slider_changes_are_debounced() {
        let mut m = model();
        m.set_source(image(8, 4));
        let before = m.generation();

        m.set_intensity(1.0);
        m.set_intensity(2.0);
        m.set_output_width(20).unwrap();
        assert!(!m.tick(Instant::now()));
        assert_eq!(m.generation(), before);

        assert!(m.tick(later()));
        assert_eq!(m.generation(), before + 1);
        assert_eq!(m.state().effect.intensity, 2.0);
        assert!(!m.tick(later()));
    }

    #[test]
    fn test_bad_intensity_text_keeps_last_value() {
        let mut m = model();
        m.set_intensity_text("4.5").unwrap();
        assert_eq!(m.state().effect.intensity, 4.5);

        assert!(matches!(
            m.set_intensity_text("abc"),
            Err(Error::InvalidNumber { .. })
        ));
        assert!(m.set_intensity_text("NaN").is_err());
        assert_eq!(m.state().effect.intensity, 4.5);
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let mut m = model();
        assert!(matches!(
            m.set_output_width(0),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(m.set_output_width_text("-3").is_err());
        assert!(m.set_output_width_text("wide").is_err());
        assert_eq!(m.state().render.output_width, 100);

        m.set_output_width_text(" 64 ").unwrap();
        assert_eq!(m.state().render.output_width, 64);
    }

    #[test]
    fn test_ascii_mode_renders_at_output_width() {
        let mut m = model();
        m.set_source(image(40, 20));
        m.set_output_width(10).unwrap();
        m.set_ascii_mode(true);

        match m.output() {
            Some(Output::Ascii(art)) => assert_eq!((art.width(), art.height()), (10, 5)),
            other => panic!("expected ascii output, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_alphabet_skips_and_reports() {
        let mut m = model();
        m.set_source(image(8, 8));
        m.set_ascii_mode(true);
        let before = m.generation();

        m.select_alphabet_preset("   ");
        assert_eq!(m.generation(), before);
        assert!(matches!(m.last_error(), Some(Error::EmptyAlphabet)));

        m.select_alphabet_preset(" .:#");
        assert_eq!(m.generation(), before + 1);
        assert!(m.last_error().is_none());
    }

    #[test]
    fn test_alphabet_text_is_debounced() {
        let mut m = model();
        m.set_source(image(8, 8));
        let before = m.generation();

        m.set_alphabet_text("ab");
        assert_eq!(m.generation(), before);
        assert!(m.tick(later()));
        assert_eq!(m.generation(), before + 1);
    }

    #[test]
    fn test_stale_decode_is_dropped() {
        let mut m = model();
        let first = m.begin_decode();
        let second = m.begin_decode();

        assert!(!m.finish_decode(first, Ok(image(3, 3))));
        assert!(m.state().source.is_none());

        assert!(m.finish_decode(second, Ok(image(5, 5))));
        assert_eq!(m.state().source.as_ref().unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn test_decode_failure_keeps_previous_source() {
        let mut m = model();
        m.set_source(image(4, 4));
        let seq = m.begin_decode();
        assert!(m.finish_decode(seq, Err(Error::UnsupportedFormat { mime: None })));
        assert!(matches!(m.last_error(), Some(Error::UnsupportedFormat { .. })));
        assert_eq!(m.state().source.as_ref().unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_background_load() {
        let mut m = model();
        let png = encode_png(&image(6, 2)).unwrap();
        m.load_bytes(png, Some("image/png".to_string()));

        assert!(m.wait_decoded(Duration::from_secs(10)));
        assert_eq!(m.state().source.as_ref().unwrap().dimensions(), (6, 2));
        assert_eq!(m.generation(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut m = model();
        let err = m.load_file(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(m.state().source.is_none());
    }

    #[test]
    fn test_handle_maps_controls() {
        let mut m = model();
        m.set_source(image(8, 8));
        m.handle(Control::Effect(Effect::Hue)).unwrap();
        m.handle(Control::Intensity(90.0)).unwrap();
        m.handle(Control::ColorAnnotated(false)).unwrap();
        m.handle(Control::AsciiMode(true)).unwrap();
        assert!(m.handle(Control::OutputWidth(0)).is_err());

        let state = m.state();
        assert_eq!(state.effect, EffectSpec::new(Effect::Hue, 90.0));
        assert!(!state.render.color_annotated);
        assert!(state.render.ascii_mode);
    }
}
