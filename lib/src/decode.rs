//! Image decoding and PNG encoding at the edges of the pipeline
//!
//! Decoding can run in the background through [`ImageLoader`]: each request
//! carries a sequence number so the caller can discard completions that were
//! overtaken by a newer request.

use crate::PixelBuffer;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, Sender};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// MIME type for a file name, based on its extension
pub fn mime_for_path(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Decode `bytes` into an RGBA buffer
///
/// A recognized `mime` selects the decoder first. When that fails, or no
/// decoder matches `mime`, the format is sniffed from the content, so a
/// misnamed file still loads.
///
/// # Errors
/// [`Error::UnsupportedFormat`] when the bytes cannot be decoded.
pub fn decode(bytes: &[u8], mime: Option<&str>) -> Result<PixelBuffer> {
    let format = mime.and_then(ImageFormat::from_mime_type);

    let declared = format.map(|format| image::load_from_memory_with_format(bytes, format));
    let decoded = match declared {
        Some(Ok(img)) => Ok(img),
        Some(Err(e)) => {
            log::debug!("{format:?} decoder rejected the data ({e}), sniffing instead");
            image::load_from_memory(bytes)
        }
        None => image::load_from_memory(bytes),
    };

    match decoded {
        Ok(img) => Ok(img.to_rgba8()),
        Err(e) => {
            log::warn!("failed to decode image ({}): {e}", mime.unwrap_or("unknown type"));
            Err(Error::UnsupportedFormat {
                mime: mime.map(str::to_string),
            })
        }
    }
}

/// Encode a buffer as PNG bytes, ready to hand out as a downloadable blob
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Result of a background decode
#[derive(Debug)]
pub struct Decoded {
    /// Sequence number passed to [`ImageLoader::spawn`]
    pub seq: u64,
    pub result: Result<PixelBuffer>,
}

/// Decodes images on the rayon pool and reports back over a channel
#[derive(Debug)]
pub struct ImageLoader {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Start decoding `bytes` in the background
    pub fn spawn(&self, seq: u64, bytes: Vec<u8>, mime: Option<String>) {
        let tx = self.tx.clone();
        rayon::spawn(move || {
            let result = decode(&bytes, mime.as_deref());
            // The receiver lives as long as the loader; a send error only
            // means the loader was dropped mid-decode
            let _ = tx.send(Decoded { seq, result });
        });
    }

    /// Next finished decode, if any, without blocking
    pub fn try_recv(&self) -> Option<Decoded> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished decode
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Decoded> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample_png() -> Vec<u8> {
        let img = PixelBuffer::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 7, 255]));
        encode_png(&img).unwrap()
    }

    #[test]
    fn test_png_round_trip() {
        let img = PixelBuffer::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 7, 255]));
        let decoded = decode(&sample_png(), Some("image/png")).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_sniffs_without_mime() {
        let decoded = decode(&sample_png(), None).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
    }

    #[test]
    fn test_decode_garbage_is_unsupported() {
        let err = decode(b"definitely not an image", Some("image/png")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { mime: Some(ref m) } if m == "image/png"));

        let err = decode(b"", None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { mime: None }));
    }

    #[test]
    fn test_misdeclared_mime_falls_back_to_sniffing() {
        for mime in ["image/gif", "image/webp", "image/jpeg"] {
            let decoded = decode(&sample_png(), Some(mime)).unwrap();
            assert_eq!(decoded.dimensions(), (5, 3), "{mime}");
        }

        let mime = mime_for_path(Path::new("photo.webp"));
        assert!(decode(&sample_png(), mime.as_deref()).is_ok());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a/photo.JPG")).as_deref(), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("pic.png")).as_deref(), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_loader_reports_sequence() {
        let loader = ImageLoader::new();
        loader.spawn(42, sample_png(), Some("image/png".to_string()));

        let decoded = loader.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(decoded.seq, 42);
        assert_eq!(decoded.result.unwrap().dimensions(), (5, 3));
    }
}
