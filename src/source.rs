//! Source image types
//!
//! A user-supplied file enters the pipeline as a [`RawFile`]; only payloads
//! that sniff as a supported image format become a [`SourceImage`]. The
//! controller owns the source for the duration of one submission turn and
//! supersedes it when a new image is submitted.

use crate::error::{PipelineError, Result};
use image::ImageFormat;
use std::path::Path;

/// An arbitrary user-selected file, not yet validated as an image
#[derive(Debug, Clone)]
pub struct RawFile {
    /// Origin name of the file (display and logging only)
    pub name: String,
    /// Raw payload bytes
    pub bytes: Vec<u8>,
}

impl RawFile {
    /// Create a raw file from in-memory bytes
    #[must_use]
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a raw file from disk
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let bytes = tokio::fs::read(path_ref).await?;
        let name = path_ref
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_owned();
        Ok(Self { name, bytes })
    }
}

/// A validated source image: raw bytes plus the sniffed image format
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl SourceImage {
    /// Validate a raw file as an image by sniffing its content
    ///
    /// Validation is content-based, not extension-based: a `.jpg` file
    /// containing text is rejected, a misnamed PNG is accepted.
    pub fn sniff(file: RawFile) -> Result<Self> {
        if file.bytes.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "'{}' is empty",
                file.name
            )));
        }
        let format = image::guess_format(&file.bytes).map_err(|_| {
            PipelineError::invalid_input(format!("'{}' is not an image", file.name))
        })?;
        Ok(Self {
            name: file.name,
            bytes: file.bytes,
            format,
        })
    }

    /// Origin name of the source file
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw image bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Sniffed image format
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of the sniffed format
    #[must_use]
    pub fn media_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Decode the source into a [`image::DynamicImage`]
    pub fn decode(&self) -> Result<image::DynamicImage> {
        let decoded = image::load_from_memory_with_format(&self.bytes, self.format)?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encode_png;

    #[test]
    fn test_sniff_accepts_png_regardless_of_name() {
        let png = encode_png(4, 4);
        let source = SourceImage::sniff(RawFile::new("holiday.jpg", png)).unwrap();
        assert_eq!(source.format(), ImageFormat::Png);
        assert_eq!(source.media_type(), "image/png");
        assert_eq!(source.name(), "holiday.jpg");
    }

    #[test]
    fn test_sniff_rejects_text_payload() {
        let err = SourceImage::sniff(RawFile::new("notes.txt", b"hello world".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_sniff_rejects_empty_payload() {
        let err = SourceImage::sniff(RawFile::new("empty.png", Vec::new())).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_round_trips_dimensions() {
        let png = encode_png(7, 3);
        let source = SourceImage::sniff(RawFile::new("tiny.png", png)).unwrap();
        let decoded = source.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, encode_png(2, 2)).unwrap();

        let file = RawFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "input.png");
        assert!(SourceImage::sniff(file).is_ok());
    }
}
