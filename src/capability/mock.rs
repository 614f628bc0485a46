//! Mock capability implementation for testing and offline use
//!
//! Provides a simple corner-color keying algorithm as a stand-in for real
//! segmentation: pixels close in color to the top-left corner are treated as
//! background and made transparent. Useful for exercising the pipeline
//! without any external service, and for injecting failures in tests.

use crate::capability::BackgroundRemoval;
use crate::error::{PipelineError, Result};
use crate::handles::ImageBlob;
use crate::outcome::RemovalOutcome;
use crate::source::SourceImage;
use async_trait::async_trait;
use image::Rgba;
use std::io::Cursor;
use std::time::Duration;

/// Which [`RemovalOutcome`] encoding the mock should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcomeShape {
    /// A media-typed blob (default)
    Blob,
    /// A raw PNG buffer
    Buffer,
    /// A fixed external URL, no pixel work performed
    Url,
}

/// Deterministic mock background-removal capability
pub struct MockRemoval {
    shape: MockOutcomeShape,
    delay: Duration,
    failure: Option<String>,
    /// Squared RGB distance below which a pixel counts as background
    threshold: u32,
}

impl MockRemoval {
    /// Create a mock producing blob outcomes with no delay
    #[must_use]
    pub fn new() -> Self {
        Self {
            shape: MockOutcomeShape::Blob,
            delay: Duration::ZERO,
            failure: None,
            threshold: 3 * 32 * 32,
        }
    }

    /// Select the outcome encoding the mock produces
    #[must_use]
    pub fn with_shape(mut self, shape: MockOutcomeShape) -> Self {
        self.shape = shape;
        self
    }

    /// Sleep for `delay` before responding, to exercise in-flight states
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every invocation with the given capability error message
    #[must_use]
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    fn key_out_background(&self, source: &SourceImage) -> Result<Vec<u8>> {
        let mut rgba = source.decode()?.to_rgba8();
        let Rgba([kr, kg, kb, _]) = *rgba
            .get_pixel_checked(0, 0)
            .ok_or_else(|| PipelineError::capability("image has no pixels"))?;
        let key = (u32::from(kr), u32::from(kg), u32::from(kb));

        for pixel in rgba.pixels_mut() {
            let Rgba([r, g, b, _]) = *pixel;
            let dr = u32::from(r).abs_diff(key.0);
            let dg = u32::from(g).abs_diff(key.1);
            let db = u32::from(b).abs_diff(key.2);
            if dr * dr + dg * dg + db * db < self.threshold {
                pixel.0[3] = 0;
            }
        }

        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        Ok(buffer)
    }
}

impl Default for MockRemoval {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRemoval for MockRemoval {
    async fn remove_background(&self, source: &SourceImage) -> Result<RemovalOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(PipelineError::capability(message.clone()));
        }
        match self.shape {
            MockOutcomeShape::Url => Ok(RemovalOutcome::Url(
                "https://mock.invalid/bg-removed.png".to_owned(),
            )),
            MockOutcomeShape::Blob => {
                let png = self.key_out_background(source)?;
                Ok(RemovalOutcome::Blob(ImageBlob::png(png)))
            },
            MockOutcomeShape::Buffer => {
                let png = self.key_out_background(source)?;
                Ok(RemovalOutcome::Buffer(png))
            },
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawFile;
    use crate::test_support::encode_png;

    fn source() -> SourceImage {
        SourceImage::sniff(RawFile::new("fixture.png", encode_png(8, 8))).unwrap()
    }

    #[tokio::test]
    async fn test_mock_keys_out_corner_color() {
        let outcome = MockRemoval::new().remove_background(&source()).await.unwrap();
        let RemovalOutcome::Blob(blob) = outcome else {
            panic!("expected blob outcome");
        };
        assert!(blob.is_image());

        let result = image::load_from_memory(blob.bytes()).unwrap().to_rgba8();
        // Top-left corner matches the key color and must be transparent
        assert_eq!(result.get_pixel(0, 0).0[3], 0);
        // The right half is a different color and must remain opaque
        assert_eq!(result.get_pixel(7, 0).0[3], 255);
    }

    #[tokio::test]
    async fn test_mock_shapes() {
        let buffer = MockRemoval::new()
            .with_shape(MockOutcomeShape::Buffer)
            .remove_background(&source())
            .await
            .unwrap();
        assert!(matches!(buffer, RemovalOutcome::Buffer(b) if !b.is_empty()));

        let url = MockRemoval::new()
            .with_shape(MockOutcomeShape::Url)
            .remove_background(&source())
            .await
            .unwrap();
        assert!(matches!(url, RemovalOutcome::Url(u) if u.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let err = MockRemoval::failing("model unavailable")
            .remove_background(&source())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Capability(_)));
        assert!(err.to_string().contains("model unavailable"));
    }
}
