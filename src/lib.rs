#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Background-Removal Pipeline Controller
//!
//! A small library that wires user-supplied images to an external
//! background-removal capability: validate the submitted file, invoke the
//! capability asynchronously, show simulated progress while waiting,
//! normalize the polymorphic result into one displayable reference, and
//! release every temporary object reference exactly once.
//!
//! The segmentation work itself is out of scope: it lives behind the
//! [`BackgroundRemoval`] trait and is consumed as an opaque service boundary.
//! This crate ships an HTTP client implementation and a deterministic mock.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgremove_pipeline::{MockRemoval, PipelineController, RawFile};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut controller = PipelineController::new(Arc::new(MockRemoval::new()));
//! controller.submit(RawFile::from_path("input.jpg").await?)?;
//!
//! let view = controller.wait().await;
//! if let Some(result) = &view.result {
//!     let blob = controller.resolve(result).expect("object url");
//!     tokio::fs::write(controller.download_name(), blob.bytes()).await?;
//! }
//! controller.reset();
//! # Ok(())
//! # }
//! ```
//!
//! ## Remote capability
//!
//! ```rust,no_run
//! use bgremove_pipeline::{HttpRemovalService, PipelineController};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let service = HttpRemovalService::new("https://removal.example.com/v1/segment")?;
//! let controller = PipelineController::new(Arc::new(service));
//! # let _ = controller;
//! # Ok(())
//! # }
//! ```

pub mod capability;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod handles;
pub mod outcome;
pub mod progress;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use capability::{BackgroundRemoval, HttpRemovalService, MockOutcomeShape, MockRemoval};
pub use config::{InputRejection, PipelineConfig, PipelineConfigBuilder};
pub use controller::{PipelineController, ViewState};
pub use error::{PipelineError, Result};
pub use handles::{DisplayRef, ImageBlob, ObjectUrlRegistry, OBJECT_URL_SCHEME};
pub use outcome::RemovalOutcome;
pub use progress::{
    NoOpProgressReporter, ProgressReporter, SimulatedProgress, TracingProgressReporter,
};
pub use source::{RawFile, SourceImage};

/// Remove the background from an image provided as bytes
///
/// A one-shot convenience wrapper around the capability boundary for callers
/// that do not need the controller's state machine or progress simulation:
/// validate, invoke, normalize, and hand back the processed image as a blob.
///
/// Returns [`PipelineError::InvalidInput`] for non-image payloads and
/// [`PipelineError::UnrecognizedResult`] when the capability answers with an
/// external URL instead of image data.
pub async fn remove_background_from_bytes(
    image_bytes: &[u8],
    capability: &dyn BackgroundRemoval,
) -> Result<ImageBlob> {
    let source = SourceImage::sniff(RawFile::new("input", image_bytes.to_vec()))?;
    let registry = ObjectUrlRegistry::new();

    let outcome = capability.remove_background(&source).await?;
    let display = outcome.normalize(&registry)?;
    let blob = registry.resolve(&display).ok_or_else(|| {
        PipelineError::unrecognized_result(
            "capability returned an external url; no image data to hand back",
        )
    })?;
    registry.revoke(&display);
    Ok((*blob).clone())
}

/// Remove the background from an image read from an async stream
///
/// Reads the stream to its end, then delegates to
/// [`remove_background_from_bytes`].
pub async fn remove_background_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    capability: &dyn BackgroundRemoval,
) -> Result<ImageBlob> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;
    remove_background_from_bytes(&buffer, capability).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::encode_png;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_remove_background_from_bytes() {
        let blob = remove_background_from_bytes(&encode_png(8, 8), &MockRemoval::new())
            .await
            .unwrap();
        assert_eq!(blob.media_type(), "image/png");
        assert!(!blob.is_empty());
    }

    #[tokio::test]
    async fn test_remove_background_from_reader() {
        let reader = Cursor::new(encode_png(8, 8));
        let blob = remove_background_from_reader(reader, &MockRemoval::new())
            .await
            .unwrap();
        assert!(blob.is_image());
    }

    #[tokio::test]
    async fn test_bytes_api_rejects_non_image() {
        let err = remove_background_from_bytes(b"plain text", &MockRemoval::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_bytes_api_reports_external_url_results() {
        let capability = MockRemoval::new().with_shape(MockOutcomeShape::Url);
        let err = remove_background_from_bytes(&encode_png(8, 8), &capability)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnrecognizedResult(_)));
    }
}
