//! Background-removal capability boundary
//!
//! The actual segmentation work is delegated entirely to an external
//! capability consumed through the [`BackgroundRemoval`] trait. This crate
//! never looks inside it: implementations may call out over HTTP, shell out
//! to a local model runtime, or fake the work for tests.

pub mod http;
pub mod mock;

pub use http::HttpRemovalService;
pub use mock::{MockOutcomeShape, MockRemoval};

use crate::error::Result;
use crate::outcome::RemovalOutcome;
use crate::source::SourceImage;
use async_trait::async_trait;

/// Opaque asynchronous background-removal service boundary
///
/// Implementations accept a validated source image and eventually return a
/// processed image in one of the [`RemovalOutcome`] encodings. Failures are
/// surfaced as errors; the controller catches them, logs them, and resolves
/// back to idle without a result.
#[async_trait]
pub trait BackgroundRemoval: Send + Sync {
    /// Remove the background from `source`, making background pixels
    /// transparent
    async fn remove_background(&self, source: &SourceImage) -> Result<RemovalOutcome>;

    /// Human-readable name of the capability, for logging
    fn name(&self) -> &str;
}
