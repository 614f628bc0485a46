//! HTTP-backed background-removal capability
//!
//! Posts the source image to a remote segmentation endpoint and returns the
//! response body as a raw buffer outcome. The endpoint contract is
//! deliberately thin: request body is the image bytes with their sniffed
//! content type, response body is the processed image (PNG with alpha).

use crate::capability::BackgroundRemoval;
use crate::error::{PipelineError, Result};
use crate::outcome::RemovalOutcome;
use crate::source::SourceImage;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Client for a remote background-removal service
pub struct HttpRemovalService {
    client: Client,
    endpoint: String,
}

impl HttpRemovalService {
    /// Create a client for the given endpoint URL
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PipelineError::transport_error("create HTTP client", &e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint this service posts to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BackgroundRemoval for HttpRemovalService {
    async fn remove_background(&self, source: &SourceImage) -> Result<RemovalOutcome> {
        debug!(
            endpoint = %self.endpoint,
            media_type = source.media_type(),
            size = source.bytes().len(),
            "posting image to removal service"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, source.media_type())
            .body(source.bytes().to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::transport_error("post image", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::capability(format!(
                "removal service responded with {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PipelineError::transport_error("read response body", &e))?;

        Ok(RemovalOutcome::Buffer(body.to_vec()))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_construction() {
        let service = HttpRemovalService::new("https://removal.example.com/v1/segment").unwrap();
        assert_eq!(service.endpoint(), "https://removal.example.com/v1/segment");
        assert_eq!(service.name(), "http");
    }
}
