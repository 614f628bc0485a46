//! Capability result normalization
//!
//! The external capability may hand back its result in one of several
//! encodings. [`RemovalOutcome`] models them as a tagged union with exhaustive
//! matching, so a future encoding added here forces every consumer to handle
//! it instead of silently falling through a chain of type probes.

use crate::error::{PipelineError, Result};
use crate::handles::{DisplayRef, ImageBlob, ObjectUrlRegistry};

/// Result of one background-removal invocation, in whatever encoding the
/// capability produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// A direct URL reference, used as-is
    Url(String),
    /// Binary image data tagged with a media type
    Blob(ImageBlob),
    /// A raw binary buffer, assumed to be encoded PNG data
    Buffer(Vec<u8>),
}

impl RemovalOutcome {
    /// Normalize into one canonical dereferenceable display reference
    ///
    /// | Outcome | Normalization |
    /// |---|---|
    /// | `Url` | used as-is |
    /// | `Blob` | wrapped into an object URL |
    /// | `Buffer` | wrapped into a PNG-tagged blob, then an object URL |
    ///
    /// Malformed members of a recognized variant (empty URL, empty buffer,
    /// blob without image data) are a soft failure: no display reference is
    /// produced and the caller resets its processing state.
    pub fn normalize(self, registry: &ObjectUrlRegistry) -> Result<DisplayRef> {
        match self {
            Self::Url(url) => {
                if url.trim().is_empty() {
                    return Err(PipelineError::unrecognized_result(
                        "capability returned an empty url",
                    ));
                }
                Ok(DisplayRef::external(url))
            },
            Self::Blob(blob) => {
                if blob.is_empty() {
                    return Err(PipelineError::unrecognized_result(
                        "capability returned an empty blob",
                    ));
                }
                if !blob.is_image() {
                    return Err(PipelineError::unrecognized_result(format!(
                        "capability returned a non-image blob ({})",
                        blob.media_type()
                    )));
                }
                Ok(registry.create_url(blob))
            },
            Self::Buffer(bytes) => {
                if bytes.is_empty() {
                    return Err(PipelineError::unrecognized_result(
                        "capability returned an empty buffer",
                    ));
                }
                Ok(registry.create_url(ImageBlob::png(bytes)))
            },
        }
    }

    /// Short name of the encoding, for logging
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Blob(_) => "blob",
            Self::Buffer(_) => "buffer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_outcome_passes_through() {
        let registry = ObjectUrlRegistry::new();
        let display = RemovalOutcome::Url("https://cdn.example.com/cutout.png".into())
            .normalize(&registry)
            .unwrap();
        assert_eq!(display.as_str(), "https://cdn.example.com/cutout.png");
        assert!(!display.is_object_url());
        assert_eq!(registry.outstanding(), 0);
    }

    #[test]
    fn test_blob_outcome_becomes_object_url() {
        let registry = ObjectUrlRegistry::new();
        let display = RemovalOutcome::Blob(ImageBlob::png(vec![1, 2, 3]))
            .normalize(&registry)
            .unwrap();
        assert!(display.is_object_url());
        assert_eq!(registry.resolve(&display).unwrap().bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_buffer_outcome_is_tagged_png() {
        let registry = ObjectUrlRegistry::new();
        let display = RemovalOutcome::Buffer(vec![9, 9, 9])
            .normalize(&registry)
            .unwrap();
        let blob = registry.resolve(&display).unwrap();
        assert_eq!(blob.media_type(), "image/png");
        assert_eq!(blob.bytes(), &[9, 9, 9]);
    }

    #[test]
    fn test_malformed_outcomes_are_soft_failures() {
        let registry = ObjectUrlRegistry::new();
        let cases = [
            RemovalOutcome::Url("   ".into()),
            RemovalOutcome::Blob(ImageBlob::png(Vec::new())),
            RemovalOutcome::Blob(ImageBlob::new("text/plain", vec![1])),
            RemovalOutcome::Buffer(Vec::new()),
        ];
        for outcome in cases {
            let err = outcome.normalize(&registry).unwrap_err();
            assert!(matches!(err, PipelineError::UnrecognizedResult(_)));
        }
        // No handle may be created on any failed normalization
        assert_eq!(registry.created(), 0);
    }
}
