//! Temporary object references
//!
//! In-memory binary results are not directly addressable by a presentation
//! layer; the [`ObjectUrlRegistry`] wraps them into process-local `blob:` URLs
//! that can be handed out as display references and dereferenced back into
//! bytes. Every URL the registry creates must be revoked exactly once, either
//! when superseded by a newer handle or when the owning controller is torn
//! down. Unreleased handles hold their backing bytes alive, which is the
//! process-local analog of a leaked browser object URL.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

/// URL scheme prefix identifying registry-owned display references
pub const OBJECT_URL_SCHEME: &str = "blob:";

/// In-memory binary image data tagged with a media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageBlob {
    /// Create a blob with an explicit media type
    #[must_use]
    pub fn new<S: Into<String>>(media_type: S, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Create a PNG-tagged blob
    #[must_use]
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::new("image/png", bytes)
    }

    /// Media type tag, e.g. `image/png`
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Backing bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of backing bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob carries no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the media type tags image data
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// A string reference a view layer can render an image from
///
/// Either a registry-owned `blob:` URL or an external URL passed through
/// unchanged from the capability. Only the former is subject to revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayRef(String);

impl DisplayRef {
    /// Wrap an external (non-registry) URL as a display reference
    #[must_use]
    pub fn external<S: Into<String>>(url: S) -> Self {
        Self(url.into())
    }

    /// The reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference is owned by an [`ObjectUrlRegistry`]
    #[must_use]
    pub fn is_object_url(&self) -> bool {
        self.0.starts_with(OBJECT_URL_SCHEME)
    }
}

impl std::fmt::Display for DisplayRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    entries: HashMap<String, Arc<ImageBlob>>,
    created: u64,
    revoked: u64,
}

/// Registry of live object URLs and their backing blobs
///
/// Cheaply cloneable; clones share the same underlying table so a controller
/// can hand resolution capability to a frontend while retaining release
/// responsibility itself.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ObjectUrlRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wrap a blob into a fresh dereferenceable object URL
    #[must_use]
    pub fn create_url(&self, blob: ImageBlob) -> DisplayRef {
        let url = format!("{}bgremove/{}", OBJECT_URL_SCHEME, Uuid::new_v4());
        let mut inner = self.lock();
        debug!(url = %url, media_type = %blob.media_type(), size = blob.len(), "created object url");
        inner.entries.insert(url.clone(), Arc::new(blob));
        inner.created += 1;
        DisplayRef(url)
    }

    /// Dereference a display reference back into its backing blob
    ///
    /// Returns `None` for revoked URLs and for external references the
    /// registry does not own.
    #[must_use]
    pub fn resolve(&self, display: &DisplayRef) -> Option<Arc<ImageBlob>> {
        self.lock().entries.get(display.as_str()).map(Arc::clone)
    }

    /// Release an object URL
    ///
    /// External references are ignored. Revoking a URL twice, or one this
    /// registry never issued, is a logged no-op rather than a double release.
    pub fn revoke(&self, display_ref: &DisplayRef) {
        if !display_ref.is_object_url() {
            return;
        }
        let mut inner = self.lock();
        if inner.entries.remove(display_ref.as_str()).is_some() {
            inner.revoked += 1;
            debug!(url = %display_ref, "revoked object url");
        } else {
            warn!(url = %display_ref, "revoke of unknown or already-revoked object url");
        }
    }

    /// Number of live, unrevoked object URLs
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.lock().entries.len()
    }

    /// Total URLs created over the registry's lifetime
    #[must_use]
    pub fn created(&self) -> u64 {
        self.lock().created
    }

    /// Total URLs revoked over the registry's lifetime
    #[must_use]
    pub fn revoked(&self) -> u64 {
        self.lock().revoked
    }
}
