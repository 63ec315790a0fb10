//! AssetResolver trait for abstracting image loading.
//!
//! This trait allows the engine to resolve embedded image references
//! without being tied to filesystem access.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Invalid resource format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// A resolved image: its encoded bytes plus natural pixel dimensions.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub data: SharedResourceData,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Resolves an image reference found in a note to binary data.
///
/// Implementations may hit the disk, a vault index or the network, so resolution
/// is asynchronous; the engine bounds every call with a timeout.
#[async_trait]
pub trait AssetResolver: Send + Sync + Debug {
    /// Resolve a reference (as written in the note) to image data.
    async fn resolve(&self, reference: &str) -> Result<ResolvedAsset, ResourceError>;

    /// Returns a human-readable name for this resolver (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory asset resolver.
///
/// Assets must be registered before use. This is the simplest resolver and is
/// what tests and embedding hosts with pre-fetched attachments use.
#[derive(Debug, Default)]
pub struct InMemoryAssetResolver {
    assets: RwLock<HashMap<String, ResolvedAsset>>,
}

impl InMemoryAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset under `reference`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(
        &self,
        reference: impl Into<String>,
        data: Vec<u8>,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Result<(), ResourceError> {
        let reference = reference.into();
        let mut assets = self.assets.write().map_err(|_| ResourceError::LoadFailed {
            path: reference.clone(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets.insert(
            reference,
            ResolvedAsset {
                data: Arc::new(data),
                pixel_width,
                pixel_height,
            },
        );
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Returns `true` if the lock is poisoned.
    pub fn is_empty(&self) -> bool {
        self.assets.read().map(|a| a.is_empty()).unwrap_or(true)
    }
}

#[async_trait]
impl AssetResolver for InMemoryAssetResolver {
    async fn resolve(&self, reference: &str) -> Result<ResolvedAsset, ResourceError> {
        let assets = self.assets.read().map_err(|_| ResourceError::LoadFailed {
            path: reference.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets
            .get(reference)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(reference.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryAssetResolver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_resolver_add_and_resolve() {
        let resolver = InMemoryAssetResolver::new();
        resolver.add("cat.png", b"png-bytes".to_vec(), 640, 480).unwrap();

        let asset = resolver.resolve("cat.png").await.unwrap();
        assert_eq!(&*asset.data, b"png-bytes");
        assert_eq!((asset.pixel_width, asset.pixel_height), (640, 480));
    }

    #[tokio::test]
    async fn test_in_memory_resolver_not_found() {
        let resolver = InMemoryAssetResolver::new();
        let result = resolver.resolve("missing.png").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn test_in_memory_resolver_overwrite() {
        let resolver = InMemoryAssetResolver::new();
        resolver.add("a.png", vec![1], 1, 1).unwrap();
        resolver.add("a.png", vec![2], 2, 2).unwrap();
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::LoadFailed {
            path: "file.bin".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("file.bin"));
        assert!(err.to_string().contains("permission denied"));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let resource_err: ResourceError = io_err.into();
        assert!(matches!(resource_err, ResourceError::Io(_)));
    }
}
