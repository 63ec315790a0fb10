//! Filesystem-based asset resolver for native platforms.
//!
//! References are resolved relative to a base directory, usually the one
//! holding the note. A bare file name that is not found directly is looked up
//! by name anywhere below the base, the way note vaults link attachments.
//!
//! # Security
//!
//! Resolved paths must stay within the base directory; absolute paths and
//! `..` escapes are rejected (e.g. `../../../etc/passwd`).

use async_trait::async_trait;
use notepress_traits::{AssetResolver, ResolvedAsset, ResourceError};
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// How deep the by-name fallback search descends.
const MAX_SEARCH_DEPTH: usize = 8;

#[derive(Debug)]
pub struct FilesystemAssetResolver {
    base_path: PathBuf,
    /// Canonicalized base path for security checks
    canonical_base: Option<PathBuf>,
    search_by_name: bool,
}

impl FilesystemAssetResolver {
    /// Creates a resolver rooted at `base_path`.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        // May fail if the path doesn't exist yet
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
            search_by_name: true,
        }
    }

    /// Disables the by-name fallback search.
    pub fn exact_paths_only(mut self) -> Self {
        self.search_by_name = false;
        self
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Resolves a reference relative to the base path.
    ///
    /// Returns `None` if the path would escape the base directory.
    fn resolve_path_safe(&self, reference: &str) -> Option<PathBuf> {
        let reference = reference.replace("%20", " ");
        let relative = Path::new(&reference);
        if relative.is_absolute() {
            return None;
        }

        let full_path = self.base_path.join(relative);
        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref base) = self.canonical_base
        {
            return canonical.starts_with(base).then_some(canonical);
        }

        // Not on disk (yet): reject any `..` outright.
        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }
        Some(full_path)
    }

    fn find_by_name(&self, file_name: &str) -> Option<PathBuf> {
        let base = self.canonical_base.as_ref()?;
        let mut pending = vec![(base.clone(), 0usize)];
        let mut matches = Vec::new();
        while let Some((dir, depth)) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Ok(kind) = entry.file_type() else {
                    continue;
                };
                if kind.is_dir() && depth < MAX_SEARCH_DEPTH {
                    pending.push((path, depth + 1));
                } else if kind.is_file() && entry.file_name().to_str() == Some(file_name) {
                    matches.push(path);
                }
            }
        }
        // Shortest path wins; ties break alphabetically so lookups are stable.
        matches.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });
        matches.into_iter().next()
    }

    async fn locate(&self, reference: &str) -> Result<PathBuf, ResourceError> {
        let path = self
            .resolve_path_safe(reference)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (path traversal blocked)", reference)))?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }

        let is_bare_name = Path::new(reference).components().count() == 1;
        if self.search_by_name && is_bare_name {
            log::debug!("'{}' not found at {}; searching by name", reference, path.display());
            if let Some(found) = self.find_by_name(reference) {
                return Ok(found);
            }
        }
        Err(ResourceError::NotFound(reference.to_string()))
    }
}

/// Reads the pixel size from the image header without decoding pixels.
fn read_dimensions(reference: &str, data: &[u8]) -> Result<(u32, u32), ResourceError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ResourceError::LoadFailed {
            path: reference.to_string(),
            message: e.to_string(),
        })?
        .into_dimensions()
        .map_err(|e| ResourceError::InvalidFormat(format!("{}: {}", reference, e)))
}

#[async_trait]
impl AssetResolver for FilesystemAssetResolver {
    async fn resolve(&self, reference: &str) -> Result<ResolvedAsset, ResourceError> {
        let path = self.locate(reference).await?;
        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(reference.to_string())
            } else {
                ResourceError::LoadFailed {
                    path: reference.to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        let (pixel_width, pixel_height) = read_dimensions(reference, &data)?;
        log::debug!("Resolved '{}' to {} ({}x{})", reference, path.display(), pixel_width, pixel_height);
        Ok(ResolvedAsset {
            data: Arc::new(data),
            pixel_width,
            pixel_height,
        })
    }

    fn name(&self) -> &'static str {
        "FilesystemAssetResolver"
    }
}
