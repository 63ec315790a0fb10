// src/pipeline/builder.rs
use super::exporter::NoteExporter;
use crate::error::PipelineError;
use crate::settings::ExportSettings;
use notepress_layout::GridTableLayout;
use notepress_resource::FilesystemAssetResolver;
use notepress_traits::{AssetResolver, InMemoryAssetResolver, Rasterizer, TableLayout, UnavailableRasterizer};
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `NoteExporter`.
///
/// Without further configuration images resolve against an empty store,
/// math and callouts fall back to placeholders, and tables use the grid layout.
pub struct ExporterBuilder {
    settings: ExportSettings,
    resolver: Arc<dyn AssetResolver>,
    rasterizer: Arc<dyn Rasterizer>,
    tables: Arc<dyn TableLayout>,
}

impl Default for ExporterBuilder {
    fn default() -> Self {
        Self {
            settings: ExportSettings::default(),
            resolver: Arc::new(InMemoryAssetResolver::new()),
            rasterizer: Arc::new(UnavailableRasterizer),
            tables: Arc::new(GridTableLayout),
        }
    }
}

impl ExporterBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Loads settings from a JSON file.
    pub fn with_settings_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        let path_ref = path.as_ref();
        let json = std::fs::read_to_string(path_ref).map_err(|e| {
            PipelineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read settings from '{}': {}", path_ref.display(), e),
            ))
        })?;
        self.settings = ExportSettings::from_json(&json)?;
        Ok(self)
    }

    pub fn with_asset_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolves image references against files under `dir`.
    pub fn with_asset_dir<P: AsRef<Path>>(self, dir: P) -> Self {
        self.with_asset_resolver(Arc::new(FilesystemAssetResolver::new(dir)))
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_table_layout(mut self, tables: Arc<dyn TableLayout>) -> Self {
        self.tables = tables;
        self
    }

    /// Validates the settings and builds the exporter.
    pub fn build(self) -> Result<NoteExporter, PipelineError> {
        self.settings.validate()?;
        log::debug!(
            "Building exporter: rasterizer={}, theme={:?}, font={}",
            self.rasterizer.name(),
            self.settings.theme,
            self.settings.font_family
        );
        Ok(NoteExporter::new(self.settings, self.resolver, self.rasterizer, self.tables))
    }
}
