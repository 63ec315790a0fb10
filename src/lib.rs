//! notepress turns markdown notes into paginated PDF documents.
//!
//! The work is split across the workspace crates; this crate wires them
//! together behind [`NoteExporter`].

pub mod error;
pub mod pipeline;
pub mod settings;

pub use error::PipelineError;
pub use pipeline::{ExportReport, ExportRequest, ExporterBuilder, NoteExporter};
pub use settings::{ExportSettings, DEFAULT_FOOTNOTE_TEMPLATE};

pub use notepress_layout::{GridTableLayout, LaidOutDocument, LayoutConfig};
pub use notepress_render_lopdf::LopdfRenderer;
pub use notepress_resource::FilesystemAssetResolver;
pub use notepress_traits::{
    AssetResolver, InMemoryAssetResolver, RasterError, RasterImage, RasterKind, RasterRequest, Rasterizer,
    ResourceError, TableLayout, UnavailableRasterizer,
};
pub use notepress_types::{Color, Margins, SemanticRole, Theme};
