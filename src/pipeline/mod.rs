//! Export orchestration.
//!
//! - [`ExporterBuilder`]: wires settings and host capabilities together
//! - [`NoteExporter`]: runs one export per request, superseding stale ones
//!
//! # Example
//!
//! ```ignore
//! use notepress::{ExportRequest, ExporterBuilder};
//!
//! let exporter = ExporterBuilder::new().with_asset_dir("vault").build()?;
//! let report = exporter.export(ExportRequest::new("note.md", text, "note", now)).await?;
//! std::fs::write("note.pdf", report.pdf)?;
//! ```

mod builder;
mod exporter;

pub use builder::ExporterBuilder;
pub use exporter::{ExportReport, ExportRequest, NoteExporter};
