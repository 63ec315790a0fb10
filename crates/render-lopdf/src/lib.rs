//! PDF serialization of laid-out pages using lopdf.
//!
//! The renderer builds the whole object graph in memory and writes it out in
//! one go. Nothing time-dependent is written, so equal input gives equal bytes.

mod error;
mod fonts;
mod helpers;
mod images;
mod renderer;
mod writer;

pub use error::RenderError;
pub use fonts::FontResources;
pub use helpers::{build_outlines, render_page_content};
pub use renderer::LopdfRenderer;
pub use writer::PdfDocumentWriter;
