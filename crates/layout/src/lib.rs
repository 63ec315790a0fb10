use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout pass was superseded by a newer request.")]
    Superseded,
}

pub mod classifier;
pub mod config;
pub mod context;
pub mod elements;
pub mod engine;
pub mod fonts;
pub mod footnote;
pub mod generation;
pub mod image;
pub mod inline;
pub mod output;
pub mod paginator;
pub mod raster;
pub mod segmenter;
pub mod table;
pub mod text;

#[cfg(test)]
mod test_utils;

pub use self::config::LayoutConfig;
pub use self::context::LayoutContext;
pub use self::elements::{ImageElement, ImageId, LineElement, Page, PageElement, RectElement, TextElement};
pub use self::engine::PaginationEngine;
pub use self::fonts::{CustomFont, FontFamily, FontKey, FontLoadError, FontSet};
pub use self::footnote::FootnoteCompositor;
pub use self::generation::GenerationTicket;
pub use self::inline::InlineRun;
pub use self::output::{HeadingAnchor, ImageResource, LaidOutDocument};
pub use self::paginator::{Paginator, TextFlow};
pub use self::segmenter::{segment_document, Block, ListMarker, SourceBlock};
pub use self::table::GridTableLayout;
