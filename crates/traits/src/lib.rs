//! Interfaces to the external capabilities the layout engine consumes.
//!
//! The engine never touches the filesystem, a markup renderer or a grid layout
//! directly; hosts plug those in through the traits here.

pub mod raster;
pub mod resource;
pub mod table;

pub use raster::{RasterError, RasterImage, RasterKind, RasterRequest, Rasterizer, UnavailableRasterizer};
pub use resource::{AssetResolver, InMemoryAssetResolver, ResolvedAsset, ResourceError, SharedResourceData};
pub use table::{TableCanvas, TableData, TableError, TableLayout, TableStyle, TextWeight};
