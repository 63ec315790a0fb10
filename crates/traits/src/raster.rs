//! Rasterizer trait for markup that cannot be drawn with primitive operations.
//!
//! Callouts and TeX math are handed to a host renderer that returns RGBA pixels.

use async_trait::async_trait;
use notepress_types::Theme;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RasterError {
    #[error("Rasterizer unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to render markup: {0}")]
    RenderFailed(String),

    #[error("Rasterizer returned {actual} bytes for a {width}x{height} RGBA image")]
    BadPixelBuffer { width: u32, height: u32, actual: usize },
}

/// What kind of markup a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    /// `$$...$$` display math.
    BlockMath,
    /// `$...$` inline math.
    InlineMath,
    /// A contiguous run of `>` lines, prefix included.
    Callout,
}

#[derive(Debug, Clone)]
pub struct RasterRequest {
    pub markup: String,
    pub kind: RasterKind,
    pub theme: Theme,
    pub target_width_px: u32,
}

/// Non-premultiplied RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Checks that the buffer length matches the dimensions.
    pub fn validate(&self) -> Result<(), RasterError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(RasterError::BadPixelBuffer {
                width: self.width,
                height: self.height,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync + Debug {
    async fn rasterize(&self, request: &RasterRequest) -> Result<RasterImage, RasterError>;

    fn name(&self) -> &'static str;
}

/// Used when the host has no renderer; every request fails and the engine
/// falls back to placeholder text.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRasterizer;

#[async_trait]
impl Rasterizer for UnavailableRasterizer {
    async fn rasterize(&self, request: &RasterRequest) -> Result<RasterImage, RasterError> {
        Err(RasterError::Unavailable(format!(
            "no renderer configured for {:?}",
            request.kind
        )))
    }

    fn name(&self) -> &'static str {
        "UnavailableRasterizer"
    }
}
