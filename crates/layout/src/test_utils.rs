use async_trait::async_trait;
use notepress_traits::{RasterError, RasterImage, RasterRequest, Rasterizer};
use std::sync::Mutex;

/// Bytes that sniff as PNG. Layout never decodes them.
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 24]);
    data
}

/// Returns a solid image of fixed size for every request and records the markup.
#[derive(Debug)]
pub struct EchoRasterizer {
    width: u32,
    height: u32,
    pub seen: Mutex<Vec<String>>,
}

impl EchoRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Rasterizer for EchoRasterizer {
    async fn rasterize(&self, request: &RasterRequest) -> Result<RasterImage, RasterError> {
        self.seen.lock().unwrap().push(request.markup.clone());
        Ok(RasterImage {
            pixels: vec![255; (self.width * self.height * 4) as usize],
            width: self.width,
            height: self.height,
        })
    }

    fn name(&self) -> &'static str {
        "EchoRasterizer"
    }
}
