#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use notepress::{RasterError, RasterImage, RasterRequest, Rasterizer};
use std::io::Cursor;
use std::time::Duration;

pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .expect("valid fixture timestamp")
}

/// `count` numbered paragraphs separated by blank lines.
pub fn paragraphs(count: usize) -> String {
    (1..=count)
        .map(|i| format!("Paragraph {} has a few words that wrap across the page width eventually.", i))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A real PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode fixture png");
    buf.into_inner()
}

/// Answers every request with a solid image, after `delay`.
#[derive(Debug)]
pub struct SolidRasterizer {
    pub width: u32,
    pub height: u32,
    pub delay: Duration,
}

impl SolidRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            delay: Duration::ZERO,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(64, 32)
        }
    }
}

#[async_trait]
impl Rasterizer for SolidRasterizer {
    async fn rasterize(&self, _request: &RasterRequest) -> Result<RasterImage, RasterError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(RasterImage {
            pixels: vec![90; (self.width * self.height * 4) as usize],
            width: self.width,
            height: self.height,
        })
    }

    fn name(&self) -> &'static str {
        "SolidRasterizer"
    }
}
