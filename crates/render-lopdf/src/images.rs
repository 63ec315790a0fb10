//! Image XObjects: every image is re-encoded as Flate RGB, alpha as an SMask.

use crate::error::RenderError;
use crate::writer::{deflate, PdfDocumentWriter};
use lopdf::{dictionary, ObjectId, Stream};
use notepress_layout::ImageResource;

struct Rgba<'a> {
    pixels: std::borrow::Cow<'a, [u8]>,
    width: u32,
    height: u32,
}

fn decode(resource: &ImageResource) -> Option<Rgba<'_>> {
    match resource {
        ImageResource::Encoded { data, format, .. } => match image::load_from_memory(data) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Some(Rgba {
                    pixels: rgba.into_raw().into(),
                    width,
                    height,
                })
            }
            Err(e) => {
                log::warn!("Could not decode {:?} image: {}", format, e);
                None
            }
        },
        ImageResource::Raster(raster) => Some(Rgba {
            pixels: raster.pixels.as_slice().into(),
            width: raster.width,
            height: raster.height,
        }),
    }
}

fn image_stream(data: &[u8], width: u32, height: u32, color_space: &str) -> Result<Stream, RenderError> {
    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(data)?,
    ))
}

/// Adds `resource` as an image XObject.
///
/// Returns `None` when the pixels cannot be decoded; the image is then
/// left out of the page.
pub fn embed_image(writer: &mut PdfDocumentWriter, resource: &ImageResource) -> Result<Option<ObjectId>, RenderError> {
    let Some(rgba) = decode(resource) else {
        return Ok(None);
    };
    if rgba.width == 0 || rgba.height == 0 {
        log::warn!("Skipping empty image");
        return Ok(None);
    }

    let pixel_count = (rgba.width as usize) * (rgba.height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for px in rgba.pixels.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    let mut stream = image_stream(&rgb, rgba.width, rgba.height, "DeviceRGB")?;
    if alpha.iter().any(|a| *a != u8::MAX) {
        let mask_id = writer.add_object(image_stream(&alpha, rgba.width, rgba.height, "DeviceGray")?);
        stream.dict.set("SMask", mask_id);
    }
    Ok(Some(writer.add_object(stream)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepress_traits::RasterImage;

    #[test]
    fn opaque_rasters_carry_no_mask() {
        let mut writer = PdfDocumentWriter::new();
        let raster = ImageResource::Raster(RasterImage {
            pixels: vec![10, 20, 30, 255].repeat(4),
            width: 2,
            height: 2,
        });
        assert!(embed_image(&mut writer, &raster).unwrap().is_some());

        let translucent = ImageResource::Raster(RasterImage {
            pixels: vec![10, 20, 30, 128].repeat(4),
            width: 2,
            height: 2,
        });
        assert!(embed_image(&mut writer, &translucent).unwrap().is_some());
    }

    #[test]
    fn undecodable_bytes_are_skipped() {
        let mut writer = PdfDocumentWriter::new();
        let broken = ImageResource::Encoded {
            data: std::sync::Arc::new(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3]),
            format: notepress_types::ImageFormat::Png,
            pixel_width: 4,
            pixel_height: 4,
        };
        assert!(embed_image(&mut writer, &broken).unwrap().is_none());
    }
}
