//! Sizing and stamping of image boxes: padding, picture, wrapped caption.

use crate::context::LayoutContext;
use crate::elements::{ImageElement, ImageId, PageElement};
use crate::fonts::FontKey;
use crate::paginator::Paginator;
use crate::text::wrap_text;
use notepress_types::{Rect, SemanticRole, Size};

pub const IMAGE_PADDING: f32 = 6.0;
const CAPTION_SCALE: f32 = 0.85;

/// CSS pixels to points.
pub fn px_to_pt(px: u32) -> f32 {
    px as f32 * 72.0 / 96.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxAlign {
    Center,
    /// Left edge at the given x.
    Left(f32),
}

/// Measured geometry of one image box.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBox {
    pub image: Size,
    pub caption_lines: Vec<String>,
    pub caption_size: f32,
    pub caption_line_height: f32,
    pub padding: f32,
}

impl ImageBox {
    pub fn height(&self) -> f32 {
        let caption = if self.caption_lines.is_empty() {
            0.0
        } else {
            IMAGE_PADDING / 2.0 + self.caption_lines.len() as f32 * self.caption_line_height
        };
        self.padding * 2.0 + self.image.height + caption
    }
}

fn caption_font(ctx: &LayoutContext) -> FontKey {
    ctx.fonts.body(false, true)
}

/// Computes the box for an image of `pixel_width` x `pixel_height`.
///
/// The width override is in pixels. The image never grows past the printable
/// width and is scaled down further when the whole box would not fit on an
/// empty page.
pub fn measure_image_box(
    ctx: &LayoutContext,
    pixel_width: u32,
    pixel_height: u32,
    width_override: Option<u32>,
    caption: Option<&str>,
    padding: f32,
) -> ImageBox {
    let natural = Size::new(px_to_pt(pixel_width), px_to_pt(pixel_height));
    let target_width = width_override.map(px_to_pt).unwrap_or(natural.width);
    let mut image = if natural.width > 0.0 {
        Size::new(target_width, natural.height * target_width / natural.width)
    } else {
        natural
    };
    let content = ctx.content_box();
    image = image.fit_width(content.width);

    let caption_size = ctx.font_size * CAPTION_SCALE;
    let caption_line_height = ctx.line_height_for(caption_size);
    let wrap_caption = |width: f32| -> Vec<String> {
        match caption {
            Some(text) if !text.trim().is_empty() => wrap_text(text, width.max(1.0), |s| {
                ctx.fonts.measure(s, caption_font(ctx), caption_size)
            }),
            _ => Vec::new(),
        }
    };

    let mut measured = ImageBox {
        image,
        caption_lines: wrap_caption(image.width),
        caption_size,
        caption_line_height,
        padding,
    };

    // Shrinking narrows the caption, which can add caption lines; settle in a few rounds.
    for _ in 0..3 {
        let overflow = measured.height() - content.height;
        if overflow <= 0.0 || measured.image.height <= 0.0 {
            break;
        }
        let target_height = (measured.image.height - overflow).max(1.0);
        let scale = target_height / measured.image.height;
        measured.image = Size::new(measured.image.width * scale, target_height);
        measured.caption_lines = wrap_caption(measured.image.width);
    }
    measured
}

/// Stamps a measured image box whose top edge is at `top`.
///
/// Draw order is background, picture, caption.
pub fn draw_image_box(
    pager: &mut Paginator<'_>,
    top: f32,
    measured: &ImageBox,
    image: ImageId,
    align: BoxAlign,
    with_background: bool,
) {
    let ctx = pager.context();
    let content = ctx.content_box();

    if with_background {
        let background = ctx.role_color(SemanticRole::CodeBackground);
        pager.fill_rect(Rect::new(content.x, top, content.width, measured.height()), background);
    }

    let x = match align {
        BoxAlign::Center => content.x + (content.width - measured.image.width) / 2.0,
        BoxAlign::Left(x) => x,
    };
    let image_top = top + measured.padding;
    pager.push(PageElement::Image(ImageElement {
        rect: Rect::new(x, image_top, measured.image.width, measured.image.height),
        image,
    }));

    let font = caption_font(ctx);
    let color = ctx.muted_color();
    let center = x + measured.image.width / 2.0;
    let mut line_top = image_top + measured.image.height + IMAGE_PADDING / 2.0;
    for line in &measured.caption_lines {
        let width = ctx.fonts.measure(line, font, measured.caption_size);
        let baseline = line_top + measured.caption_line_height / 2.0 + measured.caption_size * 0.3;
        pager.draw_text(line, center - width / 2.0, baseline, font, measured.caption_size, color);
        line_top += measured.caption_line_height;
    }
}
