use crate::error::RenderError;
use crate::fonts::FontResources;
use crate::helpers::{build_outlines, render_page_content};
use crate::images::embed_image;
use crate::writer::PdfDocumentWriter;
use notepress_layout::LaidOutDocument;

/// Turns a laid-out document into one PDF buffer.
#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    title: Option<String>,
    outlines: bool,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfRenderer {
    pub fn new() -> Self {
        Self {
            title: None,
            outlines: true,
        }
    }

    /// Sets the document info `Title`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_outlines(mut self, outlines: bool) -> Self {
        self.outlines = outlines;
        self
    }

    pub fn render(&self, doc: &LaidOutDocument) -> Result<Vec<u8>, RenderError> {
        log::info!("Rendering {} pages", doc.page_count());
        let mut writer = PdfDocumentWriter::new();
        let fonts = FontResources::register(&mut writer, doc)?;

        let mut image_names = Vec::with_capacity(doc.images.len());
        for (index, resource) in doc.images.iter().enumerate() {
            let name = match embed_image(&mut writer, resource)? {
                Some(id) => {
                    let name = format!("Im{}", index + 1);
                    writer.register_xobject(&name, id);
                    Some(name)
                }
                None => None,
            };
            image_names.push(name);
        }

        for page in &doc.pages {
            let content = render_page_content(page, &fonts, &image_names, doc.page_width, doc.page_height)?;
            writer.add_page(content, doc.page_width, doc.page_height)?;
        }

        let outline_root = if self.outlines {
            build_outlines(&mut writer, &doc.headings, doc.page_height)
        } else {
            None
        };
        let bytes = writer.finish(self.title.as_deref(), outline_root)?;
        log::info!("Rendered PDF of {} bytes", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;
    use notepress_layout::{FontFamily, FontSet, LayoutConfig, LayoutContext, Paginator, TextFlow};
    use notepress_layout::paginator::RunStyle;
    use notepress_traits::RasterImage;
    use notepress_layout::ImageResource;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sample(ctx: &LayoutContext) -> LaidOutDocument {
        let mut pager = Paginator::new(ctx);
        let style = RunStyle::plain(ctx.fonts.body(false, false), ctx.font_size, ctx.text_color);
        pager.record_heading(1, "Intro");
        let mut flow = TextFlow::new(ctx.margins.left, ctx.font_size, ctx.line_height());
        pager.place_text(&mut flow, "Hello PDF world", &style);
        pager.end_line(&mut flow);
        pager.request_space(0.0, true);
        pager.record_heading(2, "Details");
        let bold = RunStyle::plain(ctx.fonts.body(true, false), ctx.font_size, ctx.text_color);
        pager.place_text(&mut flow, "Second page", &bold);
        pager.end_line(&mut flow);
        pager.finish()
    }

    #[test]
    fn renders_pages_fonts_and_title() {
        init_logger();
        let ctx = LayoutContext::default();
        let bytes = LopdfRenderer::new().with_title("My Note").render(&sample(&ctx)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello PDF world"));

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"My Note");
        assert!(info.get(b"CreationDate").is_err());
    }

    #[test]
    fn heading_anchors_become_nested_outline() {
        init_logger();
        let ctx = LayoutContext::default();
        let bytes = LopdfRenderer::new().render(&sample(&ctx)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let catalog = doc.catalog().unwrap();
        let outlines_id = catalog.get(b"Outlines").unwrap().as_reference().unwrap();
        let outlines = doc.get_dictionary(outlines_id).unwrap();
        assert_eq!(outlines.get(b"Count").unwrap().as_i64().unwrap(), 1);
        let first_id = outlines.get(b"First").unwrap().as_reference().unwrap();
        let first = doc.get_dictionary(first_id).unwrap();
        assert_eq!(first.get(b"Title").unwrap().as_str().unwrap(), b"Intro");
        assert_eq!(first.get(b"Count").unwrap().as_i64().unwrap(), -1);
    }

    #[test]
    fn output_is_deterministic() {
        let ctx = LayoutContext::default();
        let doc = sample(&ctx);
        let renderer = LopdfRenderer::new().with_title("Same");
        assert_eq!(renderer.render(&doc).unwrap(), renderer.render(&doc).unwrap());
    }

    #[test]
    fn dark_theme_paints_page_background_and_images() {
        init_logger();
        let config = LayoutConfig {
            theme: notepress_types::Theme::Dark,
            ..Default::default()
        };
        let ctx = LayoutContext::new(&config, FontSet::builtin(FontFamily::Times));
        let mut pager = Paginator::new(&ctx);
        let id = pager.add_image(ImageResource::Raster(RasterImage {
            pixels: vec![0, 0, 0, 255].repeat(4),
            width: 2,
            height: 2,
        }));
        pager.push(notepress_layout::PageElement::Image(notepress_layout::ImageElement {
            rect: notepress_types::Rect::new(50.0, 50.0, 20.0, 20.0),
            image: id,
        }));
        let bytes = LopdfRenderer::new().render(&pager.finish()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = doc.get_and_decode_page_content(page_id).unwrap();
        let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators.first(), Some(&"rg"));
        assert!(operators.contains(&"Do"));
    }
}
