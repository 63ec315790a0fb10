//! Page content streams and the document outline.
//!
//! Layout works top-down in points; PDF user space is bottom-up, so every
//! y coordinate is flipped against the page height here.

use crate::error::RenderError;
use crate::fonts::FontResources;
use crate::writer::PdfDocumentWriter;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, ObjectId, StringFormat};
use notepress_layout::{HeadingAnchor, ImageElement, LineElement, Page, PageElement, RectElement, TextElement};
use notepress_types::{to_win_ansi, Color};
use std::collections::HashMap;

/// Builds the content stream of one page.
///
/// `image_names` maps image ids to XObject resource names; `None` entries
/// could not be embedded and are left out.
pub fn render_page_content(
    page: &Page,
    fonts: &FontResources,
    image_names: &[Option<String>],
    page_width: f32,
    page_height: f32,
) -> Result<Content, RenderError> {
    let mut ctx = PageContext::new(page_height, fonts, image_names);
    if let Some(background) = page.background {
        ctx.fill_rect(background, 0.0, 0.0, page_width, page_height);
    }
    for element in &page.elements {
        ctx.draw_element(element)?;
    }
    Ok(ctx.finish())
}

struct PageContext<'a> {
    page_height: f32,
    content: Content,
    state: PageRenderState,
    fonts: &'a FontResources,
    image_names: &'a [Option<String>],
}

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font_name: String,
    font_size: f32,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<f32>,
}

fn rgb_operands(color: Color) -> Vec<Object> {
    color.to_unit_rgb().iter().map(|c| (*c).into()).collect()
}

impl<'a> PageContext<'a> {
    fn new(page_height: f32, fonts: &'a FontResources, image_names: &'a [Option<String>]) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
            fonts,
            image_names,
        }
    }

    fn finish(self) -> Content {
        self.content
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn draw_element(&mut self, element: &PageElement) -> Result<(), RenderError> {
        match element {
            PageElement::Text(text) => self.draw_text(text)?,
            PageElement::Rect(RectElement { rect, color }) => {
                self.fill_rect(*color, rect.x, rect.y, rect.width, rect.height);
            }
            PageElement::Line(line) => self.draw_line(line),
            PageElement::Image(image) => self.draw_image(image),
        }
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            self.op("rg", rgb_operands(color));
            self.state.fill_color = Some(color);
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color != Some(color) {
            self.op("RG", rgb_operands(color));
            self.state.stroke_color = Some(color);
        }
    }

    fn set_line_width(&mut self, width: f32) {
        if self.state.line_width != Some(width) {
            self.op("w", vec![width.into()]);
            self.state.line_width = Some(width);
        }
    }

    fn fill_rect(&mut self, color: Color, x: f32, y: f32, width: f32, height: f32) {
        self.set_fill_color(color);
        let pdf_y = self.page_height - (y + height);
        self.op("re", vec![x.into(), pdf_y.into(), width.into(), height.into()]);
        self.op("f", vec![]);
    }

    fn draw_line(&mut self, line: &LineElement) {
        self.set_stroke_color(line.color);
        self.set_line_width(line.width);
        self.op("m", vec![line.from.0.into(), (self.page_height - line.from.1).into()]);
        self.op("l", vec![line.to.0.into(), (self.page_height - line.to.1).into()]);
        self.op("S", vec![]);
    }

    fn set_font(&mut self, text: &TextElement) -> Result<(), RenderError> {
        let font_name = self
            .fonts
            .resource_name(&text.font)
            .ok_or_else(|| RenderError::Other(format!("No font resource for {:?}", text.font)))?
            .to_string();
        // Font state lives in the graphics state, so it survives BT/ET.
        if self.state.font_name != font_name || self.state.font_size != text.size {
            self.op("Tf", vec![Object::Name(font_name.as_bytes().to_vec()), text.size.into()]);
            self.state.font_name = font_name;
            self.state.font_size = text.size;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &TextElement) -> Result<(), RenderError> {
        if text.text.trim().is_empty() {
            return Ok(());
        }
        self.op("BT", vec![]);
        self.set_font(text)?;
        self.set_fill_color(text.color);
        let pdf_y = self.page_height - text.baseline;
        self.op("Td", vec![text.x.into(), pdf_y.into()]);
        self.op("Tj", vec![Object::String(to_win_ansi(&text.text), StringFormat::Literal)]);
        self.op("ET", vec![]);
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageElement) {
        let Some(Some(name)) = self.image_names.get(image.image) else {
            log::debug!("Image {} was not embedded; leaving its box empty", image.image);
            return;
        };
        let rect = image.rect;
        let pdf_y = self.page_height - (rect.y + rect.height);
        let name = name.as_bytes().to_vec();
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![rect.width.into(), 0.into(), 0.into(), rect.height.into(), rect.x.into(), pdf_y.into()],
        );
        self.op("Do", vec![Object::Name(name)]);
        self.op("Q", vec![]);
    }
}

struct FlatOutlineItem {
    id: ObjectId,
    title: String,
    dest: Vec<Object>,
    parent: Option<usize>,
}

struct OutlineNode {
    id: ObjectId,
    title: String,
    dest: Vec<Object>,
    children: Vec<OutlineNode>,
}

/// Creates the PDF outline (bookmarks) from heading anchors.
///
/// Headings nest by level; a deeper level after a shallower one becomes its
/// child. Returns the `Outlines` root, or `None` without headings.
pub fn build_outlines(
    writer: &mut PdfDocumentWriter,
    headings: &[HeadingAnchor],
    page_height: f32,
) -> Option<ObjectId> {
    let page_ids = writer.page_ids().to_vec();
    let mut flat: Vec<FlatOutlineItem> = Vec::new();
    let mut level_stack: Vec<(u8, usize)> = Vec::new();

    for heading in headings {
        let Some(page_id) = page_ids.get(heading.page_index) else {
            continue;
        };
        while level_stack.last().is_some_and(|(level, _)| *level >= heading.level) {
            level_stack.pop();
        }
        let parent = level_stack.last().map(|(_, idx)| *idx);
        level_stack.push((heading.level, flat.len()));
        flat.push(FlatOutlineItem {
            id: writer.new_object_id(),
            title: heading.text.clone(),
            dest: vec![Object::Reference(*page_id), "FitH".into(), (page_height - heading.y).into()],
            parent,
        });
    }

    // Children always follow their parent, so a reverse sweep completes each
    // child list before its parent is built.
    let mut children: HashMap<usize, Vec<OutlineNode>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, item) in flat.into_iter().enumerate().rev() {
        let mut kids = children.remove(&i).unwrap_or_default();
        kids.reverse();
        let node = OutlineNode {
            id: item.id,
            title: item.title,
            dest: item.dest,
            children: kids,
        };
        match item.parent {
            Some(parent) => children.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();

    let (first, last) = (roots.first()?.id, roots.last()?.id);
    let root_id = writer.new_object_id();
    writer.set_object(
        root_id,
        dictionary! {
            "Type" => "Outlines",
            "First" => first,
            "Last" => last,
            "Count" => roots.len() as i64,
        },
    );
    write_outline_level(writer, &roots, root_id);
    log::debug!("Built outline with {} top-level entries", roots.len());
    Some(root_id)
}

fn write_outline_level(writer: &mut PdfDocumentWriter, items: &[OutlineNode], parent_id: ObjectId) {
    for (i, item) in items.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => Object::String(to_win_ansi(&item.title), StringFormat::Literal),
            "Parent" => parent_id,
            "Dest" => item.dest.clone(),
        };
        if i > 0 {
            dict.set("Prev", items[i - 1].id);
        }
        if let Some(next) = items.get(i + 1) {
            dict.set("Next", next.id);
        }
        if let (Some(first), Some(last)) = (item.children.first(), item.children.last()) {
            dict.set("First", first.id);
            dict.set("Last", last.id);
            dict.set("Count", -(item.children.len() as i64));
            write_outline_level(writer, &item.children, item.id);
        }
        writer.set_object(item.id, dict);
    }
}
