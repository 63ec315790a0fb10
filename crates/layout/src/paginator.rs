//! The page list, the write cursor and word-wrapped text flow.

use crate::context::LayoutContext;
use crate::elements::{ImageId, LineElement, Page, PageElement, RectElement, TextElement};
use crate::fonts::FontKey;
use crate::inline::InlineRun;
use crate::output::{HeadingAnchor, ImageResource, LaidOutDocument};
use crate::text::split_tokens;
use notepress_types::{Color, Rect, SemanticRole};

// Absorbs float noise when comparing a box against the bottom margin.
const EPSILON: f32 = 0.01;

pub const GUTTER_FONT_SIZE: f32 = 8.0;
const GUTTER_GAP: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Underline,
    Strike,
}

/// Fully resolved drawing style of one token.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    pub font: FontKey,
    pub size: f32,
    pub color: Color,
    pub background: Option<Color>,
    pub rule: Option<Rule>,
}

impl RunStyle {
    pub fn plain(font: FontKey, size: f32, color: Color) -> Self {
        Self {
            font,
            size,
            color,
            background: None,
            rule: None,
        }
    }

    fn is_decorated(&self) -> bool {
        self.background.is_some() || self.rule.is_some()
    }
}

/// Line state of one text block being flowed.
#[derive(Debug, Clone)]
pub struct TextFlow {
    /// Where the first and every wrapped line start.
    pub origin_x: f32,
    pub size: f32,
    pub line_height: f32,
    /// Headings and the title set everything in bold.
    pub force_bold: bool,
    /// Replaces the body color for plain and emphasized text.
    pub color: Option<Color>,
    /// Source line still waiting for its gutter number.
    pub gutter_line: Option<usize>,
    line_started: bool,
    line_has_content: bool,
    suppress_space: bool,
    span_end: Option<f32>,
}

impl TextFlow {
    pub fn new(origin_x: f32, size: f32, line_height: f32) -> Self {
        Self {
            origin_x,
            size,
            line_height,
            force_bold: false,
            color: None,
            gutter_line: None,
            line_started: false,
            line_has_content: false,
            suppress_space: false,
            span_end: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.force_bold = true;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_gutter(mut self, line: usize) -> Self {
        self.gutter_line = Some(line);
        self
    }

    pub fn line_started(&self) -> bool {
        self.line_started
    }

    pub fn line_has_content(&self) -> bool {
        self.line_has_content
    }
}

/// Restore point used to roll back a capability that failed halfway.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot {
    finished_pages: usize,
    elements: usize,
    images: usize,
    headings: usize,
    x: f32,
    y: f32,
    last_gutter_line: Option<usize>,
}

pub struct Paginator<'c> {
    ctx: &'c LayoutContext,
    finished: Vec<Page>,
    current: Page,
    images: Vec<ImageResource>,
    headings: Vec<HeadingAnchor>,
    x: f32,
    y: f32,
    last_gutter_line: Option<usize>,
}

impl<'c> Paginator<'c> {
    pub fn new(ctx: &'c LayoutContext) -> Self {
        Self {
            ctx,
            finished: Vec::new(),
            current: Page {
                background: ctx.page_background(),
                elements: Vec::new(),
            },
            images: Vec::new(),
            headings: Vec::new(),
            x: ctx.margins.left,
            y: ctx.margins.top,
            last_gutter_line: None,
        }
    }

    pub fn context(&self) -> &'c LayoutContext {
        self.ctx
    }

    pub fn page_index(&self) -> usize {
        self.finished.len()
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// Nothing stamped yet and the cursor still at the top margin.
    pub fn is_pristine(&self) -> bool {
        self.current.elements.is_empty() && (self.y - self.ctx.margins.top).abs() < EPSILON
    }

    /// Starts a new page when forced or when `height` does not fit below the
    /// cursor. Returns whether a page was added.
    pub fn request_space(&mut self, height: f32, force: bool) -> bool {
        if !force && self.y + height <= self.ctx.content_bottom() + EPSILON {
            return false;
        }
        let page = Page {
            background: self.ctx.page_background(),
            elements: Vec::new(),
        };
        self.finished.push(std::mem::replace(&mut self.current, page));
        self.y = self.ctx.margins.top;
        log::debug!(
            "Started page {} ({})",
            self.page_index() + 1,
            if force { "forced" } else { "overflow" }
        );
        true
    }

    pub fn push(&mut self, element: PageElement) {
        self.current.elements.push(element);
    }

    /// Pushes onto an earlier page, or the current one.
    pub fn push_on(&mut self, page_index: usize, element: PageElement) {
        match self.finished.get_mut(page_index) {
            Some(page) => page.elements.push(element),
            None => self.current.elements.push(element),
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(PageElement::Rect(RectElement { rect, color }));
    }

    pub fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.push(PageElement::Line(LineElement { from, to, width, color }));
    }

    pub fn draw_text(&mut self, text: &str, x: f32, baseline: f32, font: FontKey, size: f32, color: Color) {
        self.push(PageElement::Text(TextElement {
            x,
            baseline,
            text: text.to_string(),
            font,
            size,
            color,
        }));
    }

    pub fn add_image(&mut self, resource: ImageResource) -> ImageId {
        self.images.push(resource);
        self.images.len() - 1
    }

    pub fn record_heading(&mut self, level: u8, text: &str) {
        self.headings.push(HeadingAnchor {
            level,
            text: text.to_string(),
            page_index: self.page_index(),
            y: self.y,
        });
    }

    /// Stamps a source line number in the left margin, once per line.
    pub fn stamp_gutter(&mut self, page_index: usize, line: usize, baseline: f32) {
        if !self.ctx.gutter || self.last_gutter_line.is_some_and(|last| last >= line) {
            return;
        }
        self.last_gutter_line = Some(line);
        let label = line.to_string();
        let font = FontKey::regular(self.ctx.fonts.body_family());
        let width = self.ctx.fonts.measure(&label, font, GUTTER_FONT_SIZE);
        let x = (self.ctx.margins.left - GUTTER_GAP - width).max(0.0);
        self.push_on(
            page_index,
            PageElement::Text(TextElement {
                x,
                baseline,
                text: label,
                font,
                size: GUTTER_FONT_SIZE,
                color: self.ctx.muted_color(),
            }),
        );
    }

    /// Reserves an unsplittable box of `height` below the cursor and returns
    /// its top. The gutter number, if any, goes at the box's midpoint.
    pub fn place_box(&mut self, height: f32, gutter_line: Option<usize>) -> f32 {
        self.request_space(height, false);
        let top = self.y;
        self.y += height;
        if let Some(line) = gutter_line {
            let page = self.page_index();
            self.stamp_gutter(page, line, top + height / 2.0 + GUTTER_FONT_SIZE * 0.3);
        }
        top
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            finished_pages: self.finished.len(),
            elements: self.current.elements.len(),
            images: self.images.len(),
            headings: self.headings.len(),
            x: self.x,
            y: self.y,
            last_gutter_line: self.last_gutter_line,
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        if self.finished.len() > snapshot.finished_pages {
            self.current = self.finished.remove(snapshot.finished_pages);
            self.finished.truncate(snapshot.finished_pages);
        }
        self.current.elements.truncate(snapshot.elements);
        self.images.truncate(snapshot.images);
        self.headings.truncate(snapshot.headings);
        self.x = snapshot.x;
        self.y = snapshot.y;
        self.last_gutter_line = snapshot.last_gutter_line;
    }

    pub fn finish(mut self) -> LaidOutDocument {
        self.finished.push(self.current);
        LaidOutDocument {
            page_width: self.ctx.page_width,
            page_height: self.ctx.page_height,
            pages: self.finished,
            images: self.images,
            headings: self.headings,
            fonts: self.ctx.fonts.clone(),
        }
    }

    // --- text flow ---

    fn baseline(&self, flow: &TextFlow) -> f32 {
        self.y + flow.line_height / 2.0 + flow.size * 0.3
    }

    /// Claims space for a new line and moves to its origin.
    pub fn start_line(&mut self, flow: &mut TextFlow) {
        self.request_space(flow.line_height, false);
        flow.line_started = true;
        flow.line_has_content = false;
        flow.span_end = None;
        self.x = flow.origin_x;
        if let Some(line) = flow.gutter_line.take() {
            let baseline = self.baseline(flow);
            self.stamp_gutter(self.page_index(), line, baseline);
        }
    }

    fn wrap_line(&mut self, flow: &mut TextFlow) {
        self.y += flow.line_height;
        self.start_line(flow);
        flow.suppress_space = true;
    }

    /// Closes the current line, if one was started.
    pub fn end_line(&mut self, flow: &mut TextFlow) {
        if flow.line_started {
            self.y += flow.line_height;
            flow.line_started = false;
        }
        flow.line_has_content = false;
        flow.suppress_space = false;
        flow.span_end = None;
        self.x = flow.origin_x;
    }

    /// Resolves a text-bearing run to its drawing style; `None` for boxes.
    pub fn resolve_style(&self, flow: &TextFlow, run: &InlineRun) -> Option<RunStyle> {
        let ctx = self.ctx;
        let fonts = &ctx.fonts;
        let base = flow.color.unwrap_or(ctx.text_color);
        let role = |role: SemanticRole| ctx.role_override(role).unwrap_or(base);
        let style = match run {
            InlineRun::PlainText(_) => RunStyle::plain(fonts.body(flow.force_bold, false), flow.size, base),
            InlineRun::Emphasis { bold, italic, .. } => {
                let color = match flow.color {
                    Some(color) => color,
                    None if *bold => role(SemanticRole::Bold),
                    None => role(SemanticRole::Italic),
                };
                RunStyle::plain(fonts.body(*bold || flow.force_bold, *italic), flow.size, color)
            }
            InlineRun::Underline { variant, .. } => RunStyle {
                rule: Some(Rule::Underline),
                ..RunStyle::plain(
                    fonts.body(variant.bold || flow.force_bold, variant.italic),
                    flow.size,
                    role(SemanticRole::Underline),
                )
            },
            InlineRun::Strike { variant, .. } => RunStyle {
                rule: Some(Rule::Strike),
                ..RunStyle::plain(
                    fonts.body(variant.bold || flow.force_bold, variant.italic),
                    flow.size,
                    role(SemanticRole::Strikethrough),
                )
            },
            InlineRun::Highlight { variant, .. } => RunStyle {
                background: Some(ctx.role_color(SemanticRole::HighlightBackground)),
                ..RunStyle::plain(
                    fonts.body(variant.bold || flow.force_bold, variant.italic),
                    flow.size,
                    role(SemanticRole::Highlight),
                )
            },
            InlineRun::ColoredText { color, variant, .. } => RunStyle::plain(
                fonts.body(variant.bold || flow.force_bold, variant.italic),
                flow.size,
                *color,
            ),
            InlineRun::Code(_) => RunStyle {
                background: Some(ctx.role_color(SemanticRole::CodeBackground)),
                ..RunStyle::plain(fonts.code(), flow.size, ctx.role_color(SemanticRole::Code))
            },
            InlineRun::Math { .. } | InlineRun::EmbeddedImage { .. } => return None,
        };
        Some(style)
    }

    /// Word-wraps `text` into the flow.
    pub fn place_text(&mut self, flow: &mut TextFlow, text: &str, style: &RunStyle) {
        for token in split_tokens(text) {
            self.place_token(flow, token.text, token.is_space, style);
        }
    }

    fn place_token(&mut self, flow: &mut TextFlow, token: &str, is_space: bool, style: &RunStyle) {
        if !flow.line_started {
            self.start_line(flow);
        }
        let width = self.ctx.fonts.measure(token, style.font, style.size);
        if self.x + width > self.ctx.content_right() + EPSILON && flow.line_has_content {
            self.wrap_line(flow);
        }
        // No leading whitespace on any line.
        if is_space && (flow.suppress_space || !flow.line_has_content) {
            flow.suppress_space = false;
            return;
        }
        flow.suppress_space = false;

        let text: String = if is_space {
            token.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect()
        } else {
            token.to_string()
        };
        let baseline = self.baseline(flow);

        if let Some(background) = style.background {
            let height = style.size * 1.25;
            let top = self.y + (flow.line_height - height) / 2.0;
            self.fill_rect(Rect::new(self.x, top, width, height), background);
        }

        let merged = !style.is_decorated()
            && flow.span_end == Some(self.x)
            && match self.current.elements.last_mut() {
                Some(PageElement::Text(last))
                    if last.font == style.font
                        && last.color == style.color
                        && last.size == style.size
                        && last.baseline == baseline =>
                {
                    last.text.push_str(&text);
                    true
                }
                _ => false,
            };
        if !merged {
            self.draw_text(&text, self.x, baseline, style.font, style.size, style.color);
        }

        if let Some(rule) = style.rule {
            let offset = match rule {
                Rule::Underline => style.size * 0.12,
                Rule::Strike => -style.size * 0.28,
            };
            let weight = (style.size * 0.06).max(0.5);
            self.stroke_line(
                (self.x, baseline + offset),
                (self.x + width, baseline + offset),
                weight,
                style.color,
            );
        }

        self.x += width;
        flow.line_has_content = true;
        flow.span_end = if style.is_decorated() { None } else { Some(self.x) };
    }
}
