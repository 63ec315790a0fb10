//! The pagination engine: lays blocks out in source order onto pages.
//!
//! The pass is sequential. It suspends only while resolving an image or
//! waiting for the rasterizer, and checks its generation ticket right after
//! each of those waits.

use crate::LayoutError;
use crate::context::LayoutContext;
use crate::generation::GenerationTicket;
use crate::image::{draw_image_box, measure_image_box, px_to_pt, BoxAlign, IMAGE_PADDING};
use crate::inline::{tokenize, InlineRun};
use crate::output::{ImageResource, LaidOutDocument};
use crate::paginator::{Paginator, RunStyle, TextFlow};
use crate::raster::{self, math_markup, placeholder, RASTER_PADDING};
use crate::segmenter::{Block, ListMarker, SourceBlock};
use crate::table::{layout_table, TableStart};
use notepress_traits::{AssetResolver, RasterKind, Rasterizer, TableLayout};
use notepress_types::{ImageFormat, SemanticRole};

pub const HEADING_SIZES: [f32; 6] = [22.0, 18.0, 16.0, 14.0, 12.0, 12.0];
pub const TITLE_SIZE: f32 = 24.0;
/// Horizontal indent per column of leading whitespace.
pub const INDENT_STEP: f32 = 4.0;
const MARKER_GAP: f32 = 4.0;
const TABLE_GAP: f32 = 4.0;

/// Font size of a heading level, clamped to 1..=6.
pub fn heading_size(level: u8) -> f32 {
    HEADING_SIZES[(level.clamp(1, 6) - 1) as usize]
}

fn heading_gap(level: u8) -> f32 {
    if level <= 1 { 8.0 } else { 6.0 }
}

pub struct PaginationEngine<'a> {
    ctx: &'a LayoutContext,
    resolver: &'a dyn AssetResolver,
    rasterizer: &'a dyn Rasterizer,
    tables: &'a dyn TableLayout,
    ticket: GenerationTicket,
}

impl<'a> PaginationEngine<'a> {
    pub fn new(
        ctx: &'a LayoutContext,
        resolver: &'a dyn AssetResolver,
        rasterizer: &'a dyn Rasterizer,
        tables: &'a dyn TableLayout,
    ) -> Self {
        Self {
            ctx,
            resolver,
            rasterizer,
            tables,
            ticket: GenerationTicket::detached(),
        }
    }

    pub fn with_ticket(mut self, ticket: GenerationTicket) -> Self {
        self.ticket = ticket;
        self
    }

    /// Lays out `blocks`, preceded by a title block when `title` is given.
    pub async fn paginate(&self, blocks: &[SourceBlock], title: Option<&str>) -> Result<LaidOutDocument, LayoutError> {
        log::info!("Paginating {} blocks", blocks.len());
        let mut pager = Paginator::new(self.ctx);

        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            self.layout_title(&mut pager, title);
        }
        for block in blocks {
            self.layout_block(&mut pager, block).await?;
        }

        let doc = pager.finish();
        log::info!("Pagination finished with {} pages", doc.page_count());
        Ok(doc)
    }

    async fn layout_block(&self, pager: &mut Paginator<'_>, block: &SourceBlock) -> Result<(), LayoutError> {
        let ctx = self.ctx;
        match &block.block {
            Block::Frontmatter { lines } => {
                log::debug!("Skipping {} frontmatter lines", lines.len());
            }
            Block::ForcedBreak { source_line } => {
                log::debug!("Forced break before line {}", source_line);
                pager.request_space(0.0, true);
            }
            Block::Heading { level, text } => {
                let size = heading_size(*level);
                if !pager.is_pristine() {
                    pager.advance(heading_gap(*level));
                }
                let line_height = ctx.line_height_for(size);
                pager.request_space(line_height, false);
                pager.record_heading(*level, &plain_text(text));
                let mut flow = TextFlow::new(ctx.margins.left, size, line_height)
                    .bold()
                    .with_color(ctx.role_color(SemanticRole::heading(*level)))
                    .with_gutter(block.line);
                self.flow_runs(pager, &mut flow, tokenize(text)).await?;
                pager.end_line(&mut flow);
            }
            Block::Paragraph { text, indent } => {
                if text.trim().is_empty() {
                    pager.request_space(ctx.line_height(), false);
                    pager.advance(ctx.line_height());
                    return Ok(());
                }
                let origin = ctx.margins.left + *indent as f32 * INDENT_STEP;
                let mut flow = TextFlow::new(origin, ctx.font_size, ctx.line_height()).with_gutter(block.line);
                self.flow_runs(pager, &mut flow, tokenize(text)).await?;
                pager.end_line(&mut flow);
            }
            Block::ListItem { indent, marker, text } => {
                self.layout_list_item(pager, block.line, *indent, marker, text).await?;
            }
            Block::Table { rows, raw_lines } => {
                let fallback = TableStart {
                    page: pager.page_index(),
                    top: pager.y(),
                };
                match layout_table(pager, self.tables, rows) {
                    Ok(start) => {
                        let TableStart { page: start_page, top: start_y } = start.unwrap_or(fallback);
                        let end_y = if pager.page_index() == start_page { pager.y() } else { ctx.content_bottom() };
                        let mid = (start_y + end_y) / 2.0;
                        pager.stamp_gutter(start_page, block.line, mid + crate::paginator::GUTTER_FONT_SIZE * 0.3);
                        pager.advance(TABLE_GAP);
                    }
                    Err(e) => {
                        log::warn!("Table at line {} could not be laid out ({}); rendering as text", block.line, e);
                        for (offset, raw) in raw_lines.iter().enumerate() {
                            let mut flow = TextFlow::new(ctx.margins.left, ctx.font_size, ctx.line_height())
                                .with_gutter(block.line + offset);
                            let style = RunStyle::plain(ctx.fonts.body(false, false), ctx.font_size, ctx.text_color);
                            pager.place_text(&mut flow, raw, &style);
                            pager.end_line(&mut flow);
                        }
                    }
                }
            }
            Block::Callout { raw_lines } => {
                let mut flow = TextFlow::new(ctx.margins.left, ctx.font_size, ctx.line_height()).with_gutter(block.line);
                self.layout_raster(pager, &mut flow, raw_lines.join("\n"), RasterKind::Callout).await?;
                pager.end_line(&mut flow);
            }
        }
        Ok(())
    }

    fn layout_title(&self, pager: &mut Paginator<'_>, title: &str) {
        let ctx = self.ctx;
        let line_height = ctx.line_height_for(TITLE_SIZE);
        let mut flow = TextFlow::new(ctx.margins.left, TITLE_SIZE, line_height)
            .bold()
            .with_color(ctx.role_color(SemanticRole::Title));
        let style = RunStyle::plain(ctx.fonts.body(true, false), TITLE_SIZE, ctx.role_color(SemanticRole::Title));
        pager.place_text(&mut flow, title, &style);
        pager.end_line(&mut flow);
        pager.advance(heading_gap(1));
    }

    async fn layout_list_item(
        &self,
        pager: &mut Paginator<'_>,
        line: usize,
        indent: usize,
        marker: &ListMarker,
        text: &str,
    ) -> Result<(), LayoutError> {
        let ctx = self.ctx;
        let marker_text = match marker {
            ListMarker::Bullet => "•",
            ListMarker::Ordered(numeral) => numeral.as_str(),
        };
        let font = ctx.fonts.body(false, false);
        let marker_x = ctx.margins.left + indent as f32 * INDENT_STEP;
        let marker_width = ctx.fonts.measure(marker_text, font, ctx.font_size);
        let origin = marker_x + marker_width + MARKER_GAP;

        let mut flow = TextFlow::new(origin, ctx.font_size, ctx.line_height()).with_gutter(line);
        pager.start_line(&mut flow);
        let style = RunStyle::plain(font, ctx.font_size, ctx.text_color);
        let baseline = pager.y() + flow.line_height / 2.0 + flow.size * 0.3;
        pager.draw_text(marker_text, marker_x, baseline, style.font, style.size, style.color);

        self.flow_runs(pager, &mut flow, tokenize(text)).await?;
        pager.end_line(&mut flow);
        Ok(())
    }

    /// Places inline runs in order; boxes interrupt the line and text resumes below them.
    async fn flow_runs(
        &self,
        pager: &mut Paginator<'_>,
        flow: &mut TextFlow,
        runs: Vec<InlineRun>,
    ) -> Result<(), LayoutError> {
        for run in runs {
            match run {
                InlineRun::Math { source, is_block } => {
                    let kind = if is_block { RasterKind::BlockMath } else { RasterKind::InlineMath };
                    self.layout_raster(pager, flow, math_markup(&source, is_block), kind).await?;
                }
                InlineRun::EmbeddedImage { path, width_override, caption } => {
                    self.layout_image(pager, flow, &path, width_override, caption.as_deref()).await?;
                }
                text_run => {
                    if let (Some(style), Some(text)) = (pager.resolve_style(flow, &text_run), text_run.text()) {
                        pager.place_text(flow, text, &style);
                    }
                }
            }
        }
        Ok(())
    }

    async fn layout_image(
        &self,
        pager: &mut Paginator<'_>,
        flow: &mut TextFlow,
        path: &str,
        width_override: Option<u32>,
        caption: Option<&str>,
    ) -> Result<(), LayoutError> {
        let resolved = tokio::time::timeout(self.ctx.capability_timeout, self.resolver.resolve(path)).await;
        self.ticket.check()?;

        let asset = match resolved {
            Ok(Ok(asset)) => asset,
            Ok(Err(e)) => {
                log::warn!("Skipping image '{}': {}", path, e);
                return Ok(());
            }
            Err(_) => {
                log::warn!("Skipping image '{}': {} timed out", path, self.resolver.name());
                return Ok(());
            }
        };
        let Some(format) = ImageFormat::sniff(&asset.data) else {
            log::warn!("Skipping image '{}': unsupported format", path);
            return Ok(());
        };
        if asset.pixel_width == 0 || asset.pixel_height == 0 {
            log::warn!("Skipping image '{}': zero-sized", path);
            return Ok(());
        }

        let measured = measure_image_box(
            self.ctx,
            asset.pixel_width,
            asset.pixel_height,
            width_override,
            caption,
            IMAGE_PADDING,
        );
        let id = pager.add_image(ImageResource::Encoded {
            data: asset.data,
            format,
            pixel_width: asset.pixel_width,
            pixel_height: asset.pixel_height,
        });
        pager.end_line(flow);
        let top = pager.place_box(measured.height(), flow.gutter_line.take());
        draw_image_box(pager, top, &measured, id, BoxAlign::Center, true);
        log::debug!("Placed image '{}' at {:.1}x{:.1}pt", path, measured.image.width, measured.image.height);
        Ok(())
    }

    async fn layout_raster(
        &self,
        pager: &mut Paginator<'_>,
        flow: &mut TextFlow,
        markup: String,
        kind: RasterKind,
    ) -> Result<(), LayoutError> {
        let image = raster::rasterize(self.rasterizer, self.ctx, markup, kind).await;
        self.ticket.check()?;

        pager.end_line(flow);
        let Some(image) = image else {
            let style = RunStyle::plain(self.ctx.fonts.body(false, true), flow.size, self.ctx.error_color());
            pager.place_text(flow, placeholder(kind), &style);
            pager.end_line(flow);
            return Ok(());
        };

        let mut measured = measure_image_box(self.ctx, image.width, image.height, None, None, RASTER_PADDING);
        let align = if kind == RasterKind::InlineMath {
            let available = self.ctx.content_right() - flow.origin_x;
            if measured.image.width > available && measured.image.width > 0.0 {
                let scale = available / measured.image.width;
                measured.image.width = available;
                measured.image.height *= scale;
            }
            BoxAlign::Left(flow.origin_x)
        } else {
            BoxAlign::Center
        };
        let (width_pt, height_pt) = (px_to_pt(image.width), px_to_pt(image.height));
        log::debug!("Placing {:?} raster ({:.1}x{:.1}pt natural)", kind, width_pt, height_pt);

        let id = pager.add_image(ImageResource::Raster(image));
        let top = pager.place_box(measured.height(), flow.gutter_line.take());
        draw_image_box(pager, top, &measured, id, align, false);
        Ok(())
    }
}

/// Heading text as shown in bookmarks: styling markers removed.
fn plain_text(text: &str) -> String {
    tokenize(text)
        .iter()
        .filter_map(|run| match run {
            InlineRun::Math { source, .. } => Some(source.as_str()),
            other => other.text(),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
