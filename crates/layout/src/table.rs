//! Table adapter and the bundled grid layout.

use crate::paginator::Paginator;
use crate::text::wrap_text;
use notepress_traits::{TableCanvas, TableData, TableError, TableLayout, TableStyle, TextWeight};
use notepress_types::{Color, Rect};

/// Page index and top edge of the first thing a table drew.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStart {
    pub page: usize,
    pub top: f32,
}

/// Exposes the paginator to a `TableLayout`.
pub struct PaginatorCanvas<'p, 'c> {
    pager: &'p mut Paginator<'c>,
    start: Option<TableStart>,
}

impl<'p, 'c> PaginatorCanvas<'p, 'c> {
    pub fn new(pager: &'p mut Paginator<'c>) -> Self {
        Self { pager, start: None }
    }

    /// Where drawing began; `None` if nothing was drawn.
    pub fn start(&self) -> Option<TableStart> {
        self.start
    }

    fn mark(&mut self, top: f32) {
        if self.start.is_none() {
            self.start = Some(TableStart {
                page: self.pager.page_index(),
                top,
            });
        }
    }
}

impl TableCanvas for PaginatorCanvas<'_, '_> {
    fn cursor_y(&self) -> f32 {
        self.pager.y()
    }

    fn content_box(&self) -> Rect {
        self.pager.context().content_box()
    }

    fn new_page(&mut self) -> f32 {
        self.pager.request_space(0.0, true);
        self.pager.y()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.mark(rect.y);
        self.pager.fill_rect(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        let (l, t, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());
        self.mark(t);
        self.pager.stroke_line((l, t), (r, t), width, color);
        self.pager.stroke_line((r, t), (r, b), width, color);
        self.pager.stroke_line((r, b), (l, b), width, color);
        self.pager.stroke_line((l, b), (l, t), width, color);
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32, size: f32, weight: TextWeight, color: Color) {
        self.mark(baseline - size);
        let font = self.pager.context().fonts.body(weight == TextWeight::Bold, false);
        self.pager.draw_text(text, x, baseline, font, size, color);
    }

    fn measure_text(&self, text: &str, size: f32, weight: TextWeight) -> f32 {
        let fonts = &self.pager.context().fonts;
        fonts.measure(text, fonts.body(weight == TextWeight::Bold, false), size)
    }
}

/// Runs `layout` at the cursor and moves the cursor to where the table ended.
///
/// Returns where the table started drawing. On error the paginator is rolled
/// back to its state before the call.
pub fn layout_table(
    pager: &mut Paginator<'_>,
    layout: &dyn TableLayout,
    rows: &[Vec<String>],
) -> Result<Option<TableStart>, TableError> {
    let data = TableData {
        header: rows.first().cloned().unwrap_or_default(),
        body: rows.iter().skip(1).cloned().collect(),
    };
    let style = pager.context().table_style();
    let snapshot = pager.snapshot();

    let mut canvas = PaginatorCanvas::new(pager);
    let result = layout.layout(&data, &style, &mut canvas);
    let start = canvas.start();
    match result {
        Ok(end_y) if end_y.is_finite() => {
            pager.set_y(end_y);
            pager.set_x(pager.context().margins.left);
            Ok(start)
        }
        Ok(end_y) => {
            pager.restore(snapshot);
            Err(TableError::LayoutFailed(format!("{} returned cursor {}", layout.name(), end_y)))
        }
        Err(e) => {
            pager.restore(snapshot);
            Err(e)
        }
    }
}

/// Equal-width columns, wrapped cells, header repeated after a page break.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridTableLayout;

struct WrappedRow {
    cells: Vec<Vec<String>>,
    height: f32,
}

impl GridTableLayout {
    fn wrap_row(
        &self,
        cells: &[String],
        columns: usize,
        column_width: f32,
        style: &TableStyle,
        weight: TextWeight,
        canvas: &dyn TableCanvas,
    ) -> WrappedRow {
        let text_width = (column_width - style.cell_padding * 2.0).max(1.0);
        let cells: Vec<Vec<String>> = (0..columns)
            .map(|i| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                wrap_text(text, text_width, |s| canvas.measure_text(s, style.font_size, weight))
            })
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        WrappedRow {
            cells,
            height: lines as f32 * style.line_height + style.cell_padding * 2.0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row(
        &self,
        row: &WrappedRow,
        top: f32,
        left: f32,
        column_width: f32,
        style: &TableStyle,
        weight: TextWeight,
        fill: Option<Color>,
        canvas: &mut dyn TableCanvas,
    ) -> f32 {
        for (i, lines) in row.cells.iter().enumerate() {
            let cell = Rect::new(left + i as f32 * column_width, top, column_width, row.height);
            if let Some(fill) = fill {
                canvas.fill_rect(cell, fill);
            }
            canvas.stroke_rect(cell, style.border, 0.5);
            for (n, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = top
                    + style.cell_padding
                    + n as f32 * style.line_height
                    + style.line_height / 2.0
                    + style.font_size * 0.3;
                canvas.draw_text(line, cell.x + style.cell_padding, baseline, style.font_size, weight, style.text);
            }
        }
        top + row.height
    }
}

impl TableLayout for GridTableLayout {
    fn layout(&self, data: &TableData, style: &TableStyle, canvas: &mut dyn TableCanvas) -> Result<f32, TableError> {
        let columns = data.column_count();
        if columns == 0 {
            return Err(TableError::NoColumns);
        }
        let content = canvas.content_box();
        let column_width = content.width / columns as f32;
        let bottom = content.bottom();

        let header = self.wrap_row(&data.header, columns, column_width, style, TextWeight::Bold, canvas);
        let body: Vec<WrappedRow> = data
            .body
            .iter()
            .map(|row| self.wrap_row(row, columns, column_width, style, TextWeight::Regular, canvas))
            .collect();

        // Keep the header together with the first body row.
        let lead = header.height + body.first().map_or(0.0, |r| r.height);
        let mut y = canvas.cursor_y();
        if y + lead > bottom && y > content.y {
            y = canvas.new_page();
        }
        y = self.draw_row(&header, y, content.x, column_width, style, TextWeight::Bold, Some(style.header_fill), canvas);

        let mut rows_on_page = 0;
        for row in &body {
            if y + row.height > bottom && rows_on_page > 0 {
                y = canvas.new_page();
                log::debug!("Table continues on a new page; repeating header");
                y = self.draw_row(&header, y, content.x, column_width, style, TextWeight::Bold, Some(style.header_fill), canvas);
                rows_on_page = 0;
            }
            y = self.draw_row(row, y, content.x, column_width, style, TextWeight::Regular, style.body_fill, canvas);
            rows_on_page += 1;
        }
        Ok(y)
    }

    fn name(&self) -> &'static str {
        "GridTableLayout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LayoutContext;
    use crate::elements::PageElement;

    fn rows(body: usize) -> Vec<Vec<String>> {
        let mut rows = vec![vec!["Name".to_string(), "Value".to_string()]];
        rows.extend((0..body).map(|i| vec![format!("row {}", i), i.to_string()]));
        rows
    }

    #[test]
    fn one_body_row_draws_one_data_row() {
        let ctx = LayoutContext::default();
        let mut pager = Paginator::new(&ctx);
        let start = pager.y();
        layout_table(&mut pager, &GridTableLayout, &rows(1)).unwrap();
        let style = ctx.table_style();
        let row_height = style.line_height + style.cell_padding * 2.0;
        assert!((pager.y() - (start + 2.0 * row_height)).abs() < 1e-3);
        let doc = pager.finish();
        assert_eq!(doc.page_text(0), "Name Value row 0 0");
    }

    #[test]
    fn start_follows_a_leading_page_break() {
        let ctx = LayoutContext::default();
        let mut pager = Paginator::new(&ctx);
        pager.set_y(ctx.content_bottom() - 5.0);
        let start = layout_table(&mut pager, &GridTableLayout, &rows(2)).unwrap().unwrap();
        assert_eq!(start.page, 1);
        assert!((start.top - ctx.margins.top).abs() < 1e-3);
        let doc = pager.finish();
        assert!(doc.pages[0].texts().next().is_none());
    }

    #[test]
    fn long_tables_repeat_the_header() {
        let ctx = LayoutContext::default();
        let mut pager = Paginator::new(&ctx);
        layout_table(&mut pager, &GridTableLayout, &rows(80)).unwrap();
        let doc = pager.finish();
        assert!(doc.page_count() >= 2);
        for page in &doc.pages {
            let first = page.texts().next().map(|t| t.text.clone());
            assert_eq!(first.as_deref(), Some("Name"));
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl TableLayout for Failing {
        fn layout(&self, _: &TableData, _: &TableStyle, canvas: &mut dyn TableCanvas) -> Result<f32, TableError> {
            canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK);
            canvas.new_page();
            Err(TableError::LayoutFailed("nope".into()))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    #[test]
    fn failed_layout_leaves_no_trace() {
        let ctx = LayoutContext::default();
        let mut pager = Paginator::new(&ctx);
        assert!(layout_table(&mut pager, &Failing, &rows(1)).is_err());
        let doc = pager.finish();
        assert_eq!(doc.page_count(), 1);
        assert!(!doc.pages[0].elements.iter().any(|e| matches!(e, PageElement::Rect(_))));
    }
}
