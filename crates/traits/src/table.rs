//! Table layout capability.
//!
//! The engine hands header and body rows to a `TableLayout` together with a
//! `TableCanvas` that exposes drawing, measuring and page-break primitives.
//! Coordinates are points with the origin at the top-left of the page.

use notepress_types::{Color, Rect};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TableError {
    #[error("Table has no columns")]
    NoColumns,

    #[error("Table layout failed: {0}")]
    LayoutFailed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl TableData {
    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        self.body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_fill: Color,
    pub body_fill: Option<Color>,
    pub border: Color,
    pub text: Color,
    pub font_size: f32,
    pub line_height: f32,
    pub cell_padding: f32,
}

/// The engine's drawing surface as seen by a table layout.
pub trait TableCanvas {
    /// Current top of the free area on the current page.
    fn cursor_y(&self) -> f32;
    /// The printable box of the current page.
    fn content_box(&self) -> Rect;
    /// Starts a new page and returns the new cursor y.
    fn new_page(&mut self) -> f32;
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);
    /// Draws `text` with its baseline at `baseline`.
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32, size: f32, weight: TextWeight, color: Color);
    fn measure_text(&self, text: &str, size: f32, weight: TextWeight) -> f32;
}

pub trait TableLayout: Send + Sync + std::fmt::Debug {
    /// Lays the table out starting at the canvas cursor and returns the final
    /// cursor y.
    fn layout(&self, data: &TableData, style: &TableStyle, canvas: &mut dyn TableCanvas) -> Result<f32, TableError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_uses_widest_row() {
        let data = TableData {
            header: vec!["a".into(), "b".into()],
            body: vec![vec!["1".into(), "2".into(), "3".into()]],
        };
        assert_eq!(data.column_count(), 3);
        assert_eq!(TableData::default().column_count(), 0);
    }
}
