//! The read-only environment of one layout pass.

use crate::config::LayoutConfig;
use crate::fonts::FontSet;
use notepress_traits::TableStyle;
use notepress_types::{Color, ColorOverrides, Margins, Rect, SemanticRole, Theme};
use std::time::Duration;

/// Page geometry, fonts and resolved colors, built once before a pass.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub font_size: f32,
    pub line_height_factor: f32,
    pub fonts: FontSet,
    pub text_color: Color,
    pub theme: Theme,
    overrides: ColorOverrides,
    pub gutter: bool,
    pub capability_timeout: Duration,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new(&LayoutConfig::default(), FontSet::default())
    }
}

impl LayoutContext {
    pub fn new(config: &LayoutConfig, fonts: FontSet) -> Self {
        let (page_width, page_height) = config.page_size.dimensions_pt();
        Self {
            page_width,
            page_height,
            margins: config.margins,
            font_size: config.font_size,
            line_height_factor: config.line_height_factor,
            fonts,
            text_color: config.text_color.unwrap_or_else(|| config.theme.text_color()),
            theme: config.theme,
            overrides: config.color_overrides.clone(),
            gutter: config.gutter,
            capability_timeout: config.capability_timeout,
        }
    }

    /// The printable area.
    pub fn content_box(&self) -> Rect {
        Rect::new(
            self.margins.left,
            self.margins.top,
            self.page_width - self.margins.left - self.margins.right,
            self.page_height - self.margins.top - self.margins.bottom,
        )
    }

    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margins.bottom
    }

    pub fn content_right(&self) -> f32 {
        self.page_width - self.margins.right
    }

    pub fn line_height(&self) -> f32 {
        self.line_height_for(self.font_size)
    }

    pub fn line_height_for(&self, size: f32) -> f32 {
        size * self.line_height_factor
    }

    /// Color for a role: the host override if present, else the theme default.
    pub fn role_color(&self, role: SemanticRole) -> Color {
        if let Some(color) = self.overrides.get(&role) {
            return *color;
        }
        match role {
            SemanticRole::Code => self.theme.code_color(),
            SemanticRole::HighlightBackground => self.theme.highlight_background(),
            SemanticRole::CodeBackground => self.theme.code_background(),
            SemanticRole::PageBackground => self.theme.page_background().unwrap_or(Color::WHITE),
            _ => self.text_color,
        }
    }

    pub fn role_override(&self, role: SemanticRole) -> Option<Color> {
        self.overrides.get(&role).copied()
    }

    /// `None` means the page is left unpainted.
    pub fn page_background(&self) -> Option<Color> {
        self.overrides
            .get(&SemanticRole::PageBackground)
            .copied()
            .or_else(|| self.theme.page_background())
    }

    pub fn muted_color(&self) -> Color {
        self.theme.muted_color()
    }

    pub fn error_color(&self) -> Color {
        self.theme.error_color()
    }

    /// Colors handed to the table capability.
    pub fn table_style(&self) -> TableStyle {
        TableStyle {
            header_fill: self.theme.table_header_fill(),
            body_fill: self.page_background(),
            border: self.theme.table_border(),
            text: self.text_color,
            font_size: self.font_size,
            line_height: self.line_height(),
            cell_padding: 4.0,
        }
    }
}
