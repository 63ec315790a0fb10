use notepress_types::{Color, ColorOverrides, Margins, PageSize, Theme};
use std::time::Duration;

/// Inputs that shape one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub margins: Margins,
    /// Body text size in points.
    ///
    /// Defaults to `11`.
    pub font_size: f32,
    /// Line advance as a multiple of the font size.
    ///
    /// Defaults to `1.35`.
    pub line_height_factor: f32,
    pub theme: Theme,
    /// Replaces the theme's body text color when set.
    pub text_color: Option<Color>,
    pub color_overrides: ColorOverrides,
    /// Stamp source line numbers in the left margin.
    pub gutter: bool,
    /// Upper bound on every asset-resolution and rasterization wait.
    ///
    /// Defaults to 10 seconds.
    pub capability_timeout: Duration,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margins: Margins::default(),
            font_size: 11.0,
            line_height_factor: 1.35,
            theme: Theme::Light,
            text_color: None,
            color_overrides: ColorOverrides::new(),
            gutter: false,
            capability_timeout: Duration::from_secs(10),
        }
    }
}
