//! User-facing export settings, loadable from JSON.

use crate::error::PipelineError;
use notepress_layout::LayoutConfig;
use notepress_types::{Color, ColorOverrides, Margins, PageSize, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FOOTNOTE_TEMPLATE: &str = "{title} - Page {page} of {total}";

/// Everything the user can choose about one export.
///
/// Missing fields take their defaults, so `{}` is a valid settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    pub theme: Theme,
    /// Built-in family name, or the family name of `custom_font_path`.
    pub font_family: String,
    /// TrueType file embedded in place of the built-in family.
    pub custom_font_path: Option<PathBuf>,
    /// Stamp source line numbers in the left margin.
    pub gutter: bool,
    pub footnote_enabled: bool,
    pub footnote_template: String,
    /// 1-based source lines that start a new page.
    pub forced_breaks: BTreeSet<usize>,
    pub color_overrides: ColorOverrides,
    pub text_color: Option<Color>,
    /// Set the note title above the first line.
    pub include_title: bool,
    pub margins: Margins,
    pub font_size: f32,
    pub line_height_factor: f32,
    pub capability_timeout_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_family: "helvetica".to_string(),
            custom_font_path: None,
            gutter: false,
            footnote_enabled: false,
            footnote_template: DEFAULT_FOOTNOTE_TEMPLATE.to_string(),
            forced_breaks: BTreeSet::new(),
            color_overrides: ColorOverrides::new(),
            text_color: None,
            include_title: false,
            margins: Margins::default(),
            font_size: 11.0,
            line_height_factor: 1.35,
            capability_timeout_ms: 10_000,
        }
    }
}

impl ExportSettings {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(PipelineError::Settings(format!("fontSize must be positive, got {}", self.font_size)));
        }
        if !(self.line_height_factor.is_finite() && self.line_height_factor > 0.0) {
            return Err(PipelineError::Settings(format!(
                "lineHeightFactor must be positive, got {}",
                self.line_height_factor
            )));
        }
        let m = &self.margins;
        let (width, height) = PageSize::A4.dimensions_pt();
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| !v.is_finite() || *v < 0.0)
            || m.left + m.right >= width
            || m.top + m.bottom >= height
        {
            return Err(PipelineError::Settings("margins leave no printable area".to_string()));
        }
        if self.forced_breaks.contains(&0) {
            return Err(PipelineError::Settings("forcedBreaks are 1-based line numbers".to_string()));
        }
        Ok(())
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            page_size: PageSize::A4,
            margins: self.margins,
            font_size: self.font_size,
            line_height_factor: self.line_height_factor,
            theme: self.theme,
            text_color: self.text_color,
            color_overrides: self.color_overrides.clone(),
            gutter: self.gutter,
            capability_timeout: Duration::from_millis(self.capability_timeout_ms),
        }
    }
}
