//! Themes and the semantic color roles that can be overridden by the host.
use crate::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Colors come from the host's theme inspection, on top of the light palette.
    Host,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticRole {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Title,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Highlight,
    Code,
    PageBackground,
    HighlightBackground,
    CodeBackground,
}

impl SemanticRole {
    /// The role for a heading level; levels past 6 share the level-6 role.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => SemanticRole::Heading1,
            2 => SemanticRole::Heading2,
            3 => SemanticRole::Heading3,
            4 => SemanticRole::Heading4,
            5 => SemanticRole::Heading5,
            _ => SemanticRole::Heading6,
        }
    }
}

/// Resolved role → RGB overrides, as produced by the host's theme/CSS inspection.
pub type ColorOverrides = BTreeMap<SemanticRole, Color>;

impl Theme {
    pub fn text_color(self) -> Color {
        match self {
            Theme::Dark => Color::rgb(220, 221, 222),
            Theme::Light | Theme::Host => Color::rgb(34, 34, 34),
        }
    }

    pub fn page_background(self) -> Option<Color> {
        match self {
            Theme::Dark => Some(Color::gray(30)),
            Theme::Light | Theme::Host => None,
        }
    }

    pub fn highlight_background(self) -> Color {
        match self {
            Theme::Dark => Color::rgb(102, 88, 20),
            Theme::Light | Theme::Host => Color::rgb(255, 243, 163),
        }
    }

    pub fn code_background(self) -> Color {
        match self {
            Theme::Dark => Color::gray(45),
            Theme::Light | Theme::Host => Color::gray(240),
        }
    }

    pub fn code_color(self) -> Color {
        match self {
            Theme::Dark => Color::rgb(230, 150, 120),
            Theme::Light | Theme::Host => Color::rgb(180, 60, 40),
        }
    }

    pub fn muted_color(self) -> Color {
        match self {
            Theme::Dark => Color::gray(130),
            Theme::Light | Theme::Host => Color::gray(140),
        }
    }

    pub fn table_header_fill(self) -> Color {
        match self {
            Theme::Dark => Color::gray(55),
            Theme::Light | Theme::Host => Color::gray(230),
        }
    }

    pub fn table_border(self) -> Color {
        match self {
            Theme::Dark => Color::gray(90),
            Theme::Light | Theme::Host => Color::gray(180),
        }
    }

    pub fn error_color(self) -> Color {
        match self {
            Theme::Dark => Color::rgb(255, 120, 120),
            Theme::Light | Theme::Host => Color::rgb(200, 30, 30),
        }
    }

    /// The name handed to external renderers.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Host => "host",
        }
    }
}
