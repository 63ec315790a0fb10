//! Positioned drawing primitives produced by the paginator.
//!
//! All coordinates are page space: points, origin top-left, y downwards.

use crate::fonts::FontKey;
use notepress_types::{Color, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub font: FontKey,
    pub size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectElement {
    pub rect: Rect,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub width: f32,
    pub color: Color,
}

/// Index into `LaidOutDocument::images`.
pub type ImageId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub rect: Rect,
    pub image: ImageId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageElement {
    Text(TextElement),
    /// A filled rectangle.
    Rect(RectElement),
    /// A stroked segment.
    Line(LineElement),
    Image(ImageElement),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub background: Option<Color>,
    pub elements: Vec<PageElement>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(|el| match el {
            PageElement::Text(t) => Some(t),
            _ => None,
        })
    }
}
