//! Inline-style tokenization of a single text run.
//!
//! The text is matched against one alternation whose branch order is the
//! style precedence; the leftmost match wins and, at equal start, the earlier
//! branch wins. Emphasis markers toggle a `(bold, italic)` pair that stays on
//! until toggled again, so unmatched markers style the rest of the run.

use notepress_types::Color;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\[\]|]+)(?:\|([^\[\]]*))?\]\]").expect("BUG: invalid WIKILINK regex literal")
});

static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"!\[\[(?P<wiki>[^\]]+)\]\]",
        r"|!\[(?P<alt>[^\]]*)\]\((?P<src>[^)]+)\)",
        r"|\$\$(?P<bmath>(?s:.+?))\$\$",
        r"|\$(?P<imath>[^\s$](?:[^$\n]*[^\s$])?)\$",
        r#"|<span\s+style\s*=\s*["']\s*color\s*:\s*(?P<scolor>#[0-9A-Fa-f]{3,6})\s*;?\s*["']\s*>(?P<stext>.*?)</span>"#,
        r#"|<font\s+color\s*=\s*["']?(?P<fcolor>#[0-9A-Fa-f]{3,6})["']?\s*>(?P<ftext>.*?)</font>"#,
        r"|<u>(?P<u>.*?)</u>",
        r"|<s>(?P<s1>.*?)</s>|<del>(?P<s2>.*?)</del>|~~(?P<s3>.+?)~~",
        r"|<mark>(?P<h1>.*?)</mark>|==(?P<h2>.+?)==",
        r"|<code>(?P<c1>.*?)</code>|`(?P<c2>[^`]+)`",
        r"|(?P<marker>\*\*\*|\*\*|\*|_)",
    ))
    .expect("BUG: invalid INLINE regex literal")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontVariant {
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineRun {
    PlainText(String),
    Emphasis { text: String, bold: bool, italic: bool },
    Underline { text: String, variant: FontVariant },
    Strike { text: String, variant: FontVariant },
    Highlight { text: String, variant: FontVariant },
    ColoredText { text: String, color: Color, variant: FontVariant },
    Code(String),
    Math { source: String, is_block: bool },
    EmbeddedImage { path: String, width_override: Option<u32>, caption: Option<String> },
}

impl InlineRun {
    /// The glyph text of a text-bearing run.
    pub fn text(&self) -> Option<&str> {
        match self {
            InlineRun::PlainText(text)
            | InlineRun::Emphasis { text, .. }
            | InlineRun::Underline { text, .. }
            | InlineRun::Strike { text, .. }
            | InlineRun::Highlight { text, .. }
            | InlineRun::ColoredText { text, .. }
            | InlineRun::Code(text) => Some(text),
            InlineRun::Math { .. } | InlineRun::EmbeddedImage { .. } => None,
        }
    }
}

/// The bold/italic toggle pair for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleState {
    pub bold: bool,
    pub italic: bool,
}

impl StyleState {
    pub fn apply_marker(&mut self, marker: &str) {
        match marker {
            "***" => {
                self.bold = !self.bold;
                self.italic = !self.italic;
            }
            "**" => self.bold = !self.bold,
            _ => self.italic = !self.italic,
        }
    }

    pub fn variant(&self) -> FontVariant {
        FontVariant {
            bold: self.bold,
            italic: self.italic,
        }
    }

    fn resolve(&self, text: &str) -> Option<InlineRun> {
        if text.is_empty() {
            return None;
        }
        Some(if self.bold || self.italic {
            InlineRun::Emphasis {
                text: text.to_string(),
                bold: self.bold,
                italic: self.italic,
            }
        } else {
            InlineRun::PlainText(text.to_string())
        })
    }
}

/// Rewrites `[[target|alias]]` to its display text; `![[...]]` embeds are kept.
pub fn rewrite_wikilinks(text: &str) -> String {
    WIKILINK
        .replace_all(text, |caps: &Captures| {
            if &caps[1] == "!" {
                return caps[0].to_string();
            }
            match caps.get(3).map(|m| m.as_str().trim()).filter(|a| !a.is_empty()) {
                Some(alias) => alias.to_string(),
                None => caps[2].trim().to_string(),
            }
        })
        .into_owned()
}

/// Splits image attributes into a pixel width and a caption.
///
/// Integers set the width; anything else is a caption, the last one winning.
pub fn parse_image_attributes<'a>(attrs: impl IntoIterator<Item = &'a str>) -> (Option<u32>, Option<String>) {
    let mut width = None;
    let mut caption = None;
    for attr in attrs.into_iter().map(str::trim).filter(|a| !a.is_empty()) {
        match attr.parse::<u32>() {
            Ok(px) => width = Some(px),
            Err(_) => caption = Some(attr.to_string()),
        }
    }
    (width, caption)
}

fn embedded_image(target: &str) -> Option<InlineRun> {
    let mut parts = target.split('|');
    let path = parts.next()?.trim();
    if path.is_empty() {
        return None;
    }
    let (width_override, caption) = parse_image_attributes(parts);
    Some(InlineRun::EmbeddedImage {
        path: path.to_string(),
        width_override,
        caption,
    })
}

fn markdown_image(alt: &str, src: &str) -> Option<InlineRun> {
    let path = src.trim().trim_start_matches('<').trim_end_matches('>').replace("%20", " ");
    if path.is_empty() {
        return None;
    }
    let (width_override, caption) = parse_image_attributes(alt.split('|').skip(1));
    Some(InlineRun::EmbeddedImage {
        path,
        width_override,
        caption,
    })
}

fn decorated(state: &StyleState, text: &str, make: fn(String, FontVariant) -> InlineRun) -> Option<InlineRun> {
    if text.is_empty() {
        return None;
    }
    Some(make(text.to_string(), state.variant()))
}

fn group<'t>(caps: &Captures<'t>, names: &[&str]) -> Option<&'t str> {
    names.iter().find_map(|name| caps.name(name)).map(|m| m.as_str())
}

/// Tokenizes one text run into styled inline runs.
pub fn tokenize(text: &str) -> Vec<InlineRun> {
    let text = rewrite_wikilinks(text);
    let mut state = StyleState::default();
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        runs.extend(state.resolve(&text[last..whole.start()]));
        last = whole.end();

        let run = if let Some(target) = caps.name("wiki") {
            embedded_image(target.as_str())
        } else if let Some(src) = caps.name("src") {
            markdown_image(caps.name("alt").map_or("", |m| m.as_str()), src.as_str())
        } else if let Some(source) = caps.name("bmath") {
            Some(InlineRun::Math { source: source.as_str().trim().to_string(), is_block: true })
        } else if let Some(source) = caps.name("imath") {
            Some(InlineRun::Math { source: source.as_str().to_string(), is_block: false })
        } else if let (Some(hex), Some(inner)) = (
            group(&caps, &["scolor", "fcolor"]),
            group(&caps, &["stext", "ftext"]),
        ) {
            match Color::from_hex(hex) {
                Ok(color) if !inner.is_empty() => Some(InlineRun::ColoredText {
                    text: inner.to_string(),
                    color,
                    variant: state.variant(),
                }),
                Ok(_) => None,
                Err(e) => {
                    log::debug!("Ignoring color span with bad color '{}': {}", hex, e);
                    state.resolve(inner)
                }
            }
        } else if let Some(inner) = caps.name("u") {
            decorated(&state, inner.as_str(), |text, variant| InlineRun::Underline { text, variant })
        } else if let Some(inner) = group(&caps, &["s1", "s2", "s3"]) {
            decorated(&state, inner, |text, variant| InlineRun::Strike { text, variant })
        } else if let Some(inner) = group(&caps, &["h1", "h2"]) {
            decorated(&state, inner, |text, variant| InlineRun::Highlight { text, variant })
        } else if let Some(inner) = group(&caps, &["c1", "c2"]) {
            (!inner.is_empty()).then(|| InlineRun::Code(inner.to_string()))
        } else if let Some(marker) = caps.name("marker") {
            state.apply_marker(marker.as_str());
            None
        } else {
            None
        };
        runs.extend(run);
    }
    runs.extend(state.resolve(&text[last..]));
    runs
}
