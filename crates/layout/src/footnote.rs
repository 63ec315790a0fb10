//! Per-page footer text stamped after layout, once the page total is known.

use crate::context::LayoutContext;
use crate::elements::{PageElement, TextElement};
use crate::output::LaidOutDocument;
use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const FOOTNOTE_FONT_SIZE: f32 = 9.0;

static DATE_WITH_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{date:([^}]*)\}").expect("BUG: invalid DATE_WITH_FORMAT regex literal"));

// Longest tokens first so `MMMM` is not read as `MM` twice.
const MOMENT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("A", "%p"),
];

/// Translates a moment.js-style date format into a `chrono` strftime string.
///
/// Text inside `[...]` is copied literally.
pub fn moment_to_chrono(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '['
            && let Some(close) = rest.find(']')
        {
            out.push_str(&rest[1..close].replace('%', "%%"));
            rest = &rest[close + 1..];
            continue;
        }
        for (token, spec) in MOMENT_TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'outer;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn format_timestamp(timestamp: &NaiveDateTime, strftime: &str) -> String {
    if StrftimeItems::new(strftime).any(|item| matches!(item, Item::Error)) {
        log::warn!("Unusable date format '{}'", strftime);
        return strftime.to_string();
    }
    timestamp.format(strftime).to_string()
}

/// Expands footer templates and stamps them onto every page.
#[derive(Debug, Clone)]
pub struct FootnoteCompositor {
    template: String,
    title: String,
    timestamp: NaiveDateTime,
}

impl FootnoteCompositor {
    pub fn new(template: impl Into<String>, title: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            template: template.into(),
            title: title.into(),
            timestamp,
        }
    }

    /// Expands the template for 1-based `page` of `total`.
    pub fn expand(&self, page: usize, total: usize) -> String {
        let with_dates = DATE_WITH_FORMAT.replace_all(&self.template, |caps: &Captures| {
            format_timestamp(&self.timestamp, &moment_to_chrono(&caps[1]))
        });
        with_dates
            .replace("{date}", &self.timestamp.format("%Y-%m-%d").to_string())
            .replace("{time}", &self.timestamp.format("%H:%M").to_string())
            .replace("{title}", &self.title)
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }

    /// Stamps the footer centered at half the bottom margin of every page,
    /// in the body face and base text color.
    pub fn stamp(&self, doc: &mut LaidOutDocument, ctx: &LayoutContext) {
        let total = doc.pages.len();
        let font = ctx.fonts.body(false, false);
        let baseline = ctx.page_height - ctx.margins.bottom / 2.0 + FOOTNOTE_FONT_SIZE * 0.3;
        for (index, page) in doc.pages.iter_mut().enumerate() {
            let text = self.expand(index + 1, total);
            if text.trim().is_empty() {
                continue;
            }
            let width = ctx.fonts.measure(&text, font, FOOTNOTE_FONT_SIZE);
            page.elements.push(PageElement::Text(TextElement {
                x: (ctx.page_width - width) / 2.0,
                baseline,
                text,
                font,
                size: FOOTNOTE_FONT_SIZE,
                color: ctx.text_color,
            }));
        }
        log::debug!("Stamped footnotes on {} pages", total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(14, 5, 9))
            .unwrap()
    }

    #[test]
    fn translates_moment_tokens() {
        assert_eq!(moment_to_chrono("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono("dddd, MMMM D"), "%A, %B %-d");
        assert_eq!(moment_to_chrono("hh:mm A"), "%I:%M %p");
        assert_eq!(moment_to_chrono("[Week of] YY"), "Week of %y");
        assert_eq!(moment_to_chrono("100%"), "100%%");
    }

    #[test]
    fn expands_placeholders_in_order() {
        let footnote = FootnoteCompositor::new(
            "{title} - Page {page} of {total} ({date} {time}, {date:MMM D YYYY})",
            "Notes",
            timestamp(),
        );
        assert_eq!(
            footnote.expand(2, 3),
            "Notes - Page 2 of 3 (2024-03-07 14:05, Mar 7 2024)"
        );
    }

    #[test]
    fn stamps_every_page() {
        let ctx = LayoutContext::default();
        let mut pager = crate::Paginator::new(&ctx);
        pager.request_space(0.0, true);
        pager.request_space(0.0, true);
        let mut doc = pager.finish();
        FootnoteCompositor::new("{title} - Page {page} of {total}", "Plan", timestamp()).stamp(&mut doc, &ctx);
        assert_eq!(doc.page_text(1), "Plan - Page 2 of 3");
        assert_eq!(doc.page_text(2), "Plan - Page 3 of 3");
    }
}
