//! Per-line classification of a markdown note.
//!
//! Precedence is fixed: forced page break > callout > table row > heading >
//! list item > indented text > paragraph. The forced-break flag is reported
//! alongside the content kind because the line's content is still rendered.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static BLOCK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s\^[A-Za-z0-9_-]+\s*$").expect("BUG: invalid BLOCK_ID regex literal")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*)$").expect("BUG: invalid HEADING regex literal"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([-*]|\d+\.)[ \t]+(.*)$").expect("BUG: invalid LIST_ITEM regex literal")
});

/// Columns a tab occupies when measuring indentation.
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Frontmatter,
    Blank,
    Callout,
    TableRow,
    Heading { level: u8, text: String },
    ListItem { indent: usize, marker: String, text: String },
    Indented { indent: usize, text: String },
    Paragraph { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// 1-based source line number.
    pub line: usize,
    pub forced_break: bool,
    pub kind: LineKind,
    /// The line with any trailing block identifier removed.
    pub text: String,
}

/// Width of leading whitespace with tabs expanded.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Removes a trailing ` ^block-id` reference.
pub fn strip_block_id(line: &str) -> &str {
    match BLOCK_ID.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

/// Returns the last line of the frontmatter region, if the document opens one
/// and closes it.
pub fn frontmatter_end(lines: &[&str]) -> Option<usize> {
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return None;
    }
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| l.trim_end() == "---")
        .map(|(idx, _)| idx + 1)
}

#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    forced_breaks: BTreeSet<usize>,
    frontmatter_end: Option<usize>,
}

impl LineClassifier {
    pub fn new(lines: &[&str], forced_breaks: BTreeSet<usize>) -> Self {
        Self {
            forced_breaks,
            frontmatter_end: frontmatter_end(lines),
        }
    }

    pub fn frontmatter_end(&self) -> Option<usize> {
        self.frontmatter_end
    }

    /// Classifies the line at 1-based position `line`.
    pub fn classify(&self, line: usize, raw: &str) -> ClassifiedLine {
        if self.frontmatter_end.is_some_and(|end| line <= end) {
            return ClassifiedLine {
                line,
                forced_break: false,
                kind: LineKind::Frontmatter,
                text: raw.to_string(),
            };
        }

        let text = strip_block_id(raw).trim_end().to_string();
        let kind = classify_content(&text);
        ClassifiedLine {
            line,
            forced_break: self.forced_breaks.contains(&line),
            kind,
            text,
        }
    }
}

fn classify_content(text: &str) -> LineKind {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('>') {
        return LineKind::Callout;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|') {
        return LineKind::TableRow;
    }
    if let Some(caps) = HEADING.captures(text) {
        return LineKind::Heading {
            level: caps[1].len() as u8,
            text: caps[2].trim().to_string(),
        };
    }
    if let Some(caps) = LIST_ITEM.captures(text) {
        return LineKind::ListItem {
            indent: indent_width(&caps[1]),
            marker: caps[2].to_string(),
            text: caps[3].to_string(),
        };
    }
    let indent = indent_width(text);
    if indent > 0 {
        return LineKind::Indented {
            indent,
            text: trimmed.to_string(),
        };
    }
    LineKind::Paragraph {
        text: text.to_string(),
    }
}

/// Splits a table row into trimmed cells. `\|` is kept as a literal pipe.
pub fn split_table_row(row: &str) -> Vec<String> {
    let inner = row.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
