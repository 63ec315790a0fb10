//! Groups classified lines into layout blocks.

use crate::classifier::{split_table_row, ClassifiedLine, LineClassifier, LineKind};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SEPARATOR_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").expect("BUG: invalid SEPARATOR_ROW regex literal")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    /// The literal numeral token, e.g. `"3."`.
    Ordered(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Frontmatter { lines: Vec<String> },
    Heading { level: u8, text: String },
    /// `indent` is the expanded leading-whitespace width; 0 for plain lines.
    Paragraph { text: String, indent: usize },
    ListItem { indent: usize, marker: ListMarker, text: String },
    /// `rows[0]` is the header; the separator row has already been dropped.
    Table { rows: Vec<Vec<String>>, raw_lines: Vec<String> },
    Callout { raw_lines: Vec<String> },
    ForcedBreak { source_line: usize },
}

/// A block together with the 1-based source line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    pub line: usize,
    pub block: Block,
}

impl SourceBlock {
    fn new(line: usize, block: Block) -> Self {
        Self { line, block }
    }
}

/// Splits `text` into lines and segments them.
pub fn segment_document(text: &str, forced_breaks: BTreeSet<usize>) -> Vec<SourceBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let classifier = LineClassifier::new(&lines, forced_breaks);
    segment(&lines, &classifier)
}

pub fn segment(lines: &[&str], classifier: &LineClassifier) -> Vec<SourceBlock> {
    let classified: Vec<ClassifiedLine> = lines
        .iter()
        .enumerate()
        .map(|(idx, raw)| classifier.classify(idx + 1, raw))
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < classified.len() {
        let current = &classified[i];
        if current.forced_break {
            blocks.push(SourceBlock::new(
                current.line,
                Block::ForcedBreak { source_line: current.line },
            ));
        }

        match &current.kind {
            LineKind::Frontmatter => {
                let end = run_end(&classified, i, |l| l.kind == LineKind::Frontmatter);
                let lines = classified[i..end].iter().map(|l| l.text.clone()).collect();
                blocks.push(SourceBlock::new(current.line, Block::Frontmatter { lines }));
                i = end;
            }
            LineKind::Callout => {
                let end = run_end(&classified, i, |l| l.kind == LineKind::Callout);
                let raw_lines = classified[i..end].iter().map(|l| l.text.clone()).collect();
                blocks.push(SourceBlock::new(current.line, Block::Callout { raw_lines }));
                i = end;
            }
            LineKind::TableRow => {
                // Forced breaks inside a table split it into pages, not into new tables.
                let mut end = i + 1;
                while end < classified.len() && classified[end].kind == LineKind::TableRow {
                    end += 1;
                }
                blocks.extend(table_blocks(&classified[i..end]));
                i = end;
            }
            LineKind::Paragraph { text } if opens_math_block(text) => {
                match math_block_end(&classified, i) {
                    Some(end) => {
                        let text = classified[i..=end]
                            .iter()
                            .map(|l| l.text.as_str())
                            .collect::<Vec<_>>()
                            .join("\n");
                        blocks.push(SourceBlock::new(current.line, Block::Paragraph { text, indent: 0 }));
                        i = end + 1;
                    }
                    None => {
                        blocks.push(single_line_block(current));
                        i += 1;
                    }
                }
            }
            _ => {
                blocks.push(single_line_block(current));
                i += 1;
            }
        }
    }
    blocks
}

/// End (exclusive) of the run of lines starting at `start` that satisfy `same`.
/// A forced break on any later line ends the run.
fn run_end(lines: &[ClassifiedLine], start: usize, same: impl Fn(&ClassifiedLine) -> bool) -> usize {
    let mut end = start + 1;
    while end < lines.len() && !lines[end].forced_break && same(&lines[end]) {
        end += 1;
    }
    end
}

fn opens_math_block(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with("$$") && trimmed.matches("$$").count() == 1
}

fn math_block_end(lines: &[ClassifiedLine], start: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .take_while(|(_, l)| !l.forced_break && l.kind != LineKind::Frontmatter)
        .find(|(_, l)| l.text.contains("$$"))
        .map(|(idx, _)| idx)
}

fn is_separator_row(text: &str) -> bool {
    SEPARATOR_ROW.is_match(text.trim())
}

/// Builds the table blocks of one contiguous run of `|` rows.
///
/// Forced breaks split the run into pieces, each emitted after its
/// `ForcedBreak` with the table header repeated. A piece whose second row is a
/// separator starts a new table with its own header.
fn table_blocks(rows: &[ClassifiedLine]) -> Vec<SourceBlock> {
    if rows.len() < 2 {
        log::debug!("Table at line {} has fewer than 2 rows; rendering as text", rows[0].line);
        return rows
            .iter()
            .map(|l| SourceBlock::new(l.line, Block::Paragraph { text: l.text.clone(), indent: 0 }))
            .collect();
    }

    let mut blocks = Vec::new();
    let mut header_idx = 0;
    let mut header = split_table_row(&rows[0].text);
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && !rows[end].forced_break {
            end += 1;
        }
        let piece = &rows[start..end];
        if start > 0 {
            blocks.push(SourceBlock::new(
                piece[0].line,
                Block::ForcedBreak { source_line: piece[0].line },
            ));
            if piece.len() >= 2 && is_separator_row(&piece[1].text) {
                header_idx = start;
                header = split_table_row(&piece[0].text);
            }
        }

        // Rows before `header_idx + 2` are the header and its separator.
        let body: Vec<Vec<String>> = (start..end)
            .filter(|&idx| idx >= header_idx + 2)
            .map(|idx| split_table_row(&rows[idx].text))
            .collect();
        let owns_header = (start..end).contains(&header_idx);
        if !body.is_empty() || owns_header {
            let mut table_rows = vec![header.clone()];
            table_rows.extend(body);
            let raw_lines = piece.iter().map(|l| l.text.clone()).collect();
            blocks.push(SourceBlock::new(piece[0].line, Block::Table { rows: table_rows, raw_lines }));
        }
        start = end;
    }
    blocks
}

fn single_line_block(line: &ClassifiedLine) -> SourceBlock {
    let block = match &line.kind {
        LineKind::Heading { level, text } => Block::Heading { level: *level, text: text.clone() },
        LineKind::ListItem { indent, marker, text } => Block::ListItem {
            indent: *indent,
            marker: if marker == "-" || marker == "*" {
                ListMarker::Bullet
            } else {
                ListMarker::Ordered(marker.clone())
            },
            text: text.clone(),
        },
        LineKind::Indented { indent, text } => Block::Paragraph { text: text.clone(), indent: *indent },
        LineKind::Paragraph { text } => Block::Paragraph { text: text.clone(), indent: 0 },
        LineKind::Blank => Block::Paragraph { text: String::new(), indent: 0 },
        // Group kinds only reach here as single lines.
        LineKind::Callout => Block::Callout { raw_lines: vec![line.text.clone()] },
        LineKind::TableRow => Block::Paragraph { text: line.text.clone(), indent: 0 },
        LineKind::Frontmatter => Block::Frontmatter { lines: vec![line.text.clone()] },
    };
    SourceBlock::new(line.line, block)
}
