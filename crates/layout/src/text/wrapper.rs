//! Greedy word wrapping over word / whitespace tokens.

/// A maximal run of either whitespace or non-whitespace characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_space: bool,
}

pub fn split_tokens(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match current {
            Some(kind) if kind != is_space => {
                tokens.push(Token { text: &text[start..idx], is_space: kind });
                start = idx;
                current = Some(is_space);
            }
            None => current = Some(is_space),
            _ => {}
        }
    }
    if let Some(kind) = current {
        tokens.push(Token { text: &text[start..], is_space: kind });
    }
    tokens
}

/// Wraps `text` into lines no wider than `max_width`.
///
/// A line is only broken when it already has content, so a single word wider
/// than `max_width` gets a line of its own. Whitespace that would start a new
/// line is dropped. Always returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;

    for token in split_tokens(text) {
        let token_width = measure(token.text);
        if width + token_width > max_width && !line.trim().is_empty() {
            lines.push(std::mem::take(&mut line).trim_end().to_string());
            width = 0.0;
            if token.is_space {
                continue;
            }
        }
        if token.is_space && line.is_empty() && !lines.is_empty() {
            continue;
        }
        line.push_str(token.text);
        width += token_width;
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn tokens_alternate_words_and_spaces() {
        let tokens = split_tokens("ab  c\td");
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["ab", "  ", "c", "\t", "d"]);
        assert!(tokens[1].is_space);
        assert!(split_tokens("").is_empty());
    }

    #[test]
    fn wraps_at_word_boundaries() {
        assert_eq!(wrap_text("aaa bbb ccc", 7.0, chars), vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn overwide_word_gets_its_own_line() {
        assert_eq!(
            wrap_text("a supercalifragilistic b", 5.0, chars),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 10.0, chars), vec![String::new()]);
    }
}
