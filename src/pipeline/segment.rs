//! Paragraph and sentence splitting.
//!
//! Segmentation is a heuristic, so it sits behind the [`Segmenter`] trait: the
//! serializer takes any implementation, and a smarter splitter (abbreviation
//! lists, a language model) can replace [`PunctuationSegmenter`] without
//! touching recognition or the format writers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Splits text into paragraphs and sentences. Implementations must be pure.
pub trait Segmenter: Send + Sync {
    /// Maximal runs of text bounded by blank lines, trimmed, never empty.
    fn paragraphs(&self, text: &str) -> Vec<String>;

    /// Sentences of one paragraph, trimmed, never empty.
    fn sentences(&self, paragraph: &str) -> Vec<String>;
}

/// Blank-line paragraphs; sentences end at `.`, `!` or `?` followed by
/// whitespace or end of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSegmenter;

/// Two or more line breaks, allowing whitespace-only lines in between.
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[^\S\n]*\n\s*").unwrap());

impl Segmenter for PunctuationSegmenter {
    fn paragraphs(&self, text: &str) -> Vec<String> {
        let text = text.replace("\r\n", "\n");
        RE_PARAGRAPH_BREAK
            .split(&text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = paragraph.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = match chars.peek() {
                None => true,
                Some(&(_, next)) => next.is_whitespace(),
            };
            if at_boundary {
                let end = idx + c.len_utf8();
                push_fragment(&mut sentences, &paragraph[start..end]);
                start = end;
            }
        }
        push_fragment(&mut sentences, &paragraph[start..]);
        sentences
    }
}

fn push_fragment(out: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}
