//! Post-processing: deterministic whitespace cleanup of raw engine text.
//!
//! Tesseract output carries artefacts that break paragraph splitting later on:
//! trailing form feeds, runs of spaces from column gaps, lines that hold only
//! whitespace, and the occasional zero-width character from the source PDF.
//!
//! After [`clean_page_text`] a page satisfies:
//! - no leading or trailing whitespace, on the page or on any line
//! - inner whitespace runs are a single space
//! - paragraphs are separated by exactly one blank line (`"\n\n"`)
//!
//! The serializer relies on the last point: splitting on blank lines and
//! re-joining with `"\n\n"` reproduces the page text exactly.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to one page of raw engine output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF) and form feeds to blank lines
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Collapse inner whitespace and trim every line
/// 4. Collapse 2+ blank lines down to 1
/// 5. Trim the page
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = normalise_lines(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{000C}', "\n\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Collapse inner whitespace per line ───────────────────────────────

static RE_INNER_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

fn normalise_lines(input: &str) -> String {
    input
        .lines()
        .map(|line| RE_INNER_WS.replace_all(line.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}
