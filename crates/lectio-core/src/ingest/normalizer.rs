//! Cleanup of raw extracted text.
//!
//! PDF extraction leaves replacement glyphs, stray bullets, control
//! characters and lines broken in the middle of a sentence. [`normalize`]
//! turns that into a single line of text that the language pipeline can
//! consume.

use std::sync::LazyLock;

use regex::Regex;

static CORRUPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{FFFD}●•▪■]+").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

// General category C: Cc, Cf, Cs, Co, Cn.
static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{C}+").expect("valid regex"));

const TERMINAL_PUNCTUATION: [char; 5] = ['.', '!', '?', ';', ':'];

/// Normalize raw text. Never fails; the output is idempotent under a second
/// application.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let cleaned = basic_cleaning(raw);
    let joined = smart_line_joining(&cleaned);
    collapse_whitespace(&joined)
}

/// Join pages with `separator` and normalize the result.
#[must_use]
pub fn normalize_pages<S: AsRef<str>>(pages: &[S], separator: &str) -> String {
    let raw = pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator);
    normalize(&raw)
}

/// Remove corrupt glyphs, collapse whitespace within each line and strip
/// control characters. Line breaks are kept for [`smart_line_joining`].
#[must_use]
pub fn basic_cleaning(text: &str) -> String {
    let text = CORRUPT_RE.replace_all(text, "");

    text.split(is_line_break)
        .map(|line| remove_control_chars(&collapse_whitespace(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop every character in Unicode general category C.
#[must_use]
pub fn remove_control_chars(text: &str) -> String {
    CONTROL_RE.replace_all(text, "").into_owned()
}

/// Re-join lines that were broken in the middle of a sentence.
///
/// A line that does not end in terminal punctuation is joined to the next one
/// with a space when the next line starts lowercase; otherwise a newline is
/// kept. Empty lines are dropped.
#[must_use]
pub fn smart_line_joining(text: &str) -> String {
    let lines: Vec<&str> = text
        .split(is_line_break)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut joined = String::with_capacity(text.len());

    for (i, line) in lines.iter().enumerate() {
        joined.push_str(line);

        let Some(next) = lines.get(i + 1) else {
            break;
        };

        let ends_sentence = line.ends_with(TERMINAL_PUNCTUATION);
        let next_lowercase = next.chars().next().is_some_and(char::is_lowercase);

        if !ends_sentence && next_lowercase {
            joined.push(' ');
        } else {
            joined.push('\n');
        }
    }

    collapse_whitespace(&joined)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

// Mirrors the separators `str.splitlines` honours, not just `\n`.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}
