//! Small text helpers shared by the scrapers and the fixture browser.

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn normalize_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes raw DOM text the way a browser renders it: whitespace collapsed
/// within each line, blank lines dropped, line breaks kept.
pub fn rendered_text(raw: &str) -> String {
    raw.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything before the first line break
pub fn first_line(text: &str) -> &str {
    let line = text.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}

/// At most `max_chars` characters, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Leading snippet of an element's text: trimmed, first line only, bounded length.
/// Whitespace-only text yields `None`.
pub fn snippet(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(first_line(trimmed), max_chars).to_string())
}

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
