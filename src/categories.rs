//! Gathering the list of categories to scrape.

use std::fs;
use std::io;
use std::path::Path;

/// Whether the input is already a URL rather than a label to look up
pub fn is_url(input: &str) -> bool {
    input
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}

/// Splits an inline comma-separated list, dropping empty entries
pub fn parse_inline(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One label or URL per line, blank lines ignored
pub fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn read_categories_file(path: &Path) -> io::Result<Vec<String>> {
    Ok(parse_lines(&fs::read_to_string(path)?))
}

/// Merges the inline list and the categories file, in that order.
/// An unreadable file is reported and skipped; if nothing is left the
/// defaults are used.
pub fn load_category_inputs(
    inline: Option<&str>,
    file: Option<&Path>,
    defaults: &[String],
) -> Vec<String> {
    let mut items = Vec::new();

    if let Some(list) = inline {
        items.extend(parse_inline(list));
    }

    if let Some(path) = file {
        match read_categories_file(path) {
            Ok(lines) => items.extend(lines),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                ::log::warn!("Categories file not found: {}", path.display());
            }
            Err(e) => {
                ::log::warn!("Could not read categories file {}: {}", path.display(), e);
            }
        }
    }

    if items.is_empty() {
        ::log::info!("No categories given, using the {} defaults", defaults.len());
        items = defaults.to_vec();
    }

    items
}
