//! Keyword-anchored window extraction.
//!
//! Offsets are counted in characters, not bytes, so a window never splits a
//! multi-byte character.

/// Lowercase a single character, keeping it as-is when lowercasing would
/// expand it into several characters. Keeps haystack and content indices aligned.
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Character index of the first case-insensitive occurrence of `keyword`.
pub fn find_keyword(content: &str, keyword: &str) -> Option<usize> {
    let needle: Vec<char> = keyword.chars().map(fold).collect();
    if needle.is_empty() {
        return Some(0);
    }

    let haystack: Vec<char> = content.chars().map(fold).collect();
    haystack
        .windows(needle.len())
        .position(|candidate| candidate == needle.as_slice())
}

/// Return the slice `[i - window, i + window)` around the first match of
/// `keyword`, clamped to the content bounds.
///
/// When the keyword is absent the whole content comes back unchanged, so the
/// status patterns still get a chance to match somewhere on the page.
pub fn extract_window<'a>(content: &'a str, keyword: &str, window: usize) -> &'a str {
    let Some(index) = find_keyword(content, keyword) else {
        return content;
    };

    let start = index.saturating_sub(window);
    let end = index.saturating_add(window);

    let byte_offset = |char_index: usize| {
        content
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(content.len())
    };

    &content[byte_offset(start)..byte_offset(end)]
}
