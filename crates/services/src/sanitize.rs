//! User-supplied text is escaped once, before persistence, and rendered
//! verbatim as text afterwards.

/// HTML-entity escapes a string for safe storage and later rendering.
/// Covers at least `&`, `<`, `>`, `"` and `'`. Pure and total.
pub fn escape_html(raw: &str) -> String {
    html_escape::encode_safe(raw).into_owned()
}

/// Prefix of `s` containing at most `max` characters, cut on a char
/// boundary. Byte slicing would panic mid-codepoint on accented input,
/// which Portuguese comments are full of.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
