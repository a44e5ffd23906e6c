//! Text Normalizer: trims, collapses whitespace, truncates for the embedding provider.
//!
//! Case is preserved here; lower-casing happens only at match time.

/// Maximum input length (in chars) handed to the embedding provider.
pub const MAX_EMBED_CHARS: usize = 512;

/// Trims and collapses every internal whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max_chars` chars, always on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Normalized and truncated form sent to the embedding provider.
pub fn prepare_for_embedding(text: &str) -> String {
    let normalized = normalize(text);
    truncate_chars(&normalized, MAX_EMBED_CHARS).trim_end().to_string()
}
