//! Text normalization shared by the scorer.

/// Splits camelCase boundaries, turns every non-alphanumeric character into a
/// separator, lowercases and collapses whitespace.
///
/// `"sampleID"` and `"sample_id"` both normalize to `"sample id"`.
pub fn normalize_text(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if prev_lower && ch.is_uppercase() {
                spaced.push(' ');
            }
            spaced.extend(ch.to_lowercase());
            prev_lower = ch.is_lowercase() || ch.is_numeric();
        } else {
            spaced.push(' ');
            prev_lower = false;
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text with separators removed entirely.
pub fn compact_text(raw: &str) -> String {
    normalize_text(raw).replace(' ', "")
}

/// Normalized tokens in sorted order, so word order does not affect scoring.
pub fn sorted_tokens(raw: &str) -> String {
    let normalized = normalize_text(raw);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
