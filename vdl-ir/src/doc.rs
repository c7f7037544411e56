//! Documentation string normalization.

/// Strip the indentation common to every non-blank line, then trim.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize(raw: &str) -> Option<String> {
    let indent = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let stripped = raw
        .lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n");

    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize an optional doc string.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize)
}
