use regex::Regex;
use std::sync::LazyLock;

static MARKUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]{0,512}>").expect("invalid MARKUP_PATTERN"));

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
    ("&lt;", " "),
    ("&gt;", " "),
];

/// Sanitizes a host-supplied text span.
///
/// Strips markup tags, decodes a handful of HTML entities, turns control characters into
/// spaces, collapses whitespace and truncates to `max_chars` characters.
///
/// # Returns
/// The sanitized text and whether it had to be truncated.
pub fn sanitize_text(text: &str, max_chars: usize) -> (String, bool) {
    // Bound the work done on oversized input before running any regex over it.
    let hard_limit = max_chars.saturating_mul(2).max(max_chars);
    let mut truncated = text.chars().count() > hard_limit;
    let bounded: String = text.chars().take(hard_limit).collect();

    let mut cleaned = MARKUP_PATTERN.replace_all(&bounded, " ").into_owned();

    for (entity, replacement) in HTML_ENTITIES {
        if cleaned.contains(entity) {
            cleaned = cleaned.replace(entity, replacement);
        }
    }

    let collapsed = cleaned
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() > max_chars {
        truncated = true;
        (collapsed.chars().take(max_chars).collect(), truncated)
    } else {
        (collapsed, truncated)
    }
}
