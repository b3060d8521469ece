/// Prepares a string for similarity comparison.
///
/// Lowercases, turns every character other than alphanumerics, whitespace and `&` into a
/// space, and collapses runs of whitespace.
///
/// Note: Hyphenated names ("Coca-Cola") become separate tokens.
pub fn preprocess(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| {
            if c.is_alphanumeric() || c == '&' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenizer function to split preprocessed text into individual tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    preprocess(text)
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}
