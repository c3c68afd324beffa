use once_cell::sync::Lazy;
use regex::Regex;

/// Decorations removed from source titles, applied in order.
static DECORATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "(feat. Someone)", "(ft. Someone)"
        Regex::new(r"(?i)\s*\((?:feat|ft)\.?\s[^)]*\)").unwrap(),
        // "Song - feat. Someone"
        Regex::new(r"(?i)\s+-\s+(?:feat|ft)\.?\s.*$").unwrap(),
        // "Song - From \"Movie\""
        Regex::new(r#"(?i)\s*-\s*from\s+"[^"]*""#).unwrap(),
        // "Song (From \"Movie\")"
        Regex::new(r#"(?i)\s*\(from\s+"[^"]*"\)"#).unwrap(),
        // "[Anything]"
        Regex::new(r"\s*\[[^\]]*\]").unwrap(),
        // "(Remastered Version)", "(Version 2)"
        Regex::new(r"(?i)\s*\([^)]*\bversion\b[^)]*\)").unwrap(),
    ]
});

/// Lower-cases, replaces everything that isn't alphanumeric or whitespace
/// with a space, and collapses whitespace runs.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips feature credits, soundtrack attributions, bracketed tags and
/// version annotations from a source catalog title.
pub fn clean(title: &str) -> String {
    let mut cleaned = title.to_owned();
    for pattern in DECORATION_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_owned()
}
