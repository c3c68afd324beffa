/// Builds the ordered, de-duplicated list of search queries for one track.
///
/// The first query is always `"{title} {artist}"`. `title` falls back to
/// `original_title` when cleaning left nothing behind. May return an empty
/// list when neither title nor artist has any text.
pub fn generate_queries(
    cleaned_title: &str,
    original_title: &str,
    primary_artist: &str,
    templates: &[String],
) -> Vec<String> {
    let title = if cleaned_title.trim().is_empty() {
        original_title.trim()
    } else {
        cleaned_title.trim()
    };
    let artist = primary_artist.trim();

    let mut queries: Vec<String> = Vec::with_capacity(templates.len() + 1);
    let primary = "{title} {artist}".to_owned();
    for template in std::iter::once(&primary).chain(templates) {
        let filled = template
            .replace("{title}", title)
            .replace("{artist}", artist);
        let filled = filled.split_whitespace().collect::<Vec<_>>().join(" ");
        if !filled.is_empty() && !queries.contains(&filled) {
            queries.push(filled);
        }
    }
    queries
}
