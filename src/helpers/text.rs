//! Slug, reading-time and tag display helpers

/// Default reading speed used by [`reading_time`]
pub const WORDS_PER_MINUTE: usize = 200;

/// Derive a URL-safe slug from a title
///
/// Lowercases, collapses every run of non-alphanumeric characters into one
/// hyphen and trims hyphens at both ends. Non-ASCII letters are transliterated.
/// Applying it to its own output is a no-op.
pub fn generate_slug(title: &str) -> String {
    slug::slugify(title)
}

/// Whitespace-delimited word count
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Estimated reading time in whole minutes, never less than one
pub fn reading_time(content: &str, words_per_minute: usize) -> usize {
    let wpm = words_per_minute.max(1);
    word_count(content).div_ceil(wpm).max(1)
}

/// Reading time formatted as "<n> min read"
pub fn format_reading_time(content: &str, words_per_minute: usize) -> String {
    format!("{} min read", reading_time(content, words_per_minute))
}

/// First `max` tags plus the number left out
pub fn tag_summary(tags: &[String], max: usize) -> (&[String], usize) {
    let shown = &tags[..tags.len().min(max)];
    (shown, tags.len() - shown.len())
}
