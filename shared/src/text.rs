//! Pure text helpers: slugs, excerpts, reading time, tag normalization and
//! human-readable byte sizes.

/// Average adult reading speed used for the reading-time estimate.
const WORDS_PER_MINUTE: f64 = 200.0;

/// Default excerpt length in characters.
pub const EXCERPT_MAX_LENGTH: usize = 160;

/// URL-friendly slug from a title: lowercase, punctuation dropped, runs of
/// whitespace/hyphens collapsed to a single hyphen.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_hyphen = true;
        }
        // Other punctuation is dropped without forcing a separator.
    }
    slug
}

/// Remove HTML tags, keeping text content.
pub fn strip_html(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {},
        }
    }
    text
}

/// Excerpt of at most `max_length` characters, cut at a word boundary with a
/// trailing ellipsis when the content is longer.
pub fn generate_excerpt(content: &str, max_length: usize) -> String {
    let text = strip_html(content);
    let total_chars = text.chars().count();
    if total_chars <= max_length {
        return text;
    }

    let head: String = text.chars().take(max_length).collect();
    let cut = match head.rfind(' ') {
        Some(pos) => head[..pos].trim_end().to_string(),
        None => head,
    };
    format!("{cut}...")
}

/// Number of words in the content, ignoring HTML tags.
pub fn count_words(content: &str) -> u32 {
    strip_html(content).split_whitespace().count() as u32
}

/// Estimated reading time, minimum one minute. Midpoints round to even,
/// so 500 words is 2 minutes and 700 words is 4.
pub fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count() as f64;
    let minutes = (words / WORDS_PER_MINUTE).round_ties_even().max(1.0) as u64;
    format!("{minutes} min read")
}

/// Trim, lowercase, drop empties and deduplicate. Returns a sorted list so
/// normalization is idempotent and order-independent.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Human-readable byte size with one decimal, e.g. `2.5 MB`.
pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

#[cfg(test)]
mod tests {
    use super::{
        count_words, format_file_size, generate_excerpt, generate_slug, normalize_tags,
        reading_time, strip_html, EXCERPT_MAX_LENGTH,
    };

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("  Rust: 2024 Edition!  "), "rust-2024-edition");
        assert_eq!(generate_slug("already-a-slug"), "already-a-slug");
        assert_eq!(generate_slug("What's  new?"), "whats-new");
    }

    #[test]
    fn slug_of_punctuation_only_is_empty() {
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn strip_html_removes_tags_only() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("no tags"), "no tags");
    }

    #[test]
    fn excerpt_short_content_is_untouched() {
        assert_eq!(generate_excerpt("A short note.", EXCERPT_MAX_LENGTH), "A short note.");
    }

    #[test]
    fn excerpt_cuts_at_word_boundary_with_ellipsis() {
        let content = "word ".repeat(100);
        let excerpt = generate_excerpt(&content, 20);
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.chars().count() <= 23);
        assert!(!excerpt.contains("wor..."));
    }

    #[test]
    fn reading_time_has_one_minute_floor() {
        assert_eq!(reading_time("one two three"), "1 min read");
        let two_hundred = "word ".repeat(200);
        assert_eq!(reading_time(&two_hundred), "1 min read");
    }

    #[test]
    fn reading_time_rounds_word_count() {
        let four_hundred = "word ".repeat(400);
        assert_eq!(reading_time(&four_hundred), "2 min read");
        let thousand = "word ".repeat(1000);
        assert_eq!(reading_time(&thousand), "5 min read");
    }

    #[test]
    fn reading_time_midpoints_round_to_even() {
        let five_hundred = "word ".repeat(500);
        assert_eq!(reading_time(&five_hundred), "2 min read");
        let seven_hundred = "word ".repeat(700);
        assert_eq!(reading_time(&seven_hundred), "4 min read");
    }

    #[test]
    fn count_words_ignores_markup() {
        assert_eq!(count_words("<p>one two</p> <div>three</div>"), 3);
    }

    #[test]
    fn normalize_tags_trims_lowercases_and_dedups() {
        assert_eq!(normalize_tags(["AI", " ai ", "ML"]), vec!["ai", "ml"]);
        assert_eq!(normalize_tags(["", "  ", "rust"]), vec!["rust"]);
    }

    #[test]
    fn normalize_tags_is_idempotent() {
        let once = normalize_tags(["Web", "RUST", "web", " async "]);
        let twice = normalize_tags(once.iter().map(String::as_str));
        assert_eq!(once, twice);
    }

    #[test]
    fn format_file_size_steps_through_units() {
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
