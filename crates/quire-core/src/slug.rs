//! Slug utilities.
//!
//! Provides functions for turning titles and file names into URL-safe,
//! lowercase kebab-case slugs. Used by the collection layer when an entry's
//! identity is derived from its file name.

use std::path::Path;

/// Normalize a string to a lowercase kebab-case slug.
///
/// Performs the following transformations:
/// 1. Converts to lowercase
/// 2. Treats whitespace, underscores and hyphens as word separators
/// 3. Drops every other character that is not alphanumeric
/// 4. Joins the words with single hyphens
///
/// # Examples
///
/// ```
/// use quire_core::slug::slugify;
///
/// assert_eq!(slugify("Rust Meetup"), "rust-meetup");
/// assert_eq!(slugify("spring_summit_2025"), "spring-summit-2025");
/// assert_eq!(slugify("  Hello,   World!  "), "hello-world");
/// assert_eq!(slugify("--already--kebab--"), "already-kebab");
/// ```
pub fn slugify(input: &str) -> String {
    input
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Compute a slug from a file path's stem.
///
/// Returns `None` if the path has no file stem or the stem has no
/// slug-worthy characters.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use quire_core::slug::slug_from_path;
///
/// assert_eq!(
///     slug_from_path(Path::new("/content/events/Rust_Meetup.mdx")),
///     Some("rust-meetup".to_string())
/// );
/// assert_eq!(slug_from_path(Path::new("/")), None);
/// ```
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| slugify(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
}
