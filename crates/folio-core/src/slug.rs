//! URL slug derivation for project titles.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Derive a slug from a title.
///
/// Lowercases the title, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and strips leading and trailing `-`.
/// Non-ASCII letters count as separators.
///
/// # Examples
///
/// ```
/// use folio_core::slugify;
///
/// assert_eq!(slugify("My New Project"), "my-new-project");
/// assert_eq!(slugify("  WOOD-ID!! "), "wood-id");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
