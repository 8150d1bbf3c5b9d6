/*!
 * Placeholder tokens that must survive translation verbatim:
 * `%{name}`, `{name}` and `$identifier`.
 */

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%\{[^{}]+\}|\{[^{}]+\}|\$[A-Za-z_][A-Za-z0-9_]*")
        .expect("Invalid placeholder regex")
});

/// Set of placeholder tokens found in `text`
pub fn placeholder_set(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Order-independent canonical form: sorted, de-duplicated, joined
pub fn signature(text: &str) -> String {
    placeholder_set(text)
        .into_iter()
        .collect::<Vec<_>>()
        .join("|")
}

/// Whether both texts carry exactly the same placeholder set
pub fn placeholders_match(original: &str, translated: &str) -> bool {
    signature(original) == signature(translated)
}
