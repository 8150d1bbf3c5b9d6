/*!
 * Checks that decide which translations get a second, stricter attempt.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::placeholders::placeholders_match;

/// Originals at or below this many characters may legitimately stay unchanged
pub const SHORT_STRING_MAX_CHARS: usize = 2;

/// Why a translation needs another look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    PlaceholderMismatch,
    LooksUntranslated,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::PlaceholderMismatch => write!(f, "placeholder mismatch"),
            Issue::LooksUntranslated => write!(f, "looks untranslated"),
        }
    }
}

pub struct ConsistencyChecker;

impl ConsistencyChecker {
    /// Same text as the original, ignoring case and surrounding whitespace
    pub fn looks_untranslated(original: &str, translated: &str) -> bool {
        let original = original.trim();
        if original.chars().count() <= SHORT_STRING_MAX_CHARS {
            return false;
        }
        translated.trim().to_lowercase() == original.to_lowercase()
    }

    /// Every issue found for one translation
    pub fn issues(original: &str, translated: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        if !placeholders_match(original, translated) {
            issues.push(Issue::PlaceholderMismatch);
        }
        if Self::looks_untranslated(original, translated) {
            issues.push(Issue::LooksUntranslated);
        }
        issues
    }

    /// Ids needing a retry: placeholder mismatches plus untranslated-looking values.
    ///
    /// `originals` without a translation are compared against themselves.
    pub fn retry_set(
        originals: &BTreeMap<usize, String>,
        translations: &BTreeMap<usize, String>,
    ) -> BTreeSet<usize> {
        originals
            .iter()
            .filter(|(id, original)| {
                let translated = translations.get(id).unwrap_or(original);
                !Self::issues(original, translated).is_empty()
            })
            .map(|(id, _)| *id)
            .collect()
    }
}
