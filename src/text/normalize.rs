// Canonicalization of tokens and phrases.
//
// A single function handles both the token-time variant mapping and the
// aggregation-time semantic-group mapping, so a key canonicalizes the same
// way no matter which stage sees it first.

use super::lexicon::Lexicon;

/// Maps surface forms to their canonical key.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Normalizer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Canonicalize a token or phrase.
    ///
    /// Variant lookup (case-insensitive) runs first, then the semantic-group
    /// lookup on its result. Purely alphabetic ASCII comes back upper-cased.
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, raw: &str) -> String {
        let word = raw.trim();
        if word.is_empty() {
            return String::new();
        }

        let variant = self
            .lexicon
            .variants
            .get(&word.to_lowercase())
            .map(String::as_str)
            .unwrap_or(word);

        let canonical = self
            .lexicon
            .semantic
            .get(&variant.to_lowercase())
            .map(String::as_str)
            .unwrap_or(variant);

        if is_ascii_word(canonical) {
            canonical.to_ascii_uppercase()
        } else {
            canonical.to_string()
        }
    }
}

/// True for a non-empty string made only of ASCII letters.
pub fn is_ascii_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// True for characters in the CJK Unified Ideographs block.
pub fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}
