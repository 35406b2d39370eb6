// Token admissibility.
//
// Decides whether a tagged token is worth keeping as a hot keyword. The
// filter holds only a reference to the immutable lexicon, so it is safe to
// share across mapper threads.

use super::lexicon::Lexicon;
use super::normalize::{is_ascii_word, is_cjk, Normalizer};

/// POS tags that are admitted outright: person/place/organization/other
/// proper nouns, foreign words, noun-like adjectives, idioms, abbreviations.
pub const ALLOW_TAGS: &[&str] = &["nr", "ns", "nt", "nz", "eng", "an", "i", "j"];

/// POS tag prefixes that are admitted: nouns, verbs, adjectives, foreign words.
pub const ALLOW_TAG_PREFIXES: &[&str] = &["n", "v", "a", "eng"];

/// Proper-noun classes that earn the largest phrase bonus.
pub const PROPER_NOUN_TAGS: &[&str] = &["nr", "ns", "nt", "nz"];

/// Shortest CJK token kept.
pub const MIN_CJK_CHARS: usize = 2;
/// Longest CJK token kept; longer ones are sentence fragments.
pub const MAX_CJK_CHARS: usize = 10;
/// Kinship-marked tokens at or below this length are fragments.
pub const KINSHIP_FRAGMENT_CHARS: usize = 4;

/// Whether a POS tag passes the high-value tag gate.
pub fn tag_allowed(tag: &str) -> bool {
    ALLOW_TAGS.contains(&tag) || ALLOW_TAG_PREFIXES.iter().any(|p| tag.starts_with(p))
}

/// Token filter over a shared lexicon.
#[derive(Debug, Clone, Copy)]
pub struct TokenFilter<'a> {
    lexicon: &'a Lexicon,
    normalizer: Normalizer<'a>,
}

impl<'a> TokenFilter<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            normalizer: Normalizer::new(lexicon),
        }
    }

    /// Whether `token` (with its optional POS tag) is a keyword candidate.
    ///
    /// An empty tag is treated the same as no tag.
    pub fn is_admissible(&self, token: &str, tag: Option<&str>) -> bool {
        let surface = token.trim();
        let key = self.normalizer.normalize(surface);
        if key.is_empty() {
            return false;
        }

        // Checked on both forms so a blacklisted surface can't slip through
        // a semantic group label
        if self.lexicon.is_blocked(surface) || self.lexicon.is_blocked(&key) {
            return false;
        }

        if key.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        let len = key.chars().count();
        if is_ascii_word(&key) && len < 2 {
            return false;
        }

        if key.chars().any(is_cjk) && !(MIN_CJK_CHARS..=MAX_CJK_CHARS).contains(&len) {
            return false;
        }

        if self.lexicon.has_kinship_marker(&key) && len <= KINSHIP_FRAGMENT_CHARS {
            return false;
        }

        match tag {
            Some(t) if !t.is_empty() => tag_allowed(t),
            _ => true,
        }
    }
}
