// Adjacent-token phrase merging and scoring.
//
// Two neighbouring noun/adjective/proper-noun tokens ("中国" + "足球") are
// merged into a candidate phrase. Candidates are scored by length, POS
// classes and how many other surviving tokens they contain, then placed
// ahead of the single tokens in the title's final keyword list.

use std::collections::HashSet;

use super::filter::{TokenFilter, ALLOW_TAGS, PROPER_NOUN_TAGS};
use super::lexicon::Lexicon;
use super::normalize::Normalizer;

/// Tunable constants for phrase scoring and the per-title cap.
///
/// `score = length * len + allow_tag * [either tag in ALLOW_TAGS]
///        + noun * [either tag n*] + adjective * [either tag a*]
///        + proper_noun * [either tag in nr/ns/nt/nz]
///        + containment * (#other admissible tokens inside the phrase)`
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    /// Per-character bonus (default 2)
    pub length: u32,
    /// Either source tag in the high-value allow set (default 10)
    pub allow_tag: u32,
    /// Either source tag noun-prefixed (default 5)
    pub noun: u32,
    /// Either source tag adjective-prefixed (default 3)
    pub adjective: u32,
    /// Either source tag a proper-noun class (default 15)
    pub proper_noun: u32,
    /// Per contained admissible token (default 2)
    pub containment: u32,
    /// Longest merged phrase kept, in characters (default 8)
    pub max_phrase_chars: usize,
    /// Tokens kept per title, phrases and singles combined (default 40)
    pub max_tokens: usize,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length: 2,
            allow_tag: 10,
            noun: 5,
            adjective: 3,
            proper_noun: 15,
            containment: 2,
            max_phrase_chars: 8,
            max_tokens: 40,
        }
    }
}

/// A normalized token in textual order, before admissibility filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamToken {
    pub key: String,
    pub tag: Option<String>,
}

impl StreamToken {
    fn tag_str(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

/// Whether a tag may take part in a phrase. Untagged tokens may.
fn phrase_tag_ok(tag: &str) -> bool {
    tag.is_empty() || ALLOW_TAGS.contains(&tag) || tag.starts_with('n') || tag.starts_with('a')
}

/// Builds the final keyword list for one title.
pub struct PhraseBuilder<'a> {
    lexicon: &'a Lexicon,
    normalizer: Normalizer<'a>,
    filter: TokenFilter<'a>,
    weights: &'a ScoreWeights,
}

impl<'a> PhraseBuilder<'a> {
    pub fn new(lexicon: &'a Lexicon, weights: &'a ScoreWeights) -> Self {
        Self {
            lexicon,
            normalizer: Normalizer::new(lexicon),
            filter: TokenFilter::new(lexicon),
            weights,
        }
    }

    /// Junk components, blacklisted words and stopwords never merge.
    fn is_junk(&self, key: &str) -> bool {
        self.lexicon.junk_components.contains(key) || self.lexicon.is_blocked(key)
    }

    /// Score a merged phrase from its two source tags.
    pub fn score(&self, phrase: &str, tag_a: &str, tag_b: &str, admissible: &[String]) -> u32 {
        let w = self.weights;
        let tags = [tag_a, tag_b];

        let mut score = w.length * phrase.chars().count() as u32;
        if tags.iter().any(|t| ALLOW_TAGS.contains(t)) {
            score += w.allow_tag;
        }
        if tags.iter().any(|t| t.starts_with('n')) {
            score += w.noun;
        }
        if tags.iter().any(|t| t.starts_with('a')) {
            score += w.adjective;
        }
        if tags.iter().any(|t| PROPER_NOUN_TAGS.contains(t)) {
            score += w.proper_noun;
        }

        let contained = admissible
            .iter()
            .filter(|tok| tok.as_str() != phrase && phrase.contains(tok.as_str()))
            .count() as u32;
        score + w.containment * contained
    }

    /// Merge adjacent pairs of `stream` into scored phrases, then append the
    /// leftover `admissible` single tokens. Deduplicated, at most
    /// `max_tokens` entries.
    ///
    /// `stream` is the full normalized sequence in textual order, so two
    /// tokens are only merged if nothing (not even a filtered-out word) sat
    /// between them.
    pub fn build(&self, stream: &[StreamToken], admissible: &[String]) -> Vec<String> {
        let mut phrases: Vec<(String, u32)> = Vec::new();

        for pair in stream.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.key.is_empty() || b.key.is_empty() {
                continue;
            }
            if self.is_junk(&a.key) || self.is_junk(&b.key) {
                continue;
            }
            if self.lexicon.has_kinship_marker(&a.key) || self.lexicon.has_kinship_marker(&b.key) {
                continue;
            }
            if !(phrase_tag_ok(a.tag_str()) && phrase_tag_ok(b.tag_str())) {
                continue;
            }

            let phrase = self.normalizer.normalize(&format!("{}{}", a.key, b.key));
            if phrase.chars().count() > self.weights.max_phrase_chars {
                continue;
            }
            if !self.filter.is_admissible(&phrase, None) {
                continue;
            }

            let score = self.score(&phrase, a.tag_str(), b.tag_str(), admissible);
            phrases.push((phrase, score));
        }

        // Stable: equal scores keep discovery order
        phrases.sort_by(|x, y| y.1.cmp(&x.1));

        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for word in phrases.iter().map(|(p, _)| p).chain(admissible.iter()) {
            if out.len() >= self.weights.max_tokens {
                break;
            }
            if seen.insert(word.as_str()) {
                out.push(word.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(key: &str, tag: &str) -> StreamToken {
        StreamToken {
            key: key.to_string(),
            tag: (!tag.is_empty()).then(|| tag.to_string()),
        }
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn adjacent_nouns_merge_ahead_of_singles() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        let stream = vec![tok("中国", "ns"), tok("足球", "n"), tok("输", "v")];
        let out = builder.build(&stream, &strings(&["中国", "足球"]));
        assert_eq!(out, strings(&["中国足球", "中国", "足球"]));
    }

    #[test]
    fn score_components() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        // len 4 -> 8, ns in allow set +10, noun +5, proper +15, contains 2 tokens +4
        let s = builder.score("中国足球", "ns", "n", &strings(&["中国", "足球", "中国足球"]));
        assert_eq!(s, 8 + 10 + 5 + 15 + 4);

        // Untagged: only length counts
        assert_eq!(builder.score("台风登陆", "", "", &[]), 8);

        // Adjective bonus
        assert_eq!(builder.score("美丽乡村", "a", "n", &[]), 8 + 5 + 3);
    }

    #[test]
    fn higher_score_sorts_first_ties_keep_order() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        let stream = vec![
            tok("暴雨", "n"),
            tok("预警", "n"),
            tok("武汉", "ns"),
            tok("大学", "n"),
        ];
        let out = builder.build(&stream, &[]);
        // 预警武汉 and 武汉大学 tie on the proper-noun bonus; 暴雨预警 trails
        assert_eq!(out, strings(&["预警武汉", "武汉大学", "暴雨预警"]));
    }

    #[test]
    fn filtered_word_between_breaks_adjacency() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        // "的" sits between the nouns in the real text
        let stream = vec![tok("北京", "ns"), tok("的", "uj"), tok("暴雨", "n")];
        let out = builder.build(&stream, &strings(&["北京", "暴雨"]));
        assert_eq!(out, strings(&["北京", "暴雨"]));
    }

    #[test]
    fn junk_components_and_kinship_never_merge() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        let stream = vec![tok("小", "a"), tok("明星", "n"), tok("姐姐", "n"), tok("演唱会", "n")];
        let out = builder.build(&stream, &strings(&["明星", "演唱会"]));
        assert_eq!(out, strings(&["明星", "演唱会"]));
    }

    #[test]
    fn verbs_do_not_merge() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        let stream = vec![tok("球队", "n"), tok("夺冠", "v")];
        let out = builder.build(&stream, &strings(&["球队", "夺冠"]));
        assert_eq!(out, strings(&["球队", "夺冠"]));
    }

    #[test]
    fn long_phrases_dropped() {
        let lex = Lexicon::default();
        let weights = ScoreWeights::default();
        let builder = PhraseBuilder::new(&lex, &weights);

        let stream = vec![tok("中华人民共和国", "ns"), tok("国务院", "nt")];
        let out = builder.build(&stream, &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn output_is_capped() {
        let lex = Lexicon::default();
        let weights = ScoreWeights {
            max_tokens: 3,
            ..ScoreWeights::default()
        };
        let builder = PhraseBuilder::new(&lex, &weights);

        let singles = strings(&["甲乙", "丙丁", "戊己", "庚辛"]);
        let out = builder.build(&[], &singles);
        assert_eq!(out, strings(&["甲乙", "丙丁", "戊己"]));
    }
}
