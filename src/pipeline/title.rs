// Per-title keyword pipeline.
//
// clean -> tag -> normalize -> filter -> phrase-build -> cap. The output is
// the title's keyword list in relevance order, ready for the aggregators.
// A title that yields nothing is simply dropped.

use std::sync::Arc;

use anyhow::Result;

use crate::records::{RawRecord, SegmentedRecord};
use crate::text::clean::TitleCleaner;
use crate::text::filter::TokenFilter;
use crate::text::lexicon::Lexicon;
use crate::text::normalize::Normalizer;
use crate::text::phrase::{PhraseBuilder, ScoreWeights, StreamToken};
use crate::text::tagger::Tagger;

/// Everything needed to turn a title into keywords. Immutable once built;
/// share one instance across the whole run.
pub struct TitlePipeline {
    lexicon: Arc<Lexicon>,
    cleaner: TitleCleaner,
    tagger: Arc<dyn Tagger>,
    weights: ScoreWeights,
}

impl TitlePipeline {
    pub fn new(lexicon: Arc<Lexicon>, tagger: Arc<dyn Tagger>, weights: ScoreWeights) -> Result<Self> {
        Ok(Self {
            lexicon,
            cleaner: TitleCleaner::new()?,
            tagger,
            weights,
        })
    }

    /// Keywords for one title: scored phrases first, then single tokens.
    pub fn keywords(&self, title: &str) -> Vec<String> {
        let cleaned = self.cleaner.clean(title);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let normalizer = Normalizer::new(&self.lexicon);
        let filter = TokenFilter::new(&self.lexicon);

        let mut stream = Vec::new();
        let mut admissible = Vec::new();
        for token in self.tagger.tag(&cleaned) {
            let key = normalizer.normalize(&token.surface);
            if filter.is_admissible(&token.surface, token.tag.as_deref()) {
                admissible.push(key.clone());
            }
            stream.push(StreamToken { key, tag: token.tag });
        }

        PhraseBuilder::new(&self.lexicon, &self.weights).build(&stream, &admissible)
    }

    /// Segment one `rank,title` record. `None` when the title has no
    /// usable keywords.
    pub fn segment(&self, record: &RawRecord) -> Option<SegmentedRecord> {
        let tokens = self.keywords(&record.title);
        if tokens.is_empty() {
            return None;
        }
        Some(SegmentedRecord {
            rank: record.rank,
            tokens,
        })
    }
}
