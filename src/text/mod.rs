// Text processing: cleaning, tagging, normalization, filtering and
// phrase building for hot-search titles.

pub mod clean;
pub mod filter;
pub mod lexicon;
pub mod normalize;
pub mod phrase;
pub mod tagger;
