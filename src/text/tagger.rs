// Tokenizer/POS-tagger seam.
//
// Segmentation and tagging are an external capability: the pipeline only
// needs `title -> ordered (surface, tag)` pairs. The trait lets us swap the
// backend (jieba, a remote service, a test fixture) without touching the
// rest of the pipeline.

/// One token produced by a tagger, in textual order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub surface: String,
    /// POS tag (jieba/ICTCLAS style: `n`, `nr`, `v`, `eng`, ...), if known
    pub tag: Option<String>,
}

impl TaggedToken {
    pub fn new(surface: impl Into<String>, tag: Option<&str>) -> Self {
        Self {
            surface: surface.into(),
            tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }
}

/// Splits a cleaned title into ordered, optionally tagged tokens.
///
/// Implementations must be pure: same input, same output, no shared state
/// that changes between calls.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<TaggedToken>;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> Vec<TaggedToken> + Send + Sync,
{
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        self(text)
    }
}

/// Fallback tagger: whitespace split, no POS tags.
///
/// Only useful when titles are already segmented; every token comes back
/// untagged, so the POS gates are skipped downstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTagger;

impl Tagger for WhitespaceTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        text.split_whitespace()
            .map(|w| TaggedToken::new(w, None))
            .collect()
    }
}

/// jieba-backed segmenter with POS tagging. HMM new-word guessing is off,
/// which keeps odd fragments out of the token stream.
#[cfg(feature = "jieba")]
pub struct JiebaTagger {
    jieba: jieba_rs::Jieba,
}

#[cfg(feature = "jieba")]
impl JiebaTagger {
    /// Load the bundled dictionary, plus an optional user dictionary.
    pub fn new(user_dict: Option<&std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut jieba = jieba_rs::Jieba::new();
        if let Some(path) = user_dict {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open user dictionary {}", path.display()))?;
            let mut reader = std::io::BufReader::new(file);
            jieba
                .load_dict(&mut reader)
                .with_context(|| format!("Failed to load user dictionary {}", path.display()))?;
            tracing::info!(path = %path.display(), "Loaded jieba user dictionary");
        }
        Ok(Self { jieba })
    }
}

#[cfg(feature = "jieba")]
impl Tagger for JiebaTagger {
    fn tag(&self, text: &str) -> Vec<TaggedToken> {
        self.jieba
            .tag(text, false)
            .into_iter()
            .map(|t| TaggedToken::new(t.word, Some(t.tag)))
            .collect()
    }
}
