// Hot-list acquisition: a source trait, the Weibo HTTP source, and the
// snapshot writer that lays the result out for the pipeline.

pub mod snapshot;
pub mod weibo;

use anyhow::Result;
use async_trait::async_trait;

/// Anything that can produce the current hot-search list, best first.
#[async_trait]
pub trait HotListSource: Send + Sync {
    /// Current titles in rank order. Ads are already removed.
    async fn fetch_titles(&self) -> Result<Vec<String>>;
}

/// A fixed list, for tests and offline runs.
pub struct StaticSource(pub Vec<String>);

#[async_trait]
impl HotListSource for StaticSource {
    async fn fetch_titles(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}
