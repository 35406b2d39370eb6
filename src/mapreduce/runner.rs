// In-process stand-in for the map/reduce runtime.
//
// Splits the input into disjoint shards, maps each shard on a blocking
// worker task with no shared mutable state, concatenates the output,
// shuffles it by key and streams it through the running-sum reducer.
// Results don't depend on shard count, concurrency or completion order.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{map_lines, reduce_grouped, shuffle, Job};
use crate::records::{KeyCount, LineStats};

/// Finished job output.
#[derive(Debug, Clone, Default)]
pub struct JobOutput {
    pub rows: Vec<KeyCount>,
    pub stats: LineStats,
}

/// Local runner settings.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    /// Number of input shards (mapper instances)
    pub shards: usize,
    /// Mapper shards processed at once
    pub concurrency: usize,
    /// Show a progress bar over shards
    pub progress: bool,
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self {
            shards: 4,
            concurrency: 4,
            progress: false,
        }
    }
}

impl LocalRunner {
    /// Run `job` over `lines`.
    pub async fn run<J>(&self, job: Arc<J>, lines: Vec<String>) -> Result<JobOutput>
    where
        J: Job + 'static,
    {
        let shard_size = lines.len().div_ceil(self.shards.max(1)).max(1);
        let shards: Vec<Vec<String>> = lines.chunks(shard_size).map(<[String]>::to_vec).collect();

        let pb = if self.progress {
            let pb = ProgressBar::new(shards.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Mapping {msg} [{bar:30}] {pos}/{len}")
                    .context("Invalid progress bar template")?,
            );
            pb.set_message(job.name());
            pb
        } else {
            ProgressBar::hidden()
        };

        let results: Vec<Result<(Vec<(String, u64)>, LineStats)>> =
            stream::iter(shards.into_iter().map(|shard| {
                let job = Arc::clone(&job);
                let pb = pb.clone();
                async move {
                    let out = tokio::task::spawn_blocking(move || map_lines(job.as_ref(), &shard))
                        .await
                        .context("Mapper task panicked")?;
                    pb.inc(1);
                    Ok::<_, anyhow::Error>(out)
                }
            }))
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;
        pb.finish_and_clear();

        let mut pairs = Vec::new();
        let mut stats = LineStats::default();
        for result in results {
            let (shard_pairs, shard_stats) = result?;
            pairs.extend(shard_pairs);
            stats.merge(shard_stats);
        }

        info!(
            job = job.name(),
            intermediate = pairs.len(),
            "Map phase complete"
        );

        shuffle(&mut pairs);
        let reduced = reduce_grouped(pairs);
        let rows = job.finish(reduced);

        Ok(JobOutput { rows, stats })
    }
}
