// File-level stages for a local run.
//
// Mirrors the layout the cluster jobs use: one data directory holding the
// current snapshot, a history/ folder of archived snapshots, and the final
// artifacts written next to them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::title::TitlePipeline;
use crate::aggregate::cooccurrence::CooccurrenceJob;
use crate::aggregate::frequency::{FrequencyJob, FrequencyParams};
use crate::aggregate::time_bucket::{HourClock, TimeBucketJob};
use crate::mapreduce::runner::{JobOutput, LocalRunner};
use crate::records::{read_lines, write_lines, LineStats, RawRecord, SegmentedRecord};
use crate::text::lexicon::Lexicon;

/// Where every stage reads and writes.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw: PathBuf,
    pub segmented: PathBuf,
    pub history_dir: PathBuf,
    pub frequency: PathBuf,
    pub cooccurrence: PathBuf,
    pub time_distribution: PathBuf,
    /// JSON dashboard snapshot written by `report --json`
    pub dashboard: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            raw: data_dir.join("news_raw.txt"),
            segmented: data_dir.join("news_seg.txt"),
            history_dir: data_dir.join("history"),
            frequency: data_dir.join("top20.txt"),
            cooccurrence: data_dir.join("cooccurrence.txt"),
            time_distribution: data_dir.join("time_distribution.txt"),
            dashboard: data_dir.join("dashboard.json"),
        }
    }
}

/// Run the title pipeline over `rank,title` lines.
///
/// Malformed lines are skipped. Non-empty input that produces no output at
/// all is an error: the downstream jobs would have nothing to work on.
pub fn segment_lines<I, S>(pipeline: &TitlePipeline, lines: I) -> Result<(Vec<SegmentedRecord>, LineStats)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stats = LineStats::default();
    let mut out = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        stats.read += 1;
        match RawRecord::parse(line) {
            Ok(record) => {
                if let Some(seg) = pipeline.segment(&record) {
                    stats.emitted += 1;
                    out.push(seg);
                }
            }
            Err(e) => stats.skip("segment", line, &e),
        }
    }

    if stats.read > 0 && out.is_empty() {
        bail!(
            "Segmentation produced no output from {} input lines; check the snapshot format",
            stats.read
        );
    }
    Ok((out, stats))
}

/// Every line of every `*.txt` file in the history directory, files in
/// name order.
pub fn read_history(dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list history directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut lines = Vec::new();
    for file in &files {
        lines.extend(read_lines(file)?);
    }
    info!(files = files.len(), lines = lines.len(), "Loaded history snapshots");
    Ok(lines)
}

/// Shared, immutable state for a local run.
pub struct RunContext {
    pub lexicon: Arc<Lexicon>,
    pub pipeline: TitlePipeline,
    pub clock: HourClock,
    pub frequency: FrequencyParams,
}

/// What a local run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub segment: LineStats,
    pub frequency: JobOutput,
    pub cooccurrence: JobOutput,
    /// `None` when there was no history to analyze
    pub time: Option<JobOutput>,
}

/// Run every stage: segment, then the three jobs, writing all artifacts.
pub async fn run_all(ctx: &RunContext, runner: &LocalRunner, paths: &DataPaths) -> Result<RunSummary> {
    let raw = read_lines(&paths.raw)?;
    let (segmented, segment_stats) = segment_lines(&ctx.pipeline, &raw)?;
    segment_stats.log_summary("segment");
    write_lines(&paths.segmented, &segmented)?;

    let seg_lines: Vec<String> = segmented.iter().map(ToString::to_string).collect();

    let frequency_job = Arc::new(FrequencyJob::new(
        Arc::clone(&ctx.lexicon),
        ctx.frequency.clone(),
    ));
    let frequency = runner.run(frequency_job, seg_lines.clone()).await?;
    frequency.stats.log_summary("frequency");
    if frequency.rows.is_empty() {
        bail!("Frequency job produced no keywords from {} titles", seg_lines.len());
    }
    write_lines(&paths.frequency, &frequency.rows)?;

    let cooccurrence = runner.run(Arc::new(CooccurrenceJob), seg_lines).await?;
    cooccurrence.stats.log_summary("cooccurrence");
    write_lines(&paths.cooccurrence, &cooccurrence.rows)?;

    let time = if paths.history_dir.is_dir() {
        let history = read_history(&paths.history_dir)?;
        let out = runner
            .run(Arc::new(TimeBucketJob::new(ctx.clock)), history)
            .await?;
        out.stats.log_summary("time");
        write_lines(&paths.time_distribution, &out.rows)?;
        Some(out)
    } else {
        warn!(
            dir = %paths.history_dir.display(),
            "No history directory, skipping time distribution"
        );
        None
    };

    Ok(RunSummary {
        segment: segment_stats,
        frequency,
        cooccurrence,
        time,
    })
}
