// Snapshot writer.
//
// One fetch produces three files: the current snapshot (`rank,title`,
// overwritten each time), and an hourly history pair under history/, a
// `timestamp,rank,title` text file with `#` header lines plus a JSON copy.
// Two fetches in the same hour overwrite that hour's history pair.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::info;

use super::HotListSource;
use crate::aggregate::time_bucket::HourClock;
use crate::pipeline::stages::DataPaths;
use crate::records::{write_lines, HistoryRecord, RawRecord};

/// Paths written by one snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFiles {
    pub raw: PathBuf,
    pub history_text: PathBuf,
    pub history_json: PathBuf,
    pub count: usize,
}

#[derive(Debug, Serialize)]
struct HistoryJson<'a> {
    timestamp: i64,
    datetime: String,
    count: usize,
    hotwords: Vec<RankedWord<'a>>,
}

#[derive(Debug, Serialize)]
struct RankedWord<'a> {
    rank: usize,
    word: &'a str,
}

/// Write `titles` (rank order) as the current snapshot and this hour's
/// history files. An empty list is an error: it almost always means the
/// source was rate-limited or changed shape.
pub fn write_snapshot(
    paths: &DataPaths,
    titles: &[String],
    now: DateTime<FixedOffset>,
) -> Result<SnapshotFiles> {
    if titles.is_empty() {
        bail!("Hot list is empty (rate-limited, or the response format changed?)");
    }

    let timestamp = now.timestamp();
    let datetime = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let stem = format!("news_raw_{}", now.format("%Y-%m-%d_%H"));

    let raw: Vec<RawRecord> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| RawRecord {
            rank: i as u32 + 1,
            title: title.clone(),
        })
        .collect();
    write_lines(&paths.raw, &raw)?;
    info!(count = raw.len(), path = %paths.raw.display(), "Saved current snapshot");

    let mut history = vec![
        format!("# 采集时间: {datetime}"),
        format!("# 时间戳: {timestamp}"),
    ];
    history.extend(raw.iter().map(|r| {
        HistoryRecord {
            timestamp,
            rank: r.rank,
            title: r.title.clone(),
        }
        .to_string()
    }));
    let history_text = paths.history_dir.join(format!("{stem}.txt"));
    write_lines(&history_text, &history)?;

    let json = HistoryJson {
        timestamp,
        datetime,
        count: titles.len(),
        hotwords: titles
            .iter()
            .enumerate()
            .map(|(i, word)| RankedWord { rank: i + 1, word })
            .collect(),
    };
    let history_json = paths.history_dir.join(format!("{stem}.json"));
    let body = serde_json::to_string_pretty(&json).context("Failed to serialize history JSON")?;
    std::fs::write(&history_json, body)
        .with_context(|| format!("Failed to write {}", history_json.display()))?;
    info!(path = %history_text.display(), "Saved history snapshot");

    Ok(SnapshotFiles {
        raw: paths.raw.clone(),
        history_text,
        history_json,
        count: titles.len(),
    })
}

/// Fetch from `source` and write the snapshot, stamped with `clock`'s time.
pub async fn fetch_and_save(
    source: &dyn HotListSource,
    paths: &DataPaths,
    clock: HourClock,
) -> Result<SnapshotFiles> {
    let titles = source.fetch_titles().await?;
    write_snapshot(paths, &titles, clock.now())
}
