// Composition tests: stages chained over a real data directory.
//
//   fetch (static source) -> segment -> frequency / cooccurrence / time
//   -> artifacts -> dashboard snapshot
//
// No network; everything lives in a temp directory.

use std::io::Cursor;
use std::sync::Arc;

use hotwords::aggregate::cooccurrence::CooccurrenceJob;
use hotwords::aggregate::frequency::FrequencyParams;
use hotwords::aggregate::time_bucket::HourClock;
use hotwords::fetch::snapshot::{fetch_and_save, write_snapshot};
use hotwords::fetch::StaticSource;
use hotwords::mapreduce::runner::LocalRunner;
use hotwords::mapreduce::stream::{map_stream, reduce_stream};
use hotwords::pipeline::stages::{run_all, DataPaths, RunContext};
use hotwords::pipeline::title::TitlePipeline;
use hotwords::records::{read_key_counts, read_lines, KeyCount, SegmentedRecord};
use hotwords::report::categories::Category;
use hotwords::report::DashboardSnapshot;
use hotwords::text::lexicon::Lexicon;
use hotwords::text::phrase::ScoreWeights;
use hotwords::text::tagger::WhitespaceTagger;

const TITLES: &[&str] = &[
    "#热搜# 青州 地震",
    "青州 地震 救援 进展",
    "台风 登陆 浙江 视频",
    "中国 足球 输了",
    "地震 救援 网友 热议",
];

fn beijing() -> HourClock {
    HourClock::from_offset_hours(8).unwrap()
}

fn context() -> RunContext {
    let lexicon = Arc::new(Lexicon::default());
    RunContext {
        pipeline: TitlePipeline::new(
            Arc::clone(&lexicon),
            Arc::new(WhitespaceTagger),
            ScoreWeights::default(),
        )
        .unwrap(),
        lexicon,
        clock: beijing(),
        frequency: FrequencyParams::default(),
    }
}

fn titles() -> Vec<String> {
    TITLES.iter().map(|t| t.to_string()).collect()
}

// ============================================================
// Full local run
// ============================================================

#[tokio::test]
async fn fetch_then_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());

    let files = fetch_and_save(&StaticSource(titles()), &paths, beijing())
        .await
        .unwrap();
    assert_eq!(files.count, TITLES.len());

    let summary = run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap();
    assert_eq!(summary.segment.read, TITLES.len());
    assert!(summary.time.is_some());

    // Segmented lines parse back, ranks preserved
    let seg = read_lines(&paths.segmented).unwrap();
    let first = SegmentedRecord::parse(&seg[0]).unwrap();
    assert_eq!(first.rank, 1);
    assert_eq!(first.tokens[0], "青州地震");

    // Frequency: unique keys, sorted descending, at most 20
    let (freq, _) = read_key_counts(&paths.frequency).unwrap();
    assert!(!freq.is_empty() && freq.len() <= 20);
    assert!(freq.windows(2).all(|w| w[0].count >= w[1].count));
    let mut keys: Vec<&str> = freq.iter().map(|r| r.key.as_str()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), freq.len());
    assert!(freq.iter().all(|r| r.key != "网友" && r.key != "视频"));

    // Co-occurrence keys are canonical
    let (pairs, _) = read_key_counts(&paths.cooccurrence).unwrap();
    for row in &pairs {
        let (a, b) = row.key.split_once(',').unwrap();
        assert!(a < b);
    }
    let quake_rescue = pairs
        .iter()
        .find(|r| r.key == "地震,救援")
        .map(|r| r.count);
    assert_eq!(quake_rescue, Some(2));

    // Every history line landed in one hour bucket
    let (time, _) = read_key_counts(&paths.time_distribution).unwrap();
    assert!(!time.is_empty());
    let hour = &time[0].key[..2];
    assert!(time.iter().all(|r| r.key.starts_with(hour)));
}

#[tokio::test]
async fn run_without_history_skips_time_stage() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    std::fs::write(&paths.raw, "1,青州 地震\n2,台风 登陆\n").unwrap();

    let summary = run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap();
    assert!(summary.time.is_none());
    assert!(!paths.time_distribution.exists());

    let snapshot = DashboardSnapshot::load(&paths).unwrap();
    assert!(snapshot.time.is_none());
    assert_eq!(snapshot.frequency.keywords[0].word, "青州地震");
}

#[tokio::test]
async fn missing_snapshot_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    let err = run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn snapshot_of_only_noise_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    std::fs::write(&paths.raw, "1,网友 热搜\n2,视频\nnot a record\n").unwrap();
    let err = run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no output"));
}

// ============================================================
// Report
// ============================================================

#[tokio::test]
async fn dashboard_reflects_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    fetch_and_save(&StaticSource(titles()), &paths, beijing())
        .await
        .unwrap();
    run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap();

    let snapshot = DashboardSnapshot::load(&paths).unwrap();
    assert!(snapshot.frequency.total_heat > 0);
    assert!(snapshot.categories.get(Category::Society) > 0);
    assert!(snapshot.cooccurrence.edges.iter().all(|e| e.count >= 2));

    let dist = snapshot.time.as_ref().unwrap();
    assert_eq!(dist.buckets.len(), 24);
    let busy: Vec<_> = dist.buckets.iter().filter(|b| b.total_heat > 0).collect();
    assert_eq!(busy.len(), 1);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["frequency"]["keywords"].is_array());
    assert_eq!(json["time"]["buckets"].as_array().unwrap().len(), 24);
}

// ============================================================
// Streaming drivers agree with the local runner
// ============================================================

#[tokio::test]
async fn map_sort_reduce_matches_runner() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    let now = chrono::DateTime::from_timestamp(1_700_010_000, 0)
        .unwrap()
        .fixed_offset();
    write_snapshot(&paths, &titles(), now).unwrap();
    let summary = run_all(&context(), &LocalRunner::default(), &paths)
        .await
        .unwrap();

    let segmented = std::fs::read_to_string(&paths.segmented).unwrap();

    let mut mapped = Vec::new();
    map_stream(&CooccurrenceJob, Cursor::new(segmented), &mut mapped).unwrap();

    // What `sort` does between the mapper and reducer
    let mut lines: Vec<&str> = std::str::from_utf8(&mapped).unwrap().lines().collect();
    let key = |l: &str| l.split('\t').next().unwrap_or_default().to_string();
    lines.sort_by(|a, b| key(a).cmp(&key(b)));
    let sorted = lines.join("\n");

    let mut reduced = Vec::new();
    reduce_stream(&CooccurrenceJob, Cursor::new(sorted), &mut reduced).unwrap();
    let streamed: Vec<KeyCount> = std::str::from_utf8(&reduced)
        .unwrap()
        .lines()
        .map(|l| KeyCount::parse(l).unwrap())
        .collect();

    assert_eq!(streamed, summary.cooccurrence.rows);
}
