// Line-oriented record formats.
//
// Every stage talks in newline-terminated text so it can run under a
// streaming map/reduce runtime:
//
//   snapshot       rank,title
//   history        timestamp,rank,title
//   segmented      rank,token1 token2 ...
//   intermediate   key<TAB>count
//
// There is no escaping: titles and tokens must not contain the delimiter
// characters. Parsers return an error for malformed lines; callers skip the
// line and count it in `LineStats`.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Parse a 1-based rank.
fn parse_rank(s: &str) -> Result<u32> {
    let rank: u32 = s
        .trim()
        .parse()
        .with_context(|| format!("rank is not an integer: {s:?}"))?;
    if rank == 0 {
        bail!("rank must be 1 or greater");
    }
    Ok(rank)
}

/// One line of the current hot-list snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub rank: u32,
    pub title: String,
}

impl RawRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let (rank, title) = line
            .trim()
            .split_once(',')
            .context("missing ',' between rank and title")?;
        let title = title.trim();
        if title.is_empty() {
            bail!("empty title");
        }
        Ok(Self {
            rank: parse_rank(rank)?,
            title: title.to_string(),
        })
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.rank, self.title)
    }
}

/// One line of an archived, timestamped snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Unix seconds
    pub timestamp: i64,
    pub rank: u32,
    pub title: String,
}

impl HistoryRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.trim().splitn(3, ',');
        let (Some(ts), Some(rank), Some(title)) = (parts.next(), parts.next(), parts.next()) else {
            bail!("expected timestamp,rank,title");
        };
        let timestamp: i64 = ts
            .trim()
            .parse()
            .with_context(|| format!("timestamp is not an integer: {ts:?}"))?;
        let title = title.trim();
        if title.is_empty() {
            bail!("empty title");
        }
        Ok(Self {
            timestamp,
            rank: parse_rank(rank)?,
            title: title.to_string(),
        })
    }

    /// History files carry `#`-prefixed header lines.
    pub fn is_comment(line: &str) -> bool {
        line.trim_start().starts_with('#')
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.timestamp, self.rank, self.title)
    }
}

/// A title reduced to its ranked keyword list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedRecord {
    pub rank: u32,
    /// Relevance order: scored phrases first, then single tokens
    pub tokens: Vec<String>,
}

impl SegmentedRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let (rank, tokens) = line
            .trim()
            .split_once(',')
            .context("missing ',' between rank and tokens")?;
        let tokens: Vec<String> = tokens.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            bail!("no tokens");
        }
        Ok(Self {
            rank: parse_rank(rank)?,
            tokens,
        })
    }
}

impl fmt::Display for SegmentedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.rank, self.tokens.join(" "))
    }
}

/// A `key<TAB>count` line: map output, reduce input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

impl KeyCount {
    pub fn parse(line: &str) -> Result<Self> {
        let (key, count) = line
            .trim_end_matches(['\r', '\n'])
            .split_once('\t')
            .context("missing tab between key and count")?;
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key");
        }
        let count: u64 = count
            .trim()
            .parse()
            .with_context(|| format!("count is not an integer: {count:?}"))?;
        Ok(Self {
            key: key.to_string(),
            count,
        })
    }
}

impl fmt::Display for KeyCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.key, self.count)
    }
}

impl From<(String, u64)> for KeyCount {
    fn from((key, count): (String, u64)) -> Self {
        Self { key, count }
    }
}

/// Per-stage line accounting. Correctness never depends on these numbers;
/// they exist so a run can report how much input it threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Non-blank lines seen
    pub read: usize,
    /// Lines that produced output
    pub emitted: usize,
    /// Malformed lines skipped
    pub skipped: usize,
}

impl LineStats {
    /// Record a malformed line and log why it was dropped.
    pub fn skip(&mut self, stage: &str, line: &str, err: &anyhow::Error) {
        self.skipped += 1;
        debug!(stage, line, error = %err, "Skipping malformed line");
    }

    pub fn merge(&mut self, other: LineStats) {
        self.read += other.read;
        self.emitted += other.emitted;
        self.skipped += other.skipped;
    }

    /// Log a one-line summary for the stage.
    pub fn log_summary(&self, stage: &str) {
        info!(
            stage,
            read = self.read,
            emitted = self.emitted,
            skipped = self.skipped,
            "Stage finished"
        );
    }
}

/// Read a required input file as lines. A missing file is fatal.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        bail!("Required input file not found: {}", path.display());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Read a `key<TAB>count` artifact, skipping malformed lines.
pub fn read_key_counts(path: &Path) -> Result<(Vec<KeyCount>, LineStats)> {
    let mut stats = LineStats::default();
    let mut out = Vec::new();
    for line in read_lines(path)? {
        if line.trim().is_empty() {
            continue;
        }
        stats.read += 1;
        match KeyCount::parse(&line) {
            Ok(kc) => {
                stats.emitted += 1;
                out.push(kc);
            }
            Err(e) => stats.skip("artifact", &line, &e),
        }
    }
    Ok((out, stats))
}

/// Write records one per line, replacing `path`.
pub fn write_lines<T: fmt::Display>(path: &Path, records: &[T]) -> Result<()> {
    let mut text = String::new();
    for r in records {
        text.push_str(&r.to_string());
        text.push('\n');
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
