// Streaming drivers: a job's mapper or reducer between a reader and a
// writer, one line at a time. This is how the jobs run under Hadoop
// streaming (`-mapper "hotwords map frequency"`), and how the CLI pipes
// them together locally with `sort` in between.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use super::{Job, RunningSum};
use crate::records::{KeyCount, LineStats};

/// Map every input line and write `key<TAB>count` lines as they come.
pub fn map_stream<J, R, W>(job: &J, reader: R, mut writer: W) -> Result<LineStats>
where
    J: Job + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut stats = LineStats::default();
    let mut pending: Vec<(String, u64)> = Vec::new();

    for line in reader.lines() {
        let line = line.context("Failed to read input line")?;
        if line.trim().is_empty() {
            continue;
        }
        stats.read += 1;

        pending.clear();
        match job.map(&line, &mut |key, count| pending.push((key, count))) {
            Ok(()) => {
                if !pending.is_empty() {
                    stats.emitted += 1;
                }
                for (key, count) in pending.drain(..) {
                    writeln!(writer, "{}", KeyCount { key, count })
                        .context("Failed to write mapper output")?;
                }
            }
            Err(e) => stats.skip(job.name(), &line, &e),
        }
    }

    writer.flush().context("Failed to flush mapper output")?;
    Ok(stats)
}

/// Sum key-sorted `key<TAB>count` lines, apply the job's finishing step
/// and write the result.
///
/// The input must be grouped by key, as the shuffle (or `sort`) leaves it.
pub fn reduce_stream<J, R, W>(job: &J, reader: R, mut writer: W) -> Result<LineStats>
where
    J: Job + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut stats = LineStats::default();
    let mut sum = RunningSum::new();
    let mut reduced = Vec::new();

    for line in reader.lines() {
        let line = line.context("Failed to read input line")?;
        if line.trim().is_empty() {
            continue;
        }
        stats.read += 1;
        match KeyCount::parse(&line) {
            Ok(kc) => {
                stats.emitted += 1;
                reduced.extend(sum.push(kc.key, kc.count));
            }
            Err(e) => stats.skip(job.name(), &line, &e),
        }
    }
    reduced.extend(sum.finish());

    for row in job.finish(reduced) {
        writeln!(writer, "{row}").context("Failed to write reducer output")?;
    }
    writer.flush().context("Failed to flush reducer output")?;
    Ok(stats)
}
