// Map/reduce plumbing shared by the three aggregators.
//
// A job is a pure line mapper plus an optional finishing step over the
// reduced counts. Reduction itself is always the same: a streaming running
// sum over key-contiguous input, flushed on key change and at end-of-input.
// Under Hadoop streaming the runtime provides the shuffle; the local runner
// emulates it with a stable sort.

pub mod runner;
pub mod stream;

use anyhow::Result;

use crate::records::{KeyCount, LineStats};

/// A map/reduce job over text lines.
pub trait Job: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Emit `(key, count)` pairs for one input line.
    ///
    /// Returns an error for a malformed line; the driver skips it. A line
    /// that is well-formed but yields nothing (a comment, a title with no
    /// usable tokens) returns `Ok(())` without emitting.
    fn map(&self, line: &str, emit: &mut dyn FnMut(String, u64)) -> Result<()>;

    /// Post-process the full reduced output. Identity by default.
    fn finish(&self, reduced: Vec<KeyCount>) -> Vec<KeyCount> {
        reduced
    }
}

/// Run `job.map` over every line, skipping blanks and counting failures.
pub fn map_lines<J, I, S>(job: &J, lines: I) -> (Vec<(String, u64)>, LineStats)
where
    J: Job + ?Sized,
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

        let before = out.len();
        let result = job.map(line, &mut |key, count| out.push((key, count)));
        match result {
            Ok(()) => {
                if out.len() > before {
                    stats.emitted += 1;
                }
            }
            Err(e) => {
                out.truncate(before);
                stats.skip(job.name(), line, &e);
            }
        }
    }

    (out, stats)
}

/// Group map output by key. Stable, so values within a key keep their
/// arrival order; order across keys is lexicographic.
pub fn shuffle(pairs: &mut [(String, u64)]) {
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
}

/// Running sum over one contiguous key group at a time.
#[derive(Debug, Default)]
pub struct RunningSum {
    current: Option<(String, u64)>,
}

impl RunningSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value. Returns the finished previous group when the key
    /// changes.
    pub fn push(&mut self, key: String, value: u64) -> Option<KeyCount> {
        if let Some((current, sum)) = self.current.as_mut() {
            if *current == key {
                *sum = sum.saturating_add(value);
                return None;
            }
        }
        self.current.replace((key, value)).map(KeyCount::from)
    }

    /// Flush the trailing group.
    pub fn finish(self) -> Option<KeyCount> {
        self.current.map(KeyCount::from)
    }
}

/// Sum values over key-contiguous input.
///
/// Input must already be grouped by key (the shuffle guarantee); a key that
/// reappears after a different key starts a new group.
pub fn reduce_grouped<I>(pairs: I) -> Vec<KeyCount>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut acc = RunningSum::new();
    let mut out = Vec::new();
    for (key, value) in pairs {
        if let Some(done) = acc.push(key, value) {
            out.push(done);
        }
    }
    out.extend(acc.finish());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(k: &str, v: u64) -> (String, u64) {
        (k.to_string(), v)
    }

    #[test]
    fn running_sum_flushes_on_key_change_and_at_end() {
        let out = reduce_grouped(vec![kv("a", 1), kv("a", 2), kv("b", 5), kv("c", 1), kv("c", 1)]);
        let flat: Vec<(&str, u64)> = out.iter().map(|kc| (kc.key.as_str(), kc.count)).collect();
        assert_eq!(flat, vec![("a", 3), ("b", 5), ("c", 2)]);
    }

    #[test]
    fn empty_input_reduces_to_nothing() {
        assert!(reduce_grouped(Vec::new()).is_empty());
    }

    #[test]
    fn shuffle_makes_keys_contiguous() {
        let mut pairs = vec![kv("b", 1), kv("a", 1), kv("b", 2), kv("a", 3)];
        shuffle(&mut pairs);
        let out = reduce_grouped(pairs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], KeyCount { key: "a".into(), count: 4 });
        assert_eq!(out[1], KeyCount { key: "b".into(), count: 3 });
    }

    struct Echo;

    impl Job for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn map(&self, line: &str, emit: &mut dyn FnMut(String, u64)) -> Result<()> {
            let n: u64 = line.trim().parse()?;
            for i in 0..n {
                emit(format!("k{i}"), 1);
            }
            Ok(())
        }
    }

    #[test]
    fn map_lines_counts_and_discards_partial_output() {
        let (pairs, stats) = map_lines(&Echo, ["2", "", "x", "0", "1"]);
        assert_eq!(pairs.len(), 3);
        assert_eq!(stats.read, 4);
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.skipped, 1);
    }
}
