// Weighted keyword frequency.
//
// Map: each title credits its distinct normalized keywords with a weight
// derived from the title's rank. Reduce: sum per keyword. Finish: collapse
// substring duplicates ("智能" inside "人工智能"), merge semantic groups,
// keep the top N.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;

use crate::mapreduce::Job;
use crate::records::{KeyCount, SegmentedRecord};
use crate::text::lexicon::Lexicon;
use crate::text::normalize::Normalizer;

/// Ranks beyond this all get the minimum weight of 1.
pub const WEIGHT_BASE: u64 = 51;

/// Rank-derived importance of one title: `max(1, 51 - rank)`.
///
/// Rank 1 weighs 50, rank 50 weighs 1, anything lower also weighs 1.
pub fn weight(rank: u32) -> u64 {
    WEIGHT_BASE.saturating_sub(u64::from(rank)).max(1)
}

/// Tunables for the finishing step.
#[derive(Debug, Clone)]
pub struct FrequencyParams {
    /// A longer keyword displaces an accepted substring of itself when its
    /// count exceeds `inclusion_ratio * accepted_count` (default 0.7)
    pub inclusion_ratio: f64,
    /// Keywords kept in the final ranking (default 20)
    pub top_n: usize,
}

impl Default for FrequencyParams {
    fn default() -> Self {
        Self {
            inclusion_ratio: 0.7,
            top_n: 20,
        }
    }
}

/// Sort descending by count. Stable, so ties keep their input order.
fn sort_desc(rows: &mut [KeyCount]) {
    rows.sort_by(|a, b| b.count.cmp(&a.count));
}

/// Collapse keywords that contain one another.
///
/// Walks the rows from highest count down, keeping an accepted list. A
/// candidate that is a substring of an accepted word is dropped. A
/// candidate that contains an accepted (shorter) word replaces it if its
/// count exceeds `ratio` times the accepted count; otherwise the candidate
/// is dropped. Pairwise O(n²) over a vocabulary of tens of entries.
pub fn dedup_by_inclusion(rows: Vec<KeyCount>, ratio: f64) -> Vec<KeyCount> {
    let mut sorted = rows;
    sort_desc(&mut sorted);

    let mut accepted: Vec<KeyCount> = Vec::new();
    for candidate in sorted {
        let mut keep = true;
        let mut displaced: Vec<usize> = Vec::new();

        for (i, existing) in accepted.iter().enumerate() {
            if existing.key.contains(candidate.key.as_str()) {
                keep = false;
                break;
            }
            if candidate.key.contains(existing.key.as_str()) {
                if candidate.count as f64 > existing.count as f64 * ratio {
                    displaced.push(i);
                } else {
                    keep = false;
                    break;
                }
            }
        }

        if keep {
            for i in displaced.into_iter().rev() {
                accepted.remove(i);
            }
            accepted.push(candidate);
        }
    }

    sort_desc(&mut accepted);
    accepted
}

/// Sum counts of keywords that canonicalize to the same key, then sort
/// descending. Re-applying it is a no-op.
pub fn merge_semantic(rows: Vec<KeyCount>, normalizer: &Normalizer<'_>) -> Vec<KeyCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<KeyCount> = Vec::new();

    for row in rows {
        let key = normalizer.normalize(&row.key);
        match index.get(&key) {
            Some(&i) => merged[i].count += row.count,
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(KeyCount {
                    key,
                    count: row.count,
                });
            }
        }
    }

    sort_desc(&mut merged);
    merged
}

/// The frequency map/reduce job.
pub struct FrequencyJob {
    lexicon: Arc<Lexicon>,
    params: FrequencyParams,
}

impl FrequencyJob {
    pub fn new(lexicon: Arc<Lexicon>, params: FrequencyParams) -> Self {
        Self { lexicon, params }
    }
}

impl Job for FrequencyJob {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn map(&self, line: &str, emit: &mut dyn FnMut(String, u64)) -> Result<()> {
        let record = SegmentedRecord::parse(line)?;
        let w = weight(record.rank);
        let normalizer = Normalizer::new(&self.lexicon);

        let mut seen: HashSet<String> = HashSet::new();
        for token in &record.tokens {
            let key = normalizer.normalize(token);
            if key.chars().count() < 2 {
                continue;
            }
            if seen.insert(key.clone()) {
                emit(key, w);
            }
        }
        Ok(())
    }

    fn finish(&self, reduced: Vec<KeyCount>) -> Vec<KeyCount> {
        let normalizer = Normalizer::new(&self.lexicon);
        let deduped = dedup_by_inclusion(reduced, self.params.inclusion_ratio);
        let mut merged = merge_semantic(deduped, &normalizer);
        merged.truncate(self.params.top_n);
        merged
    }
}
