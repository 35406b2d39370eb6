// Keyword co-occurrence.
//
// Every unordered pair of distinct keywords in one title counts once. Pairs
// are keyed canonically (lexicographically smaller token first) so the
// reducer sees `a,b` and `b,a` as the same key.

use std::collections::BTreeSet;

use anyhow::Result;
use serde::Serialize;

use crate::mapreduce::Job;
use crate::records::{KeyCount, SegmentedRecord};

/// Canonical `a,b` key for an unordered pair.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a},{b}")
    } else {
        format!("{b},{a}")
    }
}

/// The co-occurrence map/reduce job. Reduction is a plain sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct CooccurrenceJob;

impl Job for CooccurrenceJob {
    fn name(&self) -> &'static str {
        "cooccurrence"
    }

    fn map(&self, line: &str, emit: &mut dyn FnMut(String, u64)) -> Result<()> {
        let record = SegmentedRecord::parse(line)?;

        // Sorted and distinct, so every pair comes out as (smaller, larger)
        let tokens: BTreeSet<&str> = record
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|t| t.chars().count() >= 2 && !t.contains(','))
            .collect();
        let tokens: Vec<&str> = tokens.into_iter().collect();

        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                emit(pair_key(a, b), 1);
            }
        }
        Ok(())
    }
}

/// One co-occurrence edge, as read back from the final artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CooccurrenceEdge {
    pub word1: String,
    pub word2: String,
    pub count: u64,
}

/// Default minimum count for an edge to be shown.
pub const MIN_EDGE_COUNT: u64 = 2;
/// Default number of edges kept.
pub const MAX_EDGES: usize = 50;

/// Keep edges seen at least `min_count` times, strongest `limit` first.
/// Rows whose key isn't an `a,b` pair are skipped.
pub fn strongest_edges(rows: &[KeyCount], min_count: u64, limit: usize) -> Vec<CooccurrenceEdge> {
    let mut edges: Vec<CooccurrenceEdge> = rows
        .iter()
        .filter(|kc| kc.count >= min_count)
        .filter_map(|kc| {
            let (a, b) = kc.key.split_once(',')?;
            if a.is_empty() || b.is_empty() || b.contains(',') {
                return None;
            }
            Some(CooccurrenceEdge {
                word1: a.to_string(),
                word2: b.to_string(),
                count: kc.count,
            })
        })
        .collect();
    edges.sort_by(|x, y| y.count.cmp(&x.count));
    edges.truncate(limit);
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(line: &str) -> Vec<String> {
        let mut out = Vec::new();
        CooccurrenceJob
            .map(line, &mut |k, v| {
                assert_eq!(v, 1);
                out.push(k)
            })
            .unwrap();
        out
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(pair_key("地震", "救援"), pair_key("救援", "地震"));
        assert_eq!(pair_key("AI", "芯片"), "AI,芯片");
    }

    #[test]
    fn emits_all_unordered_pairs_canonically() {
        let pairs = map("1,救援 地震 青州");
        assert_eq!(pairs.len(), 3);
        for key in &pairs {
            let (a, b) = key.split_once(',').unwrap();
            assert!(a < b, "{key} not canonical");
        }
        assert!(pairs.contains(&pair_key("救援", "地震")));
    }

    #[test]
    fn mapper_keys_are_pair_keys() {
        let pairs = map("2,青州 AI 地震");
        assert_eq!(
            pairs,
            vec![
                pair_key("地震", "AI"),
                pair_key("青州", "AI"),
                pair_key("青州", "地震"),
            ]
        );
    }

    #[test]
    fn duplicates_and_short_tokens_dropped() {
        let pairs = map("1,地震 地震 震 救援");
        assert_eq!(pairs, vec![pair_key("地震", "救援")]);
    }

    #[test]
    fn single_token_title_emits_nothing() {
        assert!(map("4,地震").is_empty());
    }

    #[test]
    fn strongest_edges_filters_and_ranks() {
        let rows = vec![
            KeyCount { key: "a1,b1".into(), count: 1 },
            KeyCount { key: "a2,b2".into(), count: 5 },
            KeyCount { key: "a3,b3".into(), count: 3 },
            KeyCount { key: "broken".into(), count: 9 },
        ];
        let edges = strongest_edges(&rows, MIN_EDGE_COUNT, 1);
        assert_eq!(
            edges,
            vec![CooccurrenceEdge {
                word1: "a2".into(),
                word2: "b2".into(),
                count: 5
            }]
        );
    }
}
