// Report views over the final artifacts.
//
// The jobs write plain `key<TAB>count` files; these types read them back
// and shape them for display: top keywords, strongest co-occurrence edges,
// the 24-hour distribution and a category tally, plus a serializable
// snapshot of all of it for the dashboard.

pub mod categories;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::aggregate::cooccurrence::{strongest_edges, CooccurrenceEdge, MAX_EDGES, MIN_EDGE_COUNT};
use crate::aggregate::frequency::FrequencyParams;
use crate::aggregate::time_bucket::TimeDistribution;
use crate::pipeline::stages::DataPaths;
use crate::records::{read_key_counts, KeyCount};
use categories::CategoryTally;

/// Weighted keyword frequencies, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyView {
    pub keywords: Vec<KeywordHeat>,
    /// Sum over every row read, not just the ones kept
    pub total_heat: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHeat {
    pub word: String,
    pub heat: u64,
}

impl FrequencyView {
    pub fn from_rows(rows: &[KeyCount], limit: usize) -> Self {
        let total_heat = rows.iter().map(|r| r.count).sum();
        let mut keywords: Vec<KeywordHeat> = rows
            .iter()
            .map(|r| KeywordHeat {
                word: r.key.clone(),
                heat: r.count,
            })
            .collect();
        keywords.sort_by(|a, b| b.heat.cmp(&a.heat));
        keywords.truncate(limit);
        Self {
            keywords,
            total_heat,
        }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.word.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CooccurrenceView {
    pub edges: Vec<CooccurrenceEdge>,
}

impl CooccurrenceView {
    pub fn from_rows(rows: &[KeyCount]) -> Self {
        Self {
            edges: strongest_edges(rows, MIN_EDGE_COUNT, MAX_EDGES),
        }
    }
}

/// Everything the dashboard shows, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub frequency: FrequencyView,
    pub cooccurrence: CooccurrenceView,
    /// `None` when no time distribution has been produced yet
    pub time: Option<TimeDistribution>,
    pub categories: CategoryTally,
}

impl DashboardSnapshot {
    /// Build the snapshot from in-memory rows.
    pub fn from_rows(
        frequency: &[KeyCount],
        cooccurrence: &[KeyCount],
        time: Option<&[KeyCount]>,
    ) -> Self {
        let frequency = FrequencyView::from_rows(frequency, FrequencyParams::default().top_n);
        let categories = CategoryTally::from_words(frequency.words());
        Self {
            generated_at: Utc::now(),
            frequency,
            cooccurrence: CooccurrenceView::from_rows(cooccurrence),
            time: time.map(TimeDistribution::from_rows),
            categories,
        }
    }

    /// Load every artifact from the data directory.
    ///
    /// The frequency and co-occurrence artifacts are required. The time
    /// distribution is optional, since a run without history skips it.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let (frequency, _) = read_key_counts(&paths.frequency)?;
        let (cooccurrence, _) = read_key_counts(&paths.cooccurrence)?;

        let time = if paths.time_distribution.exists() {
            Some(read_key_counts(&paths.time_distribution)?.0)
        } else {
            warn!(
                path = %paths.time_distribution.display(),
                "No time distribution artifact"
            );
            None
        };

        Ok(Self::from_rows(&frequency, &cooccurrence, time.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kc(key: &str, count: u64) -> KeyCount {
        KeyCount {
            key: key.to_string(),
            count,
        }
    }

    #[test]
    fn frequency_view_sorts_and_caps() {
        let rows = vec![kc("台风", 5), kc("地震", 50), kc("救援", 20)];
        let view = FrequencyView::from_rows(&rows, 2);
        assert_eq!(view.total_heat, 75);
        let words: Vec<&str> = view.words().collect();
        assert_eq!(words, vec!["地震", "救援"]);
    }

    #[test]
    fn snapshot_from_rows() {
        let snap = DashboardSnapshot::from_rows(
            &[kc("地震", 50), kc("足球", 10)],
            &[kc("地震,救援", 3), kc("台风,暴雨", 1)],
            None,
        );
        assert_eq!(snap.frequency.keywords.len(), 2);
        assert_eq!(snap.cooccurrence.edges.len(), 1);
        assert!(snap.time.is_none());
        assert_eq!(snap.categories.get(categories::Category::Society), 1);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["frequency"]["total_heat"], 60);
        assert_eq!(json["cooccurrence"]["edges"][0]["word1"], "地震");
    }

    #[test]
    fn load_requires_frequency_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        assert!(DashboardSnapshot::load(&paths).is_err());

        std::fs::write(&paths.frequency, "地震\t50\n").unwrap();
        std::fs::write(&paths.cooccurrence, "").unwrap();
        let snap = DashboardSnapshot::load(&paths).unwrap();
        assert_eq!(snap.frequency.total_heat, 50);
        assert!(snap.time.is_none());
    }
}
