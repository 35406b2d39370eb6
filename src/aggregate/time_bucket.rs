// Hourly keyword distribution from archived snapshots.
//
// Deliberately cheaper than the title pipeline: titles are split on plain
// whitespace with no normalization or filtering. Map emits `HH,token\t1`;
// the reducer sums; the consumer folds the sums into 24 hour buckets.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local, Timelike, Utc};
use serde::Serialize;

use crate::mapreduce::Job;
use crate::records::{HistoryRecord, KeyCount};

/// Hours in a day, one bucket each.
pub const HOURS: u32 = 24;
/// Keywords retained per hour bucket.
pub const TOP_PER_HOUR: usize = 10;

/// Which clock turns a unix timestamp into an hour of day.
#[derive(Debug, Clone, Copy)]
pub enum HourClock {
    /// The process's local time zone
    Local,
    /// A fixed UTC offset (e.g. +08:00 for Beijing time)
    Fixed(FixedOffset),
}

impl HourClock {
    /// Clock for a whole-hour UTC offset.
    pub fn from_offset_hours(hours: i32) -> Result<Self> {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("UTC offset out of range: {hours}"))?;
        Ok(Self::Fixed(offset))
    }

    /// The current time on this clock.
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Local => Local::now().fixed_offset(),
            Self::Fixed(offset) => Utc::now().with_timezone(offset),
        }
    }

    /// Hour of day (0-23) for a unix timestamp.
    pub fn hour_of(&self, timestamp: i64) -> Result<u32> {
        let utc = DateTime::from_timestamp(timestamp, 0)
            .with_context(|| format!("timestamp out of range: {timestamp}"))?;
        Ok(match self {
            Self::Local => utc.with_timezone(&Local).hour(),
            Self::Fixed(offset) => utc.with_timezone(offset).hour(),
        })
    }
}

/// The time-distribution map/reduce job. Reduction is a plain sum.
#[derive(Debug, Clone)]
pub struct TimeBucketJob {
    clock: HourClock,
}

impl TimeBucketJob {
    pub fn new(clock: HourClock) -> Self {
        Self { clock }
    }
}

impl Job for TimeBucketJob {
    fn name(&self) -> &'static str {
        "time"
    }

    fn map(&self, line: &str, emit: &mut dyn FnMut(String, u64)) -> Result<()> {
        if HistoryRecord::is_comment(line) {
            return Ok(());
        }
        let record = HistoryRecord::parse(line)?;
        let hour = self.clock.hour_of(record.timestamp)?;

        for token in record.title.split_whitespace() {
            if token.chars().count() >= 2 && !token.contains(',') {
                emit(format!("{hour:02},{token}"), 1);
            }
        }
        Ok(())
    }
}

/// A keyword and its count within one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourKeyword {
    pub word: String,
    pub count: u64,
}

/// One hour's slice of the distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub hour: u32,
    /// Distinct keywords seen in this hour
    pub hot_word_count: u64,
    /// Sum of all keyword counts in this hour
    pub total_heat: u64,
    /// Highest-count keywords, at most `TOP_PER_HOUR`
    pub top_keywords: Vec<HourKeyword>,
}

impl TimeBucket {
    fn empty(hour: u32) -> Self {
        Self {
            hour,
            hot_word_count: 0,
            total_heat: 0,
            top_keywords: Vec::new(),
        }
    }

    /// Two-digit label, `"00"`..`"23"`.
    pub fn label(&self) -> String {
        format!("{:02}", self.hour)
    }
}

/// All 24 hour buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeDistribution {
    pub buckets: Vec<TimeBucket>,
}

impl TimeDistribution {
    /// Fold reduced `HH,token` counts into hour buckets.
    ///
    /// Rows with an unparseable key or an hour outside 0-23 are skipped.
    pub fn from_rows(rows: &[KeyCount]) -> Self {
        let mut buckets: Vec<TimeBucket> = (0..HOURS).map(TimeBucket::empty).collect();

        for row in rows {
            let Ok((hour, word)) = split_hour_key(&row.key) else {
                continue;
            };
            let bucket = &mut buckets[hour as usize];
            bucket.hot_word_count += 1;
            bucket.total_heat += row.count;
            bucket.top_keywords.push(HourKeyword {
                word: word.to_string(),
                count: row.count,
            });
        }

        for bucket in &mut buckets {
            bucket.top_keywords.sort_by(|a, b| b.count.cmp(&a.count));
            bucket.top_keywords.truncate(TOP_PER_HOUR);
        }

        Self { buckets }
    }

    /// Bucket for an hour of day.
    pub fn hour(&self, hour: u32) -> Option<&TimeBucket> {
        self.buckets.get(hour as usize)
    }
}

fn split_hour_key(key: &str) -> Result<(u32, &str)> {
    let (hour, word) = key.split_once(',').context("missing ',' in hour key")?;
    let hour: u32 = hour.parse().context("hour is not an integer")?;
    if hour >= HOURS || word.is_empty() {
        bail!("invalid hour key {key:?}");
    }
    Ok((hour, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> HourClock {
        HourClock::from_offset_hours(8).unwrap()
    }

    #[test]
    fn oversized_offset_is_rejected_not_wrapped() {
        assert!(HourClock::from_offset_hours(25).is_err());
        assert!(HourClock::from_offset_hours(1_193_047).is_err());
        assert!(HourClock::from_offset_hours(i32::MIN).is_err());
        assert!(HourClock::from_offset_hours(-12).is_ok());
    }

    #[test]
    fn hour_uses_configured_offset() {
        // 2023-11-14T22:13:20Z
        let ts = 1_700_000_000;
        assert_eq!(HourClock::from_offset_hours(0).unwrap().hour_of(ts).unwrap(), 22);
        assert_eq!(beijing().hour_of(ts).unwrap(), 6);
    }

    #[test]
    fn map_emits_zero_padded_hour_keys() {
        let job = TimeBucketJob::new(beijing());
        let mut out = Vec::new();
        job.map("1700000000,1,青州 地震 震", &mut |k, v| out.push((k, v)))
            .unwrap();
        assert_eq!(
            out,
            vec![("06,青州".to_string(), 1), ("06,地震".to_string(), 1)]
        );
    }

    #[test]
    fn comments_emit_nothing_and_garbage_errors() {
        let job = TimeBucketJob::new(beijing());
        let mut sink = |_: String, _: u64| panic!("nothing should be emitted");
        assert!(job.map("# 采集时间: 2023-11-15 06:13:20", &mut sink).is_ok());
        assert!(job.map("soon,1,地震", &mut sink).is_err());
        assert!(job.map("1700000000,地震", &mut sink).is_err());
    }

    #[test]
    fn distribution_has_all_hours() {
        let rows = vec![
            KeyCount { key: "09,地震".into(), count: 2 },
            KeyCount { key: "09,救援".into(), count: 1 },
            KeyCount { key: "14,台风".into(), count: 4 },
            KeyCount { key: "25,台风".into(), count: 4 },
            KeyCount { key: "nonsense".into(), count: 4 },
        ];
        let dist = TimeDistribution::from_rows(&rows);
        assert_eq!(dist.buckets.len(), 24);

        let nine = dist.hour(9).unwrap();
        assert_eq!(nine.label(), "09");
        assert_eq!(nine.hot_word_count, 2);
        assert_eq!(nine.total_heat, 3);
        assert_eq!(nine.top_keywords[0].word, "地震");

        assert_eq!(dist.hour(14).unwrap().total_heat, 4);
        assert_eq!(dist.hour(0).unwrap().total_heat, 0);
    }

    #[test]
    fn top_keywords_capped_per_hour() {
        let rows: Vec<KeyCount> = (0..15)
            .map(|i| KeyCount {
                key: format!("03,词{i:02}"),
                count: i,
            })
            .collect();
        let dist = TimeDistribution::from_rows(&rows);
        let three = dist.hour(3).unwrap();
        assert_eq!(three.hot_word_count, 15);
        assert_eq!(three.top_keywords.len(), TOP_PER_HOUR);
        assert_eq!(three.top_keywords[0].count, 14);
    }
}
