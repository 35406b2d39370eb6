use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::aggregate::frequency::FrequencyParams;
use crate::aggregate::time_bucket::HourClock;
use crate::fetch::weibo::DEFAULT_HOT_API_URL;
use crate::pipeline::stages::DataPaths;
use crate::text::lexicon::Lexicon;

/// Central configuration loaded from environment variables.
///
/// Nothing here is secret; everything has a default. The .env file is
/// loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the snapshot, history/ and the job artifacts
    pub data_dir: PathBuf,
    /// Extra stopwords, one per line
    pub stopwords_path: Option<PathBuf>,
    /// Seed the stopword set with the built-in Chinese list (default true)
    pub builtin_stopwords: bool,
    /// Custom segmentation dictionary (jieba feature only)
    pub user_dict: Option<PathBuf>,
    /// Whole-hour UTC offset for hour bucketing and snapshot names.
    /// Unset means the process's local zone.
    pub utc_offset_hours: Option<i32>,
    pub hot_api_url: String,
    pub inclusion_ratio: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. `load()` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, so `FOO=` in .env doesn't break parsing
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let builtin_stopwords = match get("HOTWORDS_BUILTIN_STOPWORDS").as_deref() {
            Some("0") | Some("false") | Some("no") | Some("off") => false,
            // "true" or unset both keep the built-in list
            _ => true,
        };

        let utc_offset_hours = get("HOTWORDS_UTC_OFFSET")
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .with_context(|| format!("HOTWORDS_UTC_OFFSET must be whole hours, got {v:?}"))
            })
            .transpose()?;

        let inclusion_ratio = match get("HOTWORDS_INCLUSION_RATIO") {
            Some(v) => {
                let ratio: f64 = v
                    .trim()
                    .parse()
                    .with_context(|| format!("HOTWORDS_INCLUSION_RATIO must be a number, got {v:?}"))?;
                if !(0.0..=1.0).contains(&ratio) {
                    anyhow::bail!("HOTWORDS_INCLUSION_RATIO must be between 0 and 1, got {ratio}");
                }
                ratio
            }
            None => FrequencyParams::default().inclusion_ratio,
        };

        Ok(Self {
            data_dir: get("HOTWORDS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            stopwords_path: get("HOTWORDS_STOPWORDS").map(PathBuf::from),
            builtin_stopwords,
            user_dict: get("HOTWORDS_USER_DICT").map(PathBuf::from),
            utc_offset_hours,
            hot_api_url: get("HOTWORDS_HOT_API_URL").unwrap_or_else(|| DEFAULT_HOT_API_URL.to_string()),
            inclusion_ratio,
        })
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
    }

    pub fn clock(&self) -> Result<HourClock> {
        match self.utc_offset_hours {
            Some(hours) => HourClock::from_offset_hours(hours),
            None => Ok(HourClock::Local),
        }
    }

    pub fn frequency_params(&self) -> FrequencyParams {
        FrequencyParams {
            inclusion_ratio: self.inclusion_ratio,
            ..FrequencyParams::default()
        }
    }

    /// The lexicon with this configuration's stopwords applied.
    pub fn lexicon(&self) -> Result<Lexicon> {
        let mut lexicon = Lexicon::default();
        if self.builtin_stopwords {
            lexicon = lexicon.with_builtin_stopwords();
        }
        if let Some(path) = &self.stopwords_path {
            self.require_stopwords()?;
            lexicon = lexicon.with_stopword_file(path)?;
        }
        Ok(lexicon)
    }

    /// Check that the data directory exists.
    /// Call this before any stage that reads existing artifacts.
    pub fn require_data_dir(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            anyhow::bail!(
                "Data directory {} not found. Run `hotwords fetch` first,\n\
                 or point HOTWORDS_DATA_DIR at an existing directory.",
                self.data_dir.display()
            );
        }
        Ok(())
    }

    /// Check that the configured stopword file exists.
    pub fn require_stopwords(&self) -> Result<()> {
        if let Some(path) = &self.stopwords_path {
            if !path.is_file() {
                anyhow::bail!(
                    "HOTWORDS_STOPWORDS points at {}, which does not exist.\n\
                     Fix the path in your .env file or unset it.",
                    path.display()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]).unwrap();
        assert_eq!(c.data_dir, PathBuf::from("./data"));
        assert!(c.builtin_stopwords);
        assert!(c.stopwords_path.is_none());
        assert_eq!(c.hot_api_url, DEFAULT_HOT_API_URL);
        assert_eq!(c.inclusion_ratio, 0.7);
        assert!(matches!(c.clock().unwrap(), HourClock::Local));
    }

    #[test]
    fn overrides_parse() {
        let c = config(&[
            ("HOTWORDS_DATA_DIR", "/srv/hot"),
            ("HOTWORDS_BUILTIN_STOPWORDS", "false"),
            ("HOTWORDS_UTC_OFFSET", "8"),
            ("HOTWORDS_INCLUSION_RATIO", "0.5"),
        ])
        .unwrap();
        assert_eq!(c.paths().raw, PathBuf::from("/srv/hot/news_raw.txt"));
        assert!(!c.builtin_stopwords);
        assert_eq!(c.clock().unwrap().hour_of(1_700_000_000).unwrap(), 6);
        assert_eq!(c.frequency_params().inclusion_ratio, 0.5);
        assert_eq!(c.frequency_params().top_n, 20);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let c = config(&[("HOTWORDS_UTC_OFFSET", ""), ("HOTWORDS_DATA_DIR", " ")]).unwrap();
        assert!(c.utc_offset_hours.is_none());
        assert_eq!(c.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(config(&[("HOTWORDS_UTC_OFFSET", "eight")]).is_err());
        assert!(config(&[("HOTWORDS_INCLUSION_RATIO", "1.5")]).is_err());
        assert!(config(&[("HOTWORDS_UTC_OFFSET", "99")]).unwrap().clock().is_err());
        assert!(config(&[("HOTWORDS_UTC_OFFSET", "1193047")]).unwrap().clock().is_err());
        assert!(config(&[("HOTWORDS_UTC_OFFSET", "-1193047")]).unwrap().clock().is_err());
    }

    #[test]
    fn missing_stopword_file_is_actionable() {
        let c = config(&[("HOTWORDS_STOPWORDS", "/nonexistent/stop.txt")]).unwrap();
        let err = c.lexicon().unwrap_err();
        assert!(err.to_string().contains("HOTWORDS_STOPWORDS"));
    }

    #[test]
    fn stopword_file_extends_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "热议\n\n围观\n").unwrap();

        let c = config(&[
            ("HOTWORDS_STOPWORDS", path.to_str().unwrap()),
            ("HOTWORDS_BUILTIN_STOPWORDS", "false"),
        ])
        .unwrap();
        let lex = c.lexicon().unwrap();
        assert!(lex.is_blocked("热议"));
        assert!(lex.is_blocked("围观"));
    }
}
