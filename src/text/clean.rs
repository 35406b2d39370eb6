// Title cleaning.
//
// Removes hot-search noise (topic markers, mentions, links, entities,
// bracketed asides) and turns every remaining symbol into a space so the
// tagger can't glue words across punctuation.

use anyhow::{Context, Result};
use regex_lite::Regex;

const NOISE_PATTERN: &str = concat!(
    r"#[^#]+#",
    r"|@[\x{4E00}-\x{9FFF}A-Za-z0-9_-]+",
    r"|https?://\S+",
    r"|&[A-Za-z0-9#]+;",
    r"|转发微博",
    r"|\[[^\]]*\]",
    r"|\([^)]*\)",
    r"|（[^）]*）",
);

const NON_WORD_PATTERN: &str = r"[^\x{4E00}-\x{9FFF}A-Za-z0-9]+";

/// Compiled cleaning patterns. Build once and share.
#[derive(Debug, Clone)]
pub struct TitleCleaner {
    noise: Regex,
    non_word: Regex,
}

impl TitleCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            noise: Regex::new(NOISE_PATTERN).context("Invalid title noise pattern")?,
            non_word: Regex::new(NON_WORD_PATTERN).context("Invalid non-word pattern")?,
        })
    }

    /// Clean a raw title down to CJK ideographs, ASCII letters and digits
    /// separated by single spaces.
    pub fn clean(&self, title: &str) -> String {
        if title.is_empty() {
            return String::new();
        }
        let without_noise = self.noise.replace_all(title, " ");
        let spaced = self.non_word.replace_all(&without_noise, " ");
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(s: &str) -> String {
        TitleCleaner::new().unwrap().clean(s)
    }

    #[test]
    fn strips_topic_markers_and_mentions() {
        assert_eq!(clean("#青州地震# @新闻频道 现场画面"), "现场画面");
    }

    #[test]
    fn strips_urls_and_entities() {
        assert_eq!(clean("小米发布会 https://t.cn/abc123 &amp; 直播"), "小米发布会 直播");
    }

    #[test]
    fn strips_bracketed_asides() {
        assert_eq!(clean("王一博[心]新剧（附视频）开播(官方)"), "王一博 新剧 开播");
    }

    #[test]
    fn punctuation_becomes_space() {
        assert_eq!(clean("AI，改变世界！2025"), "AI 改变世界 2025");
        assert_eq!(clean("   "), "");
    }

    #[test]
    fn strips_repost_boilerplate() {
        assert_eq!(clean("转发微博 台风登陆"), "台风登陆");
    }
}
