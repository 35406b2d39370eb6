// Static word tables used by normalization and filtering.
//
// Everything here is immutable configuration: built once at process start
// (optionally extended from a stopword file) and then shared by reference
// into the pure normalize/filter/phrase functions. Nothing reads these
// tables through a global.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use stop_words::{get, LANGUAGE};
use tracing::info;

/// Common misspellings and internet slang mapped to their canonical form.
/// Keys are lowercase; lookup is case-insensitive.
const VARIANTS: &[(&str, &str)] = &[
    ("爆光", "曝光"),
    ("官宣了", "官宣"),
    ("官宣啦", "官宣"),
    ("预告", "预告片"),
    ("炸了", "炸裂"),
    ("哭了", "哭泣"),
    ("yyds", "永远的神"),
    ("zfb", "支付宝"),
    ("xswl", "笑死我了"),
    ("nsdd", "你说得对"),
    ("nbcs", "没人在乎"),
    ("gkd", "搞快点"),
    ("ssfd", "瑟瑟发抖"),
    ("plgg", "漂亮哥哥"),
    ("wpp", "网友"),
    ("bp", "闭麦"),
    ("blx", "玻璃心"),
    ("cjb", "成绩表"),
    ("dbq", "对不起"),
    ("emmm", "嗯"),
    ("srds", "虽然但是"),
    ("xjj", "小姐姐"),
    ("yysy", "有一说一"),
];

/// Semantic groups: canonical label followed by the surface forms that
/// refer to the same concept.
const SEMANTIC_GROUPS: &[(&str, &[&str])] = &[
    ("火灾事故", &["火灾", "事故", "起火", "失火", "着火"]),
    ("调查报告", &["报告", "调查", "通报", "结果", "结论"]),
    ("展品", &["文物", "藏品", "古董", "艺术品"]),
    ("真假", &["真伪", "伪造", "赝品"]),
    ("怀孕", &["妊娠", "有孕", "有喜", "准妈妈"]),
    ("发声", &["回应", "表态", "说话", "发言"]),
    ("质疑", &["怀疑", "争议"]),
    ("驾车", &["开车", "驾驶"]),
    ("身亡", &["死亡", "去世", "逝世", "丧命"]),
    ("手术", &["开刀", "治疗", "救治"]),
    ("利用漏洞", &["漏洞", "利用", "系统漏洞", "黑客"]),
    ("智力障碍", &["智力", "障碍", "智障", "残疾"]),
    ("博物馆", &["展馆", "美术馆", "博物院"]),
    ("格莱美", &["grammy", "颁奖礼"]),
    ("旗舰", &["高端", "顶级", "豪华"]),
    ("镜头", &["画面", "影像"]),
    ("舞台", &["表演", "演出现场"]),
];

/// Generic or noisy words that never make a useful hot keyword.
const BLACKLIST: &[&str] = &[
    "粉丝", "感动", "预告片", "回收", "产业链", "摔倒", "房型",
    "妹妹", "妹", "妹子", "小妹", "儿子", "女儿", "老公", "老婆",
    "姐姐", "姐", "哥哥", "哥", "妈妈", "妈", "爸爸", "爸",
    "小", "大", "太", "很", "真的", "觉得", "好像", "一个",
    "现场", "视频", "照片", "网友", "热搜", "回应", "最新",
    "爆料", "真相", "原因", "结果", "进展", "后续", "瓜",
    "妹小", "这个", "那个", "什么", "怎么", "如何", "为什么",
    "已经", "开始", "结束", "终于", "可能", "应该", "需要",
    "大家", "有人", "没有", "不是", "就是",
    "但是", "而且", "虽然", "因为", "所以", "如果", "只有",
    "自己", "别人", "事情", "问题", "东西", "时候", "地方",
    "一下", "一点", "一些", "这种", "那样", "怎样",
    "确实", "简直", "居然", "竟然", "总算",
    "看看", "说说", "听听", "问问", "想想", "念念",
    "今天", "昨天", "明天", "今年", "去年", "明年", "以前",
    "以后", "现在", "马上", "立刻", "正在", "曾经",
    "还有", "都是", "总是", "经常", "偶尔",
    "也许", "大概", "似乎", "仿佛", "反正",
    "实在", "果然", "难怪", "怪不得",
    "千万", "一定", "必须",
    "快来", "快去", "快看", "快听", "快说", "快打",
    "来了", "去了", "看了", "听了", "说了", "打了",
    "热搜榜", "热榜", "话题", "超话", "广场",
    "微博", "微博之夜", "微博电影",
    "工作室", "公司", "方面", "消息",
    "第一时间", "最新消息", "刚刚", "官方回应",
    "强烈推荐", "推荐", "来看", "这部", "太好",
    "太好哭", "太好笑", "一起来", "一起来看",
];

/// Words that must never take part in an adjacent-token phrase merge.
const JUNK_COMPONENTS: &[&str] = &["妹", "小", "姐", "哥", "儿子", "女儿", "粉丝", "微博", "热搜"];

/// Kinship and form-of-address markers. Short tokens containing one of
/// these are fragments ("妹小", "姐说"); longer ones are usually names.
const KINSHIP_MARKERS: &[&str] = &[
    "妹", "姐", "哥", "弟", "嫂", "姨", "叔", "舅", "爸", "妈", "爹", "娘",
    "儿子", "女儿", "老公", "老婆",
];

/// The complete set of word tables shared by the text pipeline.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Lowercased surface -> canonical form
    pub variants: HashMap<String, String>,
    /// Lowercased label-or-variant -> canonical group label
    pub semantic: HashMap<String, String>,
    pub blacklist: HashSet<String>,
    pub junk_components: HashSet<String>,
    pub kinship: Vec<String>,
    pub stopwords: HashSet<String>,
}

impl Default for Lexicon {
    /// Built-in tables with an empty stopword set.
    fn default() -> Self {
        let variants = VARIANTS
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();

        let mut semantic = HashMap::new();
        for (label, members) in SEMANTIC_GROUPS {
            semantic
                .entry(label.to_lowercase())
                .or_insert_with(|| label.to_string());
            for member in *members {
                // First group to claim a surface form keeps it
                semantic
                    .entry(member.to_lowercase())
                    .or_insert_with(|| label.to_string());
            }
        }

        Self {
            variants,
            semantic,
            blacklist: BLACKLIST.iter().map(|w| w.to_string()).collect(),
            junk_components: JUNK_COMPONENTS.iter().map(|w| w.to_string()).collect(),
            kinship: KINSHIP_MARKERS.iter().map(|w| w.to_string()).collect(),
            stopwords: HashSet::new(),
        }
    }
}

impl Lexicon {
    /// Add the built-in Chinese stopword list from the `stop-words` crate.
    pub fn with_builtin_stopwords(mut self) -> Self {
        let words: Vec<String> = get(LANGUAGE::Chinese);
        self.stopwords.extend(words.into_iter().map(|w| w.trim().to_string()));
        self.stopwords.remove("");
        self
    }

    /// Add stopwords from a newline-separated file (blank lines ignored).
    ///
    /// A missing file is an error here; callers decide whether the file is
    /// optional before calling.
    pub fn with_stopword_file(mut self, path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stopword file {}", path.display()))?;
        let before = self.stopwords.len();
        self.stopwords.extend(
            text.lines()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string),
        );
        info!(
            path = %path.display(),
            added = self.stopwords.len() - before,
            "Loaded stopword file"
        );
        Ok(self)
    }

    /// Add stopwords from an in-memory list.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords.extend(words.into_iter().map(Into::into));
        self
    }

    /// Whether `word` contains any kinship marker.
    pub fn has_kinship_marker(&self, word: &str) -> bool {
        self.kinship.iter().any(|k| word.contains(k.as_str()))
    }

    /// Whether `word` is blacklisted or a stopword.
    pub fn is_blocked(&self, word: &str) -> bool {
        self.blacklist.contains(word) || self.stopwords.contains(word)
    }

    /// Iterate every surface form the canonicalization tables know about
    /// (variant keys, variant targets, group labels and members).
    pub fn known_forms(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .flat_map(|(k, v)| [k.as_str(), v.as_str()])
            .chain(self.semantic.iter().flat_map(|(k, v)| [k.as_str(), v.as_str()]))
    }
}
