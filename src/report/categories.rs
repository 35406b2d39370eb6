// Rule-based topic categories for the top keywords.
//
// A keyword is matched against each category's word list: exact match
// first, then "contains a listed word", then a few brand/term fallbacks.
// Anything left over counts as Other.

use serde::Serialize;

/// Hot-list topic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Entertainment,
    Society,
    Technology,
    Sports,
    Finance,
    Other,
}

impl Category {
    /// Display label (the dashboard's Chinese name).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Entertainment => "娱乐",
            Self::Society => "社会",
            Self::Technology => "科技",
            Self::Sports => "体育",
            Self::Finance => "财经",
            Self::Other => "其他",
        }
    }

    pub const ALL: [Category; 6] = [
        Self::Entertainment,
        Self::Society,
        Self::Technology,
        Self::Sports,
        Self::Finance,
        Self::Other,
    ];
}

const RULES: &[(Category, &[&str])] = &[
    (
        Category::Entertainment,
        &[
            "明星", "电影", "电视剧", "综艺", "演唱会", "演员", "歌手", "爱豆", "流量", "红毯",
            "偶像", "剧", "影视", "音乐", "艺人", "剧组", "首映", "颁奖礼", "节目", "导演",
            "编剧", "制片人", "发布会", "电影节", "颁奖典礼", "新剧", "开播", "收官", "收视率",
            "口碑", "影评", "剧评", "卫视", "直播", "写真", "婚纱", "求婚", "格莱美",
        ],
    ),
    (
        Category::Society,
        &[
            "事故", "救援", "事件", "社会", "民生", "交通", "安全", "公益", "环保", "火灾",
            "爆炸", "车祸", "疫情", "防控", "政策", "法规", "教育", "医疗", "地震", "洪水",
            "养老", "就业", "社保", "住房", "慈善", "志愿者", "争议", "确诊", "孩子", "父母",
            "道歉", "农村", "摆摊", "演习", "解放军", "台风", "暴雨",
        ],
    ),
    (
        Category::Technology,
        &[
            "AI", "人工智能", "科技", "互联网", "手机", "电脑", "技术", "算法", "芯片", "软件",
            "APP", "5G", "大数据", "云计算", "区块链", "元宇宙", "自动驾驶", "机器人", "网络",
            "创新", "数码", "智能", "VR", "AR", "半导体", "编程", "开发", "应用", "数字",
        ],
    ),
    (
        Category::Sports,
        &[
            "比赛", "冠军", "球员", "球队", "奥运会", "世界杯", "体育", "赛事", "足球", "篮球",
            "排球", "网球", "乒乓球", "羽毛球", "田径", "游泳", "比分", "运动员", "亚军", "季军",
            "金牌", "银牌", "铜牌", "进球", "得分", "欧洲杯", "亚洲杯", "亚运会", "世锦赛",
            "公开赛",
        ],
    ),
    (
        Category::Finance,
        &[
            "股市", "经济", "金融", "投资", "理财", "企业", "市场", "股票", "基金", "汇率",
            "利率", "GDP", "CPI", "上市", "破产", "保险", "银行", "PPI", "退市", "并购",
            "重组", "融资", "贷款", "债券", "期货", "外汇", "黄金", "原油", "增值税", "金价",
            "票房",
        ],
    ),
];

/// Brand names that mark a keyword as technology when no rule matched.
const TECH_BRANDS: &[&str] = &["小米", "苹果", "华为", "三星", "谷歌", "微软", "阿里", "腾讯", "百度"];

/// Categorize one keyword.
pub fn categorize(word: &str) -> Category {
    if let Some((cat, _)) = RULES.iter().find(|(_, words)| words.contains(&word)) {
        return *cat;
    }
    if let Some((cat, _)) = RULES
        .iter()
        .find(|(_, words)| words.iter().any(|w| word.contains(w)))
    {
        return *cat;
    }
    if TECH_BRANDS.iter().any(|b| word.contains(b)) {
        return Category::Technology;
    }
    Category::Other
}

/// Count of keywords per category, in `Category::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub counts: Vec<(Category, usize)>,
}

impl CategoryTally {
    pub fn from_words<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: Vec<(Category, usize)> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        for word in words {
            let cat = categorize(word);
            if let Some(slot) = counts.iter_mut().find(|(c, _)| *c == cat) {
                slot.1 += 1;
            }
        }
        Self { counts }
    }

    pub fn get(&self, category: Category) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}
