//! 解题记录与收藏的后端数据结构

use serde::{Deserialize, Serialize};

/// 后端返回的标签，`type` 为 `knowledge` 或 `semantic`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTag {
    pub name: String,
    #[serde(rename = "type", default)]
    pub tag_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordListItem {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub tags: Vec<RecordTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDetailItem {
    #[serde(flatten)]
    pub item: RecordListItem,
    #[serde(default)]
    pub solution: Option<String>,
}

/// 个人统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStats {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "daysOfLearning", default)]
    pub days_of_learning: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteListItem {
    pub id: String,
    pub record_id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(rename = "favoriteTime", default)]
    pub favorite_time: String,
    #[serde(default)]
    pub tags: Vec<RecordTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCheck {
    pub is_favorited: bool,
    #[serde(default)]
    pub favorite_id: Option<String>,
}

/// 列表查询参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
    pub category: Option<String>,
    /// 仅管理员接口使用
    pub user_id: Option<String>,
}

impl ListQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }
}
