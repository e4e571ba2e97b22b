//! 前端展示用的题目类型
//!
//! 后端把语义情境标签称为 `semantic`，展示层统一称为 `context`。
//! 两种叫法只在 [`TagType::from_backend`] 处转换。

use serde::{Deserialize, Serialize};

use crate::models::solve::AnalyzeResultData;

/// 标签类型（展示词汇）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    /// 知识点
    Knowledge,
    /// 语义情境
    Context,
}

impl TagType {
    /// 后端标签类型 → 展示类型
    ///
    /// `"semantic"` 映射为 `Context`，其余一律视为 `Knowledge`。
    pub fn from_backend(raw: &str) -> Self {
        if raw == "semantic" {
            TagType::Context
        } else {
            TagType::Knowledge
        }
    }

    /// 中文名称
    pub fn label(self) -> &'static str {
        match self {
            TagType::Knowledge => "知识点",
            TagType::Context => "语义情境",
        }
    }
}

/// 展示用标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// 列表内序号，从 1 开始
    pub id: usize,
    pub name: String,
    pub tag_type: TagType,
}

/// 一次识别得到的标签
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTags {
    pub knowledge_points: Vec<String>,
    pub contexts: Vec<String>,
}

impl ResolvedTags {
    pub fn new(knowledge_points: Vec<String>, contexts: Vec<String>) -> Self {
        Self {
            knowledge_points,
            contexts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge_points.is_empty() && self.contexts.is_empty()
    }

    /// 展开为带序号的标签列表，知识点在前
    pub fn to_tags(&self) -> Vec<Tag> {
        self.knowledge_points
            .iter()
            .map(|name| (name, TagType::Knowledge))
            .chain(self.contexts.iter().map(|name| (name, TagType::Context)))
            .enumerate()
            .map(|(i, (name, tag_type))| Tag {
                id: i + 1,
                name: name.clone(),
                tag_type,
            })
            .collect()
    }
}

impl From<AnalyzeResultData> for ResolvedTags {
    fn from(data: AnalyzeResultData) -> Self {
        Self {
            knowledge_points: data.knowledge_points,
            contexts: data.semantic_contexts,
        }
    }
}

/// 历史记录 / 收藏列表项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemHistory {
    pub id: String,
    pub question: String,
    pub answer_summary: String,
    pub tags: Vec<Tag>,
    pub timestamp: String,
    pub is_favorite: bool,
    pub favorite_time: Option<String>,
}

impl ProblemHistory {
    pub fn tags_of(&self, tag_type: TagType) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(move |t| t.tag_type == tag_type)
    }
}

/// 解题详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub history: ProblemHistory,
    /// 后端原始解题内容（Markdown/LaTeX）
    pub solution_markdown: String,
    pub solution_steps: Vec<String>,
    pub final_answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_maps_to_context_everything_else_to_knowledge() {
        assert_eq!(TagType::from_backend("semantic"), TagType::Context);
        assert_eq!(TagType::from_backend("knowledge"), TagType::Knowledge);
        assert_eq!(TagType::from_backend(""), TagType::Knowledge);
        assert_eq!(TagType::from_backend("Semantic"), TagType::Knowledge);
    }

    #[test]
    fn resolved_tags_number_from_one_knowledge_first() {
        let tags = ResolvedTags::new(vec!["勾股定理".into()], vec!["几何测量".into(), "行程问题".into()]);
        let list = tags.to_tags();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].id, 1);
        assert_eq!(list[0].tag_type, TagType::Knowledge);
        assert_eq!(list[2].name, "行程问题");
        assert_eq!(list[2].tag_type, TagType::Context);
    }

    #[test]
    fn analyze_data_converts_to_display_vocabulary() {
        let data = AnalyzeResultData {
            knowledge_points: vec!["arithmetic".into()],
            semantic_contexts: vec![],
        };
        let tags = ResolvedTags::from(data);
        assert_eq!(tags.knowledge_points, vec!["arithmetic".to_string()]);
        assert!(tags.contexts.is_empty());
        assert!(!tags.is_empty());
    }
}
