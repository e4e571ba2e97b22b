//! 解题相关接口的请求与响应结构

use serde::{Deserialize, Serialize};

use crate::models::problem::ResolvedTags;

/// 可选的解题模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveModelOption {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl SolveModelOption {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// 后端尚未返回模型列表时使用的默认选项
pub fn fallback_model_options() -> Vec<SolveModelOption> {
    vec![
        SolveModelOption::new("gpt-5.2", "GPT-5.2"),
        SolveModelOption::new("gpt-4o", "GPT-4o"),
        SolveModelOption::new("deepseek-v3", "DeepSeek-V3"),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub question: String,
}

/// 知识点与语义情境识别结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeResultData {
    pub knowledge_points: Vec<String>,
    pub semantic_contexts: Vec<String>,
}

/// 解题请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub knowledge_points: Vec<String>,
    pub semantic_contexts: Vec<String>,
}

impl SolveRequest {
    pub fn new(question: impl Into<String>, model: Option<String>, tags: &ResolvedTags) -> Self {
        Self {
            question: question.into(),
            model,
            knowledge_points: tags.knowledge_points.clone(),
            semantic_contexts: tags.contexts.clone(),
        }
    }
}

/// 解题结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveResultData {
    pub content: String,
    pub knowledge_points: Vec<String>,
    pub semantic_contexts: Vec<String>,
}

/// 保存解题记录请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSaveRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub knowledge_points: Vec<String>,
    pub semantic_contexts: Vec<String>,
}

/// 记录摘要最多保留的字符数
pub const ANSWER_SUMMARY_CHARS: usize = 500;

impl RecordSaveRequest {
    /// 由解题内容构造：answer 取前 500 个字符，solution 为全文
    pub fn from_solution(question: impl Into<String>, content: &str, tags: &ResolvedTags) -> Self {
        Self {
            question: question.into(),
            answer: Some(content.chars().take(ANSWER_SUMMARY_CHARS).collect()),
            solution: Some(content.to_string()),
            knowledge_points: tags.knowledge_points.clone(),
            semantic_contexts: tags.contexts.clone(),
        }
    }
}

/// 只含 id 的返回数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn solve_request_omits_missing_model() {
        let tags = ResolvedTags::new(vec!["概率".into()], vec![]);
        let body = serde_json::to_value(SolveRequest::new("掷骰子", None, &tags)).unwrap();
        assert_eq!(
            body,
            json!({"question": "掷骰子", "knowledge_points": ["概率"], "semantic_contexts": []})
        );
    }

    #[test]
    fn save_request_truncates_answer_by_chars() {
        let content = "解".repeat(600);
        let req = RecordSaveRequest::from_solution("q", &content, &ResolvedTags::default());
        assert_eq!(req.answer.as_ref().unwrap().chars().count(), 500);
        assert_eq!(req.solution.as_deref(), Some(content.as_str()));
    }

    #[test]
    fn analyze_data_defaults_missing_lists() {
        let data: AnalyzeResultData = serde_json::from_value(json!({})).unwrap();
        assert!(data.knowledge_points.is_empty());
        assert!(data.semantic_contexts.is_empty());
    }

    #[test]
    fn model_option_reads_name_field() {
        let opt: SolveModelOption = serde_json::from_value(json!({"id": "gpt-4o", "name": "GPT-4o"})).unwrap();
        assert_eq!(opt.display_name, "GPT-4o");
    }
}
