//! 管理端数据结构

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserItem {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserCreate {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSolveModelItem {
    pub id: i64,
    pub model_id: String,
    pub display_name: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSolveModelCreate {
    pub model_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminSolveModelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// 模型接口配置：解题、知识点识别、语义情境识别三套端点
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUniapiConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url_knowledge: Option<String>,
    #[serde(default)]
    pub token_knowledge: Option<String>,
    #[serde(default)]
    pub model_knowledge: Option<String>,
    #[serde(default)]
    pub base_url_semantic: Option<String>,
    #[serde(default)]
    pub token_semantic: Option<String>,
    #[serde(default)]
    pub model_semantic: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUniapiConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url_knowledge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_knowledge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_knowledge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url_semantic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_semantic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_semantic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecordItem {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecordDetailItem {
    #[serde(flatten)]
    pub item: AdminRecordItem,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub knowledge_points: Vec<String>,
    #[serde(default)]
    pub semantic_contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminFavoriteItem {
    pub id: String,
    pub record_id: String,
    pub question: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// 模型连接测试结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "durationMs", default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
}

/// 三个模型端点的连通性
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub solve: Result<AdminTestResult, String>,
    pub knowledge: Result<AdminTestResult, String>,
    pub semantic: Result<AdminTestResult, String>,
}
