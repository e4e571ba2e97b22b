//! 一次提交的上下文
//!
//! 提交开始时一次性生成本次提交用到的全部消息 id。

use std::fmt::Display;

use uuid::Uuid;

/// 单次提交上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 去掉首尾空白后的题目
    pub question: String,
    /// 提交 id
    pub submission: Uuid,
    /// 用户消息
    pub user_entry: Uuid,
    /// 识别阶段消息（等待 → 标签 / 失败）
    pub analyze_entry: Uuid,
    /// 解题阶段消息（等待 → 解答 / 失败）
    pub solve_entry: Uuid,
}

impl SubmissionCtx {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            submission: Uuid::new_v4(),
            user_entry: Uuid::new_v4(),
            analyze_entry: Uuid::new_v4(),
            solve_entry: Uuid::new_v4(),
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = self.submission.simple().to_string();
        write!(f, "[提交 #{}]", &short[..8])
    }
}
