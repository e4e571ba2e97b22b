//! 解题对话记录
//!
//! 只追加的消息序列。等待中的消息在请求完成后按 id 原地替换，
//! 条目 id 保持不变，不会出现重复的等待消息。

use serde::Serialize;
use uuid::Uuid;

use crate::models::problem::ResolvedTags;

/// 出错阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// 识别知识点与语义情境
    Analyze,
    /// 解题
    Solve,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Analyze => "识别阶段出错",
            Stage::Solve => "解题阶段出错",
        }
    }
}

/// 对话中的一条阶段消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StageMessage {
    /// 用户提交的原始题目
    UserSubmission { text: String },
    /// 正在识别
    AnalyzingPending,
    /// 识别结果，两个列表都可能为空
    TagsResolved { tags: ResolvedTags },
    /// 正在解题
    SolvingPending,
    /// 解答；保存成功时带记录 id
    SolutionResolved {
        content: String,
        tags: ResolvedTags,
        persisted_record_id: Option<String>,
    },
    /// 本次提交失败，保留原题以便重试
    Failed {
        stage: Stage,
        message: String,
        original_question: String,
    },
}

impl StageMessage {
    pub fn is_pending(&self) -> bool {
        matches!(self, StageMessage::AnalyzingPending | StageMessage::SolvingPending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    /// 所属提交，同一次提交的消息共享
    pub submission: Uuid,
    pub message: StageMessage,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn get(&self, id: Uuid) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn push(&mut self, id: Uuid, submission: Uuid, message: StageMessage) {
        self.entries.push(TranscriptEntry {
            id,
            submission,
            message,
        });
    }

    /// 按 id 原地替换消息；找不到时返回 false
    pub fn replace(&mut self, id: Uuid, message: StageMessage) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.message = message;
                true
            }
            None => false,
        }
    }

    /// 为尚未保存的解答写入记录 id；已有 id 时不覆盖
    pub fn set_record_id(&mut self, id: Uuid, record_id: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        match &mut entry.message {
            StageMessage::SolutionResolved {
                persisted_record_id,
                ..
            } if persisted_record_id.is_none() => {
                *persisted_record_id = Some(record_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// 某次提交的原始题目
    pub fn question_for(&self, submission: Uuid) -> Option<&str> {
        self.entries
            .iter()
            .filter(|e| e.submission == submission)
            .find_map(|e| match &e.message {
                StageMessage::UserSubmission { text } => Some(text.as_str()),
                _ => None,
            })
    }

    /// 第 n 个解答（从 1 开始），供界面按序号引用
    pub fn nth_solution(&self, n: usize) -> Option<&TranscriptEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.message, StageMessage::SolutionResolved { .. }))
            .nth(n.checked_sub(1)?)
    }

    /// 最近一次失败的原题
    pub fn last_failed_question(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|e| match &e.message {
            StageMessage::Failed {
                original_question, ..
            } => Some(original_question.as_str()),
            _ => None,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.message.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(record: Option<&str>) -> StageMessage {
        StageMessage::SolutionResolved {
            content: "x = 2".into(),
            tags: ResolvedTags::default(),
            persisted_record_id: record.map(str::to_string),
        }
    }

    #[test]
    fn replace_keeps_position_and_id() {
        let mut t = Transcript::new();
        let sub = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        t.push(a, sub, StageMessage::UserSubmission { text: "q".into() });
        t.push(b, sub, StageMessage::AnalyzingPending);
        assert_eq!(t.pending_count(), 1);

        assert!(t.replace(b, StageMessage::TagsResolved { tags: ResolvedTags::default() }));
        assert_eq!(t.len(), 2);
        assert_eq!(t.entries()[1].id, b);
        assert_eq!(t.pending_count(), 0);
        assert!(!t.replace(Uuid::new_v4(), StageMessage::SolvingPending));
    }

    #[test]
    fn set_record_id_only_fills_missing() {
        let mut t = Transcript::new();
        let (sub, id) = (Uuid::new_v4(), Uuid::new_v4());
        t.push(id, sub, solution(None));
        assert!(t.set_record_id(id, "rec1"));
        assert!(!t.set_record_id(id, "rec2"));
        assert_eq!(t.get(id).unwrap().message, solution(Some("rec1")));
    }

    #[test]
    fn question_lookup_is_scoped_to_submission() {
        let mut t = Transcript::new();
        let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());
        t.push(Uuid::new_v4(), s1, StageMessage::UserSubmission { text: "first".into() });
        t.push(Uuid::new_v4(), s2, StageMessage::UserSubmission { text: "second".into() });
        assert_eq!(t.question_for(s2), Some("second"));
        assert_eq!(t.question_for(Uuid::new_v4()), None);
    }

    #[test]
    fn nth_solution_counts_from_one() {
        let mut t = Transcript::new();
        let sub = Uuid::new_v4();
        let first = Uuid::new_v4();
        t.push(first, sub, solution(None));
        t.push(Uuid::new_v4(), sub, StageMessage::SolvingPending);
        assert_eq!(t.nth_solution(1).map(|e| e.id), Some(first));
        assert!(t.nth_solution(0).is_none());
        assert!(t.nth_solution(2).is_none());
    }
}
