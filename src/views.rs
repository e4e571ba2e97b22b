//! 终端展示
//!
//! 只把状态渲染成文本，不发请求也不修改状态。

use std::fmt::Write;

use crate::models::auth::AuthUser;
use crate::models::markdown::markdown_to_plain_text;
use crate::models::problem::{ProblemDetail, ProblemHistory, ResolvedTags, TagType};
use crate::models::record::RecordStats;
use crate::models::solve::SolveModelOption;
use crate::workflow::notice::{Notice, NoticeLevel};
use crate::workflow::transcript::{StageMessage, Transcript, TranscriptEntry};

const RULE: &str = "────────────────────────────────────────";

/// 渲染单条对话消息
///
/// `solution_no` 为解答序号（从 1 开始），用于 `:view N`。
pub fn render_entry(entry: &TranscriptEntry, model_name: &str, solution_no: Option<usize>) -> String {
    match &entry.message {
        StageMessage::UserSubmission { text } => format!("👤 {}", text),
        StageMessage::AnalyzingPending => "⏳ 正在识别知识点与语义情境...".to_string(),
        StageMessage::TagsResolved { tags } => render_tags(tags),
        StageMessage::SolvingPending => format!("⏳ {} 正在解题...", model_name),
        StageMessage::Failed { stage, message, .. } => {
            format!("❌ {}\n   {}\n   输入 :retry 重新尝试", stage.label(), message)
        }
        StageMessage::SolutionResolved {
            content,
            persisted_record_id,
            ..
        } => {
            let mut out = String::new();
            let no = solution_no.map(|n| format!(" #{}", n)).unwrap_or_default();
            let _ = writeln!(out, "📘 解答{}", no);
            let _ = writeln!(out, "{}", RULE);
            let _ = writeln!(out, "{}", markdown_to_plain_text(content));
            let _ = writeln!(out, "{}", RULE);
            match persisted_record_id {
                Some(id) => {
                    let _ = write!(out, "已保存 (记录 {})", id);
                }
                None => {
                    let _ = write!(out, "未保存，输入 :view{} 查看完整解析", no.replace(" #", " "));
                }
            }
            out
        }
    }
}

/// 识别结果块
pub fn render_tags(tags: &ResolvedTags) -> String {
    if tags.is_empty() {
        return "🏷️ 未识别到知识点或语义情境".to_string();
    }
    let mut lines = vec!["🏷️ 识别结果".to_string()];
    if !tags.knowledge_points.is_empty() {
        lines.push(format!("   {}：{}", TagType::Knowledge.label(), tags.knowledge_points.join("、")));
    }
    if !tags.contexts.is_empty() {
        lines.push(format!("   {}：{}", TagType::Context.label(), tags.contexts.join("、")));
    }
    lines.join("\n")
}

/// 渲染整段对话
pub fn render_transcript(transcript: &Transcript, model_name: &str) -> String {
    let mut solution_no = 0;
    transcript
        .entries()
        .iter()
        .map(|entry| {
            let no = match entry.message {
                StageMessage::SolutionResolved { .. } => {
                    solution_no += 1;
                    Some(solution_no)
                }
                _ => None,
            };
            render_entry(entry, model_name, no)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 模型列表，当前选中项带 `*`
pub fn render_model_list(options: &[SolveModelOption], selected: Option<&str>) -> String {
    if options.is_empty() {
        return "暂无可用模型".to_string();
    }
    options
        .iter()
        .map(|m| {
            let mark = if selected == Some(m.id.as_str()) { "*" } else { " " };
            format!("{} {:<20} {}", mark, m.id, m.display_name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 历史记录或收藏列表
pub fn render_history_list(items: &[ProblemHistory], total: Option<u64>) -> String {
    if items.is_empty() {
        return "暂无记录".to_string();
    }
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let star = if item.is_favorite { "★" } else { " " };
        let when = item.favorite_time.as_deref().unwrap_or(&item.timestamp);
        let _ = writeln!(out, "{}. {} [{}] {}", i + 1, star, item.id, first_line(&item.question));
        if !when.is_empty() {
            let _ = writeln!(out, "     时间：{}", when);
        }
        let names: Vec<&str> = item.tags.iter().map(|t| t.name.as_str()).collect();
        if !names.is_empty() {
            let _ = writeln!(out, "     标签：{}", names.join("、"));
        }
        if !item.answer_summary.is_empty() {
            let _ = writeln!(out, "     答案：{}", first_line(&item.answer_summary));
        }
    }
    if let Some(total) = total {
        let _ = write!(out, "共 {} 条", total);
    }
    out.trim_end().to_string()
}

/// 解题详情页
pub fn render_problem_detail(detail: &ProblemDetail) -> String {
    let h = &detail.history;
    let mut out = String::new();
    let _ = writeln!(out, "📄 题目 [{}]", h.id);
    let _ = writeln!(out, "{}", h.question);
    if !h.timestamp.is_empty() {
        let _ = writeln!(out, "时间：{}", h.timestamp);
    }

    for tag_type in [TagType::Knowledge, TagType::Context] {
        let names: Vec<&str> = h.tags_of(tag_type).map(|t| t.name.as_str()).collect();
        if !names.is_empty() {
            let _ = writeln!(out, "{}：{}", tag_type.label(), names.join("、"));
        }
    }

    let _ = writeln!(out, "{}", RULE);
    for (i, step) in detail.solution_steps.iter().enumerate() {
        let _ = writeln!(out, "步骤 {}", i + 1);
        let _ = writeln!(out, "{}", markdown_to_plain_text(step));
        let _ = writeln!(out);
    }
    if !detail.final_answer.is_empty() {
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "答案：{}", markdown_to_plain_text(&detail.final_answer));
    }
    out.trim_end().to_string()
}

/// 个人资料卡片
pub fn render_profile(user: &AuthUser, avatar_url: &str, stats: Option<&RecordStats>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "👤 {} (@{})", user.display_name(), user.username);
    let _ = writeln!(out, "   ID：{}", user.id);
    if !avatar_url.is_empty() {
        let _ = writeln!(out, "   头像：{}", avatar_url);
    }
    if let Some(s) = stats {
        let _ = writeln!(out, "   解题总数：{}", s.total);
        let _ = writeln!(out, "   学习天数：{}", s.days_of_learning);
    }
    out.trim_end().to_string()
}

pub fn render_notice(notice: &Notice) -> String {
    let icon = match notice.level {
        NoticeLevel::Info => "ℹ️",
        NoticeLevel::Success => "✅",
        NoticeLevel::Error => "❌",
    };
    format!("{} {}", icon, notice.text)
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
