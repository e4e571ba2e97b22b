//! 后端记录 / 收藏 → 展示结构

use crate::models::markdown::split_solution_steps;
use crate::models::problem::{ProblemDetail, ProblemHistory, Tag, TagType};
use crate::models::record::{FavoriteListItem, RecordDetailItem, RecordListItem, RecordTag};

/// 后端标签列表 → 展示标签（序号从 1 开始）
pub fn map_tags(tags: &[RecordTag]) -> Vec<Tag> {
    tags.iter()
        .enumerate()
        .map(|(i, t)| Tag {
            id: i + 1,
            name: t.name.clone(),
            tag_type: TagType::from_backend(&t.tag_type),
        })
        .collect()
}

pub fn map_record_to_history(r: &RecordListItem) -> ProblemHistory {
    ProblemHistory {
        id: r.id.clone(),
        question: r.question.clone(),
        answer_summary: r.answer.clone().unwrap_or_default(),
        tags: map_tags(&r.tags),
        timestamp: r.time.clone(),
        is_favorite: false,
        favorite_time: None,
    }
}

/// 收藏项的 id 取 record_id，便于跳转详情；列表接口不返回记录时间
pub fn map_favorite_to_history(f: &FavoriteListItem) -> ProblemHistory {
    ProblemHistory {
        id: f.record_id.clone(),
        question: f.question.clone(),
        answer_summary: f.answer.clone().unwrap_or_default(),
        tags: map_tags(&f.tags),
        timestamp: String::new(),
        is_favorite: true,
        favorite_time: Some(f.favorite_time.clone()),
    }
}

pub fn map_detail_to_problem_detail(r: &RecordDetailItem) -> ProblemDetail {
    let solution_markdown = r.solution.clone().unwrap_or_default();
    ProblemDetail {
        history: map_record_to_history(&r.item),
        solution_steps: split_solution_steps(&solution_markdown),
        solution_markdown,
        final_answer: r.item.answer.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, tag_type: &str) -> RecordTag {
        RecordTag {
            name: name.to_string(),
            tag_type: tag_type.to_string(),
        }
    }

    fn record() -> RecordListItem {
        RecordListItem {
            id: "rec123".into(),
            question: "1+1=?".into(),
            answer: None,
            time: "2026-01-02 10:00".into(),
            tags: vec![tag("arithmetic", "knowledge"), tag("购物", "semantic")],
        }
    }

    #[test]
    fn record_maps_semantic_tag_to_context() {
        let h = map_record_to_history(&record());
        assert_eq!(h.answer_summary, "");
        assert_eq!(h.tags[1].tag_type, TagType::Context);
        assert_eq!(h.tags[1].id, 2);
        assert!(!h.is_favorite);
    }

    #[test]
    fn favorite_uses_record_id_and_marks_favorite() {
        let f = FavoriteListItem {
            id: "fav9".into(),
            record_id: "rec123".into(),
            question: "q".into(),
            answer: Some("2".into()),
            favorite_time: "2026-01-03".into(),
            tags: vec![],
        };
        let h = map_favorite_to_history(&f);
        assert_eq!(h.id, "rec123");
        assert!(h.is_favorite);
        assert_eq!(h.timestamp, "");
        assert_eq!(h.favorite_time.as_deref(), Some("2026-01-03"));
    }

    #[test]
    fn detail_splits_steps_and_keeps_markdown() {
        let d = RecordDetailItem {
            item: RecordListItem {
                answer: Some("2".into()),
                ..record()
            },
            solution: Some("先算\n\n再答".into()),
        };
        let detail = map_detail_to_problem_detail(&d);
        assert_eq!(detail.solution_steps, vec!["先算", "再答"]);
        assert_eq!(detail.solution_markdown, "先算\n\n再答");
        assert_eq!(detail.final_answer, "2");
    }

    #[test]
    fn detail_without_solution_has_one_empty_step() {
        let d = RecordDetailItem {
            item: record(),
            solution: None,
        };
        let detail = map_detail_to_problem_detail(&d);
        assert_eq!(detail.solution_steps, vec![String::new()]);
    }
}
