//! 解题流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 识别知识点与语义情境（analyze）
//! 2. 带着标签调用解题模型（solve）
//! 3. 保存解题记录（save，失败不影响展示）
//!
//! 三个请求严格串行；同一时间只允许一个流程在跑。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::SolveBackend;
use crate::error::{AppResult, BusinessError};
use crate::models::problem::ResolvedTags;
use crate::models::solve::{fallback_model_options, RecordSaveRequest, SolveModelOption, SolveRequest};
use crate::utils::truncate_text;
use crate::workflow::notice::{Notice, NoticeSender};
use crate::workflow::submission_ctx::SubmissionCtx;
use crate::workflow::transcript::{Stage, StageMessage, Transcript, TranscriptEntry};

/// 识别失败且后端未给出原因时的文案
pub const ANALYZE_FAILED_MSG: &str = "识别知识点与语义情境失败";
/// 解题失败且后端未给出原因时的文案
pub const SOLVE_FAILED_MSG: &str = "解题失败";
/// 解题成功但内容为空
pub const EMPTY_CONTENT_MSG: &str = "未返回解题内容";

/// 用户可见的失败类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveFailure {
    #[error("{0}")]
    AnalyzeFailed(String),
    #[error("{0}")]
    SolveFailed(String),
    #[error("未返回解题内容")]
    EmptyContent,
    /// 不终止流程，只提示
    #[error("{0}")]
    PersistFailed(String),
}

impl SolveFailure {
    /// 终止流程的失败所在阶段
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SolveFailure::AnalyzeFailed(_) => Some(Stage::Analyze),
            SolveFailure::SolveFailed(_) | SolveFailure::EmptyContent => Some(Stage::Solve),
            SolveFailure::PersistFailed(_) => None,
        }
    }
}

/// 一次提交的结果摘要；完整状态见对话记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 题目为空，未发出任何请求
    Rejected,
    /// 已有流程在进行
    Busy,
    Failed {
        stage: Stage,
        failure: SolveFailure,
    },
    Solved {
        entry: Uuid,
        record_id: Option<String>,
    },
}

/// 模型下拉框状态
#[derive(Debug, Clone)]
struct ModelSelection {
    options: Vec<SolveModelOption>,
    selected: Option<String>,
}

/// 标记流程进行中，离开作用域时自动清除
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 解题流程
///
/// - 编排 analyze → solve → save
/// - 维护对话记录，界面只读取快照
/// - 只依赖 [`SolveBackend`]，不关心 HTTP 细节
pub struct SolveFlow {
    backend: Arc<dyn SolveBackend>,
    transcript: RwLock<Transcript>,
    models: RwLock<ModelSelection>,
    busy: AtomicBool,
    /// 补存解题记录时串行化，避免同一条解答被重复保存
    persist_lock: Mutex<()>,
    notices: NoticeSender,
}

impl SolveFlow {
    /// 创建新的解题流程
    pub fn new(backend: Arc<dyn SolveBackend>, notices: NoticeSender) -> Self {
        Self {
            backend,
            transcript: RwLock::new(Transcript::new()),
            models: RwLock::new(ModelSelection {
                options: fallback_model_options(),
                selected: None,
            }),
            busy: AtomicBool::new(false),
            persist_lock: Mutex::new(()),
            notices,
        }
    }

    /// 是否有流程在进行
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// 对话记录快照
    pub fn transcript(&self) -> Transcript {
        self.read_transcript().clone()
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.read_transcript().entries().to_vec()
    }

    // ========== 模型选择 ==========

    pub fn model_options(&self) -> Vec<SolveModelOption> {
        self.read_models().options.clone()
    }

    pub fn selected_model(&self) -> Option<String> {
        self.read_models().selected.clone()
    }

    /// 选中模型的展示名；不在列表中时显示 id
    pub fn selected_model_name(&self) -> String {
        let models = self.read_models();
        match &models.selected {
            Some(id) => models
                .options
                .iter()
                .find(|m| &m.id == id)
                .map(|m| m.display_name.clone())
                .unwrap_or_else(|| id.clone()),
            None => "请选择模型".to_string(),
        }
    }

    /// 选择模型；空字符串表示交给后端默认
    pub fn select_model(&self, id: impl Into<String>) {
        let id = id.into();
        self.write_models().selected = if id.trim().is_empty() { None } else { Some(id) };
    }

    /// 重新拉取模型列表
    ///
    /// 只有成功且非空时才替换；当前选择仍存在则保留，否则选第一个。
    pub async fn refresh_models(&self) {
        let list = match self.backend.solve_models().await {
            Ok(env) if env.is_success() => env.data.unwrap_or_default(),
            Ok(env) => {
                debug!("模型列表返回错误: {}", env.err_msg);
                return;
            }
            Err(e) => {
                debug!("模型列表获取失败: {}", e);
                return;
            }
        };
        let Some(first) = list.first().map(|m| m.id.clone()) else {
            return;
        };

        let mut models = self.write_models();
        let keep = models
            .selected
            .as_ref()
            .is_some_and(|prev| list.iter().any(|m| &m.id == prev));
        if !keep {
            models.selected = Some(first);
        }
        models.options = list;
    }

    // ========== 提交 ==========

    /// 提交题目，驱动完整流程
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let question = question.trim();
        if question.is_empty() {
            self.notify(Notice::info(BusinessError::EmptyQuestion.to_string()));
            return SubmitOutcome::Rejected;
        }

        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!("⚠️ 已有解题流程在进行，忽略本次提交");
            return SubmitOutcome::Busy;
        };

        let ctx = SubmissionCtx::new(question);
        info!("{} 📝 开始解题: {}", ctx, truncate_text(question, 80));
        self.run(&ctx).await
    }

    /// 用出错时记录的原题重新走一遍完整流程
    pub async fn retry(&self, original_question: &str) -> SubmitOutcome {
        info!("🔁 重新尝试解题");
        self.submit(original_question).await
    }

    async fn run(&self, ctx: &SubmissionCtx) -> SubmitOutcome {
        // ========== 阶段 1: 识别 ==========
        {
            let mut t = self.write_transcript();
            t.push(
                ctx.user_entry,
                ctx.submission,
                StageMessage::UserSubmission {
                    text: ctx.question.clone(),
                },
            );
            t.push(ctx.analyze_entry, ctx.submission, StageMessage::AnalyzingPending);
        }

        let tags = match self.analyze(ctx).await {
            Ok(tags) => tags,
            Err(failure) => return self.fail(ctx, ctx.analyze_entry, failure),
        };
        info!(
            "{} ✓ 识别完成: 知识点 {} 个, 语义情境 {} 个",
            ctx,
            tags.knowledge_points.len(),
            tags.contexts.len()
        );

        {
            let mut t = self.write_transcript();
            t.replace(ctx.analyze_entry, StageMessage::TagsResolved { tags: tags.clone() });
            t.push(ctx.solve_entry, ctx.submission, StageMessage::SolvingPending);
        }

        // ========== 阶段 2: 解题 ==========
        let content = match self.solve(ctx, &tags).await {
            Ok(content) => content,
            Err(failure) => return self.fail(ctx, ctx.solve_entry, failure),
        };
        info!("{} ✓ 解题完成，内容 {} 字", ctx, content.chars().count());

        // ========== 阶段 3: 保存（失败不终止） ==========
        let record_id = match self.save(&RecordSaveRequest::from_solution(&ctx.question, &content, &tags)).await {
            Ok(id) => {
                info!("{} ✓ 解题记录已保存: {}", ctx, id);
                self.notify(Notice::success("解题记录已自动保存"));
                Some(id)
            }
            Err(failure) => {
                warn!("{} ⚠️ 解题记录保存失败: {}", ctx, failure);
                self.notify(Notice::error(format!("解题记录保存失败: {}", failure)));
                None
            }
        };

        self.write_transcript().replace(
            ctx.solve_entry,
            StageMessage::SolutionResolved {
                content,
                tags,
                persisted_record_id: record_id.clone(),
            },
        );

        SubmitOutcome::Solved {
            entry: ctx.solve_entry,
            record_id,
        }
    }

    async fn analyze(&self, ctx: &SubmissionCtx) -> Result<ResolvedTags, SolveFailure> {
        info!("{} 🔍 正在识别知识点与语义情境...", ctx);
        match self.backend.analyze(&ctx.question).await {
            Err(e) => Err(SolveFailure::AnalyzeFailed(e.reason())),
            Ok(env) if !env.is_success() => {
                Err(SolveFailure::AnalyzeFailed(env.message_or(ANALYZE_FAILED_MSG)))
            }
            Ok(env) => Ok(ResolvedTags::from(env.data.unwrap_or_default())),
        }
    }

    async fn solve(&self, ctx: &SubmissionCtx, tags: &ResolvedTags) -> Result<String, SolveFailure> {
        let request = SolveRequest::new(ctx.question.clone(), self.selected_model(), tags);
        info!(
            "{} 🧮 正在解题 (模型: {})...",
            ctx,
            request.model.as_deref().unwrap_or("默认")
        );
        match self.backend.solve(&request).await {
            Err(e) => Err(SolveFailure::SolveFailed(e.reason())),
            Ok(env) if !env.is_success() => Err(SolveFailure::SolveFailed(env.message_or(SOLVE_FAILED_MSG))),
            Ok(env) => {
                let content = env.data.map(|d| d.content).unwrap_or_default();
                if content.is_empty() {
                    Err(SolveFailure::EmptyContent)
                } else {
                    Ok(content)
                }
            }
        }
    }

    async fn save(&self, request: &RecordSaveRequest) -> Result<String, SolveFailure> {
        match self.backend.save_record(request).await {
            Err(e) => Err(SolveFailure::PersistFailed(e.reason())),
            Ok(env) if !env.is_success() => Err(SolveFailure::PersistFailed(env.message_or("保存失败"))),
            Ok(env) => env
                .data
                .map(|d| d.id)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| SolveFailure::PersistFailed("未返回记录ID".to_string())),
        }
    }

    /// 把等待中的消息替换为失败消息
    fn fail(&self, ctx: &SubmissionCtx, pending: Uuid, failure: SolveFailure) -> SubmitOutcome {
        let stage = failure.stage().unwrap_or(Stage::Solve);
        let message = failure.to_string();
        error!("{} ❌ {}: {}", ctx, stage.label(), message);

        self.write_transcript().replace(
            pending,
            StageMessage::Failed {
                stage,
                message: message.clone(),
                original_question: ctx.question.clone(),
            },
        );
        self.notify(Notice::error(message));

        SubmitOutcome::Failed { stage, failure }
    }

    // ========== 查看完整解析 ==========

    /// 返回解答对应的记录 id
    ///
    /// 已保存的直接返回；未保存的用本次提交的原题与已有内容单独再保存一次，
    /// 成功后写回对话记录，之后再调用不会重复保存。
    pub async fn view_full_result(&self, entry: Uuid) -> AppResult<String> {
        // 持锁到写回 id 为止，后来的调用会直接读到已保存的 id
        let _persisting = self.persist_lock.lock().await;
        let request = {
            let t = self.read_transcript();
            let found = t.get(entry).ok_or_else(|| BusinessError::EntryNotFound {
                id: entry.to_string(),
            })?;
            let StageMessage::SolutionResolved {
                content,
                tags,
                persisted_record_id,
            } = &found.message
            else {
                return Err(BusinessError::NotASolution {
                    id: entry.to_string(),
                }
                .into());
            };
            if let Some(id) = persisted_record_id {
                return Ok(id.clone());
            }
            let question = t.question_for(found.submission).ok_or_else(|| BusinessError::EntryNotFound {
                id: found.submission.to_string(),
            })?;
            RecordSaveRequest::from_solution(question, content, tags)
        };

        match self.save(&request).await {
            Ok(id) => {
                self.write_transcript().set_record_id(entry, &id);
                self.notify(Notice::success("已保存到解题记录"));
                Ok(id)
            }
            Err(failure) => {
                warn!("⚠️ 补存解题记录失败: {}", failure);
                self.notify(Notice::error("保存失败"));
                Err(BusinessError::SaveFailed {
                    reason: failure.to_string(),
                }
                .into())
            }
        }
    }

    // ========== 辅助方法 ==========

    fn notify(&self, notice: Notice) {
        // 接收端已关闭说明界面已离开，忽略
        let _ = self.notices.send(notice);
    }

    fn read_transcript(&self) -> RwLockReadGuard<'_, Transcript> {
        self.transcript.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_transcript(&self) -> RwLockWriteGuard<'_, Transcript> {
        self.transcript.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_models(&self) -> RwLockReadGuard<'_, ModelSelection> {
        self.models.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_models(&self) -> RwLockWriteGuard<'_, ModelSelection> {
        self.models.write().unwrap_or_else(|e| e.into_inner())
    }
}
