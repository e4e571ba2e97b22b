//! 解题流程依赖的后端能力

use async_trait::async_trait;

use crate::api::envelope::ApiEnvelope;
use crate::error::AppResult;
use crate::models::solve::{
    AnalyzeResultData, CreatedId, RecordSaveRequest, SolveModelOption, SolveRequest, SolveResultData,
};

/// 解题后端
///
/// `Err` 表示传输层失败（网络错误、非 2xx）；`Ok` 中的信封仍可能带
/// `errCode != 0` 的业务错误，调用方需要分别处理。
#[async_trait]
pub trait SolveBackend: Send + Sync {
    /// 识别知识点与语义情境
    async fn analyze(&self, question: &str) -> AppResult<ApiEnvelope<AnalyzeResultData>>;

    /// 解题
    async fn solve(&self, request: &SolveRequest) -> AppResult<ApiEnvelope<SolveResultData>>;

    /// 保存解题记录
    async fn save_record(&self, request: &RecordSaveRequest) -> AppResult<ApiEnvelope<CreatedId>>;

    /// 可选的解题模型
    async fn solve_models(&self) -> AppResult<ApiEnvelope<Vec<SolveModelOption>>>;
}
