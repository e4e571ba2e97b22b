//! 解题接口：`/solve/analyze`、`/solve`、`/solve/models`

use async_trait::async_trait;
use tracing::debug;

use crate::api::backend::SolveBackend;
use crate::api::client::{ApiClient, Auth};
use crate::api::envelope::ApiEnvelope;
use crate::error::AppResult;
use crate::models::solve::{
    AnalyzeRequest, AnalyzeResultData, CreatedId, RecordSaveRequest, SolveModelOption, SolveRequest,
    SolveResultData,
};
use crate::utils::truncate_text;

impl ApiClient {
    /// 解题模型列表（与管理端“解题模型管理”同一数据源）
    pub async fn solve_models(&self) -> AppResult<ApiEnvelope<Vec<SolveModelOption>>> {
        self.get(Auth::User, "/solve/models", Vec::new()).await
    }

    /// 仅分析题目：识别知识点与语义情境
    pub async fn solve_analyze(&self, question: &str) -> AppResult<ApiEnvelope<AnalyzeResultData>> {
        debug!("识别题目: {}", truncate_text(question, 40));
        let body = AnalyzeRequest {
            question: question.to_string(),
        };
        self.post(Auth::User, "/solve/analyze", &body).await
    }

    /// 解题，可带上已识别的标签避免重复识别
    pub async fn solve(&self, request: &SolveRequest) -> AppResult<ApiEnvelope<SolveResultData>> {
        debug!("解题 Payload: {:?}", request);
        self.post(Auth::User, "/solve", request).await
    }
}

#[async_trait]
impl SolveBackend for ApiClient {
    async fn analyze(&self, question: &str) -> AppResult<ApiEnvelope<AnalyzeResultData>> {
        self.solve_analyze(question).await
    }

    async fn solve(&self, request: &SolveRequest) -> AppResult<ApiEnvelope<SolveResultData>> {
        ApiClient::solve(self, request).await
    }

    async fn save_record(&self, request: &RecordSaveRequest) -> AppResult<ApiEnvelope<CreatedId>> {
        self.record_save(request).await
    }

    async fn solve_models(&self) -> AppResult<ApiEnvelope<Vec<SolveModelOption>>> {
        ApiClient::solve_models(self).await
    }
}
