//! 解题记录接口

use tracing::debug;

use crate::api::client::{ApiClient, Auth};
use crate::api::envelope::ApiEnvelope;
use crate::error::AppResult;
use crate::models::record::{ListQuery, RecordDetailItem, RecordListItem, RecordStats};
use crate::models::solve::{CreatedId, RecordSaveRequest};

impl ApiClient {
    /// 解题总数与学习天数
    pub async fn records_stats(&self) -> AppResult<ApiEnvelope<RecordStats>> {
        self.get(Auth::User, "/records/stats", Vec::new()).await
    }

    pub async fn records_list(&self, query: &ListQuery) -> AppResult<ApiEnvelope<Vec<RecordListItem>>> {
        self.get(Auth::User, "/records/list", self.list_query(query)).await
    }

    pub async fn record_detail(&self, id: &str) -> AppResult<ApiEnvelope<RecordDetailItem>> {
        self.get(Auth::User, "/records/detail", vec![("id", id.to_string())])
            .await
    }

    pub async fn record_save(&self, request: &RecordSaveRequest) -> AppResult<ApiEnvelope<CreatedId>> {
        debug!("保存记录 Payload: question={}", request.question);
        self.post(Auth::User, "/records/save", request).await
    }

    pub async fn record_remove(&self, id: &str) -> AppResult<ApiEnvelope<serde_json::Value>> {
        self.delete(Auth::User, "/records/remove", vec![("id", id.to_string())])
            .await
    }
}
