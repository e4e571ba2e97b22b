//! 收藏接口

use serde_json::json;

use crate::api::client::{ApiClient, Auth};
use crate::api::envelope::ApiEnvelope;
use crate::error::AppResult;
use crate::models::record::{FavoriteCheck, FavoriteListItem, ListQuery};
use crate::models::solve::CreatedId;

impl ApiClient {
    pub async fn favorites_list(&self, query: &ListQuery) -> AppResult<ApiEnvelope<Vec<FavoriteListItem>>> {
        let query = ListQuery {
            category: None,
            user_id: None,
            ..query.clone()
        };
        self.get(Auth::User, "/favorites/list", self.list_query(&query))
            .await
    }

    pub async fn favorite_add(&self, record_id: &str) -> AppResult<ApiEnvelope<CreatedId>> {
        self.post(Auth::User, "/favorites/add", &json!({ "record_id": record_id }))
            .await
    }

    pub async fn favorite_remove(&self, record_id: &str) -> AppResult<ApiEnvelope<serde_json::Value>> {
        self.delete(
            Auth::User,
            "/favorites/remove",
            vec![("record_id", record_id.to_string())],
        )
        .await
    }

    pub async fn favorite_check(&self, record_id: &str) -> AppResult<ApiEnvelope<FavoriteCheck>> {
        self.get(
            Auth::User,
            "/favorites/check",
            vec![("record_id", record_id.to_string())],
        )
        .await
    }
}
