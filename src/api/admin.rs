//! 管理员接口：所有请求携带 `X-Admin-Token`

use std::path::Path;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::auth::read_upload;
use crate::api::client::{ApiClient, Auth};
use crate::api::envelope::{ApiEnvelope, Page};
use crate::error::{ApiError, AppResult};
use crate::models::admin::{
    AdminFavoriteItem, AdminRecordDetailItem, AdminRecordItem, AdminSolveModelCreate,
    AdminSolveModelItem, AdminSolveModelUpdate, AdminTestResult, AdminUniapiConfig,
    AdminUniapiConfigUpdate, AdminUserCreate, AdminUserItem, AdminUserUpdate, ConnectionReport,
};
use crate::models::record::ListQuery;
use crate::models::solve::CreatedId;

impl ApiClient {
    /// 管理员登录：写入口令并用一次用户列表请求校验，失败则清除
    pub async fn admin_login(&self, secret: &str) -> AppResult<()> {
        self.session().set_admin_token(secret.trim());
        let check = self
            .admin_users_list(&ListQuery::page(1, 1))
            .await
            .and_then(|env| env.into_page("/admin/users", "管理员口令无效").map(|_| ()));
        if let Err(e) = check {
            warn!("⚠️ 管理员口令校验失败: {}", e);
            self.session().clear_admin_token();
            return Err(e);
        }
        info!("✓ 管理员已登录");
        Ok(())
    }

    pub fn admin_logout(&self) {
        self.session().clear_admin_token();
    }

    // ========== 用户 ==========

    pub async fn admin_users_list(&self, query: &ListQuery) -> AppResult<ApiEnvelope<Vec<AdminUserItem>>> {
        let query = ListQuery {
            category: None,
            user_id: None,
            ..query.clone()
        };
        self.get(Auth::Admin, "/admin/users", self.list_query(&query))
            .await
    }

    pub async fn admin_user_get(&self, user_id: &str) -> AppResult<ApiEnvelope<AdminUserItem>> {
        self.get(Auth::Admin, &format!("/admin/users/{}", user_id), Vec::new())
            .await
    }

    pub async fn admin_user_create(&self, body: &AdminUserCreate) -> AppResult<ApiEnvelope<CreatedId>> {
        self.post(Auth::Admin, "/admin/users", body).await
    }

    pub async fn admin_user_update(
        &self,
        user_id: &str,
        body: &AdminUserUpdate,
    ) -> AppResult<ApiEnvelope<CreatedId>> {
        self.patch(Auth::Admin, &format!("/admin/users/{}", user_id), body)
            .await
    }

    pub async fn admin_user_update_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> AppResult<ApiEnvelope<CreatedId>> {
        self.patch(
            Auth::Admin,
            &format!("/admin/users/{}/password", user_id),
            &json!({ "password": password }),
        )
        .await
    }

    pub async fn admin_user_delete(&self, user_id: &str) -> AppResult<ApiEnvelope<Value>> {
        self.delete(Auth::Admin, &format!("/admin/users/{}", user_id), Vec::new())
            .await
    }

    /// 为用户上传头像，返回头像地址
    pub async fn admin_user_upload_avatar(&self, user_id: &str, file: &Path) -> AppResult<String> {
        let path = format!("/admin/users/{}/avatar", user_id);
        let (file_name, bytes) = read_upload(file).await?;
        let data = self
            .upload::<Value>(Auth::Admin, &path, file_name, bytes)
            .await?
            .into_data(&path, "上传失败")?;
        match data.get("url").and_then(Value::as_str) {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => Err(ApiError::Application {
                endpoint: path,
                code: 0,
                message: "上传失败".to_string(),
            }
            .into()),
        }
    }

    // ========== 解题模型 ==========

    pub async fn admin_solve_models_list(&self) -> AppResult<ApiEnvelope<Vec<AdminSolveModelItem>>> {
        self.get(Auth::Admin, "/admin/solve-models", Vec::new()).await
    }

    pub async fn admin_solve_model_create(
        &self,
        body: &AdminSolveModelCreate,
    ) -> AppResult<ApiEnvelope<AdminSolveModelItem>> {
        self.post(Auth::Admin, "/admin/solve-models", body).await
    }

    pub async fn admin_solve_model_update(
        &self,
        id: i64,
        body: &AdminSolveModelUpdate,
    ) -> AppResult<ApiEnvelope<AdminSolveModelItem>> {
        self.patch(Auth::Admin, &format!("/admin/solve-models/{}", id), body)
            .await
    }

    pub async fn admin_solve_model_delete(&self, id: i64) -> AppResult<ApiEnvelope<Value>> {
        self.delete(Auth::Admin, &format!("/admin/solve-models/{}", id), Vec::new())
            .await
    }

    // ========== 模型接口配置 ==========

    pub async fn admin_uniapi_config_get(&self) -> AppResult<ApiEnvelope<AdminUniapiConfig>> {
        self.get(Auth::Admin, "/admin/uniapi-config", Vec::new()).await
    }

    pub async fn admin_uniapi_config_update(
        &self,
        body: &AdminUniapiConfigUpdate,
    ) -> AppResult<ApiEnvelope<Value>> {
        self.patch(Auth::Admin, "/admin/uniapi-config", body).await
    }

    // ========== 记录与收藏 ==========

    pub async fn admin_records_list(&self, query: &ListQuery) -> AppResult<ApiEnvelope<Vec<AdminRecordItem>>> {
        let query = ListQuery {
            category: None,
            ..query.clone()
        };
        self.get(Auth::Admin, "/admin/records", self.list_query(&query))
            .await
    }

    pub async fn admin_record_detail(&self, id: &str) -> AppResult<ApiEnvelope<AdminRecordDetailItem>> {
        self.get(Auth::Admin, &format!("/admin/records/{}", id), Vec::new())
            .await
    }

    pub async fn admin_record_delete(&self, id: &str) -> AppResult<ApiEnvelope<Value>> {
        self.delete(Auth::Admin, &format!("/admin/records/{}", id), Vec::new())
            .await
    }

    pub async fn admin_favorites_list(
        &self,
        query: &ListQuery,
    ) -> AppResult<ApiEnvelope<Vec<AdminFavoriteItem>>> {
        let query = ListQuery {
            category: None,
            ..query.clone()
        };
        self.get(Auth::Admin, "/admin/favorites", self.list_query(&query))
            .await
    }

    pub async fn admin_favorite_delete(&self, id: &str) -> AppResult<ApiEnvelope<Value>> {
        self.delete(Auth::Admin, &format!("/admin/favorites/{}", id), Vec::new())
            .await
    }

    // ========== 连接测试 ==========

    /// 测试解题模型；可指定模型 ID
    pub async fn admin_test_solve(&self, model_id: Option<&str>) -> AppResult<ApiEnvelope<AdminTestResult>> {
        let query = model_id
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(|m| vec![("model_id", m.to_string())])
            .unwrap_or_default();
        self.get(Auth::Admin, "/admin/test/solve", query).await
    }

    pub async fn admin_test_knowledge(&self) -> AppResult<ApiEnvelope<AdminTestResult>> {
        self.get(Auth::Admin, "/admin/test/knowledge", Vec::new()).await
    }

    pub async fn admin_test_semantic(&self) -> AppResult<ApiEnvelope<AdminTestResult>> {
        self.get(Auth::Admin, "/admin/test/semantic", Vec::new()).await
    }

    /// 同时测试三个模型端点
    pub async fn run_connection_tests(&self, model_id: Option<&str>) -> ConnectionReport {
        let (solve, knowledge, semantic) = futures::future::join3(
            self.admin_test_solve(model_id),
            self.admin_test_knowledge(),
            self.admin_test_semantic(),
        )
        .await;

        let settle = |r: AppResult<ApiEnvelope<AdminTestResult>>, endpoint: &str| {
            r.and_then(|env| env.into_data(endpoint, "测试失败"))
                .map_err(|e| e.reason())
        };

        ConnectionReport {
            solve: settle(solve, "/admin/test/solve"),
            knowledge: settle(knowledge, "/admin/test/knowledge"),
            semantic: settle(semantic, "/admin/test/semantic"),
        }
    }
}

/// 分页结果转成 JSON，供命令行直接输出
pub fn page_to_json<T: serde::Serialize>(page: &Page<T>) -> Value {
    json!({ "total": page.total, "items": page.items })
}
