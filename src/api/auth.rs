//! 登录、注册与个人资料
//!
//! 登录 / 注册成功后写入会话；修改资料后同步会话中的用户信息。

use std::path::Path;

use tracing::info;

use crate::api::client::{ApiClient, Auth};
use crate::error::{ApiError, AppResult, BusinessError};
use crate::models::auth::{AuthUser, Credentials, LoginData, ProfileUpdate, UploadedUrl};

impl ApiClient {
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginData> {
        self.authenticate("/auth/login", username, password, "登录失败")
            .await
    }

    pub async fn register(&self, username: &str, password: &str) -> AppResult<LoginData> {
        self.authenticate("/auth/register", username, password, "注册失败")
            .await
    }

    async fn authenticate(
        &self,
        path: &str,
        username: &str,
        password: &str,
        fallback: &str,
    ) -> AppResult<LoginData> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let data = self
            .post::<_, LoginData>(Auth::User, path, &body)
            .await?
            .into_data(path, fallback)?;
        if data.access_token.is_empty() {
            return Err(ApiError::Application {
                endpoint: path.to_string(),
                code: 0,
                message: fallback.to_string(),
            }
            .into());
        }

        self.session()
            .set_user_auth(data.access_token.clone(), data.user.clone())?;
        info!("✓ 已登录: {}", data.user.username);
        Ok(data)
    }

    /// 退出登录，清除本地登录态
    pub fn logout(&self) -> AppResult<()> {
        self.session().clear_user_auth()
    }

    pub async fn get_profile(&self) -> AppResult<AuthUser> {
        self.get::<AuthUser>(Auth::User, "/auth/profile", Vec::new())
            .await?
            .into_data("/auth/profile", "获取资料失败")
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> AppResult<AuthUser> {
        let user = self
            .patch::<_, AuthUser>(Auth::User, "/auth/profile", update)
            .await?
            .into_data("/auth/profile", "更新资料失败")?;
        self.session().update_user(user.clone())?;
        Ok(user)
    }

    /// 上传头像，返回相对路径的 avatar_url
    pub async fn upload_avatar(&self, file: &Path) -> AppResult<String> {
        let (file_name, bytes) = read_upload(file).await?;
        self.upload::<UploadedUrl>(Auth::User, "/auth/avatar/upload", file_name, bytes)
            .await?
            .into_data("/auth/avatar/upload", "上传失败")?
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ApiError::Application {
                    endpoint: "/auth/avatar/upload".to_string(),
                    code: 0,
                    message: "上传失败".to_string(),
                }
                .into()
            })
    }
}

/// 读取待上传文件，返回（文件名, 内容）
pub(crate) async fn read_upload(file: &Path) -> AppResult<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| BusinessError::FileReadFailed {
            path: file.display().to_string(),
            source,
        })?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "avatar".to_string());
    Ok((file_name, bytes))
}
