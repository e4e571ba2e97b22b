//! 后端 HTTP 客户端
//!
//! 封装请求发送、鉴权头与信封解析。普通接口在已登录时带
//! `Authorization: Bearer <token>`，管理接口带 `X-Admin-Token`。

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::envelope::ApiEnvelope;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::record::ListQuery;
use crate::session::SessionStore;

/// 接口路径前缀
pub const API_PREFIX: &str = "/api";

/// 管理员口令请求头
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// 请求鉴权方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// 有用户 token 时附带 Bearer
    User,
    /// 必须有管理员口令
    Admin,
}

/// 查询参数，值为空的会被忽略
pub(crate) type Query = Vec<(&'static str, String)>;

/// 后端 API 客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    origin: String,
    default_page_size: u32,
    session: SessionStore,
}

impl ApiClient {
    /// 创建客户端
    pub fn new(config: &Config, session: SessionStore) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::transport("client", e.to_string()))?;

        Ok(Self {
            http,
            origin: config.origin().to_string(),
            default_page_size: config.default_page_size,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `/solve` → `http://host/api/solve`
    pub fn api_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}{}", self.origin, API_PREFIX, path)
        } else {
            format!("{}{}/{}", self.origin, API_PREFIX, path)
        }
    }

    /// 把头像等相对路径转为完整 URL
    pub fn asset_url(&self, path: Option<&str>) -> String {
        match path {
            None | Some("") => String::new(),
            Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
            Some(p) if p.starts_with('/') => format!("{}{}", self.origin, p),
            Some(p) => format!("{}/{}", self.origin, p),
        }
    }

    /// 列表查询参数，page / pageSize 缺省为 1 / 默认页大小
    pub(crate) fn list_query(&self, q: &ListQuery) -> Query {
        let mut query: Query = vec![
            ("page", q.page.unwrap_or(1).to_string()),
            (
                "pageSize",
                q.page_size.unwrap_or(self.default_page_size).to_string(),
            ),
        ];
        if let Some(k) = &q.keyword {
            query.push(("keyword", k.clone()));
        }
        if let Some(c) = &q.category {
            query.push(("category", c.clone()));
        }
        if let Some(u) = &q.user_id {
            query.push(("user_id", u.clone()));
        }
        query
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        query: Query,
    ) -> AppResult<ApiEnvelope<T>> {
        self.send(auth, Method::GET, path, query, None::<&()>).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        body: &B,
    ) -> AppResult<ApiEnvelope<T>> {
        self.send(auth, Method::POST, path, Vec::new(), Some(body)).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        body: &B,
    ) -> AppResult<ApiEnvelope<T>> {
        self.send(auth, Method::PATCH, path, Vec::new(), Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        query: Query,
    ) -> AppResult<ApiEnvelope<T>> {
        self.send(auth, Method::DELETE, path, query, None::<&()>).await
    }

    /// 上传单个文件（multipart 字段名 `file`）
    pub(crate) async fn upload<T: DeserializeOwned>(
        &self,
        auth: Auth,
        path: &str,
        file_name: String,
        bytes: Vec<u8>,
    ) -> AppResult<ApiEnvelope<T>> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self.authorize(auth, self.http.post(self.api_url(path)))?;
        debug!("上传文件 → {}", path);
        self.execute(path, builder.multipart(form)).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        auth: Auth,
        method: Method,
        path: &str,
        query: Query,
        body: Option<&B>,
    ) -> AppResult<ApiEnvelope<T>> {
        let query: Query = query.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        let mut builder = self.http.request(method.clone(), self.api_url(path));
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let builder = self.authorize(auth, builder)?;

        debug!("{} {} {:?}", method, path, query);
        self.execute(path, builder).await
    }

    fn authorize(&self, auth: Auth, builder: RequestBuilder) -> AppResult<RequestBuilder> {
        match auth {
            Auth::User => Ok(match self.session.access_token() {
                Some(token) => builder.bearer_auth(token),
                None => builder,
            }),
            Auth::Admin => {
                let token = self
                    .session
                    .admin_token()
                    .ok_or(ApiError::AdminTokenMissing)?;
                Ok(builder.header(ADMIN_TOKEN_HEADER, token))
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> AppResult<ApiEnvelope<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::transport(path, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::transport(path, e.to_string()))?;

        if !status.is_success() {
            // 非 2xx 时优先用信封里的 errMsg，其次是状态描述
            let message = serde_json::from_str::<ApiEnvelope<Value>>(&text)
                .ok()
                .map(|env| env.err_msg)
                .filter(|m| !m.trim().is_empty())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "请求失败".to_string());
            return Err(ApiError::Http {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parse_failed = |source: serde_json::Error| ApiError::JsonParseFailed {
            endpoint: path.to_string(),
            source,
        };

        // 先按无类型信封解析：业务错误时后端的 data 常为 `{}`，不应按 T 解析
        let raw: ApiEnvelope<Value> = serde_json::from_str(&text).map_err(parse_failed)?;
        let data = match raw.data {
            Some(value) if raw.err_code == 0 && !value.is_null() => {
                Some(serde_json::from_value(value).map_err(parse_failed)?)
            }
            _ => None,
        };
        Ok(ApiEnvelope {
            err_code: raw.err_code,
            err_msg: raw.err_msg,
            data,
            total: raw.total,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("origin", &self.origin)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, SessionStore::in_memory()).unwrap()
    }

    #[test]
    fn api_url_adds_prefix_once() {
        let c = client("http://localhost:8000/");
        assert_eq!(c.api_url("/solve"), "http://localhost:8000/api/solve");
        assert_eq!(c.api_url("records/list"), "http://localhost:8000/api/records/list");
    }

    #[test]
    fn asset_url_handles_relative_and_absolute() {
        let c = client("http://localhost:8000");
        assert_eq!(c.asset_url(None), "");
        assert_eq!(c.asset_url(Some("https://cdn.x/a.png")), "https://cdn.x/a.png");
        assert_eq!(c.asset_url(Some("/static/a.png")), "http://localhost:8000/static/a.png");
        assert_eq!(c.asset_url(Some("static/a.png")), "http://localhost:8000/static/a.png");
    }

    #[test]
    fn list_query_defaults_page_and_size() {
        let c = client("http://localhost:8000");
        let q = c.list_query(&ListQuery::default().with_keyword(Some("方程".into())));
        assert_eq!(
            q,
            vec![
                ("page", "1".to_string()),
                ("pageSize", "10".to_string()),
                ("keyword", "方程".to_string())
            ]
        );
    }
}
