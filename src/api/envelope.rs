//! 统一响应信封 `{errCode, errMsg, data}`

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, AppResult};

/// 后端统一返回结构；列表接口额外带 `total`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(rename = "errCode", default)]
    pub err_code: i64,
    #[serde(rename = "errMsg", default)]
    pub err_msg: String,
    pub data: Option<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            err_code: 0,
            err_msg: String::new(),
            data: Some(data),
            total: None,
        }
    }

    pub fn fail(err_code: i64, err_msg: impl Into<String>) -> Self {
        Self {
            err_code,
            err_msg: err_msg.into(),
            data: None,
            total: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.err_code == 0
    }

    /// errMsg 为空时使用默认文案
    pub fn message_or(&self, fallback: &str) -> String {
        if self.err_msg.trim().is_empty() {
            fallback.to_string()
        } else {
            self.err_msg.clone()
        }
    }

    /// 成功且带数据时取出 data，否则转为错误
    pub fn into_data(self, endpoint: &str, fallback: &str) -> AppResult<T> {
        if !self.is_success() {
            return Err(ApiError::Application {
                endpoint: endpoint.to_string(),
                code: self.err_code,
                message: self.message_or(fallback),
            }
            .into());
        }
        self.data.ok_or_else(|| {
            ApiError::EmptyData {
                endpoint: endpoint.to_string(),
            }
            .into()
        })
    }

    /// 只关心是否成功的接口（删除等）
    pub fn into_unit(self, endpoint: &str, fallback: &str) -> AppResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ApiError::Application {
                endpoint: endpoint.to_string(),
                code: self.err_code,
                message: self.message_or(fallback),
            }
            .into())
        }
    }
}

/// 分页列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ApiEnvelope<Vec<T>> {
    /// 列表接口：data 缺失视为空列表，total 缺失时取条数
    pub fn into_page(self, endpoint: &str, fallback: &str) -> AppResult<Page<T>> {
        if !self.is_success() {
            return Err(ApiError::Application {
                endpoint: endpoint.to_string(),
                code: self.err_code,
                message: self.message_or(fallback),
            }
            .into());
        }
        let items = self.data.unwrap_or_default();
        let total = self.total.unwrap_or(items.len() as u64);
        Ok(Page { items, total })
    }
}
