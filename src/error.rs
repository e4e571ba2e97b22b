use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 会话存储错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
}

/// API 调用错误
///
/// `Transport` 与 `Http` 属于传输层失败，`Application` 是后端信封中 `errCode != 0`。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络不可达、连接被拒绝等
    #[error("网络请求失败 ({endpoint}): {message}")]
    Transport { endpoint: String, message: String },
    /// 非 2xx 状态码
    #[error("HTTP {status} ({endpoint}): {message}")]
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 后端返回 errCode != 0
    #[error("接口返回错误 ({endpoint}): code={code}, message={message}")]
    Application {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// errCode 为 0 但 data 缺失
    #[error("API返回空结果: {endpoint}")]
    EmptyData { endpoint: String },
    /// 响应体不是合法的信封 JSON
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 管理员接口缺少 X-Admin-Token
    #[error("请先登录管理员")]
    AdminTokenMissing,
}

/// 会话持久化错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("读取会话文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入会话文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("会话数据序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 题目为空
    #[error("请输入题目内容")]
    EmptyQuestion,
    /// 已有解题流程在进行
    #[error("正在解题中，请稍候")]
    SubmissionInProgress,
    /// 对话记录中找不到该条消息
    #[error("找不到消息: {id}")]
    EntryNotFound { id: String },
    /// 消息不是解答
    #[error("消息 {id} 不是解题结果")]
    NotASolution { id: String },
    /// 单独保存解题记录失败
    #[error("保存失败: {reason}")]
    SaveFailed { reason: String },
    /// 读取待上传文件失败
    #[error("读取文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建传输层错误
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Api(ApiError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        })
    }

    /// 创建业务返回码错误
    pub fn application(endpoint: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        AppError::Api(ApiError::Application {
            endpoint: endpoint.into(),
            code,
            message: message.into(),
        })
    }

    /// 面向用户的原因描述
    ///
    /// 传输层与业务层错误只返回原始原因（如 `Failed to fetch`、`rate limited`），
    /// 其余错误返回完整描述。
    pub fn reason(&self) -> String {
        match self {
            AppError::Api(ApiError::Transport { message, .. })
            | AppError::Api(ApiError::Http { message, .. })
            | AppError::Api(ApiError::Application { message, .. }) => message.clone(),
            AppError::Api(e @ ApiError::AdminTokenMissing) => e.to_string(),
            AppError::Business(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// 是否为传输层错误（网络错误或非 2xx）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::Transport { .. }) | AppError::Api(ApiError::Http { .. })
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strips_transport_context() {
        let err = AppError::transport("/solve/analyze", "Failed to fetch");
        assert_eq!(err.reason(), "Failed to fetch");
        assert!(err.is_transport());
        assert!(err.to_string().contains("/solve/analyze"));
    }

    #[test]
    fn reason_for_application_error_is_backend_message() {
        let err = AppError::application("/solve", 1, "rate limited");
        assert_eq!(err.reason(), "rate limited");
        assert!(!err.is_transport());
    }

    #[test]
    fn business_reason_uses_display() {
        let err = AppError::from(BusinessError::EmptyQuestion);
        assert_eq!(err.reason(), "请输入题目内容");
    }

    #[test]
    fn busy_submission_reads_as_waiting_hint() {
        let err = AppError::from(BusinessError::SubmissionInProgress);
        assert_eq!(err.reason(), "正在解题中，请稍候");
        assert!(!err.is_transport());
    }
}
