use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ConfigError};

/// 当前目录下默认查找的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "mathpro.toml";

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 后端服务地址（不含 /api 前缀）
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 用户登录态持久化文件
    pub session_file: PathBuf,
    /// 管理员口令，仅保存在内存中
    pub admin_token: Option<String>,
    /// 列表默认每页条数
    pub default_page_size: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            session_file: default_session_file(),
            admin_token: None,
            default_page_size: 10,
            verbose_logging: false,
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mathpro")
        .join("session.json")
}

impl Config {
    /// 依次叠加：默认值 → TOML 文件 → 环境变量
    ///
    /// 未显式指定文件时，若当前目录存在 `mathpro.toml` 则读取它。
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件读取，缺失字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    fn from_toml_str(content: &str, path: &Path) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 用进程环境变量覆盖
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// 用任意键值来源覆盖；无法解析的值保留上一层配置
    pub fn with_lookup(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let prev = self;
        Self {
            api_base_url: lookup("MATHPRO_API_BASE_URL").unwrap_or(prev.api_base_url),
            request_timeout_secs: lookup("MATHPRO_REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(prev.request_timeout_secs),
            session_file: lookup("MATHPRO_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(prev.session_file),
            admin_token: lookup("MATHPRO_ADMIN_TOKEN")
                .filter(|v| !v.trim().is_empty())
                .or(prev.admin_token),
            default_page_size: lookup("MATHPRO_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(prev.default_page_size),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(prev.verbose_logging),
        }
    }

    /// 后端地址去掉结尾的 `/`
    pub fn origin(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
