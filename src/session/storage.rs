//! 登录态持久化
//!
//! 只保存普通用户的 token 与用户信息；管理员口令不落盘。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppResult, SessionError};
use crate::models::AuthUser;

/// 落盘的登录信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAuth {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// 持久化后端
pub trait SessionStorage: Send + Sync {
    /// 读取；不存在时返回 `None`
    fn load(&self) -> AppResult<Option<StoredAuth>>;
    fn save(&self, auth: &StoredAuth) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// JSON 文件存储
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> AppResult<Option<StoredAuth>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| SessionError::ReadFailed {
            path: self.path_string(),
            source,
        })?;
        let auth = serde_json::from_str(&content).map_err(SessionError::from)?;
        Ok(Some(auth))
    }

    fn save(&self, auth: &StoredAuth) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::WriteFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(auth).map_err(SessionError::from)?;
        std::fs::write(&self.path, json).map_err(|source| SessionError::WriteFailed {
            path: self.path_string(),
            source,
        })?;
        debug!("登录态已写入 {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::WriteFailed {
                path: self.path_string(),
                source,
            }
            .into()),
        }
    }
}

/// 内存存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<StoredAuth>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(auth: StoredAuth) -> Self {
        Self {
            inner: Mutex::new(Some(auth)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> AppResult<Option<StoredAuth>> {
        Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, auth: &StoredAuth) -> AppResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(auth.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
