//! 会话上下文
//!
//! 进程内共享的登录态。启动时调用一次 [`SessionStore::init`] 从持久化存储恢复，
//! 之后只有登录、登出、修改资料会写入。

pub mod storage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::AuthUser;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StoredAuth};

/// 已登录的普通用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// 当前会话：普通用户与管理员相互独立
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserSession>,
    /// 仅保存在内存中
    pub admin_token: Option<String>,
}

/// 可注入的会话上下文，克隆后共享同一份状态
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn SessionStorage>,
    ready: Arc<AtomicBool>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            storage,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 不落盘的会话，用于测试或一次性命令
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// 从持久化存储恢复登录态，只执行一次
    ///
    /// token 与用户信息必须同时存在才会恢复；文件损坏时按未登录处理。
    pub fn init(&self, admin_token: Option<String>) {
        if self.ready.swap(true, Ordering::SeqCst) {
            return;
        }

        let restored = match self.storage.load() {
            Ok(Some(StoredAuth {
                token: Some(token),
                user: Some(user),
            })) if !token.is_empty() => Some(UserSession {
                access_token: token,
                user,
            }),
            Ok(_) => None,
            Err(e) => {
                warn!("⚠️ 登录态恢复失败，按未登录处理: {}", e);
                None
            }
        };

        if let Some(s) = &restored {
            info!("✓ 已恢复登录: {}", s.user.username);
        }

        let mut state = self.write();
        state.user = restored;
        state.admin_token = admin_token.filter(|t| !t.trim().is_empty());
    }

    /// 是否已完成恢复
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn get_session(&self) -> Session {
        self.read().clone()
    }

    /// 整体替换会话，并同步持久化用户部分
    pub fn set_session(&self, session: Session) -> AppResult<()> {
        self.persist(session.user.as_ref())?;
        *self.write() = session;
        Ok(())
    }

    /// 清空所有登录态（用户与管理员）
    pub fn clear_session(&self) -> AppResult<()> {
        self.storage.clear()?;
        *self.write() = Session::default();
        Ok(())
    }

    pub fn set_user_auth(&self, access_token: impl Into<String>, user: AuthUser) -> AppResult<()> {
        let session = UserSession {
            access_token: access_token.into(),
            user,
        };
        self.persist(Some(&session))?;
        self.write().user = Some(session);
        Ok(())
    }

    /// 资料更新后替换用户信息，token 不变；未登录时忽略
    pub fn update_user(&self, user: AuthUser) -> AppResult<()> {
        let updated = match &self.read().user {
            Some(s) => UserSession {
                access_token: s.access_token.clone(),
                user,
            },
            None => return Ok(()),
        };
        self.persist(Some(&updated))?;
        self.write().user = Some(updated);
        Ok(())
    }

    pub fn clear_user_auth(&self) -> AppResult<()> {
        self.storage.clear()?;
        self.write().user = None;
        Ok(())
    }

    pub fn set_admin_token(&self, token: impl Into<String>) {
        self.write().admin_token = Some(token.into());
    }

    pub fn clear_admin_token(&self) {
        self.write().admin_token = None;
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().user.as_ref().map(|s| s.access_token.clone())
    }

    pub fn admin_token(&self) -> Option<String> {
        self.read().admin_token.clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.read().user.as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    fn persist(&self, user: Option<&UserSession>) -> AppResult<()> {
        match user {
            Some(s) => self.storage.save(&StoredAuth {
                token: Some(s.access_token.clone()),
                user: Some(s.user.clone()),
            }),
            None => self.storage.clear(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionStore")
            .field("user", &session.user.as_ref().map(|s| &s.user.username))
            .field("admin", &session.admin_token.is_some())
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AuthUser {
        AuthUser {
            id: "u1".into(),
            username: "alice".into(),
            nickname: Some("小爱".into()),
            avatar_url: None,
        }
    }

    #[test]
    fn init_restores_only_complete_auth() {
        let storage = Arc::new(MemoryStorage::with(StoredAuth {
            token: Some("tok".into()),
            user: None,
        }));
        let store = SessionStore::new(storage);
        store.init(None);
        assert!(store.is_ready());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn init_runs_once_and_seeds_admin_token() {
        let storage = Arc::new(MemoryStorage::with(StoredAuth {
            token: Some("tok".into()),
            user: Some(alice()),
        }));
        let store = SessionStore::new(storage.clone());
        store.init(Some("admin-secret".into()));
        assert_eq!(store.access_token().as_deref(), Some("tok"));
        assert_eq!(store.admin_token().as_deref(), Some("admin-secret"));

        store.clear_user_auth().unwrap();
        // 第二次 init 不会重新读取存储
        storage.save(&StoredAuth {
            token: Some("other".into()),
            user: Some(alice()),
        })
        .unwrap();
        store.init(None);
        assert!(!store.is_authenticated());
        assert_eq!(store.admin_token().as_deref(), Some("admin-secret"));
    }

    #[test]
    fn login_persists_and_logout_clears_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.init(None);

        store.set_user_auth("tok", alice()).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().token.as_deref(), Some("tok"));
        assert_eq!(store.current_user().unwrap().display_name(), "小爱");

        store.clear_user_auth().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn update_user_keeps_token_and_ignores_anonymous() {
        let store = SessionStore::in_memory();
        store.init(None);
        store.update_user(alice()).unwrap();
        assert!(!store.is_authenticated());

        store.set_user_auth("tok", alice()).unwrap();
        let renamed = AuthUser {
            nickname: Some("Alice".into()),
            ..alice()
        };
        store.update_user(renamed).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("tok"));
        assert_eq!(store.current_user().unwrap().display_name(), "Alice");
    }

    #[test]
    fn set_session_persists_only_user_part() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.init(None);

        store
            .set_session(Session {
                user: Some(UserSession {
                    access_token: "tok".into(),
                    user: alice(),
                }),
                admin_token: Some("admin-secret".into()),
            })
            .unwrap();
        assert_eq!(
            storage.load().unwrap(),
            Some(StoredAuth {
                token: Some("tok".into()),
                user: Some(alice()),
            })
        );
        assert_eq!(store.admin_token().as_deref(), Some("admin-secret"));

        // 无用户的会话会清空存储，但管理员口令仍在内存中
        store
            .set_session(Session {
                user: None,
                admin_token: Some("admin-secret".into()),
            })
            .unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(!store.is_authenticated());
        assert_eq!(store.admin_token().as_deref(), Some("admin-secret"));
    }

    #[test]
    fn clones_share_state_and_clear_session_drops_admin() {
        let store = SessionStore::in_memory();
        store.init(None);
        let other = store.clone();
        other.set_admin_token("s3cret");
        assert_eq!(store.admin_token().as_deref(), Some("s3cret"));

        store.clear_session().unwrap();
        assert_eq!(other.get_session(), Session::default());
    }
}
