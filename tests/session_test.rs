use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mathpro_client::cli::Command;
use mathpro_client::session::FileStorage;
use mathpro_client::{App, Config, SessionStore};

fn file_session(config: &Config) -> SessionStore {
    let store = SessionStore::new(Arc::new(FileStorage::new(config.session_file.clone())));
    store.init(config.admin_token.clone());
    store
}

#[tokio::test]
async fn login_survives_restart_and_logout_clears_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 0,
            "errMsg": "",
            "data": {
                "access_token": "persisted-token",
                "token_type": "bearer",
                "user": { "id": "u7", "username": "bob" }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/records/stats"))
        .and(header("Authorization", "Bearer persisted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 0, "errMsg": "", "data": { "total": 3, "daysOfLearning": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = Config {
        api_base_url: server.uri(),
        session_file: dir.path().join("nested").join("session.json"),
        admin_token: Some("from-config".into()),
        ..Config::default()
    };

    // 第一次运行：登录
    let app = App::with_session(config.clone(), file_session(&config)).unwrap();
    app.run(Command::Login {
        username: "bob".into(),
        password: "pw".into(),
    })
    .await
    .unwrap();
    assert!(config.session_file.exists());
    let on_disk = std::fs::read_to_string(&config.session_file).unwrap();
    assert!(on_disk.contains("persisted-token"));
    assert!(!on_disk.contains("from-config"));

    // 第二次运行：恢复登录态并带上 token
    let session = file_session(&config);
    assert!(session.is_ready());
    assert_eq!(session.current_user().map(|u| u.username), Some("bob".to_string()));
    assert_eq!(session.admin_token().as_deref(), Some("from-config"));
    let app = App::with_session(config.clone(), session.clone()).unwrap();
    app.run(Command::Records(mathpro_client::cli::RecordsCommand::Stats))
        .await
        .unwrap();

    app.run(Command::Logout).await.unwrap();
    assert!(!session.is_authenticated());
    assert!(!file_session(&config).is_authenticated());
}

#[tokio::test]
async fn corrupt_session_file_starts_logged_out() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("session.json");
    std::fs::write(&file, "{ not json").unwrap();

    let store = SessionStore::new(Arc::new(FileStorage::new(&file)));
    store.init(None);

    assert!(store.is_ready());
    assert!(!store.is_authenticated());
    assert_eq!(store.admin_token(), None);
}

#[tokio::test]
async fn token_without_user_is_not_restored() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("session.json");
    std::fs::write(&file, r#"{"token":"orphan"}"#).unwrap();

    let store = SessionStore::new(Arc::new(FileStorage::new(&file)));
    store.init(Some("   ".into()));

    assert!(!store.is_authenticated());
    assert_eq!(store.access_token(), None);
    assert_eq!(store.admin_token(), None);
}
