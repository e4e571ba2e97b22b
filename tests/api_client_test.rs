use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mathpro_client::error::{ApiError, AppError};
use mathpro_client::models::record::ListQuery;
use mathpro_client::workflow::{notice_channel, SolveFlow, StageMessage, SubmitOutcome};
use mathpro_client::{ApiClient, Config, SessionStore};

fn client_for(server: &MockServer) -> ApiClient {
    let config = Config {
        api_base_url: server.uri(),
        ..Config::default()
    };
    ApiClient::new(&config, SessionStore::in_memory()).unwrap()
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "errCode": 0, "errMsg": "", "data": data })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": { "id": "u1", "username": "alice", "nickname": "小艾" }
        }))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_stores_session_and_sends_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/api/records/list"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "10"))
        .and(query_param("keyword", "方程"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 0,
            "errMsg": "",
            "data": [{ "id": "r1", "question": "2x=4", "time": "2024-05-01", "tags": [
                { "name": "方程", "type": "knowledge" },
                { "name": "购物", "type": "semantic" }
            ]}],
            "total": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server);
    let data = api.login("alice", "pw").await.unwrap();
    assert_eq!(data.user.display_name(), "小艾");
    assert!(api.session().is_authenticated());
    assert_eq!(api.session().access_token().as_deref(), Some("tok-1"));

    let page = api
        .records_list(&ListQuery::default().with_keyword(Some("方程".into())))
        .await
        .unwrap()
        .into_page("/records/list", "获取记录失败")
        .unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.items[0].tags[1].tag_type, "semantic");
}

#[tokio::test]
async fn login_without_token_is_rejected() {
    let server = MockServer::start().await;
    mount_login(&server, "").await;

    let api = client_for(&server);
    let err = api.login("alice", "pw").await.unwrap_err();
    assert_eq!(err.reason(), "登录失败");
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn application_error_is_returned_in_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/solve/analyze"))
        .and(body_json(json!({ "question": "1+1=?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 1,
            "errMsg": "rate limited"
        })))
        .mount(&server)
        .await;

    let env = client_for(&server).solve_analyze("1+1=?").await.unwrap();
    assert!(!env.is_success());
    assert_eq!(env.err_msg, "rate limited");
    assert_eq!(env.data, None);
}

#[tokio::test]
async fn error_envelope_with_empty_data_keeps_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 401, "errMsg": "用户名或密码错误", "data": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/favorites/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 400, "errMsg": "解题记录不存在", "data": {}
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);

    let err = api.login("alice", "pw").await.unwrap_err();
    assert_eq!(err.reason(), "用户名或密码错误");
    assert!(!err.is_transport());
    assert!(!api.session().is_authenticated());

    let env = api.favorite_add("missing").await.unwrap();
    assert_eq!(env.data, None);
    let err = env.into_data("/favorites/add", "收藏失败").unwrap_err();
    assert_eq!(err.reason(), "解题记录不存在");
}

#[tokio::test]
async fn malformed_success_data_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/favorites/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
        .mount(&server)
        .await;

    let err = client_for(&server).favorite_add("r1").await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::JsonParseFailed { .. })));
}

#[tokio::test]
async fn admin_avatar_upload_without_url_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users/u1/avatar"))
        .and(header("X-Admin-Token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("avatar.png");
    std::fs::write(&file, b"png").unwrap();

    let api = client_for(&server);
    api.session().set_admin_token("t");
    let err = api.admin_user_upload_avatar("u1", &file).await.unwrap_err();
    assert_eq!(err.reason(), "上传失败");
}

#[tokio::test]
async fn non_success_status_prefers_envelope_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/records/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errCode": 401,
            "errMsg": "未登录"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/solve/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = client_for(&server);

    let err = api.records_stats().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
        err,
        AppError::Api(ApiError::Http { status: 401, ref message, .. }) if message == "未登录"
    ));

    let err = api.solve_models().await.unwrap_err();
    assert_eq!(err.reason(), "Internal Server Error");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let config = Config {
        api_base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let api = ApiClient::new(&config, SessionStore::in_memory()).unwrap();

    let err = api.solve_analyze("1+1").await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::Transport { .. })));
}

#[tokio::test]
async fn admin_calls_require_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/uniapi-config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).admin_uniapi_config_get().await.unwrap_err();
    assert!(matches!(err, AppError::Api(ApiError::AdminTokenMissing)));
    assert_eq!(err.reason(), "请先登录管理员");
}

#[tokio::test]
async fn admin_login_sends_header_and_clears_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(header("X-Admin-Token", "good"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 0, "errMsg": "", "data": [], "total": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(header("X-Admin-Token", "bad"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errCode": 403, "errMsg": "口令错误"
        })))
        .mount(&server)
        .await;

    let api = client_for(&server);

    let err = api.admin_login("bad").await.unwrap_err();
    assert_eq!(err.reason(), "口令错误");
    assert_eq!(api.session().admin_token(), None);

    api.admin_login(" good ").await.unwrap();
    assert_eq!(api.session().admin_token().as_deref(), Some("good"));
}

#[tokio::test]
async fn favorite_remove_uses_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/favorites/remove"))
        .and(query_param("record_id", "rec9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .favorite_remove("rec9")
        .await
        .unwrap()
        .into_unit("/favorites/remove", "取消收藏失败")
        .unwrap();
}

#[tokio::test]
async fn connection_tests_settle_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/test/solve"))
        .and(query_param("model_id", "gpt-4o"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "success": true, "durationMs": 812, "model": "gpt-4o"
        }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/test/knowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 1, "errMsg": "upstream timeout"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/test/semantic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "success": true }))))
        .mount(&server)
        .await;

    let api = client_for(&server);
    api.session().set_admin_token("t");
    let report = api.run_connection_tests(Some("gpt-4o")).await;

    let solve = report.solve.unwrap();
    assert!(solve.success);
    assert_eq!(solve.duration_ms, Some(812));
    assert_eq!(report.knowledge.unwrap_err(), "upstream timeout");
    assert!(report.semantic.is_ok());
}

#[tokio::test]
async fn solve_flow_runs_against_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/solve/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "knowledge_points": ["arithmetic"],
            "semantic_contexts": []
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/solve"))
        .and(body_json(json!({
            "question": "1+1=?",
            "knowledge_points": ["arithmetic"],
            "semantic_contexts": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "content": "The answer is 2."
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/records/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "rec123" }))))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, _rx) = notice_channel();
    let flow = SolveFlow::new(Arc::new(client_for(&server)), tx);

    let outcome = flow.submit("1+1=?").await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Solved { record_id: Some(ref id), .. } if id == "rec123"
    ));
    let last = flow.transcript().last().map(|e| e.message.clone());
    assert!(matches!(
        last,
        Some(StageMessage::SolutionResolved { ref content, .. }) if content == "The answer is 2."
    ));
}

#[tokio::test]
async fn save_error_envelope_reaches_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/solve/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "knowledge_points": ["arithmetic"],
            "semantic_contexts": []
        }))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/solve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "content": "The answer is 2."
        }))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/records/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errCode": 500, "errMsg": "保存失败: 数据库连接失败", "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = notice_channel();
    let flow = SolveFlow::new(Arc::new(client_for(&server)), tx);

    let outcome = flow.submit("1+1=?").await;

    assert!(matches!(outcome, SubmitOutcome::Solved { record_id: None, .. }));
    let mut texts = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        texts.push(notice.text);
    }
    assert_eq!(texts, vec!["解题记录保存失败: 保存失败: 数据库连接失败".to_string()]);
}
