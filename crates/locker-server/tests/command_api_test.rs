// Slash-command endpoints end to end over the in-memory store

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use config::Config;
use locker_core::{EngineConfig, LockEngine};
use locker_server::api::routes;
use locker_server::model::{AppState, CommandKind, CommandResponse, Configuration, ResponseType};
use locker_store::{LockStore, MemoryStore, StoreError, StoreResult};

const TOKEN: &str = "test-token";

fn command_name(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Lock => "/lock",
        CommandKind::Unlock => "/unlock",
        CommandKind::View => "/viewlock",
        CommandKind::List => "/listlocks",
    }
}

fn configuration() -> Configuration {
    let mut builder = Config::builder();
    for kind in CommandKind::ALL {
        builder = builder
            .set_override(format!("commands.{}.name", kind.key()), command_name(kind))
            .unwrap()
            .set_override(format!("commands.{}.token", kind.key()), TOKEN)
            .unwrap();
    }
    Configuration::from_config(builder.build().unwrap())
}

fn state_with(store: Arc<dyn LockStore>) -> Arc<AppState> {
    Arc::new(AppState::new(
        configuration(),
        LockEngine::new(store, EngineConfig::default()),
    ))
}

async fn post(
    state: &Arc<AppState>,
    kind: CommandKind,
    token: &str,
    text: &str,
    user: &str,
) -> (StatusCode, Option<CommandResponse>) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state.clone()))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(command_name(kind))
        .set_form([
            ("token", token),
            ("command", command_name(kind)),
            ("text", text),
            ("user_name", user),
            ("team_domain", "ignored"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if body.is_empty() {
        (status, None)
    } else {
        (status, Some(serde_json::from_slice(&body).unwrap()))
    }
}

async fn send(
    state: &Arc<AppState>,
    kind: CommandKind,
    text: &str,
    user: &str,
) -> (StatusCode, CommandResponse) {
    let (status, body) = post(state, kind, TOKEN, text, user).await;
    (status, body.expect("response body"))
}

/// Fails every operation as if Redis were down
struct UnavailableStore;

#[async_trait]
impl LockStore for UnavailableStore {
    async fn set_if_absent(&self, _: &str, _: &str, _: Option<Duration>) -> StoreResult<bool> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn get(&self, _: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn delete(&self, _: &str) -> StoreResult<u64> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn keys_matching(&self, _: &str) -> StoreResult<Vec<String>> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(StoreError::Connection("connection refused".to_string()))
    }
}

#[actix_web::test]
async fn test_wrong_token_is_unauthorized() {
    let state = state_with(Arc::new(MemoryStore::new()));

    let (status, body) = post(&state, CommandKind::Lock, "nope", "staging", "alice").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_none());

    // Surrounding whitespace is not significant
    let padded = format!("  {}\n", TOKEN);
    let (status, _) = post(&state, CommandKind::Lock, &padded, "staging", "alice").await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_wrong_command_is_bad_request() {
    let state = state_with(Arc::new(MemoryStore::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state.clone()))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/lock")
        .set_form([
            ("token", TOKEN),
            ("command", "/unlock"),
            ("text", "staging"),
            ("user_name", "alice"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn test_unconfigured_command_rejects_empty_token() {
    let state = Arc::new(AppState::new(
        Configuration::default(),
        LockEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default()),
    ));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/lock")
        .set_form([("token", ""), ("command", ""), ("text", "x"), ("user_name", "a")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_lock_replies() {
    let state = state_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&state, CommandKind::Lock, "Staging", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response_type, ResponseType::InChannel);
    assert_eq!(body.text, "staging is now locked by alice");
    assert_eq!(body.icon_emoji.as_deref(), Some(":lock:"));

    let (status, body) = send(&state, CommandKind::Lock, "staging", "alice").await;
    assert_eq!(status, StatusCode::GONE);
    assert!(
        body.text
            .starts_with("No worries, you already have the lock on staging (")
    );
    assert!(body.icon_emoji.is_none());

    let (status, body) = send(&state, CommandKind::Lock, "STAGING", "bob").await;
    assert_eq!(status, StatusCode::GONE);
    assert!(
        body.text
            .starts_with(":x: Sorry, lock currently held by: alice (")
    );
}

#[actix_web::test]
async fn test_unlock_replies() {
    let store = MemoryStore::new();
    let state = state_with(Arc::new(store.clone()));
    send(&state, CommandKind::Lock, "staging", "alice").await;

    let (status, body) = send(&state, CommandKind::Unlock, "staging", "bob").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.text, ":rage4: Come on, you can't unlock alice's lock.");

    let (status, body) = send(&state, CommandKind::Unlock, "staging", "alice").await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body.text, "staging is now available");

    let (status, body) = send(&state, CommandKind::Unlock, "staging", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.text, "That was never locked. What's your problem?");
    assert!(store.is_empty());
}

#[actix_web::test]
async fn test_unlock_during_another_release() {
    let store = MemoryStore::new();
    let state = state_with(Arc::new(store.clone()));
    send(&state, CommandKind::Lock, "staging", "alice").await;
    store.insert("unlock-attempt-locker-staging", "true");

    let (status, body) = send(&state, CommandKind::Unlock, "staging", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.text,
        "Hmmm, someone else is trying to unlock this. How odd."
    );
}

#[actix_web::test]
async fn test_view_lock_replies() {
    let state = state_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&state, CommandKind::View, "staging", "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response_type, ResponseType::InChannel);
    assert_eq!(body.text, "That lock is not currently held");

    send(&state, CommandKind::Lock, "staging", "alice").await;
    let (status, body) = send(&state, CommandKind::View, "Staging", "bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response_type, ResponseType::Ephemeral);
    assert!(body.text.starts_with("staging is held by (alice) "));
}

#[actix_web::test]
async fn test_list_locks_filters() {
    let store = MemoryStore::new();
    store.insert("locker-api", "alice--01 Jan 25 10:00 +0000");
    store.insert("locker-web", "bob--01 Jan 25 10:00 +0000");
    let state = state_with(Arc::new(store));

    let (status, body) = send(&state, CommandKind::List, "", "carol").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.response_type, ResponseType::Ephemeral);
    let lines: Vec<&str> = body.text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Current locks: ");

    let (_, body) = send(&state, CommandKind::List, "ME", "bob").await;
    let lines: Vec<&str> = body.text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("web locked by bob ("));

    let (_, body) = send(&state, CommandKind::List, "Alice", "bob").await;
    let lines: Vec<&str> = body.text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("api locked by alice ("));

    let (_, body) = send(&state, CommandKind::List, "nobody", "bob").await;
    assert_eq!(body.text, "Current locks: ");
}

#[actix_web::test]
async fn test_store_failure_is_bad_gateway() {
    let state = state_with(Arc::new(UnavailableStore));

    for kind in CommandKind::ALL {
        let (status, body) = send(&state, kind, "staging", "alice").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{kind}");
        assert_eq!(body.response_type, ResponseType::InChannel);
        assert_eq!(body.text, ":bomb: Something is wrong with the lock service");
    }
}

#[actix_web::test]
async fn test_health() {
    let state = state_with(Arc::new(MemoryStore::new()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state))
            .configure(routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, serde_json::json!({ "status": "UP" }));
}
