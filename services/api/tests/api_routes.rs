//! End-to-end checks of the HTTP routes, driven through the router in-process.

use api_lib::{
    adapters::MockSubmissionAdapter,
    config::Config,
    web::{router, state::AuthProviderFactory, AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use safety_portal_core::{
    auth::StaticAuthProvider,
    domain::ChatTurn,
    ports::{AuthProvider, ChatCompletionService, PortError, PortResult},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct EchoChat;

#[async_trait]
impl ChatCompletionService for EchoChat {
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> PortResult<String> {
        Ok(format!("{} prior turns; you said: {}", history.len(), message))
    }
}

struct BrokenChat;

#[async_trait]
impl ChatCompletionService for BrokenChat {
    async fn complete(&self, _message: &str, _history: &[ChatTurn]) -> PortResult<String> {
        Err(PortError::Unexpected("quota exceeded".to_string()))
    }
}

fn app_and_state(chat: Arc<dyn ChatCompletionService>) -> (Router, Arc<AppState>) {
    let config = Arc::new(Config::default());
    let auth_factory: AuthProviderFactory =
        Arc::new(|| Arc::new(StaticAuthProvider::default()) as Arc<dyn AuthProvider>);
    let submissions = Arc::new(MockSubmissionAdapter::new(
        Duration::from_millis(10),
        Duration::from_millis(10),
    ));
    let state = Arc::new(AppState::new(config, auth_factory, chat, submissions));
    (router(state.clone()), state)
}

fn app_with(chat: Arc<dyn ChatCompletionService>) -> Router {
    app_and_state(chat).0
}

fn app() -> Router {
    app_with(Arc::new(EchoChat))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, set_cookie, json)
}

/// Opens the trial dialog once to obtain a session cookie.
async fn new_session(app: &Router) -> String {
    let (_, cookie, _) = send(app, "GET", "/trial", None, None).await;
    cookie.expect("stateful routes hand out a session cookie")
}

async fn login(app: &Router, cookie: &str) {
    let (status, _, body) = send(
        app,
        "POST",
        "/auth/login",
        Some(cookie),
        Some(json!({"email": "Mubeen.Ahsan@SafetyForAll.Site", "password": "669914"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mubeen");
}

#[tokio::test]
async fn sign_in_unlocks_gated_modules() {
    let app = app();
    let cookie = new_session(&app).await;

    let (_, _, body) = send(&app, "GET", "/navigate/qra", Some(&cookie), None).await;
    assert_eq!(body["action"], "sign_in_required");
    let (_, _, body) = send(&app, "GET", "/navigate/editor", Some(&cookie), None).await;
    assert_eq!(body["action"], "navigate");

    login(&app, &cookie).await;

    let (_, _, body) = send(&app, "GET", "/navigate/qra", Some(&cookie), None).await;
    assert_eq!(body["action"], "navigate");
    let (_, _, body) = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["name"], "Mubeen");
}

#[tokio::test]
async fn sign_in_is_scoped_to_the_visitor() {
    let app = app();
    let signed_in = new_session(&app).await;
    let other = new_session(&app).await;
    login(&app, &signed_in).await;

    let (_, _, body) = send(&app, "GET", "/navigate/hazop", Some(&other), None).await;
    assert_eq!(body["action"], "sign_in_required");
}

#[tokio::test]
async fn anonymous_browsing_creates_no_session() {
    let (app, state) = app_and_state(Arc::new(EchoChat));

    for uri in ["/plans", "/support", "/navigation", "/navigate/qra", "/auth/me"] {
        let (status, cookie, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(cookie.is_none(), "{uri} set a cookie");
    }
    send(&app, "POST", "/chat", None, None).await;
    assert_eq!(state.sessions.len().await, 0);

    let (_, cookie, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "mubeen.ahsan@safetyforall.site", "password": "669914"})),
    )
    .await;
    assert!(cookie.is_some());
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test]
async fn login_without_a_cookie_starts_a_session() {
    let app = app();
    let (status, cookie, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "mubeen.ahsan@safetyforall.site", "password": "669914"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("sign-in sets a session cookie");

    let (_, _, body) = send(&app, "GET", "/navigate/lopa", Some(&cookie), None).await;
    assert_eq!(body["action"], "navigate");
}

#[tokio::test]
async fn wrong_credentials_get_a_generic_error() {
    let app = app();
    let cookie = new_session(&app).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/auth/login",
        Some(&cookie),
        Some(json!({"email": "mubeen.ahsan@safetyforall.site", "password": "000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, _, body) = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn logout_relocks_modules() {
    let app = app();
    let cookie = new_session(&app).await;
    login(&app, &cookie).await;

    let (status, cleared, _) = send(&app, "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared.as_deref(), Some("session="));

    let (_, _, body) = send(&app, "GET", "/navigate/fmea", Some(&cookie), None).await;
    assert_eq!(body["action"], "sign_in_required");
}

#[tokio::test]
async fn unknown_views_are_not_found() {
    let app = app();
    let (status, _, _) = send(&app, "GET", "/navigate/dashboard", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menu_reflects_lock_state() {
    let app = app();
    let cookie = new_session(&app).await;

    let (_, _, body) = send(&app, "GET", "/navigation", Some(&cookie), None).await;
    let first = &body["categories"][0]["items"];
    assert_eq!(first[0]["view"], "editor");
    assert_eq!(first[0]["locked"], false);
    assert_eq!(first[1]["locked"], true);
    assert_eq!(body["shortcuts"][0]["view"], "case-studies");
}

#[tokio::test]
async fn chat_starts_with_greeting_and_appends_replies() {
    let app = app();

    let (status, _, body) = send(&app, "POST", "/chat", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["conversation_id"].as_str().unwrap().to_string();
    assert_eq!(body["turns"].as_array().unwrap().len(), 1);
    assert_eq!(body["turns"][0]["role"], "assistant");

    let uri = format!("/chat/{id}/messages");
    let (status, _, reply) = send(&app, "POST", &uri, None, Some(json!({"text": "What is QRA?"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["role"], "assistant");
    assert_eq!(reply["text"], "1 prior turns; you said: What is QRA?");

    let (status, _, _) = send(&app, "POST", &uri, None, Some(json!({"text": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = send(&app, "GET", &format!("/chat/{id}"), None, None).await;
    let roles: Vec<&str> = body["turns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["assistant", "user", "assistant"]);
    assert_eq!(body["sending"], false);
}

#[tokio::test]
async fn chat_failures_become_an_apology() {
    let app = app_with(Arc::new(BrokenChat));
    let (_, _, body) = send(&app, "POST", "/chat", None, None).await;
    let id = body["conversation_id"].as_str().unwrap().to_string();

    let (status, _, reply) = send(
        &app,
        "POST",
        &format!("/chat/{id}/messages"),
        None,
        Some(json!({"text": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["text"].as_str().unwrap().starts_with("I'm sorry"));
}

#[tokio::test]
async fn closed_conversations_are_gone() {
    let app = app();
    let (_, _, body) = send(&app, "POST", "/chat", None, None).await;
    let id = body["conversation_id"].as_str().unwrap().to_string();

    let (status, _, _) = send(&app, "DELETE", &format!("/chat/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, "GET", &format!("/chat/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn plans_show_tax_and_total() {
    let app = app();
    let (_, _, body) = send(&app, "GET", "/plans", None, None).await;
    assert_eq!(body[0]["name"], "Monthly Plan");
    assert_eq!(body[0]["price"], "15.00");
    assert_eq!(body[0]["tax"], "1.50");
    assert_eq!(body[0]["total"], "16.50");
    assert_eq!(body[2]["total"], "110.00");

    let (_, _, support) = send(&app, "GET", "/support", None, None).await;
    assert_eq!(support[0]["email"], "support@sfl.com.pk");
}

async fn wait_for_status(app: &Router, uri: &str, cookie: &str, state: &str) -> Value {
    for _ in 0..100 {
        let (_, _, body) = send(app, "GET", uri, Some(cookie), None).await;
        if body["status"]["state"] == state {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{uri} never reached {state}");
}

fn billing() -> Value {
    json!({
        "full_name": "Mubeen",
        "email": "mubeen.ahsan@safetyforall.site",
        "whatsapp": "+92 300 0000000",
        "address": "1 Plant Road",
        "city": "Karachi",
        "country": "Pakistan"
    })
}

#[tokio::test]
async fn checkout_flow_prefills_validates_and_completes() {
    let app = app();
    let cookie = new_session(&app).await;
    login(&app, &cookie).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/checkout/plan",
        Some(&cookie),
        Some(json!({"name": "Quarterly Plan"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["billing"]["full_name"], "Mubeen");
    assert_eq!(body["plan"]["total"], "33.00");
    assert_eq!(body["status"]["state"], "idle");

    let mut incomplete = billing();
    incomplete["whatsapp"] = json!("");
    let (status, _, _) = send(&app, "POST", "/checkout/submit", Some(&cookie), Some(incomplete)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, body) = send(&app, "POST", "/checkout/submit", Some(&cookie), Some(billing())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"]["state"], "pending");

    wait_for_status(&app, "/checkout", &cookie, "succeeded").await;

    let (_, _, body) = send(
        &app,
        "POST",
        "/checkout/plan",
        Some(&cookie),
        Some(json!({"name": "Yearly Plan"})),
    )
    .await;
    assert_eq!(body["status"]["state"], "idle");
    assert_eq!(body["plan"]["total"], "110.00");
}

#[tokio::test]
async fn checkout_without_a_plan_is_refused() {
    let app = app();
    let cookie = new_session(&app).await;

    let (status, _, _) = send(&app, "POST", "/checkout/submit", Some(&cookie), Some(billing())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        "POST",
        "/checkout/plan",
        Some(&cookie),
        Some(json!({"name": "Lifetime Plan"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trial_request_completes() {
    let app = app();
    let cookie = new_session(&app).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/trial",
        Some(&cookie),
        Some(json!({"name": "John Doe", "email": "john@company.com", "company": "Acme Inc."})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, body) = send(
        &app,
        "POST",
        "/trial",
        Some(&cookie),
        Some(json!({
            "name": "John Doe",
            "email": "john@company.com",
            "company": "Acme Inc.",
            "role": "Safety Manager"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"]["state"], "pending");

    wait_for_status(&app, "/trial", &cookie, "succeeded").await;

    let (status, _, _) = send(&app, "DELETE", "/trial", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, _, body) = send(&app, "GET", "/trial", Some(&cookie), None).await;
    assert_eq!(body["status"]["state"], "idle");
}
