use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use countyconnect::api::{self, AppState};
use countyconnect::config::Config;
use countyconnect::db::{NewAccount, Store};
use countyconnect::services::notifier::{DeliveryError, Notifier};
use countyconnect::services::Role;

#[derive(Debug, Clone)]
struct CapturedMessage {
    subject: String,
    body: String,
    recipient: String,
}

/// Stand-in transport that records instead of sending.
#[derive(Default)]
struct CapturingNotifier {
    messages: Mutex<Vec<CapturedMessage>>,
}

impl CapturingNotifier {
    fn take_last(&self) -> Option<CapturedMessage> {
        self.messages.lock().unwrap().pop()
    }

    fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl Notifier for CapturingNotifier {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        self.messages.lock().unwrap().push(CapturedMessage {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
        });
        Ok(())
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.signing_secret = "integration-test-secret".to_string();
    // Cheap hashing parameters keep the suite fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> (Router, Arc<AppState>, Arc<CapturingNotifier>) {
    let notifier = Arc::new(CapturingNotifier::default());
    let state = api::create_app_state_with_notifier(test_config(), notifier.clone())
        .await
        .expect("Failed to create app state");
    let app = api::router(state.clone()).await;
    (app, state, notifier)
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(payload), None).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    payload: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match payload {
        Some(payload) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Pulls the first http(s) URL out of a message body.
fn extract_link(body: &str) -> String {
    body.split_whitespace()
        .find(|word| word.starts_with("http"))
        .expect("message contains no link")
        .to_string()
}

/// Splits `.../{account_ref}/{token}/` into its last two path segments.
fn link_parts(link: &str) -> (String, String) {
    let trimmed = link.trim_end_matches('/');
    let mut segments = trimmed.rsplit('/');
    let token = segments.next().unwrap().to_string();
    let account_ref = segments.next().unwrap().to_string();
    (account_ref, token)
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/api/accounts/register",
        json!({
            "email": email,
            "first_name": "Wanjiku",
            "last_name": "Kamau",
            "password": password,
        }),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/api/accounts/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

/// Seeds an already-active account directly, the way `create-admin` does.
async fn seed_account(state: &AppState, email: &str, password: &str, role: Role) -> i32 {
    let account = state
        .shared
        .store
        .create_account(NewAccount {
            email: email.to_string(),
            username: None,
            first_name: String::new(),
            last_name: String::new(),
            password: password.to_string(),
            role,
            is_active: true,
            is_staff: matches!(role, Role::Admin),
            is_superuser: matches!(role, Role::Admin),
        })
        .await
        .expect("Failed to seed account");
    account.id
}

#[tokio::test]
async fn register_verify_login_happy_path() {
    let (app, _state, notifier) = spawn_app().await;

    let (status, body) = register(&app, "wanjiku@example.com", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "wanjiku@example.com");
    assert_eq!(body["data"]["role"], "VIEWER");
    assert_eq!(body["data"]["is_active"], false);

    // Correct password but unverified email.
    let (status, _) = login(&app, "wanjiku@example.com", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let message = notifier.take_last().expect("verification email captured");
    assert_eq!(message.recipient, "wanjiku@example.com");
    assert!(message.subject.contains("Verify"));

    let (account_ref, token) = link_parts(&extract_link(&message.body));
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/accounts/verify-email/{account_ref}/{token}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "wanjiku@example.com", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tokens"]["access"].is_string());
    assert!(body["data"]["tokens"]["refresh"].is_string());
    assert_eq!(body["data"]["user"]["role"], "VIEWER");
}

#[tokio::test]
async fn registration_forces_viewer_role_and_inactive() {
    let (app, _state, _notifier) = spawn_app().await;

    // Caller-supplied role and is_active must be ignored.
    let (status, body) = post_json(
        &app,
        "/api/accounts/register",
        json!({
            "email": "sneaky@example.com",
            "password": "hunter2hunter2",
            "role": "ADMIN",
            "is_active": true,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "VIEWER");
    assert_eq!(body["data"]["is_active"], false);
}

#[tokio::test]
async fn duplicate_email_is_conflict_regardless_of_case() {
    let (app, _state, _notifier) = spawn_app().await;

    let (status, _) = register(&app, "dup@example.com", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = register(&app, "DUP@Example.COM", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_and_bad_email_rejected() {
    let (app, _state, _notifier) = spawn_app().await;

    let (status, _) = register(&app, "valid@example.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "not-an-email", "hunter2hunter2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verification_link_is_single_use() {
    let (app, _state, notifier) = spawn_app().await;

    register(&app, "once@example.com", "hunter2hunter2").await;
    let message = notifier.take_last().unwrap();
    let (account_ref, token) = link_parts(&extract_link(&message.body));

    let uri = format!("/api/accounts/verify-email/{account_ref}/{token}/");
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Activation changed the state the token was derived from.
    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tampered_link_fails_closed() {
    let (app, _state, notifier) = spawn_app().await;

    register(&app, "tamper@example.com", "hunter2hunter2").await;
    let message = notifier.take_last().unwrap();
    let (account_ref, token) = link_parts(&extract_link(&message.body));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/accounts/verify-email/{account_ref}/{token}x/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/accounts/verify-email/bogusref/{token}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, state, _notifier) = spawn_app().await;

    seed_account(&state, "known@example.com", "hunter2hunter2", Role::Citizen).await;

    let (status_unknown, body_unknown) = login(&app, "nobody@example.com", "whatever123").await;
    let (status_wrong, body_wrong) = login(&app, "known@example.com", "wrongpassword").await;

    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(body_unknown["error"], body_wrong["error"]);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let (app, state, notifier) = spawn_app().await;

    seed_account(&state, "reset@example.com", "originalpass1", Role::Citizen).await;

    let (status, _) = post_json(
        &app,
        "/api/accounts/request-password-reset",
        json!({ "email": "reset@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let message = notifier.take_last().expect("reset email captured");
    let (account_ref, token) = link_parts(&extract_link(&message.body));
    let uri = format!("/api/accounts/reset-password/{account_ref}/{token}/");

    // Mismatched confirmation leaves the credential unchanged.
    let (status, _) = post_json(
        &app,
        &uri,
        json!({ "password": "newpassword1", "confirm_password": "different1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = login(&app, "reset@example.com", "originalpass1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &app,
        &uri,
        json!({ "password": "newpassword1", "confirm_password": "newpassword1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "reset@example.com", "originalpass1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "reset@example.com", "newpassword1").await;
    assert_eq!(status, StatusCode::OK);

    // The consumed link no longer matches the rotated credential.
    let (status, _) = post_json(
        &app,
        &uri,
        json!({ "password": "thirdpassword1", "confirm_password": "thirdpassword1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_request_does_not_reveal_account_existence() {
    let (app, state, notifier) = spawn_app().await;

    seed_account(&state, "exists@example.com", "hunter2hunter2", Role::Citizen).await;

    let (status_known, body_known) = post_json(
        &app,
        "/api/accounts/request-password-reset",
        json!({ "email": "exists@example.com" }),
    )
    .await;
    let (status_unknown, body_unknown) = post_json(
        &app,
        "/api/accounts/request-password-reset",
        json!({ "email": "ghost@example.com" }),
    )
    .await;

    assert_eq!(status_known, StatusCode::OK);
    assert_eq!(status_unknown, StatusCode::OK);
    assert_eq!(body_known, body_unknown);

    // Only the real account got a message.
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn refresh_reissues_a_pair() {
    let (app, state, _notifier) = spawn_app().await;

    seed_account(&state, "fresh@example.com", "hunter2hunter2", Role::Citizen).await;
    let (_, body) = login(&app, "fresh@example.com", "hunter2hunter2").await;
    let access = body["data"]["tokens"]["access"].as_str().unwrap().to_string();
    let refresh = body["data"]["tokens"]["refresh"].as_str().unwrap().to_string();

    let (status, body) = post_json(&app, "/api/accounts/refresh", json!({ "refresh": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access"].is_string());
    assert!(body["data"]["refresh"].is_string());

    // An access token is not accepted where a refresh token is expected.
    let (status, _) = post_json(&app, "/api/accounts/refresh", json!({ "refresh": access })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_requires_elevated_role() {
    let (app, state, _notifier) = spawn_app().await;

    seed_account(&state, "viewer@example.com", "hunter2hunter2", Role::Viewer).await;
    seed_account(&state, "citizen@example.com", "hunter2hunter2", Role::Citizen).await;

    // Anonymous is 401.
    let (status, _) = send(&app, "GET", "/api/accounts/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/accounts/me", None, Some("garbage.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authenticated but unelevated is 403.
    let (_, body) = login(&app, "viewer@example.com", "hunter2hunter2").await;
    let viewer_token = body["data"]["tokens"]["access"].as_str().unwrap().to_string();
    let (status, _) = send(&app, "GET", "/api/accounts/me", None, Some(&viewer_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = login(&app, "citizen@example.com", "hunter2hunter2").await;
    let citizen_token = body["data"]["tokens"]["access"].as_str().unwrap().to_string();
    let (status, body) = send(&app, "GET", "/api/accounts/me", None, Some(&citizen_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "citizen@example.com");
}

#[tokio::test]
async fn profile_update_merges_partial_fields() {
    let (app, state, _notifier) = spawn_app().await;

    seed_account(&state, "patch@example.com", "hunter2hunter2", Role::Citizen).await;
    let (_, body) = login(&app, "patch@example.com", "hunter2hunter2").await;
    let token = body["data"]["tokens"]["access"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/accounts/me",
        Some(json!({ "bio": "County planner", "first_name": "Atieno" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "County planner");
    assert_eq!(body["data"]["user"]["first_name"], "Atieno");

    // Untouched fields survive a second partial update.
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/accounts/me",
        Some(json!({ "phone": "+254700000000" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "County planner");
    assert_eq!(body["data"]["phone"], "+254700000000");
}

#[tokio::test]
async fn role_change_is_admin_only() {
    let (app, state, _notifier) = spawn_app().await;

    let target_id = seed_account(&state, "target@example.com", "hunter2hunter2", Role::Viewer).await;
    seed_account(&state, "official@example.com", "hunter2hunter2", Role::CountyOfficial).await;
    seed_account(&state, "admin@example.com", "hunter2hunter2", Role::Admin).await;

    let (_, body) = login(&app, "official@example.com", "hunter2hunter2").await;
    let official_token = body["data"]["tokens"]["access"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/accounts/{target_id}/role"),
        Some(json!({ "role": "CITIZEN" })),
        Some(&official_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = login(&app, "admin@example.com", "hunter2hunter2").await;
    let admin_token = body["data"]["tokens"]["access"].as_str().unwrap().to_string();
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/accounts/{target_id}/role"),
        Some(json!({ "role": "CITIZEN" })),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "CITIZEN");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/accounts/999999/role",
        Some(json!({ "role": "CITIZEN" })),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provisioned_admin_email_is_normalized() {
    let mut config = test_config();
    // A shared on-disk database, because provisioning opens its own store.
    let db_path = std::env::temp_dir().join(format!(
        "countyconnect-admin-{}.sqlite",
        std::process::id()
    ));
    std::fs::remove_file(&db_path).ok();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    countyconnect::cli::create_admin(
        &config,
        "  Admin@Example.COM ".to_string(),
        "hunter2hunter2".to_string(),
        None,
        "Root".to_string(),
        String::new(),
    )
    .await
    .expect("Failed to provision administrator");

    let store = Store::new(&config.general.database_path, config.security.clone())
        .await
        .expect("Failed to reopen store");

    let account = store
        .get_account_by_email("admin@example.com")
        .await
        .unwrap()
        .expect("administrator not found by the lowercase lookup login uses");
    assert_eq!(account.email, "admin@example.com");
    assert!(matches!(account.role, Role::Admin));
    assert!(account.is_active);

    // Uniqueness holds across case variants of the same address.
    let duplicate = countyconnect::cli::create_admin(
        &config,
        "ADMIN@example.com".to_string(),
        "hunter2hunter2".to_string(),
        None,
        String::new(),
        String::new(),
    )
    .await;
    assert!(duplicate.is_err());

    std::fs::remove_file(&db_path).ok();
}
