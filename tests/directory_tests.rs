use std::sync::Arc;

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
use countyconnect::db::NewAccount;
use countyconnect::services::Role;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.signing_secret = "integration-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    let state = api::create_app_state_from_config(test_config())
        .await
        .expect("Failed to create app state");
    let app = api::router(state.clone()).await;
    (app, state)
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

/// Seeds an active account and returns an access token for it.
async fn token_for(app: &Router, state: &AppState, email: &str, role: Role) -> String {
    state
        .shared
        .store
        .create_account(NewAccount {
            email: email.to_string(),
            username: None,
            first_name: String::new(),
            last_name: String::new(),
            password: "hunter2hunter2".to_string(),
            role,
            is_active: true,
            is_staff: matches!(role, Role::Admin),
            is_superuser: matches!(role, Role::Admin),
        })
        .await
        .expect("Failed to seed account");

    let (status, body) = send(
        app,
        "POST",
        "/api/accounts/login",
        Some(json!({ "email": email, "password": "hunter2hunter2" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["tokens"]["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn directory_reads_are_public_writes_are_not() {
    let (app, _state) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/locations/counties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!({ "name": "Nairobi", "code": 47 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn county_create_one_or_many() {
    let (app, state) = spawn_app().await;
    let token = token_for(&app, &state, "official@example.com", Role::CountyOfficial).await;

    // Single object.
    let (status, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!({ "name": "Nairobi", "code": 47 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Array of objects in the same endpoint.
    let (status, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!([
            { "name": "Mombasa", "code": 1 },
            { "name": "Kisumu", "code": 42 },
        ])),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Ordered by code.
    let (_, body) = send(&app, "GET", "/api/locations/counties", None, None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Mombasa", "Kisumu", "Nairobi"]);

    // Duplicate county name loses the race at the database.
    let (status, _) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!({ "name": "Nairobi" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn sub_county_crud_with_parent_filter() {
    let (app, state) = spawn_app().await;
    let official = token_for(&app, &state, "official@example.com", Role::CountyOfficial).await;
    let admin = token_for(&app, &state, "admin@example.com", Role::Admin).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!([{ "name": "Nairobi", "code": 47 }, { "name": "Kisumu", "code": 42 }])),
        Some(&official),
    )
    .await;
    let nairobi = body["data"][0]["id"].as_i64().unwrap();
    let kisumu = body["data"][1]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/locations/sub-counties",
        Some(json!([
            { "county_id": nairobi, "name": "Westlands", "code": "WST", "population": 310000 },
            { "county_id": kisumu, "name": "Kisumu East", "code": "KSE", "population": 220000 },
        ])),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let westlands = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/locations/sub-counties?county_id={nairobi}"),
        None,
        None,
    )
    .await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Westlands");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/locations/sub-counties/{westlands}"),
        Some(json!({ "county_id": nairobi, "name": "Westlands", "code": "WST", "population": 320000 })),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["population"], 320000);

    // Deletion is administrative.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/locations/sub-counties/{westlands}"),
        None,
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/locations/sub-counties/{westlands}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/locations/sub-counties/{westlands}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn geography_chain_down_to_wards() {
    let (app, state) = spawn_app().await;
    let token = token_for(&app, &state, "official@example.com", Role::CountyOfficial).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!({ "name": "Nakuru", "code": 32 })),
        Some(&token),
    )
    .await;
    let county = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/sub-counties",
        Some(json!({ "county_id": county, "name": "Naivasha", "code": "NVS", "population": 355000 })),
        Some(&token),
    )
    .await;
    let sub_county = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/constituencies",
        Some(json!({ "sub_county_id": sub_county, "name": "Naivasha", "code": "290" })),
        Some(&token),
    )
    .await;
    let constituency = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/locations/wards",
        Some(json!([
            { "constituency_id": constituency, "name": "Hells Gate", "code": "1448" },
            { "constituency_id": constituency, "name": "Lake View", "code": "1449" },
        ])),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/locations/wards?constituency_id={constituency}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn department_crud_with_filters() {
    let (app, state) = spawn_app().await;
    let official = token_for(&app, &state, "official@example.com", Role::CountyOfficial).await;
    let admin = token_for(&app, &state, "admin@example.com", Role::Admin).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!([{ "name": "Nairobi", "code": 47 }, { "name": "Kisumu", "code": 42 }])),
        Some(&official),
    )
    .await;
    let nairobi = body["data"][0]["id"].as_i64().unwrap();
    let kisumu = body["data"][1]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/departments/categories",
        Some(json!([{ "name": "Health", "description": "Health services" }, { "name": "Water" }])),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let health = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/departments",
        Some(json!([
            {
                "county_id": nairobi,
                "category_id": health,
                "name": "Public Health",
                "email": "health@nairobi.go.ke",
                "budget_allocated": 1200000.0,
                "staff_count": 85
            },
            { "county_id": kisumu, "name": "Water and Sanitation" },
        ])),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let department = body["data"][0]["id"].as_i64().unwrap();
    assert_eq!(body["data"][0]["active"], true);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/departments?county_id={nairobi}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/departments?category_id={health}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"][0]["name"], "Public Health");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/departments/{department}"),
        Some(json!({
            "county_id": nairobi,
            "category_id": health,
            "name": "Public Health",
            "email": "ph@nairobi.go.ke",
            "staff_count": 90
        })),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ph@nairobi.go.ke");

    let (status, body) = send(
        &app,
        "POST",
        "/api/departments/contacts",
        Some(json!([
            { "department_id": department, "contact_type": "EMAIL", "value": "ph@nairobi.go.ke" },
            { "department_id": department, "contact_type": "TWITTER", "value": "@nairobihealth" },
        ])),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contact = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/departments/contacts?department_id={department}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/departments/contacts/{contact}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/departments/{department}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn units_and_officers_lifecycle() {
    let (app, state) = spawn_app().await;
    let official = token_for(&app, &state, "official@example.com", Role::CountyOfficial).await;
    let admin = token_for(&app, &state, "admin@example.com", Role::Admin).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/locations/counties",
        Some(json!({ "name": "Machakos", "code": 16 })),
        Some(&official),
    )
    .await;
    let county = body["data"][0]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        "POST",
        "/api/departments",
        Some(json!({ "county_id": county, "name": "Roads and Transport" })),
        Some(&official),
    )
    .await;
    let department = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/departments/units",
        Some(json!({ "department_id": department, "name": "Road Maintenance" })),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let unit = body["data"][0]["id"].as_i64().unwrap();

    let officer_account = state
        .shared
        .store
        .create_account(NewAccount {
            email: "engineer@example.com".to_string(),
            username: None,
            first_name: "Juma".to_string(),
            last_name: "Odhiambo".to_string(),
            password: "hunter2hunter2".to_string(),
            role: Role::CountyOfficial,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        })
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/departments/officers",
        Some(json!({
            "department_id": department,
            "unit_id": unit,
            "account_id": officer_account.id,
            "position": "Chief Engineer",
            "is_head": true
        })),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["is_head"], true);
    let officer = body["data"][0]["id"].as_i64().unwrap();

    // One account, one officer record.
    let (status, _) = send(
        &app,
        "POST",
        "/api/departments/officers",
        Some(json!({
            "department_id": department,
            "account_id": officer_account.id,
            "position": "Duplicate posting"
        })),
        Some(&official),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/departments/officers?department_id={department}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/departments/officers/{officer}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/departments/units/{unit}"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn system_status_is_public() {
    let (app, _state) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/system/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database_ok"], true);
    assert!(body["data"]["version"].is_string());
}
