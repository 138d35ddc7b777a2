use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::Notifier;
use crate::state::SharedState;

mod accounts;
pub mod auth;
mod departments;
mod error;
mod locations;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

pub async fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared).await)
}

/// Test constructor: swaps the outbound mail transport so lifecycle links
/// can be captured instead of sent.
pub async fn create_app_state_with_notifier(
    config: Config,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_notifier(config, notifier).await?);
    Ok(create_app_state(shared).await)
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.shared.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/accounts/register", post(accounts::register))
        .route(
            "/accounts/verify-email/{account_ref}/{token}",
            get(accounts::verify_email),
        )
        // Emailed links carry a trailing slash.
        .route(
            "/accounts/verify-email/{account_ref}/{token}/",
            get(accounts::verify_email),
        )
        .route("/accounts/login", post(accounts::login))
        .route("/accounts/refresh", post(accounts::refresh))
        .route(
            "/accounts/request-password-reset",
            post(accounts::request_password_reset),
        )
        .route(
            "/accounts/reset-password/{account_ref}/{token}",
            post(accounts::reset_password),
        )
        .route(
            "/accounts/reset-password/{account_ref}/{token}/",
            post(accounts::reset_password),
        )
        .route("/locations/counties", get(locations::list_counties))
        .route("/locations/counties/{id}", get(locations::get_county))
        .route("/locations/sub-counties", get(locations::list_sub_counties))
        .route(
            "/locations/sub-counties/{id}",
            get(locations::get_sub_county),
        )
        .route(
            "/locations/constituencies",
            get(locations::list_constituencies),
        )
        .route(
            "/locations/constituencies/{id}",
            get(locations::get_constituency),
        )
        .route("/locations/wards", get(locations::list_wards))
        .route("/locations/wards/{id}", get(locations::get_ward))
        .route(
            "/departments/categories",
            get(departments::list_categories),
        )
        .route("/departments", get(departments::list_departments))
        .route("/departments/{id}", get(departments::get_department))
        .route("/departments/units", get(departments::list_units))
        .route("/departments/officers", get(departments::list_officers))
        .route("/departments/contacts", get(departments::list_contacts))
        .route("/system/status", get(system::get_status))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/me", get(accounts::get_me))
        .route("/accounts/me", patch(accounts::update_me))
        .route("/accounts/{id}/role", put(accounts::set_role))
        .route("/locations/counties", post(locations::create_counties))
        .route(
            "/locations/sub-counties",
            post(locations::create_sub_counties),
        )
        .route(
            "/locations/sub-counties/{id}",
            put(locations::update_sub_county),
        )
        .route(
            "/locations/sub-counties/{id}",
            delete(locations::delete_sub_county),
        )
        .route(
            "/locations/constituencies",
            post(locations::create_constituencies),
        )
        .route(
            "/locations/constituencies/{id}",
            put(locations::update_constituency),
        )
        .route(
            "/locations/constituencies/{id}",
            delete(locations::delete_constituency),
        )
        .route("/locations/wards", post(locations::create_wards))
        .route("/locations/wards/{id}", put(locations::update_ward))
        .route("/locations/wards/{id}", delete(locations::delete_ward))
        .route(
            "/departments/categories",
            post(departments::create_categories),
        )
        .route(
            "/departments/categories/{id}",
            delete(departments::delete_category),
        )
        .route("/departments", post(departments::create_departments))
        .route("/departments/{id}", put(departments::update_department))
        .route("/departments/{id}", delete(departments::delete_department))
        .route("/departments/units", post(departments::create_units))
        .route("/departments/units/{id}", delete(departments::delete_unit))
        .route("/departments/officers", post(departments::create_officers))
        .route(
            "/departments/officers/{id}",
            delete(departments::delete_officer),
        )
        .route("/departments/contacts", post(departments::create_contacts))
        .route(
            "/departments/contacts/{id}",
            delete(departments::delete_contact),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
