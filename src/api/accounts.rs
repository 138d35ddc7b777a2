//! Account lifecycle and profile endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::{ApiError, ApiResponse, AppState, MessageResponse, double_option};
use crate::services::policy;
use crate::services::{
    AccountInfo, LoginOutcome, ProfileInfo, ProfileUpdate, Registration, Role, SessionTokens,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Absent leaves the avatar untouched; explicit null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// POST /api/accounts/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountInfo>>), ApiError> {
    let account = state
        .shared
        .accounts
        .register(Registration {
            email: payload.email,
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

/// GET /api/accounts/verify-email/{ref}/{token}
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    Path((account_ref, token)): Path<(String, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .accounts
        .verify_email(&account_ref, &token)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Email verified successfully. You can now log in.",
    ))))
}

/// POST /api/accounts/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginOutcome>>, ApiError> {
    let outcome = state
        .shared
        .accounts
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(outcome)))
}

/// POST /api/accounts/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<SessionTokens>>, ApiError> {
    let tokens = state.shared.accounts.refresh(&payload.refresh).await?;

    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /api/accounts/request-password-reset
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .accounts
        .request_password_reset(&payload.email)
        .await?;

    // Same response whether or not an account exists.
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "If an account with that email exists, a password reset link has been sent.",
    ))))
}

/// POST /api/accounts/reset-password/{ref}/{token}
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path((account_ref, token)): Path<(String, String)>,
    Json(payload): Json<PasswordResetConfirmRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .shared
        .accounts
        .confirm_password_reset(
            &account_ref,
            &token,
            &payload.password,
            &payload.confirm_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password has been reset successfully.",
    ))))
}

/// GET /api/accounts/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let profile = state.shared.accounts.get_or_create_profile(user.id).await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// PATCH /api/accounts/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let profile = state
        .shared
        .accounts
        .update_profile(
            user.id,
            ProfileUpdate {
                bio: payload.bio,
                phone: payload.phone,
                location: payload.location,
                avatar_url: payload.avatar_url,
                first_name: payload.first_name,
                last_name: payload.last_name,
                username: payload.username,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /api/accounts/{id}/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    let account = state.shared.accounts.set_role(id, payload.role).await?;

    Ok(Json(ApiResponse::success(account)))
}
