//! Geography directory endpoints: counties down to wards.
//!
//! Reads are public. Creation and updates need an elevated role, deletion
//! is administrative.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::{ApiError, ApiResponse, AppState, OneOrMany};
use crate::db::{NewConstituency, NewCounty, NewSubCounty, NewWard};
use crate::entities::{constituencies, counties, sub_counties, wards};
use crate::services::policy;

#[derive(Debug, Deserialize)]
pub struct SubCountyQuery {
    pub county_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ConstituencyQuery {
    pub sub_county_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct WardQuery {
    pub constituency_id: Option<i32>,
}

// ---- Counties ----

pub async fn list_counties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<counties::Model>>>, ApiError> {
    let counties = state.shared.store.list_counties().await?;
    Ok(Json(ApiResponse::success(counties)))
}

pub async fn get_county(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<counties::Model>>, ApiError> {
    let county = state
        .shared
        .store
        .get_county(id)
        .await?
        .ok_or_else(|| ApiError::not_found("County", id))?;
    Ok(Json(ApiResponse::success(county)))
}

pub async fn create_counties(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewCounty>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<counties::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state.shared.store.create_counties(payload.into_vec()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

// ---- Sub-counties ----

pub async fn list_sub_counties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubCountyQuery>,
) -> Result<Json<ApiResponse<Vec<sub_counties::Model>>>, ApiError> {
    let sub_counties = state.shared.store.list_sub_counties(query.county_id).await?;
    Ok(Json(ApiResponse::success(sub_counties)))
}

pub async fn get_sub_county(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<sub_counties::Model>>, ApiError> {
    let sub_county = state
        .shared
        .store
        .get_sub_county(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-county", id))?;
    Ok(Json(ApiResponse::success(sub_county)))
}

pub async fn create_sub_counties(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewSubCounty>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<sub_counties::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_sub_counties(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_sub_county(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<NewSubCounty>,
) -> Result<Json<ApiResponse<sub_counties::Model>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let updated = state
        .shared
        .store
        .update_sub_county(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-county", id))?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_sub_county(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_sub_county(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Sub-county", id))
    }
}

// ---- Constituencies ----

pub async fn list_constituencies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConstituencyQuery>,
) -> Result<Json<ApiResponse<Vec<constituencies::Model>>>, ApiError> {
    let constituencies = state
        .shared
        .store
        .list_constituencies(query.sub_county_id)
        .await?;
    Ok(Json(ApiResponse::success(constituencies)))
}

pub async fn get_constituency(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<constituencies::Model>>, ApiError> {
    let constituency = state
        .shared
        .store
        .get_constituency(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Constituency", id))?;
    Ok(Json(ApiResponse::success(constituency)))
}

pub async fn create_constituencies(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewConstituency>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<constituencies::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_constituencies(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_constituency(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<NewConstituency>,
) -> Result<Json<ApiResponse<constituencies::Model>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let updated = state
        .shared
        .store
        .update_constituency(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Constituency", id))?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_constituency(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_constituency(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Constituency", id))
    }
}

// ---- Wards ----

pub async fn list_wards(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WardQuery>,
) -> Result<Json<ApiResponse<Vec<wards::Model>>>, ApiError> {
    let wards = state.shared.store.list_wards(query.constituency_id).await?;
    Ok(Json(ApiResponse::success(wards)))
}

pub async fn get_ward(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<wards::Model>>, ApiError> {
    let ward = state
        .shared
        .store
        .get_ward(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ward", id))?;
    Ok(Json(ApiResponse::success(ward)))
}

pub async fn create_wards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewWard>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<wards::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state.shared.store.create_wards(payload.into_vec()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_ward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<NewWard>,
) -> Result<Json<ApiResponse<wards::Model>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let updated = state
        .shared
        .store
        .update_ward(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Ward", id))?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_ward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_ward(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Ward", id))
    }
}
