//! Department directory endpoints: categories, departments, units,
//! officers and published contacts.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::{ApiError, ApiResponse, AppState, OneOrMany};
use crate::db::{DepartmentFilter, NewCategory, NewContact, NewDepartment, NewOfficer, NewUnit};
use crate::entities::{
    department_categories, department_contacts, department_officers, department_units, departments,
};
use crate::services::policy;

#[derive(Debug, Deserialize)]
pub struct DepartmentQuery {
    pub county_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentChildQuery {
    pub department_id: Option<i32>,
}

// ---- Categories ----

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<department_categories::Model>>>, ApiError> {
    let categories = state.shared.store.list_department_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn create_categories(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewCategory>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<department_categories::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_department_categories(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_department_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Department category", id))
    }
}

// ---- Departments ----

pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentQuery>,
) -> Result<Json<ApiResponse<Vec<departments::Model>>>, ApiError> {
    let departments = state
        .shared
        .store
        .list_departments(DepartmentFilter {
            county_id: query.county_id,
            category_id: query.category_id,
        })
        .await?;
    Ok(Json(ApiResponse::success(departments)))
}

pub async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<departments::Model>>, ApiError> {
    let department = state
        .shared
        .store
        .get_department(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Department", id))?;
    Ok(Json(ApiResponse::success(department)))
}

pub async fn create_departments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewDepartment>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<departments::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_departments(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<NewDepartment>,
) -> Result<Json<ApiResponse<departments::Model>>, ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let updated = state
        .shared
        .store
        .update_department(id, payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Department", id))?;
    Ok(Json(ApiResponse::success(updated)))
}

pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_department(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Department", id))
    }
}

// ---- Units ----

pub async fn list_units(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentChildQuery>,
) -> Result<Json<ApiResponse<Vec<department_units::Model>>>, ApiError> {
    let units = state
        .shared
        .store
        .list_department_units(query.department_id)
        .await?;
    Ok(Json(ApiResponse::success(units)))
}

pub async fn create_units(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewUnit>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<department_units::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_department_units(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn delete_unit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_department_unit(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Department unit", id))
    }
}

// ---- Officers ----

pub async fn list_officers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentChildQuery>,
) -> Result<Json<ApiResponse<Vec<department_officers::Model>>>, ApiError> {
    let officers = state
        .shared
        .store
        .list_department_officers(query.department_id)
        .await?;
    Ok(Json(ApiResponse::success(officers)))
}

pub async fn create_officers(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewOfficer>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<department_officers::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_department_officers(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn delete_officer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_department_officer(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Department officer", id))
    }
}

// ---- Contacts ----

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentChildQuery>,
) -> Result<Json<ApiResponse<Vec<department_contacts::Model>>>, ApiError> {
    let contacts = state
        .shared
        .store
        .list_department_contacts(query.department_id)
        .await?;
    Ok(Json(ApiResponse::success(contacts)))
}

pub async fn create_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OneOrMany<NewContact>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<department_contacts::Model>>>), ApiError> {
    auth::require(&user, policy::ELEVATED)?;

    let created = state
        .shared
        .store
        .create_department_contacts(payload.into_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth::require(&user, policy::ADMIN_ONLY)?;

    if state.shared.store.delete_department_contact(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Department contact", id))
    }
}
