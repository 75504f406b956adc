use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::validation::{validate_limit, validate_search_query, validate_skip, validate_user_id};
use super::{ApiError, ApiResponse, AppState, JsonBody, PathParam, QueryParams, UserDeleteResponse};
use crate::models::user::{NewUser, User, UserChanges, UserPage, UserQuery};

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.user_service().create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Result<Json<ApiResponse<UserPage>>, ApiError> {
    let query = UserQuery {
        skip: validate_skip(query.skip)?,
        limit: validate_limit(query.limit)?,
        search: validate_search_query(query.search)?,
    };

    let page = state.user_service().list_users(&query).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /api/v1/users/{id}
/// Only fields present in the body are changed.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<UserChanges>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_user_id(id)?;
    let user = state.user_service().update_user(id, payload).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ApiResponse<UserDeleteResponse>>, ApiError> {
    let id = validate_user_id(id)?;
    let deleted_user_id = state.user_service().delete_user(id).await?;

    Ok(Json(ApiResponse::success(UserDeleteResponse {
        message: "User deleted successfully".to_string(),
        deleted_user_id,
    })))
}
