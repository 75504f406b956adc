use axum::{
    Extension, Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header, request::Parts},
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::sync::Arc;
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite};

use super::{
    AccessTokenResponse, ApiError, ApiResponse, AppState, ChangePasswordRequest, FormBody,
    JsonBody, LoginResponse, MessageResponse, QueryParams, RefreshQuery, RequestUserId,
    SessionUserResponse, TokenRequest,
};
use crate::constants::auth::{LOGIN_COOKIE, SESSION_USER_KEY, TOKEN_TYPE};
use crate::models::user::User;
use crate::services::TokenPair;

// ============================================================================
// Extractors
// ============================================================================

/// Raw token from an `Authorization: Bearer <token>` header.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Self(t.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Invalid or missing Authorization header"))
    }
}

/// Credentials from an `Authorization: Basic <base64>` header.
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_basic_auth(&parts.headers).ok_or_else(|| ApiError::basic_auth("Not authenticated"))
    }
}

fn parse_basic_auth(headers: &HeaderMap) -> Option<BasicCredentials> {
    let encoded = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

// ============================================================================
// Token Handlers
// ============================================================================

/// POST /api/v1/auth/token
/// Exchange form credentials for an access and refresh token
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    FormBody(payload): FormBody<TokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    let auth = state.auth_service();
    let user = auth
        .authenticate(&payload.username, &payload.password)
        .await?;
    let tokens = auth.issue_tokens(&user)?;

    tracing::info!(username = %user.username, "Issued bearer tokens");
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /api/v1/auth/refresh
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<RefreshQuery>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, ApiError> {
    let access_token = state.auth_service().refresh(&query.refresh_token).await?;

    Ok(Json(ApiResponse::success(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    })))
}

/// GET /api/v1/auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<(Extension<RequestUserId>, Json<ApiResponse<User>>), ApiError> {
    let user = state.auth_service().current_user(&token).await?;

    Ok((
        Extension(RequestUserId(user.id)),
        Json(ApiResponse::success(user)),
    ))
}

/// PUT /api/v1/auth/password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<(Extension<RequestUserId>, Json<ApiResponse<MessageResponse>>), ApiError> {
    let auth = state.auth_service();
    let user = auth.current_user(&token).await?;

    auth.change_password(
        &user.username,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;

    Ok((
        Extension(RequestUserId(user.id)),
        Json(ApiResponse::success(MessageResponse::new(
            "Password updated successfully",
        ))),
    ))
}

// ============================================================================
// Session and Cookie Handlers
// ============================================================================

async fn authenticate_basic(
    state: &AppState,
    credentials: &BasicCredentials,
) -> Result<User, ApiError> {
    state
        .auth_service()
        .authenticate(&credentials.username, &credentials.password)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Unauthorized(msg) => ApiError::basic_auth(msg),
            other => other,
        })
}

/// POST /api/v1/auth/login
/// Verify Basic credentials and remember the user in the server-side session
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    credentials: BasicCredentials,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = authenticate_basic(&state, &credentials).await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(SESSION_USER_KEY, &user.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(username = %user.username, "Session login");
    Ok(Json(ApiResponse::success(LoginResponse {
        message: "Login successful".to_string(),
        username: user.username,
    })))
}

/// POST /api/v1/auth/login/cookie
/// Verify Basic credentials and set an HttpOnly cookie naming the user
pub async fn login_with_cookie(
    State(state): State<Arc<AppState>>,
    credentials: BasicCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let user = authenticate_basic(&state, &credentials).await?;
    let secure = state.config().read().await.server.secure_cookies;

    let cookie = Cookie::build((LOGIN_COOKIE, user.username.clone()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build();

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(ApiResponse::success(LoginResponse {
            message: "Login successful".to_string(),
            username: user.username,
        })),
    ))
}

/// GET|POST /api/v1/auth/session
pub async fn session_user(
    session: Session,
) -> Result<Json<ApiResponse<SessionUserResponse>>, ApiError> {
    let username = get_session_username(&session).await?;
    Ok(Json(ApiResponse::success(SessionUserResponse { username })))
}

/// POST /api/v1/auth/logout
/// Invalidate the current session
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to clear session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logout successful",
    ))))
}

// ============================================================================
// Helpers
// ============================================================================

/// Get username from session, returns error if not logged in
async fn get_session_username(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::unauthorized("User not logged in"))
}
