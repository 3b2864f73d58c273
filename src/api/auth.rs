//! Authentication API endpoints
//!
//! Handles HTTP requests for user authentication:
//! - POST /api/v1/auth/register - User registration
//! - POST /api/v1/auth/login - User login
//! - POST /api/v1/auth/logout - User logout
//! - GET /api/v1/auth/me - Get current user

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::api::middleware::{
    session_token_from_headers, ApiError, AppState, AuthenticatedUser,
};
use crate::api::responses::UserResponse;
use crate::services::user::{LoginInput, RegisterInput};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for first-run setup check
#[derive(Debug, Serialize)]
pub struct HasAdminResponse {
    pub has_admin: bool,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/has-admin", get(has_admin))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// GET /api/v1/auth/has-admin - Check if an admin exists
///
/// Used by the first-time setup flow; the first registration creates the
/// admin account.
async fn has_admin(State(state): State<AppState>) -> Result<Json<HasAdminResponse>, ApiError> {
    let is_first = state.user_service.is_first_user().await?;
    Ok(Json(HasAdminResponse {
        has_admin: !is_first,
    }))
}

/// POST /api/v1/auth/register - User registration
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let password = request.password.clone();

    let user = state
        .user_service
        .register(RegisterInput {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;

    // Log the fresh account in right away
    let session = state
        .user_service
        .login(LoginInput::new(user.username.clone(), password))
        .await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token: session.id,
    }))
}

/// POST /api/v1/auth/login - User login
///
/// Rate limited per username (5 failures / 15 min) and per client IP
/// (10 attempts / min).
async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let ip = addr.ip();
    if state.rate_limiter.is_ip_limited(ip).await {
        return Err(ApiError::rate_limited("Too many login attempts"));
    }
    state.rate_limiter.record_ip_request(ip).await;

    if state
        .rate_limiter
        .is_username_limited(&request.username_or_email)
        .await
    {
        return Err(ApiError::rate_limited(
            "Too many failed logins for this account",
        ));
    }

    let session = match state
        .user_service
        .login(LoginInput::new(
            request.username_or_email.clone(),
            request.password,
        ))
        .await
    {
        Ok(session) => session,
        Err(e) => {
            state
                .rate_limiter
                .record_failed_attempt(&request.username_or_email)
                .await;
            return Err(e.into());
        }
    };

    state
        .rate_limiter
        .clear_username_attempts(&request.username_or_email)
        .await;

    let user = state
        .user_service
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Session user vanished"))?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token: session.id,
    }))
}

/// POST /api/v1/auth/logout - User logout
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(token) = session_token_from_headers(&headers) {
        state.user_service.logout(&token).await?;
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/v1/auth/me - Get current user
async fn get_current_user(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<UserResponse> {
    Json(user.0.into())
}
