//! Admin API endpoints
//!
//! User management for administrators:
//! - GET /api/v1/admin/users - List users
//! - PUT /api/v1/admin/users/{id} - Update a user (role, status, profile)
//! - DELETE /api/v1/admin/users/{id} - Delete a user

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PaginatedResponse, UserResponse};
use crate::models::{ListParams, UpdateUserInput, UserRole, UserStatus};

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    20
}

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Request body for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

/// Build the admin users router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
}

/// GET /api/v1/admin/users - List users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let result = state.user_service.list(&params).await?;
    Ok(Json(PaginatedResponse::from_paged(result)))
}

/// PUT /api/v1/admin/users/{id} - Update a user
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .update(
            id,
            UpdateUserInput {
                username: request.username,
                email: request.email,
                password: request.password,
                role: request.role,
                status: request.status,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id} - Delete a user
///
/// Admins cannot delete their own account.
async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if current.0.id == id {
        return Err(ApiError::validation_error("Cannot delete your own account"));
    }

    state.user_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
