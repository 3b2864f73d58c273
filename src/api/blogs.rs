//! Blog API endpoints
//!
//! Handles HTTP requests for blog posts:
//! - GET /api/v1/blogs - List posts (with published/author filters)
//! - GET /api/v1/blogs/{id} - Get a post by ID
//! - GET /api/v1/blogs/by-slug/{slug} - Resolve a post by slug
//! - POST /api/v1/blogs - Create a post (authenticated)
//! - PUT /api/v1/blogs/{id} - Update a post (author or admin)
//! - DELETE /api/v1/blogs/{id} - Delete a post (author or admin)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{BlogResponse, PaginatedResponse};
use crate::models::{BlogFilter, CreateBlogInput, ListParams, UpdateBlogInput};

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    10
}

/// Query parameters for listing blog posts
#[derive(Debug, Deserialize)]
pub struct ListBlogsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Filter by published flag
    pub published: Option<bool>,
    /// Filter by author
    pub author_id: Option<i64>,
}

/// Request body for creating a blog post
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: String,
    pub body: String,
    pub slug: Option<String>,
    pub published: Option<bool>,
}

/// Request body for updating a blog post
#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub slug: Option<String>,
    pub published: Option<bool>,
}

/// GET /api/v1/blogs - List blog posts
pub async fn list_blogs_handler(
    State(state): State<AppState>,
    Query(query): Query<ListBlogsQuery>,
) -> Result<Json<PaginatedResponse<BlogResponse>>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);
    let filter = BlogFilter {
        published: query.published,
        author_id: query.author_id,
    };

    let result = state.blog_service.list(&filter, &params).await?;
    Ok(Json(PaginatedResponse::from_paged(result)))
}

/// GET /api/v1/blogs/{id} - Get a blog post by ID
pub async fn get_blog_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blog_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Blog post not found: {}", id)))?;

    Ok(Json(blog.into()))
}

/// GET /api/v1/blogs/by-slug/{slug} - Resolve a blog post by slug
pub async fn get_blog_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blog_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Blog post not found: {}", slug)))?;

    Ok(Json(blog.into()))
}

/// POST /api/v1/blogs - Create a blog post
///
/// The authenticated user becomes the author.
pub async fn create_blog_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBlogRequest>,
) -> Result<Json<BlogResponse>, ApiError> {
    let blog = state
        .blog_service
        .create(CreateBlogInput {
            slug: request.slug,
            title: request.title,
            body: request.body,
            author_id: user.0.id,
            published: request.published,
        })
        .await?;

    Ok(Json(blog.into()))
}

/// PUT /api/v1/blogs/{id} - Update a blog post
///
/// Only the author or an admin may edit a post.
pub async fn update_blog_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBlogRequest>,
) -> Result<Json<BlogResponse>, ApiError> {
    let existing = state
        .blog_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Blog post not found: {}", id)))?;

    if !user.0.can_edit(existing.author_id) {
        return Err(ApiError::forbidden("Not the author of this post"));
    }

    let blog = state
        .blog_service
        .update(
            id,
            UpdateBlogInput {
                slug: request.slug,
                title: request.title,
                body: request.body,
                published: request.published,
            },
        )
        .await?;

    Ok(Json(blog.into()))
}

/// DELETE /api/v1/blogs/{id} - Delete a blog post
///
/// Only the author or an admin may delete a post.
pub async fn delete_blog_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let existing = state
        .blog_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Blog post not found: {}", id)))?;

    if !user.0.can_edit(existing.author_id) {
        return Err(ApiError::forbidden("Not the author of this post"));
    }

    state.blog_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
