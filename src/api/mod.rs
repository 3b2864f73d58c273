//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Jobdesk job board:
//! - Auth endpoints (register, login, logout, me)
//! - Blog endpoints
//! - Job endpoints (public listing/detail, admin management)
//! - Master data endpoints (dropdown options, cascade chains, admin CRUD)
//! - Admin user management
//! - Site health/status

pub mod admin;
pub mod auth;
pub mod blogs;
pub mod jobs;
pub mod master_data;
pub mod middleware;
pub mod responses;
pub mod site;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        // Job management
        .route("/jobs", post(jobs::create_job_handler))
        .route("/admin/jobs/{id}", put(jobs::update_job_handler))
        .route("/admin/jobs/{id}", delete(jobs::delete_job_handler))
        .route("/admin/jobs/{id}/status", post(jobs::set_job_status_handler))
        // Master data management
        .route("/master-data/{kind}", post(master_data::create_item_handler))
        .route("/master-data/{kind}/{id}", put(master_data::update_item_handler))
        .route("/master-data/{kind}/{id}", delete(master_data::delete_item_handler))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route("/blogs", post(blogs::create_blog_handler))
        .route("/blogs/{id}", put(blogs::update_blog_handler))
        .route("/blogs/{id}", delete(blogs::delete_blog_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Master data lookups are public; admins get include_inactive
    let master_data_routes = Router::new()
        .route("/master-data/{kind}", get(master_data::list_options_handler))
        .route(
            "/master-data/{kind}/{id}/chain",
            get(master_data::cascade_chain_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .route("/blogs", get(blogs::list_blogs_handler))
        .route("/blogs/{id}", get(blogs::get_blog_handler))
        .route("/blogs/by-slug/{slug}", get(blogs::get_blog_by_slug_handler))
        .route("/jobs", get(jobs::list_jobs_handler))
        .route("/jobs/{slug}", get(jobs::get_job_handler))
        .nest("/auth", auth::public_router())
        .nest("/site", site::router())
        .merge(master_data_routes)
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS configuration supporting cookie auth from the web frontend
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
