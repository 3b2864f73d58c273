//! Job API endpoints
//!
//! Handles HTTP requests for job postings:
//! - GET /api/v1/jobs - List postings with query-string filters
//! - GET /api/v1/jobs/{slug} - Get a posting by slug
//! - POST /api/v1/jobs - Create a posting (admin)
//! - PUT /api/v1/admin/jobs/{id} - Update a posting (admin)
//! - DELETE /api/v1/admin/jobs/{id} - Delete a posting (admin)
//! - POST /api/v1/admin/jobs/{id}/status - Transition posting status (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{JobResponse, PaginatedResponse};
use crate::models::{
    CreateJobInput, EmploymentType, JobFilter, JobStatus, ListParams, UpdateJobInput,
};

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    10
}

/// Query parameters for listing job postings
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Filter by status (draft, open, closed)
    pub status: Option<String>,
    /// Filter by industry master data ID
    pub industry_id: Option<i64>,
    /// Filter by location substring
    pub location: Option<String>,
    /// Filter by employment type
    pub employment_type: Option<String>,
    /// Free-text search over title, company and location
    pub q: Option<String>,
}

/// Request body for creating a job posting
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub slug: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub industry_id: i64,
    pub sub_industry_id: Option<i64>,
    pub department_id: Option<i64>,
    pub sub_department_id: Option<i64>,
    pub job_title_id: Option<i64>,
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    pub status: Option<JobStatus>,
}

/// Request body for updating a job posting.
///
/// Optional reference fields distinguish "leave alone" (absent) from
/// "clear" (null): `"sub_industry_id": null` clears the value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_min: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_max: Option<Option<i64>>,
    pub industry_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub sub_industry_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sub_department_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub job_title_id: Option<Option<i64>>,
    pub skill_ids: Option<Vec<i64>>,
}

/// Deserialize a field that distinguishes absent from null: an absent field
/// stays `None` (via `default`), a present field (including `null`) becomes
/// `Some(inner)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Request body for a status transition
#[derive(Debug, Deserialize)]
pub struct SetJobStatusRequest {
    pub status: JobStatus,
}

/// GET /api/v1/jobs - List job postings
pub async fn list_jobs_handler(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<PaginatedResponse<JobResponse>>, ApiError> {
    let params = ListParams::new(query.page, query.page_size);

    let status = query
        .status
        .as_deref()
        .map(str::parse::<JobStatus>)
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let employment_type = query
        .employment_type
        .as_deref()
        .map(str::parse::<EmploymentType>)
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let filter = JobFilter {
        status,
        industry_id: query.industry_id,
        location: query.location,
        employment_type,
        q: query.q,
    };

    let result = state.job_service.list(&filter, &params).await?;
    Ok(Json(PaginatedResponse::from_paged(result)))
}

/// GET /api/v1/jobs/{slug} - Get a job posting by slug
pub async fn get_job_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state
        .job_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Job posting not found: {}", slug)))?;

    Ok(Json(job.into()))
}

/// POST /api/v1/jobs - Create a job posting (admin)
pub async fn create_job_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state
        .job_service
        .create(CreateJobInput {
            slug: request.slug,
            title: request.title,
            description: request.description,
            company: request.company,
            location: request.location,
            employment_type: request.employment_type,
            salary_min: request.salary_min,
            salary_max: request.salary_max,
            industry_id: request.industry_id,
            sub_industry_id: request.sub_industry_id,
            department_id: request.department_id,
            sub_department_id: request.sub_department_id,
            job_title_id: request.job_title_id,
            skill_ids: request.skill_ids,
            status: request.status,
        })
        .await?;

    Ok(Json(job.into()))
}

/// PUT /api/v1/admin/jobs/{id} - Update a job posting (admin)
pub async fn update_job_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state
        .job_service
        .update(
            id,
            UpdateJobInput {
                slug: request.slug,
                title: request.title,
                description: request.description,
                company: request.company,
                location: request.location,
                employment_type: request.employment_type,
                salary_min: request.salary_min,
                salary_max: request.salary_max,
                industry_id: request.industry_id,
                sub_industry_id: request.sub_industry_id,
                department_id: request.department_id,
                sub_department_id: request.sub_department_id,
                job_title_id: request.job_title_id,
                skill_ids: request.skill_ids,
            },
        )
        .await?;

    Ok(Json(job.into()))
}

/// POST /api/v1/admin/jobs/{id}/status - Transition posting status (admin)
pub async fn set_job_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetJobStatusRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.job_service.set_status(id, request.status).await?;
    Ok(Json(job.into()))
}

/// DELETE /api/v1/admin/jobs/{id} - Delete a job posting (admin)
pub async fn delete_job_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.job_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
