//! Shared API response types
//!
//! Common response structures used across multiple API endpoints to keep
//! the JSON envelopes consistent.

use serde::{Deserialize, Serialize};

use crate::models::{Blog, Job, MasterDataItem, PagedResult, User};

// ============================================================================
// Entity responses
// ============================================================================

/// User info response (never carries the password hash)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Full blog post response
#[derive(Debug, Serialize, Deserialize)]
pub struct BlogResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Blog> for BlogResponse {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            slug: blog.slug,
            title: blog.title,
            body: blog.body,
            author_id: blog.author_id,
            published: blog.published,
            published_at: blog.published_at.map(|dt| dt.to_rfc3339()),
            created_at: blog.created_at.to_rfc3339(),
            updated_at: blog.updated_at.to_rfc3339(),
        }
    }
}

/// Full job posting response
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    pub industry_id: i64,
    pub sub_industry_id: Option<i64>,
    pub department_id: Option<i64>,
    pub sub_department_id: Option<i64>,
    pub job_title_id: Option<i64>,
    pub skill_ids: Vec<i64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            slug: job.slug,
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            employment_type: job.employment_type.to_string(),
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            industry_id: job.industry_id,
            sub_industry_id: job.sub_industry_id,
            department_id: job.department_id,
            sub_department_id: job.sub_department_id,
            job_title_id: job.job_title_id,
            skill_ids: job.skill_ids,
            status: job.status.to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Master data item response (one dropdown option)
#[derive(Debug, Serialize, Deserialize)]
pub struct MasterDataItemResponse {
    pub id: i64,
    pub kind: String,
    pub slug: String,
    pub label: String,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<MasterDataItem> for MasterDataItemResponse {
    fn from(item: MasterDataItem) -> Self {
        Self {
            id: item.id,
            kind: item.kind.to_string(),
            slug: item.slug,
            label: item.label,
            parent_id: item.parent_id,
            sort_order: item.sort_order,
            is_active: item.is_active,
        }
    }
}

// ============================================================================
// Pagination envelope
// ============================================================================

/// Paginated list response shared by all list endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Convert a service-level paged result into the response envelope
    pub fn from_paged<U: Into<T>>(result: PagedResult<U>) -> Self {
        let total = result.total;
        let page = result.page;
        let page_size = result.per_page;
        let total_pages = result.total_pages();
        Self {
            items: result.items.into_iter().map(Into::into).collect(),
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListParams, UserRole};

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$secret".to_string(),
            UserRole::Admin,
        );

        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_paginated_response_from_paged() {
        let params = ListParams::new(2, 10);
        let users = vec![User::new(
            "bob".to_string(),
            "bob@example.com".to_string(),
            "hash".to_string(),
            UserRole::Seeker,
        )];
        let paged = PagedResult::new(users, 15, &params);

        let response: PaginatedResponse<UserResponse> = PaginatedResponse::from_paged(paged);
        assert_eq!(response.total, 15);
        assert_eq!(response.page, 2);
        assert_eq!(response.page_size, 10);
        assert_eq!(response.total_pages, 2);
        assert_eq!(response.items.len(), 1);
    }
}
