//! Job model
//!
//! This module provides:
//! - `Job` entity representing a job posting
//! - `JobStatus` and `EmploymentType` enums
//! - Input types for creating and updating postings
//! - `JobFilter` for list queries
//! - Pagination types shared by all list endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job posting entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Posting title
    pub title: String,
    /// Role description
    pub description: String,
    /// Hiring company name
    pub company: String,
    /// Work location
    pub location: String,
    /// Employment type
    pub employment_type: EmploymentType,
    /// Minimum salary, if disclosed
    pub salary_min: Option<i64>,
    /// Maximum salary, if disclosed
    pub salary_max: Option<i64>,
    /// Industry master data ID
    pub industry_id: i64,
    /// Sub-industry master data ID (child of industry)
    pub sub_industry_id: Option<i64>,
    /// Department master data ID
    pub department_id: Option<i64>,
    /// Sub-department master data ID (child of department)
    pub sub_department_id: Option<i64>,
    /// Job title master data ID
    pub job_title_id: Option<i64>,
    /// Required skill master data IDs
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    /// Posting status
    pub status: JobStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Job posting status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Draft - not visible to seekers
    Draft,
    /// Open - accepting applications
    Open,
    /// Closed - no longer accepting applications
    Closed,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl JobStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }

    /// Check whether a transition to `next` is allowed.
    ///
    /// Drafts open, open postings close, closed postings may reopen.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Draft, JobStatus::Open)
                | (JobStatus::Open, JobStatus::Closed)
                | (JobStatus::Closed, JobStatus::Open)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(JobStatus::Draft),
            "open" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// Employment type of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_time" => Ok(EmploymentType::FullTime),
            "part_time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            "internship" => Ok(EmploymentType::Internship),
            _ => Err(anyhow::anyhow!("Invalid employment type: {}", s)),
        }
    }
}

/// Input for creating a new job posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobInput {
    /// URL-friendly slug (generated from title when absent)
    pub slug: Option<String>,
    /// Posting title
    pub title: String,
    /// Role description
    pub description: String,
    /// Hiring company name
    pub company: String,
    /// Work location
    pub location: String,
    /// Employment type
    pub employment_type: EmploymentType,
    /// Minimum salary, if disclosed
    pub salary_min: Option<i64>,
    /// Maximum salary, if disclosed
    pub salary_max: Option<i64>,
    /// Industry master data ID
    pub industry_id: i64,
    /// Sub-industry master data ID
    pub sub_industry_id: Option<i64>,
    /// Department master data ID
    pub department_id: Option<i64>,
    /// Sub-department master data ID
    pub sub_department_id: Option<i64>,
    /// Job title master data ID
    pub job_title_id: Option<i64>,
    /// Required skill master data IDs
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    /// Initial status (defaults to Draft)
    pub status: Option<JobStatus>,
}

/// Input for updating an existing job posting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateJobInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New company (optional)
    pub company: Option<String>,
    /// New location (optional)
    pub location: Option<String>,
    /// New employment type (optional)
    pub employment_type: Option<EmploymentType>,
    /// New minimum salary (optional)
    pub salary_min: Option<Option<i64>>,
    /// New maximum salary (optional)
    pub salary_max: Option<Option<i64>>,
    /// New industry (optional; re-validates the cascade)
    pub industry_id: Option<i64>,
    /// New sub-industry (optional)
    pub sub_industry_id: Option<Option<i64>>,
    /// New department (optional)
    pub department_id: Option<Option<i64>>,
    /// New sub-department (optional)
    pub sub_department_id: Option<Option<i64>>,
    /// New job title (optional)
    pub job_title_id: Option<Option<i64>>,
    /// New skill set (optional, replaces the whole set)
    pub skill_ids: Option<Vec<i64>>,
}

impl UpdateJobInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.company.is_some()
            || self.location.is_some()
            || self.employment_type.is_some()
            || self.salary_min.is_some()
            || self.salary_max.is_some()
            || self.industry_id.is_some()
            || self.sub_industry_id.is_some()
            || self.department_id.is_some()
            || self.sub_department_id.is_some()
            || self.job_title_id.is_some()
            || self.skill_ids.is_some()
    }
}

/// Filters for job listing
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Only postings with this status
    pub status: Option<JobStatus>,
    /// Only postings in this industry
    pub industry_id: Option<i64>,
    /// Only postings whose location contains this string
    pub location: Option<String>,
    /// Only postings with this employment type
    pub employment_type: Option<EmploymentType>,
    /// Free-text search over title, company and location
    pub q: Option<String>,
}

impl JobFilter {
    /// Check if no filter is set
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.industry_id.is_none()
            && self.location.is_none()
            && self.employment_type.is_none()
            && self.q.is_none()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}
