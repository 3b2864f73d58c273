//! Job service
//!
//! Implements business logic for job postings:
//! - Create, read, update, delete postings
//! - Slug generation and uniqueness
//! - Paged listing with status/industry/location/type/free-text filters
//! - Status transitions (draft -> open -> closed, closed postings reopen)
//! - Cascade validation of master-data references: every referenced lookup
//!   item must exist, be active and have the expected kind, and dependent
//!   selections must be children of the selected parent (a sub-industry of
//!   the chosen industry, a sub-department of the chosen department)

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::{JobRepository, MasterDataRepository};
use crate::models::{
    CreateJobInput, Job, JobFilter, JobStatus, ListParams, MasterDataKind, PagedResult,
    UpdateJobInput,
};
use crate::services::blog::generate_slug;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Default cache TTL for job postings (30 minutes)
const JOB_CACHE_TTL_SECS: u64 = 1800;

/// Cache key prefixes
const CACHE_KEY_JOB_BY_ID: &str = "job:id:";
const CACHE_KEY_JOB_BY_SLUG: &str = "job:slug:";

/// Error types for job service operations
#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    /// Job posting not found
    #[error("Job posting not found: {0}")]
    NotFound(String),

    /// Job slug already exists
    #[error("Job slug already exists: {0}")]
    DuplicateSlug(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A master-data reference failed cascade validation
    #[error("Invalid reference in {field}: {reason}")]
    InvalidReference { field: &'static str, reason: String },

    /// Disallowed status transition
    #[error("Cannot transition job from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// The master-data reference set of a posting, as validated together.
struct ReferenceSet {
    industry_id: i64,
    sub_industry_id: Option<i64>,
    department_id: Option<i64>,
    sub_department_id: Option<i64>,
    job_title_id: Option<i64>,
    skill_ids: Vec<i64>,
}

/// Job service for managing job postings
pub struct JobService {
    repo: Arc<dyn JobRepository>,
    master_data_repo: Arc<dyn MasterDataRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl JobService {
    /// Create a new job service
    pub fn new(
        repo: Arc<dyn JobRepository>,
        master_data_repo: Arc<dyn MasterDataRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            repo,
            master_data_repo,
            cache,
            cache_ttl: Duration::from_secs(JOB_CACHE_TTL_SECS),
        }
    }

    /// Create a new job posting
    pub async fn create(&self, input: CreateJobInput) -> Result<Job, JobServiceError> {
        validate_text_fields(&input.title, &input.company, &input.location, &input.description)?;
        validate_salary_range(input.salary_min, input.salary_max)?;

        let refs = ReferenceSet {
            industry_id: input.industry_id,
            sub_industry_id: input.sub_industry_id,
            department_id: input.department_id,
            sub_department_id: input.sub_department_id,
            job_title_id: input.job_title_id,
            skill_ids: dedupe(input.skill_ids),
        };
        self.validate_references(&refs).await?;

        let slug = match input.slug {
            Some(slug) => {
                if self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(JobServiceError::DuplicateSlug(slug));
                }
                slug
            }
            None => self.unique_slug(&input.title).await?,
        };

        let now = chrono::Utc::now();
        let job = Job {
            id: 0,
            slug,
            title: input.title,
            description: input.description,
            company: input.company,
            location: input.location,
            employment_type: input.employment_type,
            salary_min: input.salary_min,
            salary_max: input.salary_max,
            industry_id: refs.industry_id,
            sub_industry_id: refs.sub_industry_id,
            department_id: refs.department_id,
            sub_department_id: refs.sub_department_id,
            job_title_id: refs.job_title_id,
            skill_ids: refs.skill_ids,
            status: input.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .repo
            .create(&job)
            .await
            .context("Failed to create job posting")?;

        self.invalidate_cache().await;
        Ok(created)
    }

    /// Get job posting by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Job>, JobServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_JOB_BY_ID, id);
        if let Some(job) = self.cache.get::<Job>(&cache_key).await.ok().flatten() {
            return Ok(Some(job));
        }

        let job = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get job posting")?;

        if let Some(ref job) = job {
            let _ = self.cache.set(&cache_key, job, self.cache_ttl).await;
        }

        Ok(job)
    }

    /// Get job posting by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Job>, JobServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_JOB_BY_SLUG, slug);
        if let Some(job) = self.cache.get::<Job>(&cache_key).await.ok().flatten() {
            return Ok(Some(job));
        }

        let job = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get job posting")?;

        if let Some(ref job) = job {
            let _ = self.cache.set(&cache_key, job, self.cache_ttl).await;
        }

        Ok(job)
    }

    /// List job postings matching the filter, newest first
    pub async fn list(
        &self,
        filter: &JobFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Job>, JobServiceError> {
        Ok(self
            .repo
            .list(filter, params)
            .await
            .context("Failed to list job postings")?)
    }

    /// Update a job posting.
    ///
    /// The resulting reference set is re-validated as a whole, so changing
    /// the industry without adjusting the sub-industry fails the cascade
    /// check.
    pub async fn update(&self, id: i64, input: UpdateJobInput) -> Result<Job, JobServiceError> {
        let mut job = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get job posting")?
            .ok_or_else(|| JobServiceError::NotFound(id.to_string()))?;

        if !input.has_changes() {
            return Ok(job);
        }

        if let Some(slug) = input.slug {
            if slug != job.slug {
                if self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(JobServiceError::DuplicateSlug(slug));
                }
                job.slug = slug;
            }
        }
        if let Some(title) = input.title {
            job.title = title;
        }
        if let Some(description) = input.description {
            job.description = description;
        }
        if let Some(company) = input.company {
            job.company = company;
        }
        if let Some(location) = input.location {
            job.location = location;
        }
        if let Some(employment_type) = input.employment_type {
            job.employment_type = employment_type;
        }
        if let Some(salary_min) = input.salary_min {
            job.salary_min = salary_min;
        }
        if let Some(salary_max) = input.salary_max {
            job.salary_max = salary_max;
        }
        if let Some(industry_id) = input.industry_id {
            job.industry_id = industry_id;
        }
        if let Some(sub_industry_id) = input.sub_industry_id {
            job.sub_industry_id = sub_industry_id;
        }
        if let Some(department_id) = input.department_id {
            job.department_id = department_id;
        }
        if let Some(sub_department_id) = input.sub_department_id {
            job.sub_department_id = sub_department_id;
        }
        if let Some(job_title_id) = input.job_title_id {
            job.job_title_id = job_title_id;
        }
        if let Some(skill_ids) = input.skill_ids {
            job.skill_ids = dedupe(skill_ids);
        }

        validate_text_fields(&job.title, &job.company, &job.location, &job.description)?;
        validate_salary_range(job.salary_min, job.salary_max)?;

        let refs = ReferenceSet {
            industry_id: job.industry_id,
            sub_industry_id: job.sub_industry_id,
            department_id: job.department_id,
            sub_department_id: job.sub_department_id,
            job_title_id: job.job_title_id,
            skill_ids: job.skill_ids.clone(),
        };
        self.validate_references(&refs).await?;

        let updated = self
            .repo
            .update(&job)
            .await
            .context("Failed to update job posting")?;

        self.invalidate_cache().await;
        Ok(updated)
    }

    /// Transition a posting to a new status
    pub async fn set_status(&self, id: i64, status: JobStatus) -> Result<Job, JobServiceError> {
        let mut job = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get job posting")?
            .ok_or_else(|| JobServiceError::NotFound(id.to_string()))?;

        if job.status == status {
            return Ok(job);
        }
        if !job.status.can_transition_to(status) {
            return Err(JobServiceError::InvalidTransition {
                from: job.status,
                to: status,
            });
        }

        job.status = status;
        let updated = self
            .repo
            .update(&job)
            .await
            .context("Failed to update job status")?;

        self.invalidate_cache().await;
        Ok(updated)
    }

    /// Delete a job posting
    pub async fn delete(&self, id: i64) -> Result<(), JobServiceError> {
        let job = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get job posting")?
            .ok_or_else(|| JobServiceError::NotFound(id.to_string()))?;

        self.repo
            .delete(job.id)
            .await
            .context("Failed to delete job posting")?;

        self.invalidate_cache().await;
        Ok(())
    }

    /// Count postings with the given status
    pub async fn count_by_status(&self, status: JobStatus) -> Result<i64, JobServiceError> {
        Ok(self
            .repo
            .count_by_status(status)
            .await
            .context("Failed to count job postings")?)
    }

    /// Validate the whole master-data reference set of a posting.
    async fn validate_references(&self, refs: &ReferenceSet) -> Result<(), JobServiceError> {
        let industry = self
            .expect_item("industry_id", refs.industry_id, MasterDataKind::Industry)
            .await?;

        if let Some(sub_industry_id) = refs.sub_industry_id {
            let sub = self
                .expect_item("sub_industry_id", sub_industry_id, MasterDataKind::SubIndustry)
                .await?;
            if sub.parent_id != Some(industry.id) {
                return Err(JobServiceError::InvalidReference {
                    field: "sub_industry_id",
                    reason: format!(
                        "{} is not a sub-industry of {}",
                        sub.label, industry.label
                    ),
                });
            }
        }

        match (refs.department_id, refs.sub_department_id) {
            (Some(department_id), sub_department_id) => {
                let department = self
                    .expect_item("department_id", department_id, MasterDataKind::Department)
                    .await?;
                if let Some(sub_department_id) = sub_department_id {
                    let sub = self
                        .expect_item(
                            "sub_department_id",
                            sub_department_id,
                            MasterDataKind::SubDepartment,
                        )
                        .await?;
                    if sub.parent_id != Some(department.id) {
                        return Err(JobServiceError::InvalidReference {
                            field: "sub_department_id",
                            reason: format!(
                                "{} is not a sub-department of {}",
                                sub.label, department.label
                            ),
                        });
                    }
                }
            }
            (None, Some(_)) => {
                return Err(JobServiceError::InvalidReference {
                    field: "sub_department_id",
                    reason: "a sub-department requires a department".to_string(),
                });
            }
            (None, None) => {}
        }

        if let Some(job_title_id) = refs.job_title_id {
            self.expect_item("job_title_id", job_title_id, MasterDataKind::JobTitle)
                .await?;
        }

        for skill_id in &refs.skill_ids {
            self.expect_item("skill_ids", *skill_id, MasterDataKind::Skill)
                .await?;
        }

        Ok(())
    }

    /// Look up a referenced item and require it to be active and of `kind`.
    async fn expect_item(
        &self,
        field: &'static str,
        id: i64,
        kind: MasterDataKind,
    ) -> Result<crate::models::MasterDataItem, JobServiceError> {
        let item = self
            .master_data_repo
            .get_by_id(id)
            .await
            .context("Failed to look up master data reference")?
            .ok_or(JobServiceError::InvalidReference {
                field,
                reason: format!("no {} with id {}", kind, id),
            })?;

        if item.kind != kind {
            return Err(JobServiceError::InvalidReference {
                field,
                reason: format!("{} is a {}, expected {}", item.label, item.kind, kind),
            });
        }
        if !item.is_active {
            return Err(JobServiceError::InvalidReference {
                field,
                reason: format!("{} is inactive", item.label),
            });
        }

        Ok(item)
    }

    async fn unique_slug(&self, title: &str) -> Result<String, JobServiceError> {
        let base = generate_slug(title);
        let base = if base.is_empty() {
            "job".to_string()
        } else {
            base
        };

        if !self
            .repo
            .exists_by_slug(&base)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Ok(base);
        }

        for n in 2..100 {
            let candidate = format!("{}-{}", base, n);
            if !self
                .repo
                .exists_by_slug(&candidate)
                .await
                .context("Failed to check slug uniqueness")?
            {
                return Ok(candidate);
            }
        }

        Err(JobServiceError::DuplicateSlug(base))
    }

    async fn invalidate_cache(&self) {
        let _ = self.cache.delete_pattern("job:*").await;
    }
}

fn validate_text_fields(
    title: &str,
    company: &str,
    location: &str,
    description: &str,
) -> Result<(), JobServiceError> {
    for (field, value) in [
        ("title", title),
        ("company", company),
        ("location", location),
        ("description", description),
    ] {
        if value.trim().is_empty() {
            return Err(JobServiceError::ValidationError(format!(
                "{} must not be empty",
                field
            )));
        }
    }
    Ok(())
}

fn validate_salary_range(min: Option<i64>, max: Option<i64>) -> Result<(), JobServiceError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(JobServiceError::ValidationError(
                "salary_min must not exceed salary_max".to_string(),
            ));
        }
    }
    if min.is_some_and(|v| v < 0) || max.is_some_and(|v| v < 0) {
        return Err(JobServiceError::ValidationError(
            "salary must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn dedupe(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::{
        MasterDataRepository, SqlxJobRepository, SqlxMasterDataRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{EmploymentType, MasterDataItem};

    struct Fixture {
        service: JobService,
        industry_id: i64,
        sub_industry_id: i64,
        other_industry_id: i64,
        other_sub_industry_id: i64,
        department_id: i64,
        sub_department_id: i64,
        skill_id: i64,
        inactive_skill_id: i64,
    }

    async fn md(
        repo: &dyn MasterDataRepository,
        kind: MasterDataKind,
        slug: &str,
        parent: Option<i64>,
    ) -> i64 {
        repo.create(&MasterDataItem::new(
            kind,
            slug.to_string(),
            slug.to_string(),
            parent,
            0,
        ))
        .await
        .expect("Failed to create master data")
        .id
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let md_repo = SqlxMasterDataRepository::new(pool.clone());

        let industry_id = md(&md_repo, MasterDataKind::Industry, "tech", None).await;
        let sub_industry_id =
            md(&md_repo, MasterDataKind::SubIndustry, "software", Some(industry_id)).await;
        let other_industry_id = md(&md_repo, MasterDataKind::Industry, "finance", None).await;
        let other_sub_industry_id = md(
            &md_repo,
            MasterDataKind::SubIndustry,
            "banking",
            Some(other_industry_id),
        )
        .await;
        let department_id = md(&md_repo, MasterDataKind::Department, "engineering", None).await;
        let sub_department_id = md(
            &md_repo,
            MasterDataKind::SubDepartment,
            "backend",
            Some(department_id),
        )
        .await;
        let skill_id = md(&md_repo, MasterDataKind::Skill, "rust", None).await;

        let mut inactive = md_repo
            .create(&MasterDataItem::new(
                MasterDataKind::Skill,
                "cobol".to_string(),
                "COBOL".to_string(),
                None,
                0,
            ))
            .await
            .unwrap();
        inactive.is_active = false;
        let inactive = md_repo.update(&inactive).await.unwrap();

        let cache = create_cache(&CacheConfig::default())
            .await
            .expect("Failed to create cache");
        let service = JobService::new(
            SqlxJobRepository::boxed(pool.clone()),
            SqlxMasterDataRepository::boxed(pool),
            cache,
        );

        Fixture {
            service,
            industry_id,
            sub_industry_id,
            other_industry_id,
            other_sub_industry_id,
            department_id,
            sub_department_id,
            skill_id,
            inactive_skill_id: inactive.id,
        }
    }

    fn create_input(fx: &Fixture, title: &str) -> CreateJobInput {
        CreateJobInput {
            slug: None,
            title: title.to_string(),
            description: "Build things".to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            employment_type: EmploymentType::FullTime,
            salary_min: Some(50_000),
            salary_max: Some(70_000),
            industry_id: fx.industry_id,
            sub_industry_id: Some(fx.sub_industry_id),
            department_id: Some(fx.department_id),
            sub_department_id: Some(fx.sub_department_id),
            job_title_id: None,
            skill_ids: vec![fx.skill_id],
            status: Some(JobStatus::Open),
        }
    }

    #[tokio::test]
    async fn test_create_valid_cascade() {
        let fx = setup().await;

        let job = fx
            .service
            .create(create_input(&fx, "Backend Engineer"))
            .await
            .expect("Valid cascade should create");

        assert_eq!(job.slug, "backend-engineer");
        assert_eq!(job.skill_ids, vec![fx.skill_id]);
        assert_eq!(job.status, JobStatus::Open);
    }

    #[tokio::test]
    async fn test_create_rejects_mismatched_sub_industry() {
        let fx = setup().await;

        // Banking belongs to finance, not tech
        let mut input = create_input(&fx, "Job");
        input.sub_industry_id = Some(fx.other_sub_industry_id);

        let result = fx.service.create(input).await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidReference {
                field: "sub_industry_id",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_wrong_kind_reference() {
        let fx = setup().await;

        // A skill id in the industry slot fails the kind check
        let mut input = create_input(&fx, "Job");
        input.industry_id = fx.skill_id;

        let result = fx.service.create(input).await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidReference {
                field: "industry_id",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_inactive_skill() {
        let fx = setup().await;

        let mut input = create_input(&fx, "Job");
        input.skill_ids = vec![fx.inactive_skill_id];

        let result = fx.service.create(input).await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidReference {
                field: "skill_ids",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_sub_department_without_department() {
        let fx = setup().await;

        let mut input = create_input(&fx, "Job");
        input.department_id = None;
        // sub_department_id still set

        let result = fx.service.create(input).await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidReference {
                field: "sub_department_id",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_salary_range() {
        let fx = setup().await;

        let mut input = create_input(&fx, "Job");
        input.salary_min = Some(90_000);
        input.salary_max = Some(50_000);

        let result = fx.service.create(input).await;
        assert!(matches!(result, Err(JobServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_dedupes_skills() {
        let fx = setup().await;

        let mut input = create_input(&fx, "Job");
        input.skill_ids = vec![fx.skill_id, fx.skill_id];

        let job = fx.service.create(input).await.unwrap();
        assert_eq!(job.skill_ids, vec![fx.skill_id]);
    }

    #[tokio::test]
    async fn test_update_revalidates_cascade() {
        let fx = setup().await;
        let job = fx.service.create(create_input(&fx, "Job")).await.unwrap();

        // Switching the industry without fixing the sub-industry breaks the
        // cascade and is refused
        let result = fx
            .service
            .update(
                job.id,
                UpdateJobInput {
                    industry_id: Some(fx.other_industry_id),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidReference { .. })
        ));

        // Switching both together is accepted
        let updated = fx
            .service
            .update(
                job.id,
                UpdateJobInput {
                    industry_id: Some(fx.other_industry_id),
                    sub_industry_id: Some(Some(fx.other_sub_industry_id)),
                    ..Default::default()
                },
            )
            .await
            .expect("Consistent cascade should update");
        assert_eq!(updated.industry_id, fx.other_industry_id);
        assert_eq!(updated.sub_industry_id, Some(fx.other_sub_industry_id));
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_references() {
        let fx = setup().await;
        let job = fx.service.create(create_input(&fx, "Job")).await.unwrap();

        let updated = fx
            .service
            .update(
                job.id,
                UpdateJobInput {
                    sub_department_id: Some(None),
                    department_id: Some(None),
                    sub_industry_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.sub_industry_id.is_none());
        assert!(updated.department_id.is_none());
        assert!(updated.sub_department_id.is_none());
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let fx = setup().await;
        let mut input = create_input(&fx, "Job");
        input.status = Some(JobStatus::Draft);
        let job = fx.service.create(input).await.unwrap();

        // draft -> closed is not allowed
        let result = fx.service.set_status(job.id, JobStatus::Closed).await;
        assert!(matches!(
            result,
            Err(JobServiceError::InvalidTransition { .. })
        ));

        let opened = fx.service.set_status(job.id, JobStatus::Open).await.unwrap();
        assert_eq!(opened.status, JobStatus::Open);

        let closed = fx.service.set_status(job.id, JobStatus::Closed).await.unwrap();
        assert_eq!(closed.status, JobStatus::Closed);

        // closed postings can reopen
        let reopened = fx.service.set_status(job.id, JobStatus::Open).await.unwrap();
        assert_eq!(reopened.status, JobStatus::Open);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let fx = setup().await;
        let job = fx.service.create(create_input(&fx, "Only Job")).await.unwrap();

        let result = fx
            .service
            .list(&JobFilter::default(), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(result.total, 1);

        fx.service.delete(job.id).await.unwrap();
        assert!(fx.service.get_by_id(job.id).await.unwrap().is_none());
        assert!(matches!(
            fx.service.delete(job.id).await,
            Err(JobServiceError::NotFound(_))
        ));
    }
}
