//! Job repository
//!
//! Database operations for job postings.
//!
//! This module provides:
//! - `JobRepository` trait defining the interface for job data access
//! - `SqlxJobRepository` implementing the trait for SQLite and MySQL
//!
//! Required skills live in the `job_skills` junction table and are loaded
//! alongside each posting. List queries assemble their WHERE clause from the
//! optional filters; both backends share the SQL text and bind order.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Job, JobFilter, JobStatus, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const JOB_COLUMNS: &str = "id, slug, title, description, company, location, employment_type, \
     salary_min, salary_max, industry_id, sub_industry_id, department_id, sub_department_id, \
     job_title_id, status, created_at, updated_at";

/// Job repository trait
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Create a new job posting (including its skill set)
    async fn create(&self, job: &Job) -> Result<Job>;

    /// Get job posting by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Job>>;

    /// Get job posting by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Job>>;

    /// List job postings matching the filter, newest first
    async fn list(&self, filter: &JobFilter, params: &ListParams) -> Result<PagedResult<Job>>;

    /// Update a job posting (replaces its skill set)
    async fn update(&self, job: &Job) -> Result<Job>;

    /// Delete a job posting
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a job slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Count postings with the given status
    async fn count_by_status(&self, status: JobStatus) -> Result<i64>;
}

/// SQLx-based job repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxJobRepository {
    pool: DynDatabasePool,
}

impl SqlxJobRepository {
    /// Create a new SQLx job repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn JobRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl JobRepository for SqlxJobRepository {
    async fn create(&self, job: &Job) -> Result<Job> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_job_sqlite(self.pool.as_sqlite().unwrap(), job).await,
            DatabaseDriver::Mysql => create_job_mysql(self.pool.as_mysql().unwrap(), job).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Job>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_job_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_job_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Job>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_job_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => get_job_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn list(&self, filter: &JobFilter, params: &ListParams) -> Result<PagedResult<Job>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_jobs_sqlite(self.pool.as_sqlite().unwrap(), filter, params).await
            }
            DatabaseDriver::Mysql => {
                list_jobs_mysql(self.pool.as_mysql().unwrap(), filter, params).await
            }
        }
    }

    async fn update(&self, job: &Job) -> Result<Job> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_job_sqlite(self.pool.as_sqlite().unwrap(), job).await,
            DatabaseDriver::Mysql => update_job_mysql(self.pool.as_mysql().unwrap(), job).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_job_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_job_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => exists_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_status_sqlite(self.pool.as_sqlite().unwrap(), status).await
            }
            DatabaseDriver::Mysql => {
                count_by_status_mysql(self.pool.as_mysql().unwrap(), status).await
            }
        }
    }
}

// ============================================================================
// Filter building
// ============================================================================

/// A bind value produced by the filter builder
#[derive(Debug, Clone, PartialEq)]
enum FilterBind {
    Int(i64),
    Str(String),
}

/// Build the WHERE clause and bind values for a job filter.
///
/// Location and free-text search are case-folded LIKE matches; the free-text
/// term spans title, company and location.
fn build_job_filter_sql(filter: &JobFilter) -> (String, Vec<FilterBind>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(status) = filter.status {
        conditions.push("status = ?".to_string());
        binds.push(FilterBind::Str(status.as_str().to_string()));
    }
    if let Some(industry_id) = filter.industry_id {
        conditions.push("industry_id = ?".to_string());
        binds.push(FilterBind::Int(industry_id));
    }
    if let Some(employment_type) = filter.employment_type {
        conditions.push("employment_type = ?".to_string());
        binds.push(FilterBind::Str(employment_type.as_str().to_string()));
    }
    if let Some(ref location) = filter.location {
        conditions.push("LOWER(location) LIKE ?".to_string());
        binds.push(FilterBind::Str(format!("%{}%", location.to_lowercase())));
    }
    if let Some(ref q) = filter.q {
        conditions
            .push("(LOWER(title) LIKE ? OR LOWER(company) LIKE ? OR LOWER(location) LIKE ?)".to_string());
        let pattern = format!("%{}%", q.to_lowercase());
        binds.push(FilterBind::Str(pattern.clone()));
        binds.push(FilterBind::Str(pattern.clone()));
        binds.push(FilterBind::Str(pattern));
    }

    let where_sql = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    (where_sql, binds)
}

macro_rules! bind_filters {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for bind in $binds {
            query = match bind {
                FilterBind::Int(v) => query.bind(*v),
                FilterBind::Str(v) => query.bind(v.clone()),
            };
        }
        query
    }};
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_job_sqlite(pool: &SqlitePool, job: &Job) -> Result<Job> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO jobs (slug, title, description, company, location, employment_type,
                          salary_min, salary_max, industry_id, sub_industry_id, department_id,
                          sub_department_id, job_title_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&job.slug)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.employment_type.as_str())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.industry_id)
    .bind(job.sub_industry_id)
    .bind(job.department_id)
    .bind(job.sub_department_id)
    .bind(job.job_title_id)
    .bind(job.status.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create job posting")?;

    let id = result.last_insert_rowid();
    replace_skills_sqlite(pool, id, &job.skill_ids).await?;

    Ok(Job {
        id,
        created_at: now,
        updated_at: now,
        ..job.clone()
    })
}

async fn get_job_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get job posting by ID")?;

    match row {
        Some(row) => {
            let mut job = row_to_job_sqlite(&row)?;
            job.skill_ids = get_skill_ids_sqlite(pool, job.id).await?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

async fn get_job_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE slug = ?", JOB_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get job posting by slug")?;

    match row {
        Some(row) => {
            let mut job = row_to_job_sqlite(&row)?;
            job.skill_ids = get_skill_ids_sqlite(pool, job.id).await?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

async fn list_jobs_sqlite(
    pool: &SqlitePool,
    filter: &JobFilter,
    params: &ListParams,
) -> Result<PagedResult<Job>> {
    let (where_sql, binds) = build_job_filter_sql(filter);

    let count_sql = format!("SELECT COUNT(*) as count FROM jobs{}", where_sql);
    let count_query = bind_filters!(sqlx::query(&count_sql), &binds);
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count job postings")?
        .get("count");

    let list_sql = format!(
        "SELECT {} FROM jobs{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        JOB_COLUMNS, where_sql
    );
    let list_query = bind_filters!(sqlx::query(&list_sql), &binds)
        .bind(params.limit())
        .bind(params.offset());
    let rows = list_query
        .fetch_all(pool)
        .await
        .context("Failed to list job postings")?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut job = row_to_job_sqlite(row)?;
        job.skill_ids = get_skill_ids_sqlite(pool, job.id).await?;
        items.push(job);
    }

    Ok(PagedResult::new(items, total, params))
}

async fn update_job_sqlite(pool: &SqlitePool, job: &Job) -> Result<Job> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET slug = ?, title = ?, description = ?, company = ?, location = ?, employment_type = ?,
            salary_min = ?, salary_max = ?, industry_id = ?, sub_industry_id = ?, department_id = ?,
            sub_department_id = ?, job_title_id = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&job.slug)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.employment_type.as_str())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.industry_id)
    .bind(job.sub_industry_id)
    .bind(job.department_id)
    .bind(job.sub_department_id)
    .bind(job.job_title_id)
    .bind(job.status.as_str())
    .bind(Utc::now())
    .bind(job.id)
    .execute(pool)
    .await
    .context("Failed to update job posting")?;

    replace_skills_sqlite(pool, job.id, &job.skill_ids).await?;

    get_job_by_id_sqlite(pool, job.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Job posting not found after update"))
}

async fn delete_job_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete job posting")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM jobs WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check job slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn count_by_status_sqlite(pool: &SqlitePool, status: JobStatus) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM jobs WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count job postings")?;

    Ok(row.get("count"))
}

async fn get_skill_ids_sqlite(pool: &SqlitePool, job_id: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT skill_id FROM job_skills WHERE job_id = ? ORDER BY skill_id")
        .bind(job_id)
        .fetch_all(pool)
        .await
        .context("Failed to get job skills")?;

    Ok(rows.iter().map(|row| row.get("skill_id")).collect())
}

async fn replace_skills_sqlite(pool: &SqlitePool, job_id: i64, skill_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM job_skills WHERE job_id = ?")
        .bind(job_id)
        .execute(pool)
        .await
        .context("Failed to clear job skills")?;

    for skill_id in skill_ids {
        sqlx::query("INSERT INTO job_skills (job_id, skill_id) VALUES (?, ?)")
            .bind(job_id)
            .bind(skill_id)
            .execute(pool)
            .await
            .context("Failed to insert job skill")?;
    }

    Ok(())
}

fn row_to_job_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Job> {
    let employment_type: String = row.get("employment_type");
    let status: String = row.get("status");
    Ok(Job {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        description: row.get("description"),
        company: row.get("company"),
        location: row.get("location"),
        employment_type: employment_type.parse()?,
        salary_min: row.get("salary_min"),
        salary_max: row.get("salary_max"),
        industry_id: row.get("industry_id"),
        sub_industry_id: row.get("sub_industry_id"),
        department_id: row.get("department_id"),
        sub_department_id: row.get("sub_department_id"),
        job_title_id: row.get("job_title_id"),
        skill_ids: Vec::new(),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_job_mysql(pool: &MySqlPool, job: &Job) -> Result<Job> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO jobs (slug, title, description, company, location, employment_type,
                          salary_min, salary_max, industry_id, sub_industry_id, department_id,
                          sub_department_id, job_title_id, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&job.slug)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.employment_type.as_str())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.industry_id)
    .bind(job.sub_industry_id)
    .bind(job.department_id)
    .bind(job.sub_department_id)
    .bind(job.job_title_id)
    .bind(job.status.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create job posting")?;

    let id = result.last_insert_id() as i64;
    replace_skills_mysql(pool, id, &job.skill_ids).await?;

    Ok(Job {
        id,
        created_at: now,
        updated_at: now,
        ..job.clone()
    })
}

async fn get_job_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get job posting by ID")?;

    match row {
        Some(row) => {
            let mut job = row_to_job_mysql(&row)?;
            job.skill_ids = get_skill_ids_mysql(pool, job.id).await?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

async fn get_job_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE slug = ?", JOB_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get job posting by slug")?;

    match row {
        Some(row) => {
            let mut job = row_to_job_mysql(&row)?;
            job.skill_ids = get_skill_ids_mysql(pool, job.id).await?;
            Ok(Some(job))
        }
        None => Ok(None),
    }
}

async fn list_jobs_mysql(
    pool: &MySqlPool,
    filter: &JobFilter,
    params: &ListParams,
) -> Result<PagedResult<Job>> {
    let (where_sql, binds) = build_job_filter_sql(filter);

    let count_sql = format!("SELECT COUNT(*) as count FROM jobs{}", where_sql);
    let count_query = bind_filters!(sqlx::query(&count_sql), &binds);
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count job postings")?
        .get("count");

    let list_sql = format!(
        "SELECT {} FROM jobs{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        JOB_COLUMNS, where_sql
    );
    let list_query = bind_filters!(sqlx::query(&list_sql), &binds)
        .bind(params.limit())
        .bind(params.offset());
    let rows = list_query
        .fetch_all(pool)
        .await
        .context("Failed to list job postings")?;

    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut job = row_to_job_mysql(row)?;
        job.skill_ids = get_skill_ids_mysql(pool, job.id).await?;
        items.push(job);
    }

    Ok(PagedResult::new(items, total, params))
}

async fn update_job_mysql(pool: &MySqlPool, job: &Job) -> Result<Job> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET slug = ?, title = ?, description = ?, company = ?, location = ?, employment_type = ?,
            salary_min = ?, salary_max = ?, industry_id = ?, sub_industry_id = ?, department_id = ?,
            sub_department_id = ?, job_title_id = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&job.slug)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.company)
    .bind(&job.location)
    .bind(job.employment_type.as_str())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.industry_id)
    .bind(job.sub_industry_id)
    .bind(job.department_id)
    .bind(job.sub_department_id)
    .bind(job.job_title_id)
    .bind(job.status.as_str())
    .bind(Utc::now())
    .bind(job.id)
    .execute(pool)
    .await
    .context("Failed to update job posting")?;

    replace_skills_mysql(pool, job.id, &job.skill_ids).await?;

    get_job_by_id_mysql(pool, job.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Job posting not found after update"))
}

async fn delete_job_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete job posting")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM jobs WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check job slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn count_by_status_mysql(pool: &MySqlPool, status: JobStatus) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM jobs WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count job postings")?;

    Ok(row.get("count"))
}

async fn get_skill_ids_mysql(pool: &MySqlPool, job_id: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT skill_id FROM job_skills WHERE job_id = ? ORDER BY skill_id")
        .bind(job_id)
        .fetch_all(pool)
        .await
        .context("Failed to get job skills")?;

    Ok(rows.iter().map(|row| row.get("skill_id")).collect())
}

async fn replace_skills_mysql(pool: &MySqlPool, job_id: i64, skill_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM job_skills WHERE job_id = ?")
        .bind(job_id)
        .execute(pool)
        .await
        .context("Failed to clear job skills")?;

    for skill_id in skill_ids {
        sqlx::query("INSERT INTO job_skills (job_id, skill_id) VALUES (?, ?)")
            .bind(job_id)
            .bind(skill_id)
            .execute(pool)
            .await
            .context("Failed to insert job skill")?;
    }

    Ok(())
}

fn row_to_job_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Job> {
    let employment_type: String = row.get("employment_type");
    let status: String = row.get("status");
    Ok(Job {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        description: row.get("description"),
        company: row.get("company"),
        location: row.get("location"),
        employment_type: employment_type.parse()?,
        salary_min: row.get("salary_min"),
        salary_max: row.get("salary_max"),
        industry_id: row.get("industry_id"),
        sub_industry_id: row.get("sub_industry_id"),
        department_id: row.get("department_id"),
        sub_department_id: row.get("sub_department_id"),
        job_title_id: row.get("job_title_id"),
        skill_ids: Vec::new(),
        status: status.parse()?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::master_data::{MasterDataRepository, SqlxMasterDataRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{EmploymentType, MasterDataItem, MasterDataKind};

    struct Fixture {
        repo: SqlxJobRepository,
        industry_id: i64,
        skill_ids: Vec<i64>,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let md_repo = SqlxMasterDataRepository::new(pool.clone());
        let industry = md_repo
            .create(&MasterDataItem::new(
                MasterDataKind::Industry,
                "tech".to_string(),
                "Technology".to_string(),
                None,
                0,
            ))
            .await
            .expect("Failed to create industry");

        let mut skill_ids = Vec::new();
        for slug in ["rust", "sql"] {
            let skill = md_repo
                .create(&MasterDataItem::new(
                    MasterDataKind::Skill,
                    slug.to_string(),
                    slug.to_uppercase(),
                    None,
                    0,
                ))
                .await
                .expect("Failed to create skill");
            skill_ids.push(skill.id);
        }

        Fixture {
            repo: SqlxJobRepository::new(pool),
            industry_id: industry.id,
            skill_ids,
        }
    }

    fn job(slug: &str, industry_id: i64, status: JobStatus) -> Job {
        let now = Utc::now();
        Job {
            id: 0,
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            description: "Description".to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            employment_type: EmploymentType::FullTime,
            salary_min: Some(50_000),
            salary_max: Some(70_000),
            industry_id,
            sub_industry_id: None,
            department_id: None,
            sub_department_id: None,
            job_title_id: None,
            skill_ids: Vec::new(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_skills() {
        let fx = setup().await;

        let mut input = job("backend-engineer", fx.industry_id, JobStatus::Open);
        input.skill_ids = fx.skill_ids.clone();

        let created = fx.repo.create(&input).await.expect("Failed to create job");
        assert!(created.id > 0);

        let found = fx
            .repo
            .get_by_id(created.id)
            .await
            .unwrap()
            .expect("Job not found");
        assert_eq!(found.skill_ids, fx.skill_ids);
        assert_eq!(found.status, JobStatus::Open);

        let by_slug = fx.repo.get_by_slug("backend-engineer").await.unwrap().unwrap();
        assert_eq!(by_slug.id, created.id);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let fx = setup().await;
        fx.repo.create(&job("a", fx.industry_id, JobStatus::Open)).await.unwrap();
        fx.repo.create(&job("b", fx.industry_id, JobStatus::Draft)).await.unwrap();
        fx.repo.create(&job("c", fx.industry_id, JobStatus::Open)).await.unwrap();

        let filter = JobFilter {
            status: Some(JobStatus::Open),
            ..Default::default()
        };
        let result = fx.repo.list(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(result.total, 2);
        assert!(result.items.iter().all(|j| j.status == JobStatus::Open));
    }

    #[tokio::test]
    async fn test_list_free_text_search() {
        let fx = setup().await;

        let mut j1 = job("rust-dev", fx.industry_id, JobStatus::Open);
        j1.title = "Rust Developer".to_string();
        let mut j2 = job("pm", fx.industry_id, JobStatus::Open);
        j2.title = "Product Manager".to_string();
        j2.company = "Rustacean Labs".to_string();
        let mut j3 = job("designer", fx.industry_id, JobStatus::Open);
        j3.title = "Designer".to_string();

        fx.repo.create(&j1).await.unwrap();
        fx.repo.create(&j2).await.unwrap();
        fx.repo.create(&j3).await.unwrap();

        // Matches title of j1 and company of j2, case-insensitively
        let filter = JobFilter {
            q: Some("RUST".to_string()),
            ..Default::default()
        };
        let result = fx.repo.list(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_list_location_filter() {
        let fx = setup().await;

        let mut j1 = job("j1", fx.industry_id, JobStatus::Open);
        j1.location = "Berlin, Germany".to_string();
        let mut j2 = job("j2", fx.industry_id, JobStatus::Open);
        j2.location = "Munich".to_string();

        fx.repo.create(&j1).await.unwrap();
        fx.repo.create(&j2).await.unwrap();

        let filter = JobFilter {
            location: Some("berlin".to_string()),
            ..Default::default()
        };
        let result = fx.repo.list(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].slug, "j1");
    }

    #[tokio::test]
    async fn test_update_replaces_skills() {
        let fx = setup().await;

        let mut input = job("update-me", fx.industry_id, JobStatus::Draft);
        input.skill_ids = vec![fx.skill_ids[0]];
        let mut created = fx.repo.create(&input).await.unwrap();

        created.title = "Updated".to_string();
        created.status = JobStatus::Open;
        created.skill_ids = vec![fx.skill_ids[1]];

        let updated = fx.repo.update(&created).await.expect("Failed to update");
        assert_eq!(updated.title, "Updated");
        assert_eq!(updated.status, JobStatus::Open);
        assert_eq!(updated.skill_ids, vec![fx.skill_ids[1]]);
    }

    #[tokio::test]
    async fn test_delete_job_cascades_skills() {
        let fx = setup().await;

        let mut input = job("delete-me", fx.industry_id, JobStatus::Open);
        input.skill_ids = fx.skill_ids.clone();
        let created = fx.repo.create(&input).await.unwrap();

        fx.repo.delete(created.id).await.expect("Failed to delete");
        assert!(fx.repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let fx = setup().await;
        fx.repo.create(&job("a", fx.industry_id, JobStatus::Open)).await.unwrap();
        fx.repo.create(&job("b", fx.industry_id, JobStatus::Closed)).await.unwrap();

        assert_eq!(fx.repo.count_by_status(JobStatus::Open).await.unwrap(), 1);
        assert_eq!(fx.repo.count_by_status(JobStatus::Draft).await.unwrap(), 0);
    }

    #[test]
    fn test_build_job_filter_sql_empty() {
        let (sql, binds) = build_job_filter_sql(&JobFilter::default());
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_build_job_filter_sql_all() {
        let filter = JobFilter {
            status: Some(JobStatus::Open),
            industry_id: Some(7),
            location: Some("Berlin".to_string()),
            employment_type: Some(EmploymentType::Contract),
            q: Some("Rust".to_string()),
        };
        let (sql, binds) = build_job_filter_sql(&filter);

        assert!(sql.starts_with(" WHERE "));
        assert!(sql.contains("status = ?"));
        assert!(sql.contains("industry_id = ?"));
        assert!(sql.contains("employment_type = ?"));
        assert!(sql.contains("LOWER(location) LIKE ?"));
        assert!(sql.contains("LOWER(title) LIKE ?"));
        // status, industry, employment_type, location + 3 free-text binds
        assert_eq!(binds.len(), 7);
        assert_eq!(binds[1], FilterBind::Int(7));
        assert_eq!(binds[3], FilterBind::Str("%berlin%".to_string()));
    }
}
