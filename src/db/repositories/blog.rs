//! Blog repository
//!
//! Database operations for blog posts.
//!
//! This module provides:
//! - `BlogRepository` trait defining the interface for blog data access
//! - `SqlxBlogRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Blog, BlogFilter, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const BLOG_COLUMNS: &str =
    "id, slug, title, body, author_id, published, published_at, created_at, updated_at";

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Create a new blog post
    async fn create(&self, blog: &Blog) -> Result<Blog>;

    /// Get blog post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>>;

    /// Get blog post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>>;

    /// List blog posts matching the filter, newest first
    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<PagedResult<Blog>>;

    /// Update a blog post
    async fn update(&self, blog: &Blog) -> Result<Blog>;

    /// Delete a blog post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a blog slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based blog repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    /// Create a new SQLx blog repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, blog: &Blog) -> Result<Blog> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_blog_sqlite(self.pool.as_sqlite().unwrap(), blog).await,
            DatabaseDriver::Mysql => create_blog_mysql(self.pool.as_mysql().unwrap(), blog).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_blog_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_blog_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_blog_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => {
                get_blog_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await
            }
        }
    }

    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<PagedResult<Blog>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_blogs_sqlite(self.pool.as_sqlite().unwrap(), filter, params).await
            }
            DatabaseDriver::Mysql => {
                list_blogs_mysql(self.pool.as_mysql().unwrap(), filter, params).await
            }
        }
    }

    async fn update(&self, blog: &Blog) -> Result<Blog> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_blog_sqlite(self.pool.as_sqlite().unwrap(), blog).await,
            DatabaseDriver::Mysql => update_blog_mysql(self.pool.as_mysql().unwrap(), blog).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_blog_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_blog_mysql(self.pool.as_mysql().unwrap(), id).await,
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
}

/// Build the WHERE clause for a blog filter.
///
/// Returns the clause (starting with " WHERE" when non-empty); values are
/// bound in filter order: published, author_id.
fn build_blog_filter_sql(filter: &BlogFilter) -> String {
    let mut conditions = Vec::new();
    if filter.published.is_some() {
        conditions.push("published = ?");
    }
    if filter.author_id.is_some() {
        conditions.push("author_id = ?");
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_blog_sqlite(pool: &SqlitePool, blog: &Blog) -> Result<Blog> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO blogs (slug, title, body, author_id, published, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.slug)
    .bind(&blog.title)
    .bind(&blog.body)
    .bind(blog.author_id)
    .bind(blog.published)
    .bind(blog.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog post")?;

    Ok(Blog {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..blog.clone()
    })
}

async fn get_blog_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Blog>> {
    let sql = format!("SELECT {} FROM blogs WHERE id = ?", BLOG_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by ID")?;

    row.map(|row| row_to_blog_sqlite(&row)).transpose()
}

async fn get_blog_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Blog>> {
    let sql = format!("SELECT {} FROM blogs WHERE slug = ?", BLOG_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by slug")?;

    row.map(|row| row_to_blog_sqlite(&row)).transpose()
}

async fn list_blogs_sqlite(
    pool: &SqlitePool,
    filter: &BlogFilter,
    params: &ListParams,
) -> Result<PagedResult<Blog>> {
    let where_sql = build_blog_filter_sql(filter);

    let count_sql = format!("SELECT COUNT(*) as count FROM blogs{}", where_sql);
    let mut count_query = sqlx::query(&count_sql);
    if let Some(published) = filter.published {
        count_query = count_query.bind(published);
    }
    if let Some(author_id) = filter.author_id {
        count_query = count_query.bind(author_id);
    }
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count blog posts")?
        .get("count");

    let list_sql = format!(
        "SELECT {} FROM blogs{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        BLOG_COLUMNS, where_sql
    );
    let mut list_query = sqlx::query(&list_sql);
    if let Some(published) = filter.published {
        list_query = list_query.bind(published);
    }
    if let Some(author_id) = filter.author_id {
        list_query = list_query.bind(author_id);
    }
    let rows = list_query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list blog posts")?;

    let items: Result<Vec<Blog>> = rows.iter().map(row_to_blog_sqlite).collect();
    Ok(PagedResult::new(items?, total, params))
}

async fn update_blog_sqlite(pool: &SqlitePool, blog: &Blog) -> Result<Blog> {
    sqlx::query(
        r#"
        UPDATE blogs
        SET slug = ?, title = ?, body = ?, published = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.slug)
    .bind(&blog.title)
    .bind(&blog.body)
    .bind(blog.published)
    .bind(blog.published_at)
    .bind(Utc::now())
    .bind(blog.id)
    .execute(pool)
    .await
    .context("Failed to update blog post")?;

    get_blog_by_id_sqlite(pool, blog.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Blog post not found after update"))
}

async fn delete_blog_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete blog post")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blogs WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check blog slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_blog_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Blog> {
    Ok(Blog {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        body: row.get("body"),
        author_id: row.get("author_id"),
        published: row.get("published"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_blog_mysql(pool: &MySqlPool, blog: &Blog) -> Result<Blog> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO blogs (slug, title, body, author_id, published, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.slug)
    .bind(&blog.title)
    .bind(&blog.body)
    .bind(blog.author_id)
    .bind(blog.published)
    .bind(blog.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create blog post")?;

    Ok(Blog {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..blog.clone()
    })
}

async fn get_blog_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Blog>> {
    let sql = format!("SELECT {} FROM blogs WHERE id = ?", BLOG_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by ID")?;

    row.map(|row| row_to_blog_mysql(&row)).transpose()
}

async fn get_blog_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Blog>> {
    let sql = format!("SELECT {} FROM blogs WHERE slug = ?", BLOG_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get blog post by slug")?;

    row.map(|row| row_to_blog_mysql(&row)).transpose()
}

async fn list_blogs_mysql(
    pool: &MySqlPool,
    filter: &BlogFilter,
    params: &ListParams,
) -> Result<PagedResult<Blog>> {
    let where_sql = build_blog_filter_sql(filter);

    let count_sql = format!("SELECT COUNT(*) as count FROM blogs{}", where_sql);
    let mut count_query = sqlx::query(&count_sql);
    if let Some(published) = filter.published {
        count_query = count_query.bind(published);
    }
    if let Some(author_id) = filter.author_id {
        count_query = count_query.bind(author_id);
    }
    let total: i64 = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count blog posts")?
        .get("count");

    let list_sql = format!(
        "SELECT {} FROM blogs{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        BLOG_COLUMNS, where_sql
    );
    let mut list_query = sqlx::query(&list_sql);
    if let Some(published) = filter.published {
        list_query = list_query.bind(published);
    }
    if let Some(author_id) = filter.author_id {
        list_query = list_query.bind(author_id);
    }
    let rows = list_query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list blog posts")?;

    let items: Result<Vec<Blog>> = rows.iter().map(row_to_blog_mysql).collect();
    Ok(PagedResult::new(items?, total, params))
}

async fn update_blog_mysql(pool: &MySqlPool, blog: &Blog) -> Result<Blog> {
    sqlx::query(
        r#"
        UPDATE blogs
        SET slug = ?, title = ?, body = ?, published = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&blog.slug)
    .bind(&blog.title)
    .bind(&blog.body)
    .bind(blog.published)
    .bind(blog.published_at)
    .bind(Utc::now())
    .bind(blog.id)
    .execute(pool)
    .await
    .context("Failed to update blog post")?;

    get_blog_by_id_mysql(pool, blog.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Blog post not found after update"))
}

async fn delete_blog_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete blog post")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM blogs WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check blog slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_blog_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Blog> {
    Ok(Blog {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        body: row.get("body"),
        author_id: row.get("author_id"),
        published: row.get("published"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
