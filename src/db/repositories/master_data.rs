//! Master data repository
//!
//! Database operations for the reference-data lookup lists.
//!
//! This module provides:
//! - `MasterDataRepository` trait defining the interface for lookup data access
//! - `SqlxMasterDataRepository` implementing the trait for SQLite and MySQL
//!
//! Every lookup kind lives in the single `master_data` table; queries are
//! always scoped by kind, and dependent kinds filter by `parent_id`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{MasterDataItem, MasterDataKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Master data repository trait
#[async_trait]
pub trait MasterDataRepository: Send + Sync {
    /// Create a new item
    async fn create(&self, item: &MasterDataItem) -> Result<MasterDataItem>;

    /// Get item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<MasterDataItem>>;

    /// Get item by kind and slug
    async fn get_by_kind_slug(
        &self,
        kind: MasterDataKind,
        slug: &str,
    ) -> Result<Option<MasterDataItem>>;

    /// List items of a kind, optionally restricted to one parent.
    ///
    /// Inactive items are excluded unless `include_inactive` is set.
    async fn list_by_kind(
        &self,
        kind: MasterDataKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<MasterDataItem>>;

    /// Update an item
    async fn update(&self, item: &MasterDataItem) -> Result<MasterDataItem>;

    /// Delete an item
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if an item with this kind and slug already exists
    async fn exists_by_kind_slug(&self, kind: MasterDataKind, slug: &str) -> Result<bool>;

    /// Check if any item references this one as parent
    async fn has_children(&self, id: i64) -> Result<bool>;

    /// Count items of a kind
    async fn count_by_kind(&self, kind: MasterDataKind) -> Result<i64>;
}

/// SQLx-based master data repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxMasterDataRepository {
    pool: DynDatabasePool,
}

impl SqlxMasterDataRepository {
    /// Create a new SQLx master data repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn MasterDataRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl MasterDataRepository for SqlxMasterDataRepository {
    async fn create(&self, item: &MasterDataItem) -> Result<MasterDataItem> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), item).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), item).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<MasterDataItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_kind_slug(
        &self,
        kind: MasterDataKind,
        slug: &str,
    ) -> Result<Option<MasterDataItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_kind_slug_sqlite(self.pool.as_sqlite().unwrap(), kind, slug).await
            }
            DatabaseDriver::Mysql => {
                get_by_kind_slug_mysql(self.pool.as_mysql().unwrap(), kind, slug).await
            }
        }
    }

    async fn list_by_kind(
        &self,
        kind: MasterDataKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<MasterDataItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_kind_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    kind,
                    parent_id,
                    include_inactive,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                list_by_kind_mysql(
                    self.pool.as_mysql().unwrap(),
                    kind,
                    parent_id,
                    include_inactive,
                )
                .await
            }
        }
    }

    async fn update(&self, item: &MasterDataItem) -> Result<MasterDataItem> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), item).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), item).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn exists_by_kind_slug(&self, kind: MasterDataKind, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_kind_slug_sqlite(self.pool.as_sqlite().unwrap(), kind, slug).await
            }
            DatabaseDriver::Mysql => {
                exists_by_kind_slug_mysql(self.pool.as_mysql().unwrap(), kind, slug).await
            }
        }
    }

    async fn has_children(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => has_children_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => has_children_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count_by_kind(&self, kind: MasterDataKind) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_kind_sqlite(self.pool.as_sqlite().unwrap(), kind).await
            }
            DatabaseDriver::Mysql => count_by_kind_mysql(self.pool.as_mysql().unwrap(), kind).await,
        }
    }
}

/// Build the list query for a kind with optional parent/active filters.
///
/// Both backends use `?` placeholders, so the SQL is shared; only the bind
/// call sites differ.
fn build_list_sql(parent_filter: bool, include_inactive: bool) -> String {
    let mut sql = String::from(
        "SELECT id, kind, slug, label, parent_id, sort_order, is_active, created_at \
         FROM master_data WHERE kind = ?",
    );
    if parent_filter {
        sql.push_str(" AND parent_id = ?");
    }
    if !include_inactive {
        sql.push_str(" AND is_active = 1");
    }
    sql.push_str(" ORDER BY sort_order, label");
    sql
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, item: &MasterDataItem) -> Result<MasterDataItem> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO master_data (kind, slug, label, parent_id, sort_order, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.kind.as_str())
    .bind(&item.slug)
    .bind(&item.label)
    .bind(item.parent_id)
    .bind(item.sort_order)
    .bind(item.is_active)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create master data item")?;

    Ok(MasterDataItem {
        id: result.last_insert_rowid(),
        created_at: now,
        ..item.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<MasterDataItem>> {
    let row = sqlx::query(
        r#"
        SELECT id, kind, slug, label, parent_id, sort_order, is_active, created_at
        FROM master_data
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get master data item by ID")?;

    row.map(|row| row_to_item_sqlite(&row)).transpose()
}

async fn get_by_kind_slug_sqlite(
    pool: &SqlitePool,
    kind: MasterDataKind,
    slug: &str,
) -> Result<Option<MasterDataItem>> {
    let row = sqlx::query(
        r#"
        SELECT id, kind, slug, label, parent_id, sort_order, is_active, created_at
        FROM master_data
        WHERE kind = ? AND slug = ?
        "#,
    )
    .bind(kind.as_str())
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get master data item by slug")?;

    row.map(|row| row_to_item_sqlite(&row)).transpose()
}

async fn list_by_kind_sqlite(
    pool: &SqlitePool,
    kind: MasterDataKind,
    parent_id: Option<i64>,
    include_inactive: bool,
) -> Result<Vec<MasterDataItem>> {
    let sql = build_list_sql(parent_id.is_some(), include_inactive);
    let mut query = sqlx::query(&sql).bind(kind.as_str());
    if let Some(parent_id) = parent_id {
        query = query.bind(parent_id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list master data items")?;

    rows.iter().map(row_to_item_sqlite).collect()
}

async fn update_sqlite(pool: &SqlitePool, item: &MasterDataItem) -> Result<MasterDataItem> {
    sqlx::query(
        r#"
        UPDATE master_data
        SET slug = ?, label = ?, parent_id = ?, sort_order = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(&item.slug)
    .bind(&item.label)
    .bind(item.parent_id)
    .bind(item.sort_order)
    .bind(item.is_active)
    .bind(item.id)
    .execute(pool)
    .await
    .context("Failed to update master data item")?;

    get_by_id_sqlite(pool, item.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Master data item not found after update"))
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM master_data WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete master data item")?;

    Ok(())
}

async fn exists_by_kind_slug_sqlite(
    pool: &SqlitePool,
    kind: MasterDataKind,
    slug: &str,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE kind = ? AND slug = ?")
        .bind(kind.as_str())
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check master data slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn has_children_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE parent_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check master data children")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn count_by_kind_sqlite(pool: &SqlitePool, kind: MasterDataKind) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE kind = ?")
        .bind(kind.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count master data items")?;

    Ok(row.get("count"))
}

fn row_to_item_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<MasterDataItem> {
    let kind: String = row.get("kind");
    Ok(MasterDataItem {
        id: row.get("id"),
        kind: kind.parse()?,
        slug: row.get("slug"),
        label: row.get("label"),
        parent_id: row.get("parent_id"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, item: &MasterDataItem) -> Result<MasterDataItem> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO master_data (kind, slug, label, parent_id, sort_order, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.kind.as_str())
    .bind(&item.slug)
    .bind(&item.label)
    .bind(item.parent_id)
    .bind(item.sort_order)
    .bind(item.is_active)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create master data item")?;

    Ok(MasterDataItem {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..item.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<MasterDataItem>> {
    let row = sqlx::query(
        r#"
        SELECT id, kind, slug, label, parent_id, sort_order, is_active, created_at
        FROM master_data
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get master data item by ID")?;

    row.map(|row| row_to_item_mysql(&row)).transpose()
}

async fn get_by_kind_slug_mysql(
    pool: &MySqlPool,
    kind: MasterDataKind,
    slug: &str,
) -> Result<Option<MasterDataItem>> {
    let row = sqlx::query(
        r#"
        SELECT id, kind, slug, label, parent_id, sort_order, is_active, created_at
        FROM master_data
        WHERE kind = ? AND slug = ?
        "#,
    )
    .bind(kind.as_str())
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get master data item by slug")?;

    row.map(|row| row_to_item_mysql(&row)).transpose()
}

async fn list_by_kind_mysql(
    pool: &MySqlPool,
    kind: MasterDataKind,
    parent_id: Option<i64>,
    include_inactive: bool,
) -> Result<Vec<MasterDataItem>> {
    let sql = build_list_sql(parent_id.is_some(), include_inactive);
    let mut query = sqlx::query(&sql).bind(kind.as_str());
    if let Some(parent_id) = parent_id {
        query = query.bind(parent_id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list master data items")?;

    rows.iter().map(row_to_item_mysql).collect()
}

async fn update_mysql(pool: &MySqlPool, item: &MasterDataItem) -> Result<MasterDataItem> {
    sqlx::query(
        r#"
        UPDATE master_data
        SET slug = ?, label = ?, parent_id = ?, sort_order = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(&item.slug)
    .bind(&item.label)
    .bind(item.parent_id)
    .bind(item.sort_order)
    .bind(item.is_active)
    .bind(item.id)
    .execute(pool)
    .await
    .context("Failed to update master data item")?;

    get_by_id_mysql(pool, item.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Master data item not found after update"))
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM master_data WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete master data item")?;

    Ok(())
}

async fn exists_by_kind_slug_mysql(
    pool: &MySqlPool,
    kind: MasterDataKind,
    slug: &str,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE kind = ? AND slug = ?")
        .bind(kind.as_str())
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check master data slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn has_children_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE parent_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("Failed to check master data children")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn count_by_kind_mysql(pool: &MySqlPool, kind: MasterDataKind) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM master_data WHERE kind = ?")
        .bind(kind.as_str())
        .fetch_one(pool)
        .await
        .context("Failed to count master data items")?;

    Ok(row.get("count"))
}

fn row_to_item_mysql(row: &sqlx::mysql::MySqlRow) -> Result<MasterDataItem> {
    let kind: String = row.get("kind");
    Ok(MasterDataItem {
        id: row.get("id"),
        kind: kind.parse()?,
        slug: row.get("slug"),
        label: row.get("label"),
        parent_id: row.get("parent_id"),
        sort_order: row.get("sort_order"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxMasterDataRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxMasterDataRepository::new(pool.clone());
        (pool, repo)
    }

    fn item(kind: MasterDataKind, slug: &str, label: &str, parent_id: Option<i64>) -> MasterDataItem {
        MasterDataItem::new(kind, slug.to_string(), label.to_string(), parent_id, 0)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo
            .create(&item(MasterDataKind::Industry, "it", "Information Technology", None))
            .await
            .expect("Failed to create");

        assert!(created.id > 0);
        assert!(created.is_active);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get")
            .expect("Not found");
        assert_eq!(found.kind, MasterDataKind::Industry);
        assert_eq!(found.label, "Information Technology");
    }

    #[tokio::test]
    async fn test_get_by_kind_slug() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&item(MasterDataKind::Skill, "rust", "Rust", None))
            .await
            .expect("Failed to create");

        let found = repo
            .get_by_kind_slug(MasterDataKind::Skill, "rust")
            .await
            .expect("Failed to get")
            .expect("Not found");
        assert_eq!(found.slug, "rust");

        // Same slug under a different kind is a different namespace
        let missing = repo
            .get_by_kind_slug(MasterDataKind::Industry, "rust")
            .await
            .expect("Failed to get");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_kind_slug_unique_constraint() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&item(MasterDataKind::Skill, "sql", "SQL", None))
            .await
            .expect("Failed to create first");

        let result = repo.create(&item(MasterDataKind::Skill, "sql", "SQL again", None)).await;
        assert!(result.is_err(), "Should fail due to duplicate (kind, slug)");

        // Same slug on another kind is allowed
        repo.create(&item(MasterDataKind::JobTitle, "sql", "SQL Developer", None))
            .await
            .expect("Different kind should be allowed");
    }

    #[tokio::test]
    async fn test_list_by_kind_filters_parent() {
        let (_pool, repo) = setup_test_repo().await;

        let tech = repo
            .create(&item(MasterDataKind::Industry, "tech", "Technology", None))
            .await
            .unwrap();
        let finance = repo
            .create(&item(MasterDataKind::Industry, "finance", "Finance", None))
            .await
            .unwrap();

        repo.create(&item(MasterDataKind::SubIndustry, "software", "Software", Some(tech.id)))
            .await
            .unwrap();
        repo.create(&item(MasterDataKind::SubIndustry, "hardware", "Hardware", Some(tech.id)))
            .await
            .unwrap();
        repo.create(&item(MasterDataKind::SubIndustry, "banking", "Banking", Some(finance.id)))
            .await
            .unwrap();

        let tech_subs = repo
            .list_by_kind(MasterDataKind::SubIndustry, Some(tech.id), false)
            .await
            .expect("Failed to list");
        assert_eq!(tech_subs.len(), 2);
        assert!(tech_subs.iter().all(|i| i.parent_id == Some(tech.id)));

        let all_subs = repo
            .list_by_kind(MasterDataKind::SubIndustry, None, false)
            .await
            .expect("Failed to list");
        assert_eq!(all_subs.len(), 3);
    }

    #[tokio::test]
    async fn test_list_excludes_inactive() {
        let (_pool, repo) = setup_test_repo().await;

        let mut skill = repo
            .create(&item(MasterDataKind::Skill, "cobol", "COBOL", None))
            .await
            .unwrap();
        repo.create(&item(MasterDataKind::Skill, "rust", "Rust", None))
            .await
            .unwrap();

        skill.is_active = false;
        repo.update(&skill).await.expect("Failed to deactivate");

        let active = repo
            .list_by_kind(MasterDataKind::Skill, None, false)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].slug, "rust");

        let all = repo
            .list_by_kind(MasterDataKind::Skill, None, true)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_sorted_by_sort_order_then_label() {
        let (_pool, repo) = setup_test_repo().await;

        let mut a = item(MasterDataKind::EducationLevel, "phd", "PhD", None);
        a.sort_order = 2;
        let mut b = item(MasterDataKind::EducationLevel, "bachelor", "Bachelor", None);
        b.sort_order = 0;
        let mut c = item(MasterDataKind::EducationLevel, "master", "Master", None);
        c.sort_order = 1;

        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();
        repo.create(&c).await.unwrap();

        let levels = repo
            .list_by_kind(MasterDataKind::EducationLevel, None, false)
            .await
            .unwrap();
        let slugs: Vec<_> = levels.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, vec!["bachelor", "master", "phd"]);
    }

    #[tokio::test]
    async fn test_has_children() {
        let (_pool, repo) = setup_test_repo().await;

        let parent = repo
            .create(&item(MasterDataKind::Department, "eng", "Engineering", None))
            .await
            .unwrap();
        let leaf = repo
            .create(&item(MasterDataKind::Department, "sales", "Sales", None))
            .await
            .unwrap();
        repo.create(&item(MasterDataKind::SubDepartment, "backend", "Backend", Some(parent.id)))
            .await
            .unwrap();

        assert!(repo.has_children(parent.id).await.unwrap());
        assert!(!repo.has_children(leaf.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&item(MasterDataKind::Skill, "go", "Go", None))
            .await
            .unwrap();

        repo.delete(created.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_by_kind() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&item(MasterDataKind::Skill, "rust", "Rust", None))
            .await
            .unwrap();
        repo.create(&item(MasterDataKind::Skill, "sql", "SQL", None))
            .await
            .unwrap();

        assert_eq!(repo.count_by_kind(MasterDataKind::Skill).await.unwrap(), 2);
        assert_eq!(repo.count_by_kind(MasterDataKind::Course).await.unwrap(), 0);
    }

    #[test]
    fn test_build_list_sql_variants() {
        let base = build_list_sql(false, false);
        assert!(base.contains("kind = ?"));
        assert!(base.contains("is_active = 1"));
        assert!(!base.contains("parent_id"));

        let with_parent = build_list_sql(true, true);
        assert!(with_parent.contains("parent_id = ?"));
        assert!(!with_parent.contains("is_active"));
    }
}
