//! Master data service
//!
//! Implements business logic for the reference-data lookup lists behind the
//! multi-step job-post form:
//! - Generic CRUD over all lookup kinds
//! - Parent/cascade validation (a sub-industry must hang off an industry,
//!   a course off an education level, and so on)
//! - Dependent-dropdown option lookups filtered by parent
//! - Resolving the full selection chain of a dependent item

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::MasterDataRepository;
use crate::models::{
    CreateMasterDataInput, MasterDataItem, MasterDataKind, UpdateMasterDataInput,
};
use crate::services::blog::generate_slug;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Default cache TTL for lookup lists (1 hour)
const MASTER_DATA_CACHE_TTL_SECS: u64 = 3600;

/// Upper bound on cascade depth when walking parent links.
/// The deepest real chain is education level -> course -> specialization.
const MAX_CHAIN_DEPTH: usize = 8;

/// Error types for master data service operations
#[derive(Debug, thiserror::Error)]
pub enum MasterDataServiceError {
    /// Item not found
    #[error("Master data item not found: {0}")]
    NotFound(i64),

    /// Label already exists within the same kind and parent
    #[error("Label already exists: {0}")]
    DuplicateLabel(String),

    /// Slug already exists within the kind
    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    /// A dependent kind was created without its parent
    #[error("Kind {0} requires a parent of kind {1}")]
    ParentRequired(MasterDataKind, MasterDataKind),

    /// A root kind was given a parent
    #[error("Kind {0} does not take a parent")]
    ParentNotAllowed(MasterDataKind),

    /// Parent item not found
    #[error("Parent item not found: {0}")]
    ParentNotFound(i64),

    /// Parent item has the wrong kind for this cascade
    #[error("Parent of kind {expected} required, found {actual}")]
    ParentKindMismatch {
        expected: MasterDataKind,
        actual: MasterDataKind,
    },

    /// Parent item is inactive
    #[error("Parent item is inactive: {0}")]
    ParentInactive(i64),

    /// Item still has dependent children
    #[error("Item {0} has dependent items and cannot be deleted")]
    HasChildren(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Master data service for managing lookup lists
pub struct MasterDataService {
    repo: Arc<dyn MasterDataRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl MasterDataService {
    /// Create a new master data service
    pub fn new(repo: Arc<dyn MasterDataRepository>, cache: Arc<Cache>) -> Self {
        Self {
            repo,
            cache,
            cache_ttl: Duration::from_secs(MASTER_DATA_CACHE_TTL_SECS),
        }
    }

    /// Create a new item of the given kind
    pub async fn create(
        &self,
        kind: MasterDataKind,
        input: CreateMasterDataInput,
    ) -> Result<MasterDataItem, MasterDataServiceError> {
        if input.label.trim().is_empty() {
            return Err(MasterDataServiceError::ValidationError(
                "Label must not be empty".to_string(),
            ));
        }

        self.validate_parent(kind, input.parent_id).await?;
        self.check_label_unique(kind, input.parent_id, &input.label, None)
            .await?;

        let slug = match input.slug {
            Some(slug) => {
                if self
                    .repo
                    .exists_by_kind_slug(kind, &slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(MasterDataServiceError::DuplicateSlug(slug));
                }
                slug
            }
            None => self.unique_slug(kind, &input.label).await?,
        };

        let item = MasterDataItem::new(
            kind,
            slug,
            input.label.trim().to_string(),
            input.parent_id,
            input.sort_order.unwrap_or(0),
        );

        let created = self
            .repo
            .create(&item)
            .await
            .context("Failed to create master data item")?;

        self.invalidate_kind(kind).await;
        Ok(created)
    }

    /// Get an item by ID regardless of kind
    pub async fn get_by_id(
        &self,
        id: i64,
    ) -> Result<Option<MasterDataItem>, MasterDataServiceError> {
        Ok(self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get master data item")?)
    }

    /// Get an item by ID, requiring it to be of the given kind
    pub async fn get(
        &self,
        kind: MasterDataKind,
        id: i64,
    ) -> Result<MasterDataItem, MasterDataServiceError> {
        let item = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get master data item")?
            .filter(|item| item.kind == kind)
            .ok_or(MasterDataServiceError::NotFound(id))?;
        Ok(item)
    }

    /// Dependent-dropdown option lookup.
    ///
    /// Returns the items of a kind, filtered by parent when given, sorted by
    /// sort order then label. Inactive items are only included when
    /// requested (admin views).
    pub async fn options(
        &self,
        kind: MasterDataKind,
        parent_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<MasterDataItem>, MasterDataServiceError> {
        let cache_key = format!(
            "md:{}:{}:{}",
            kind,
            parent_id.map_or("all".to_string(), |id| id.to_string()),
            if include_inactive { "all" } else { "active" }
        );
        if let Some(items) = self
            .cache
            .get::<Vec<MasterDataItem>>(&cache_key)
            .await
            .ok()
            .flatten()
        {
            return Ok(items);
        }

        let items = self
            .repo
            .list_by_kind(kind, parent_id, include_inactive)
            .await
            .context("Failed to list master data items")?;

        let _ = self.cache.set(&cache_key, &items, self.cache_ttl).await;
        Ok(items)
    }

    /// Resolve the full cascade chain of an item, root first.
    ///
    /// For a specialization this returns
    /// `[education level, course, specialization]`.
    pub async fn cascade_chain(
        &self,
        id: i64,
    ) -> Result<Vec<MasterDataItem>, MasterDataServiceError> {
        let mut chain = Vec::new();
        let mut current = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get master data item")?
            .ok_or(MasterDataServiceError::NotFound(id))?;

        loop {
            if chain.len() >= MAX_CHAIN_DEPTH {
                return Err(MasterDataServiceError::InternalError(anyhow::anyhow!(
                    "Cascade chain exceeds maximum depth at item {}",
                    current.id
                )));
            }

            let parent_id = current.parent_id;
            chain.push(current);

            match parent_id {
                Some(parent_id) => {
                    current = self
                        .repo
                        .get_by_id(parent_id)
                        .await
                        .context("Failed to get parent item")?
                        .ok_or(MasterDataServiceError::ParentNotFound(parent_id))?;
                }
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }

    /// Update an item of the given kind.
    ///
    /// The kind and parent of an item are fixed at creation; label, slug,
    /// sort order and active flag can change.
    pub async fn update(
        &self,
        kind: MasterDataKind,
        id: i64,
        input: UpdateMasterDataInput,
    ) -> Result<MasterDataItem, MasterDataServiceError> {
        let mut item = self.get(kind, id).await?;

        if !input.has_changes() {
            return Ok(item);
        }

        if let Some(label) = input.label {
            if label.trim().is_empty() {
                return Err(MasterDataServiceError::ValidationError(
                    "Label must not be empty".to_string(),
                ));
            }
            self.check_label_unique(kind, item.parent_id, &label, Some(item.id))
                .await?;
            item.label = label.trim().to_string();
        }
        if let Some(slug) = input.slug {
            if slug != item.slug {
                if self
                    .repo
                    .exists_by_kind_slug(kind, &slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(MasterDataServiceError::DuplicateSlug(slug));
                }
                item.slug = slug;
            }
        }
        if let Some(sort_order) = input.sort_order {
            item.sort_order = sort_order;
        }
        if let Some(is_active) = input.is_active {
            item.is_active = is_active;
        }

        let updated = self
            .repo
            .update(&item)
            .await
            .context("Failed to update master data item")?;

        self.invalidate_kind(kind).await;
        Ok(updated)
    }

    /// Delete an item of the given kind.
    ///
    /// Items that still have dependent children are refused.
    pub async fn delete(
        &self,
        kind: MasterDataKind,
        id: i64,
    ) -> Result<(), MasterDataServiceError> {
        let item = self.get(kind, id).await?;

        if self
            .repo
            .has_children(item.id)
            .await
            .context("Failed to check children")?
        {
            return Err(MasterDataServiceError::HasChildren(item.id));
        }

        self.repo
            .delete(item.id)
            .await
            .context("Failed to delete master data item")?;

        self.invalidate_kind(kind).await;
        Ok(())
    }

    /// Count items of a kind
    pub async fn count(&self, kind: MasterDataKind) -> Result<i64, MasterDataServiceError> {
        Ok(self
            .repo
            .count_by_kind(kind)
            .await
            .context("Failed to count master data items")?)
    }

    /// Enforce the parent rules of the cascade topology
    async fn validate_parent(
        &self,
        kind: MasterDataKind,
        parent_id: Option<i64>,
    ) -> Result<(), MasterDataServiceError> {
        match (kind.parent_kind(), parent_id) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(MasterDataServiceError::ParentNotAllowed(kind)),
            (Some(parent_kind), None) => {
                Err(MasterDataServiceError::ParentRequired(kind, parent_kind))
            }
            (Some(parent_kind), Some(parent_id)) => {
                let parent = self
                    .repo
                    .get_by_id(parent_id)
                    .await
                    .context("Failed to get parent item")?
                    .ok_or(MasterDataServiceError::ParentNotFound(parent_id))?;

                if parent.kind != parent_kind {
                    return Err(MasterDataServiceError::ParentKindMismatch {
                        expected: parent_kind,
                        actual: parent.kind,
                    });
                }
                if !parent.is_active {
                    return Err(MasterDataServiceError::ParentInactive(parent_id));
                }
                Ok(())
            }
        }
    }

    /// Labels are unique within (kind, parent), case-insensitively
    async fn check_label_unique(
        &self,
        kind: MasterDataKind,
        parent_id: Option<i64>,
        label: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), MasterDataServiceError> {
        let siblings = self
            .repo
            .list_by_kind(kind, parent_id, true)
            .await
            .context("Failed to list siblings")?;

        let normalized = label.trim().to_lowercase();
        let clash = siblings.iter().any(|item| {
            item.label.to_lowercase() == normalized && Some(item.id) != exclude_id
        });

        if clash {
            return Err(MasterDataServiceError::DuplicateLabel(
                label.trim().to_string(),
            ));
        }
        Ok(())
    }

    async fn unique_slug(
        &self,
        kind: MasterDataKind,
        label: &str,
    ) -> Result<String, MasterDataServiceError> {
        let base = generate_slug(label);
        let base = if base.is_empty() {
            "item".to_string()
        } else {
            base
        };

        if !self
            .repo
            .exists_by_kind_slug(kind, &base)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Ok(base);
        }

        for n in 2..100 {
            let candidate = format!("{}-{}", base, n);
            if !self
                .repo
                .exists_by_kind_slug(kind, &candidate)
                .await
                .context("Failed to check slug uniqueness")?
            {
                return Ok(candidate);
            }
        }

        Err(MasterDataServiceError::DuplicateSlug(base))
    }

    async fn invalidate_kind(&self, kind: MasterDataKind) {
        let _ = self.cache.delete_pattern(&format!("md:{}:*", kind)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxMasterDataRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> MasterDataService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let cache = create_cache(&CacheConfig::default())
            .await
            .expect("Failed to create cache");
        MasterDataService::new(SqlxMasterDataRepository::boxed(pool), cache)
    }

    fn input(label: &str, parent_id: Option<i64>) -> CreateMasterDataInput {
        CreateMasterDataInput {
            label: label.to_string(),
            slug: None,
            parent_id,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_create_root_item() {
        let service = setup().await;

        let item = service
            .create(MasterDataKind::Industry, input("Information Technology", None))
            .await
            .unwrap();

        assert_eq!(item.kind, MasterDataKind::Industry);
        assert_eq!(item.slug, "information-technology");
        assert!(item.is_active);
    }

    #[tokio::test]
    async fn test_root_kind_rejects_parent() {
        let service = setup().await;
        let industry = service
            .create(MasterDataKind::Industry, input("Tech", None))
            .await
            .unwrap();

        let result = service
            .create(MasterDataKind::Industry, input("Child Tech", Some(industry.id)))
            .await;
        assert!(matches!(
            result,
            Err(MasterDataServiceError::ParentNotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_dependent_kind_requires_parent() {
        let service = setup().await;

        let result = service
            .create(MasterDataKind::SubIndustry, input("Software", None))
            .await;
        assert!(matches!(
            result,
            Err(MasterDataServiceError::ParentRequired(_, _))
        ));
    }

    #[tokio::test]
    async fn test_parent_kind_mismatch() {
        let service = setup().await;
        let department = service
            .create(MasterDataKind::Department, input("Engineering", None))
            .await
            .unwrap();

        // A sub-industry must hang off an industry, not a department
        let result = service
            .create(MasterDataKind::SubIndustry, input("Software", Some(department.id)))
            .await;
        assert!(matches!(
            result,
            Err(MasterDataServiceError::ParentKindMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_inactive_parent_rejected() {
        let service = setup().await;
        let industry = service
            .create(MasterDataKind::Industry, input("Legacy", None))
            .await
            .unwrap();
        service
            .update(
                MasterDataKind::Industry,
                industry.id,
                UpdateMasterDataInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = service
            .create(MasterDataKind::SubIndustry, input("Old Tech", Some(industry.id)))
            .await;
        assert!(matches!(
            result,
            Err(MasterDataServiceError::ParentInactive(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_label_within_parent() {
        let service = setup().await;
        let industry = service
            .create(MasterDataKind::Industry, input("Tech", None))
            .await
            .unwrap();
        let other = service
            .create(MasterDataKind::Industry, input("Finance", None))
            .await
            .unwrap();

        service
            .create(MasterDataKind::SubIndustry, input("Consulting", Some(industry.id)))
            .await
            .unwrap();

        // Same label under the same parent is refused, case-insensitively
        let result = service
            .create(MasterDataKind::SubIndustry, input("consulting", Some(industry.id)))
            .await;
        assert!(matches!(
            result,
            Err(MasterDataServiceError::DuplicateLabel(_))
        ));

        // Same label under a different parent is fine
        service
            .create(MasterDataKind::SubIndustry, input("Consulting", Some(other.id)))
            .await
            .expect("Same label under different parent should be allowed");
    }

    #[tokio::test]
    async fn test_options_filters_by_parent_and_active() {
        let service = setup().await;
        let tech = service
            .create(MasterDataKind::Industry, input("Tech", None))
            .await
            .unwrap();
        let finance = service
            .create(MasterDataKind::Industry, input("Finance", None))
            .await
            .unwrap();

        let software = service
            .create(MasterDataKind::SubIndustry, input("Software", Some(tech.id)))
            .await
            .unwrap();
        service
            .create(MasterDataKind::SubIndustry, input("Hardware", Some(tech.id)))
            .await
            .unwrap();
        service
            .create(MasterDataKind::SubIndustry, input("Banking", Some(finance.id)))
            .await
            .unwrap();

        let tech_options = service
            .options(MasterDataKind::SubIndustry, Some(tech.id), false)
            .await
            .unwrap();
        assert_eq!(tech_options.len(), 2);

        // Deactivate one option and it disappears from the dropdown
        service
            .update(
                MasterDataKind::SubIndustry,
                software.id,
                UpdateMasterDataInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let tech_options = service
            .options(MasterDataKind::SubIndustry, Some(tech.id), false)
            .await
            .unwrap();
        assert_eq!(tech_options.len(), 1);
        assert_eq!(tech_options[0].label, "Hardware");

        // Admin view still sees it
        let all_options = service
            .options(MasterDataKind::SubIndustry, Some(tech.id), true)
            .await
            .unwrap();
        assert_eq!(all_options.len(), 2);
    }

    #[tokio::test]
    async fn test_cascade_chain_three_levels() {
        let service = setup().await;
        let bachelor = service
            .create(MasterDataKind::EducationLevel, input("Bachelor", None))
            .await
            .unwrap();
        let cs = service
            .create(MasterDataKind::Course, input("Computer Science", Some(bachelor.id)))
            .await
            .unwrap();
        let ml = service
            .create(MasterDataKind::Specialization, input("Machine Learning", Some(cs.id)))
            .await
            .unwrap();

        let chain = service.cascade_chain(ml.id).await.unwrap();
        let labels: Vec<_> = chain.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Bachelor", "Computer Science", "Machine Learning"]);
    }

    #[tokio::test]
    async fn test_cascade_chain_root() {
        let service = setup().await;
        let skill = service
            .create(MasterDataKind::Skill, input("Rust", None))
            .await
            .unwrap();

        let chain = service.cascade_chain(skill.id).await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].label, "Rust");
    }

    #[tokio::test]
    async fn test_delete_refuses_items_with_children() {
        let service = setup().await;
        let tech = service
            .create(MasterDataKind::Industry, input("Tech", None))
            .await
            .unwrap();
        let software = service
            .create(MasterDataKind::SubIndustry, input("Software", Some(tech.id)))
            .await
            .unwrap();

        let result = service.delete(MasterDataKind::Industry, tech.id).await;
        assert!(matches!(result, Err(MasterDataServiceError::HasChildren(_))));

        // Deleting the leaf first unblocks the parent
        service
            .delete(MasterDataKind::SubIndustry, software.id)
            .await
            .unwrap();
        service.delete(MasterDataKind::Industry, tech.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_enforces_kind() {
        let service = setup().await;
        let skill = service
            .create(MasterDataKind::Skill, input("Rust", None))
            .await
            .unwrap();

        assert!(service.get(MasterDataKind::Skill, skill.id).await.is_ok());
        let result = service.get(MasterDataKind::Industry, skill.id).await;
        assert!(matches!(result, Err(MasterDataServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_generated_slug_dedupe_within_kind() {
        let service = setup().await;
        let tech = service
            .create(MasterDataKind::Industry, input("Tech", None))
            .await
            .unwrap();
        let finance = service
            .create(MasterDataKind::Industry, input("Finance", None))
            .await
            .unwrap();

        let a = service
            .create(MasterDataKind::SubIndustry, input("Consulting", Some(tech.id)))
            .await
            .unwrap();
        let b = service
            .create(MasterDataKind::SubIndustry, input("Consulting", Some(finance.id)))
            .await
            .unwrap();

        assert_eq!(a.slug, "consulting");
        assert_eq!(b.slug, "consulting-2");
    }
}
