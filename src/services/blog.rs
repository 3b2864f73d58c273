//! Blog service
//!
//! Implements business logic for blog posts:
//! - Create, read, update, delete posts
//! - Slug generation from title and uniqueness checks
//! - Publish/unpublish (published_at is stamped on first publish)
//! - Paged listing with published/author filters
//!
//! Hot single-record lookups are served through the cache and invalidated
//! on every write.

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::BlogRepository;
use crate::models::{Blog, BlogFilter, CreateBlogInput, ListParams, PagedResult, UpdateBlogInput};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Default cache TTL for blog posts (1 hour)
const BLOG_CACHE_TTL_SECS: u64 = 3600;

/// Cache key prefixes
const CACHE_KEY_BLOG_BY_ID: &str = "blog:id:";
const CACHE_KEY_BLOG_BY_SLUG: &str = "blog:slug:";

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Blog slug already exists
    #[error("Blog slug already exists: {0}")]
    DuplicateSlug(String),

    /// Blog post not found
    #[error("Blog post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Blog service for managing blog posts
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl BlogService {
    /// Create a new blog service
    pub fn new(repo: Arc<dyn BlogRepository>, cache: Arc<Cache>) -> Self {
        Self {
            repo,
            cache,
            cache_ttl: Duration::from_secs(BLOG_CACHE_TTL_SECS),
        }
    }

    /// Create a new blog post
    pub async fn create(&self, input: CreateBlogInput) -> Result<Blog, BlogServiceError> {
        if input.title.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Title must not be empty".to_string(),
            ));
        }
        if input.body.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Body must not be empty".to_string(),
            ));
        }

        let slug = match input.slug {
            Some(slug) => {
                if self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(BlogServiceError::DuplicateSlug(slug));
                }
                slug
            }
            None => self.unique_slug(&input.title).await?,
        };

        let blog = Blog::new(
            slug,
            input.title,
            input.body,
            input.author_id,
            input.published.unwrap_or(false),
        );

        let created = self
            .repo
            .create(&blog)
            .await
            .context("Failed to create blog post")?;

        self.invalidate_cache().await?;
        Ok(created)
    }

    /// Get blog post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Blog>, BlogServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_BLOG_BY_ID, id);
        if let Some(blog) = self.cache.get::<Blog>(&cache_key).await.ok().flatten() {
            return Ok(Some(blog));
        }

        let blog = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get blog post by ID")?;

        if let Some(ref blog) = blog {
            let _ = self.cache.set(&cache_key, blog, self.cache_ttl).await;
        }

        Ok(blog)
    }

    /// Get blog post by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>, BlogServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_BLOG_BY_SLUG, slug);
        if let Some(blog) = self.cache.get::<Blog>(&cache_key).await.ok().flatten() {
            return Ok(Some(blog));
        }

        let blog = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get blog post by slug")?;

        if let Some(ref blog) = blog {
            let _ = self.cache.set(&cache_key, blog, self.cache_ttl).await;
        }

        Ok(blog)
    }

    /// List blog posts matching the filter, newest first
    pub async fn list(
        &self,
        filter: &BlogFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Blog>, BlogServiceError> {
        Ok(self
            .repo
            .list(filter, params)
            .await
            .context("Failed to list blog posts")?)
    }

    /// Update a blog post.
    ///
    /// published_at is stamped on the first transition to published and
    /// kept across later unpublish/republish cycles.
    pub async fn update(&self, id: i64, input: UpdateBlogInput) -> Result<Blog, BlogServiceError> {
        let mut blog = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get blog post")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))?;

        if !input.has_changes() {
            return Ok(blog);
        }

        if let Some(slug) = input.slug {
            if slug != blog.slug {
                if self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(BlogServiceError::DuplicateSlug(slug));
                }
                blog.slug = slug;
            }
        }
        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(BlogServiceError::ValidationError(
                    "Title must not be empty".to_string(),
                ));
            }
            blog.title = title;
        }
        if let Some(body) = input.body {
            blog.body = body;
        }
        if let Some(published) = input.published {
            if published && blog.published_at.is_none() {
                blog.published_at = Some(Utc::now());
            }
            blog.published = published;
        }

        let updated = self
            .repo
            .update(&blog)
            .await
            .context("Failed to update blog post")?;

        self.invalidate_cache().await?;
        Ok(updated)
    }

    /// Delete a blog post
    pub async fn delete(&self, id: i64) -> Result<(), BlogServiceError> {
        let blog = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get blog post")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))?;

        self.repo
            .delete(blog.id)
            .await
            .context("Failed to delete blog post")?;

        self.invalidate_cache().await?;
        Ok(())
    }

    /// Find a free slug derived from the title
    async fn unique_slug(&self, title: &str) -> Result<String, BlogServiceError> {
        let base = generate_slug(title);
        let base = if base.is_empty() {
            "post".to_string()
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

        Err(BlogServiceError::DuplicateSlug(base))
    }

    async fn invalidate_cache(&self) -> Result<(), BlogServiceError> {
        let _ = self.cache.delete_pattern("blog:*").await;
        Ok(())
    }
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, maps separators and ASCII punctuation to hyphens, keeps
/// non-ASCII characters, and collapses consecutive hyphens.
pub fn generate_slug(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else if c == ' ' || c == '_' || c == '-' {
                '-'
            } else if !c.is_ascii() {
                // Keep non-ASCII characters (e.g. accented names)
                c
            } else {
                '-'
            }
        })
        .collect();

    // Remove consecutive hyphens and trim hyphens from ends
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}
