//! Blog model
//!
//! This module provides:
//! - `Blog` entity representing a blog post on the board
//! - Input types for creating and updating posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Author user ID
    pub author_id: i64,
    /// Whether the post is publicly visible
    pub published: bool,
    /// When the post was first published
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Create a new blog post with the given parameters
    pub fn new(slug: String, title: String, body: String, author_id: i64, published: bool) -> Self {
        let now = Utc::now();
        let published_at = if published { Some(now) } else { None };

        Self {
            id: 0, // Will be set by database
            slug,
            title,
            body,
            author_id,
            published,
            published_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlogInput {
    /// URL-friendly slug (generated from title when absent)
    pub slug: Option<String>,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Author user ID
    pub author_id: i64,
    /// Publish immediately (defaults to false)
    pub published: Option<bool>,
}

/// Input for updating an existing blog post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New body (optional)
    pub body: Option<String>,
    /// New published flag (optional)
    pub published: Option<bool>,
}

impl UpdateBlogInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.body.is_some()
            || self.published.is_some()
    }
}

/// Filters for blog listing
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    /// Only posts with this published flag
    pub published: Option<bool>,
    /// Only posts by this author
    pub author_id: Option<i64>,
}
