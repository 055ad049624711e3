//! Editorial post model
//!
//! This module provides:
//! - `Post` entity representing an editorial content piece
//! - `PostCategory` enum for the fixed category set
//! - Input types for creating and updating posts
//! - Pagination types shared by list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Editorial post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Body content
    pub content: String,
    /// Display name of the author
    pub author: String,
    /// Content category
    pub category: PostCategory,
    /// Optional hero image URL
    pub image_url: Option<String>,
    /// Optional audio narration URL
    pub audio_url: Option<String>,
    /// Optional short introduction shown above the body
    pub introduction: Option<String>,
    /// Optional practical tip shown after the body
    pub practical_tip: Option<String>,
    /// Only published posts are visible to end users
    pub published: bool,
    /// BCP 47 language tag (e.g. "sv", "en")
    pub language: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Fixed editorial category set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostCategory {
    Pregnancy,
    Postpartum,
    Breastfeeding,
    Nutrition,
    MentalHealth,
    BabyCare,
}

impl PostCategory {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Pregnancy => "pregnancy",
            PostCategory::Postpartum => "postpartum",
            PostCategory::Breastfeeding => "breastfeeding",
            PostCategory::Nutrition => "nutrition",
            PostCategory::MentalHealth => "mental-health",
            PostCategory::BabyCare => "baby-care",
        }
    }

    /// Parse from the database string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pregnancy" => Some(PostCategory::Pregnancy),
            "postpartum" => Some(PostCategory::Postpartum),
            "breastfeeding" => Some(PostCategory::Breastfeeding),
            "nutrition" => Some(PostCategory::Nutrition),
            "mental-health" => Some(PostCategory::MentalHealth),
            "baby-care" => Some(PostCategory::BabyCare),
            _ => None,
        }
    }

    /// All categories, in display order
    pub fn all() -> &'static [PostCategory] {
        &[
            PostCategory::Pregnancy,
            PostCategory::Postpartum,
            PostCategory::Breastfeeding,
            PostCategory::Nutrition,
            PostCategory::MentalHealth,
            PostCategory::BabyCare,
        ]
    }
}

impl std::fmt::Display for PostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: PostCategory,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub introduction: Option<String>,
    pub practical_tip: Option<String>,
    /// Defaults to unpublished when absent
    pub published: Option<bool>,
    /// Defaults to the site default language when absent
    pub language: Option<String>,
}

/// Input for updating an existing post; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<PostCategory>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub introduction: Option<String>,
    pub practical_tip: Option<String>,
    pub published: Option<bool>,
    pub language: Option<String>,
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.author.is_some()
            || self.category.is_some()
            || self.image_url.is_some()
            || self.audio_url.is_some()
            || self.introduction.is_some()
            || self.practical_tip.is_some()
            || self.published.is_some()
            || self.language.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

impl ListParams {
    /// Create new pagination parameters, clamped to sane bounds
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1)) as i64 * self.per_page as i64
    }

    /// Limit for database queries
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

    /// Total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in PostCategory::all() {
            assert_eq!(PostCategory::parse(cat.as_str()), Some(*cat));
        }
        assert_eq!(PostCategory::parse("unknown"), None);
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i64> = PagedResult::new(vec![1, 2, 3], 23, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            #[test]
            fn prop_list_params_stay_in_bounds(page: u32, per_page: u32) {
                let params = ListParams::new(page, per_page);
                prop_assert!(params.page >= 1);
                prop_assert!((1..=100).contains(&params.per_page));
                prop_assert!(params.offset() >= 0);
            }
        }
    }
}
