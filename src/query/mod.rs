//! Query engine - filter, search, sort and paginate a snapshot of posts
//!
//! Everything here is a pure function of its input slice. Nothing fails: an
//! unmatched or out-of-range query yields an empty page.

mod pagination;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::content::Post;

pub use pagination::{page_window, PageWindow, MAX_VISIBLE_PAGES};

/// Default page size of the public listing
pub const DEFAULT_LIMIT: usize = 6;

/// Public listing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    /// 1-based
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PostQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Page number clamped to at least 1
    pub fn effective_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, falling back to `default_limit`, clamped to at least 1
    pub fn effective_limit(&self, default_limit: usize) -> usize {
        self.limit.unwrap_or(default_limit).max(1)
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Matches before pagination
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Whether a post matches a free-text search in title, content or excerpt
fn matches_search(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle)
        || post.content.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
}

/// Whether any tag contains `needle` (already lowercased)
fn matches_tag(post: &Post, needle: &str) -> bool {
    post.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Lowercased, non-blank filter value
fn normalized(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_lowercase)
}

/// The public listing: published posts, filtered, newest first, paginated
pub fn published(posts: &[Post], query: &PostQuery, default_limit: usize) -> Paginated<Post> {
    let search = normalized(query.search.as_deref());
    let tag = normalized(query.tag.as_deref());

    let mut matched: Vec<&Post> = posts
        .iter()
        .filter(|p| p.is_published)
        .filter(|p| search.as_deref().map_or(true, |s| matches_search(p, s)))
        .filter(|p| tag.as_deref().map_or(true, |t| matches_tag(p, t)))
        .collect();

    // sort_by is stable: equal dates keep store order
    matched.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));

    let page = query.effective_page();
    let limit = query.effective_limit(default_limit);
    let total = matched.len();
    let total_pages = total.div_ceil(limit);

    let data = matched
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .cloned()
        .collect();

    Paginated {
        data,
        total,
        page,
        limit,
        total_pages,
    }
}

/// First published post with exactly this slug
pub fn find_published_by_slug<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|p| p.is_published && p.slug == slug)
}

/// Every post, published or not, by creation date descending
pub fn all_by_created(posts: &[Post]) -> Vec<Post> {
    let mut all = posts.to_vec();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    all
}

/// Distinct tags of published posts, sorted ascending
pub fn published_tags(posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .filter(|p| p.is_published)
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
