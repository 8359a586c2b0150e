//! Blog service - the operations the presentation layer calls

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, NewPost, Post, PostDraft, PostPatch};
use crate::error::{BlogError, Result};
use crate::helpers::{date_xml, display_date, format_reading_time, generate_slug};
use crate::query::{self, Paginated, PostQuery};
use crate::store::{PatchFn, PostStore, SlugRule};

/// A published post prepared for the article view
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    /// Sanitized, styled body
    pub html: String,
    /// e.g. "3 min read"
    pub reading_time: String,
    /// Display date, or the placeholder when unpublished
    pub date: String,
    /// Machine-readable date for `<time datetime>`
    pub datetime: Option<String>,
    pub updated: String,
}

/// Store + query engine + renderer behind one API
pub struct BlogService {
    store: Arc<dyn PostStore>,
    renderer: MarkdownRenderer,
    per_page: usize,
    words_per_minute: usize,
    date_format: String,
    unique_slugs: bool,
}

impl BlogService {
    pub fn new(store: Arc<dyn PostStore>, config: &SiteConfig) -> Self {
        Self {
            store,
            renderer: MarkdownRenderer::with_style(config.style.clone()),
            per_page: config.per_page,
            words_per_minute: config.words_per_minute,
            date_format: config.date_format.clone(),
            unique_slugs: config.unique_slugs,
        }
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    // Public reading side

    /// Published posts matching the query, one page at a time
    pub async fn list_published(&self, query: &PostQuery) -> Paginated<Post> {
        let posts = self.store.snapshot().await;
        let page = query::published(&posts, query, self.per_page);
        tracing::debug!(
            "Listed page {}/{} ({} matches) for {:?}",
            page.page,
            page.total_pages,
            page.total,
            query
        );
        page
    }

    /// A published post by slug, or `None`
    pub async fn get_published_by_slug(&self, slug: &str) -> Option<Post> {
        let posts = self.store.snapshot().await;
        query::find_published_by_slug(&posts, slug).cloned()
    }

    /// Distinct tags of published posts
    pub async fn list_tags(&self) -> Vec<String> {
        query::published_tags(&self.store.snapshot().await)
    }

    /// A published post with its rendered body and display metadata
    pub async fn post_detail(&self, slug: &str) -> Option<PostDetail> {
        let post = self.get_published_by_slug(slug).await?;
        Some(self.detail(post))
    }

    pub fn detail(&self, post: Post) -> PostDetail {
        PostDetail {
            html: self.renderer.render(&post.content),
            reading_time: format_reading_time(&post.content, self.words_per_minute),
            date: display_date(post.published_at.as_ref(), &self.date_format),
            datetime: post.published_at.as_ref().map(date_xml),
            updated: display_date(Some(&post.updated_at), &self.date_format),
            post,
        }
    }

    /// Render editor content, with a placeholder for an empty body
    pub fn preview(&self, markdown: &str) -> String {
        self.renderer.render_preview(markdown)
    }

    // Admin side

    /// Every post, drafts included, newest created first
    pub async fn list_all(&self) -> Vec<Post> {
        query::all_by_created(&self.store.snapshot().await)
    }

    pub async fn create(&self, mut post: NewPost) -> Result<Post> {
        if post.slug.trim().is_empty() {
            post.slug = generate_slug(&post.title);
        }
        validate_text("title", &post.title)?;
        validate_text("excerpt", &post.excerpt)?;
        validate_text("slug", &post.slug)?;
        validate_published_at(post.published_at.as_ref())?;

        let post = self.store.create(post, self.slug_rule()).await?;
        tracing::info!("Created post {} ({})", post.id, post.slug);
        Ok(post)
    }

    pub async fn update(&self, id: &str, patch: PostPatch) -> Result<Post> {
        validate_patch(&patch)?;
        self.store.update(id, patch, self.slug_rule()).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    /// Flip `is_published`, stamping or clearing `published_at` to match
    ///
    /// The new state is derived from the record inside the store's critical
    /// section, so concurrent toggles never both publish.
    pub async fn toggle_publish(&self, id: &str) -> Result<Post> {
        let now = Utc::now();
        let derive: PatchFn = Box::new(move |current: &Post| {
            let publish = !current.is_published;
            PostPatch {
                is_published: Some(publish),
                published_at: Some(publish.then_some(now)),
                ..Default::default()
            }
        });

        let post = self.store.update_with(id, derive, SlugRule::Any).await?;
        tracing::info!(
            "{} post {}",
            if post.is_published { "Published" } else { "Unpublished" },
            id
        );
        Ok(post)
    }

    /// Save editor form state: create when `id` is `None`, replace otherwise
    ///
    /// Re-saving a published post keeps its original publication date.
    pub async fn save_draft(&self, id: Option<&str>, draft: PostDraft) -> Result<Post> {
        let Some(id) = id else {
            return self.create(draft.into_new_post()?).await;
        };

        let patch = draft.into_patch()?;
        validate_patch(&patch)?;
        let derive: PatchFn = Box::new(move |current: &Post| {
            let mut patch = patch;
            if patch.is_published == Some(true) && current.published_at.is_some() {
                patch.published_at = Some(current.published_at);
            }
            patch
        });
        self.store.update_with(id, derive, self.slug_rule()).await
    }

    fn slug_rule(&self) -> SlugRule {
        SlugRule::from_unique(self.unique_slugs)
    }
}

fn validate_patch(patch: &PostPatch) -> Result<()> {
    if let Some(title) = &patch.title {
        validate_text("title", title)?;
    }
    if let Some(excerpt) = &patch.excerpt {
        validate_text("excerpt", excerpt)?;
    }
    if let Some(slug) = &patch.slug {
        validate_text("slug", slug)?;
    }
    if let Some(published_at) = &patch.published_at {
        validate_published_at(published_at.as_ref())?;
    }
    Ok(())
}

fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BlogError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_published_at(published_at: Option<&DateTime<Utc>>) -> Result<()> {
    match published_at {
        Some(at) if *at > Utc::now() => Err(BlogError::Validation(
            "published_at must not be in the future".to_string(),
        )),
        _ => Ok(()),
    }
}
