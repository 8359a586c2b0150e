//! Post model and its create/update/editor inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BlogError, Result};
use crate::helpers::generate_slug;

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier, never changes
    pub id: String,

    /// Post title
    pub title: String,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Raw markdown content
    pub content: String,

    /// Short summary shown on cards
    pub excerpt: String,

    /// Post tags, in display order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Absolute URL of the cover image
    #[serde(default)]
    pub featured_image: Option<String>,

    /// Whether the post is visible to readers
    #[serde(default)]
    pub is_published: bool,

    /// Publication date
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Last updated date
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// The date readers see: publication date, falling back to creation date
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Merge a patch over this post and refresh `updated_at`
    pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(featured_image) = patch.featured_image {
            self.featured_image = featured_image;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
        if let Some(published_at) = patch.published_at {
            self.published_at = published_at;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Everything needed to create a post; the store fills in id and timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Build the stored record
    pub fn into_post(self, id: String, now: DateTime<Utc>) -> Post {
        Post {
            id,
            title: self.title,
            slug: self.slug,
            content: self.content,
            excerpt: self.excerpt,
            tags: self.tags,
            featured_image: self.featured_image,
            is_published: self.is_published,
            published_at: self.published_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub featured_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        *self == PostPatch::default()
    }
}

/// Raw editor form state, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub title: String,
    /// Blank means "derive from title"
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    /// Comma-separated
    pub tags: String,
    /// Blank means no image
    pub featured_image: String,
    pub is_published: bool,
}

impl PostDraft {
    /// Start a draft from an existing post, for editing
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
            tags: post.tags.join(", "),
            featured_image: post.featured_image.clone().unwrap_or_default(),
            is_published: post.is_published,
        }
    }

    /// Validate the form and turn it into a create request
    pub fn into_new_post(self) -> Result<NewPost> {
        let title = self.title.trim();
        let content = self.content.trim();
        let excerpt = self.excerpt.trim();

        if title.is_empty() || content.is_empty() || excerpt.is_empty() {
            return Err(BlogError::Validation(
                "Title, content, and excerpt are required".to_string(),
            ));
        }

        let slug = match self.slug.trim() {
            "" => generate_slug(title),
            s => s.to_string(),
        };

        let featured_image = match self.featured_image.trim() {
            "" => None,
            url => Some(url.to_string()),
        };

        Ok(NewPost {
            title: title.to_string(),
            slug,
            content: content.to_string(),
            excerpt: excerpt.to_string(),
            tags: split_tags(&self.tags),
            featured_image,
            is_published: self.is_published,
            published_at: self.is_published.then(Utc::now),
        })
    }

    /// Validate the form and turn it into a full-replacement patch
    pub fn into_patch(self) -> Result<PostPatch> {
        let post = self.into_new_post()?;
        Ok(PostPatch {
            title: Some(post.title),
            slug: Some(post.slug),
            content: Some(post.content),
            excerpt: Some(post.excerpt),
            tags: Some(post.tags),
            featured_image: Some(post.featured_image),
            is_published: Some(post.is_published),
            published_at: Some(post.published_at),
        })
    }
}

/// Split a comma-separated tag list, dropping blanks
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
