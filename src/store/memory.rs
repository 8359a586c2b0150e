//! In-memory post store

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Latency, PatchFn, PostStore, SlugRule};
use crate::content::{NewPost, Post, PostPatch};
use crate::error::{BlogError, Result};

/// Post store backed by a `Vec`, newest insert first.
///
/// Data lives only as long as the instance; every test builds its own.
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
    latency: Latency,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    /// Start from existing records, kept in the given order
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
            latency: Latency::NONE,
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }
}

impl Default for MemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn snapshot(&self) -> Vec<Post> {
        self.latency.wait().await;
        self.posts.read().await.clone()
    }

    async fn create(&self, post: NewPost, slugs: SlugRule) -> Result<Post> {
        self.latency.wait().await;

        let mut posts = self.posts.write().await;
        ensure_slug_free(&posts, &post.slug, None, slugs)?;

        let post = post.into_post(Uuid::new_v4().to_string(), Utc::now());
        tracing::debug!("Creating post {} ({})", post.id, post.slug);
        posts.insert(0, post.clone());
        Ok(post)
    }

    async fn update_with(&self, id: &str, derive: PatchFn, slugs: SlugRule) -> Result<Post> {
        self.latency.wait().await;

        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BlogError::not_found(id))?;

        let patch = derive(&posts[index]);
        if let Some(slug) = &patch.slug {
            ensure_slug_free(&posts, slug, Some(id), slugs)?;
        }

        if patch.is_empty() {
            tracing::debug!("Touching post {}", id);
        } else {
            tracing::debug!("Updated post {}", id);
        }
        let post = &mut posts[index];
        post.apply(patch, Utc::now());
        Ok(post.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.latency.wait().await;

        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BlogError::not_found(id))?;

        posts.remove(index);
        tracing::debug!("Deleted post {}", id);
        Ok(())
    }
}

fn ensure_slug_free(
    posts: &[Post],
    slug: &str,
    except_id: Option<&str>,
    slugs: SlugRule,
) -> Result<()> {
    if slugs == SlugRule::Unique
        && posts
            .iter()
            .any(|p| p.slug == slug && Some(p.id.as_str()) != except_id)
    {
        return Err(BlogError::SlugTaken(slug.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            slug: crate::helpers::generate_slug(title),
            content: "Body".to_string(),
            excerpt: "Summary".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_timestamps() {
        let store = MemoryPostStore::new();
        let a = store.create(new_post("First"), SlugRule::Any).await.unwrap();
        let b = store.create(new_post("Second"), SlugRule::Any).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
        assert_eq!(a.created_at, a.updated_at);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot[0].id, b.id, "newest insert comes first");
        assert_eq!(snapshot[1].id, a.id);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_identity() {
        let store = MemoryPostStore::new();
        let post = store.create(new_post("Original"), SlugRule::Any).await.unwrap();

        let updated = store
            .update(
                &post.id,
                PostPatch {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
                SlugRule::Any,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, post.id);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, "original");
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(store.snapshot().await[0], updated);
    }

    #[tokio::test]
    async fn test_empty_update_only_touches_updated_at() {
        let store = MemoryPostStore::new();
        let post = store.create(new_post("Same"), SlugRule::Any).await.unwrap();

        let updated = store
            .update(&post.id, PostPatch::default(), SlugRule::Any)
            .await
            .unwrap();
        let mut expected = post.clone();
        expected.updated_at = updated.updated_at;
        assert_eq!(updated, expected);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryPostStore::new();
        let err = store
            .update("missing", PostPatch::default(), SlugRule::Any)
            .await
            .unwrap_err();
        assert_eq!(err, BlogError::not_found("missing"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryPostStore::new();
        let post = store.create(new_post("Doomed"), SlugRule::Any).await.unwrap();

        store.delete(&post.id).await.unwrap();
        assert!(store.snapshot().await.is_empty());
        assert!(matches!(
            store.delete(&post.id).await,
            Err(BlogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let store = MemoryPostStore::new().with_latency(Latency::from_millis(20));
        assert_eq!(store.latency(), Latency(Duration::from_millis(20)));

        let started = Instant::now();
        store.snapshot().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_unique_slug_checked_under_lock() {
        let store = MemoryPostStore::new().with_latency(Latency::from_millis(20));
        let (a, b) = tokio::join!(
            store.create(new_post("Twin"), SlugRule::Unique),
            store.create(new_post("Twin"), SlugRule::Unique)
        );

        assert!(a.is_ok() != b.is_ok(), "exactly one create wins");
        let slugs: Vec<_> = store.snapshot().await.into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["twin"]);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_slug_but_keeps_own() {
        let store = MemoryPostStore::new();
        let first = store.create(new_post("First"), SlugRule::Unique).await.unwrap();
        let second = store.create(new_post("Second"), SlugRule::Unique).await.unwrap();

        let rename = |slug: &str| PostPatch {
            slug: Some(slug.to_string()),
            ..Default::default()
        };
        assert_eq!(
            store
                .update(&second.id, rename("first"), SlugRule::Unique)
                .await
                .unwrap_err(),
            BlogError::SlugTaken("first".to_string())
        );
        store
            .update(&first.id, rename("first"), SlugRule::Unique)
            .await
            .unwrap();
        store
            .update(&second.id, rename("first"), SlugRule::Any)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_with_sees_current_record() {
        let store = MemoryPostStore::new();
        let post = store.create(new_post("Flip"), SlugRule::Any).await.unwrap();

        fn flip() -> PatchFn {
            Box::new(|current: &Post| PostPatch {
                is_published: Some(!current.is_published),
                ..Default::default()
            })
        }
        let (a, b) = tokio::join!(
            store.update_with(&post.id, flip(), SlugRule::Any),
            store.update_with(&post.id, flip(), SlugRule::Any)
        );
        assert!(a.unwrap().is_published != b.unwrap().is_published);
        assert!(!store.snapshot().await[0].is_published);
    }
}
