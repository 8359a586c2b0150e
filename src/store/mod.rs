//! Post store - the authoritative post collection

mod memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::content::{NewPost, Post, PostPatch};
use crate::error::Result;

pub use memory::MemoryPostStore;

/// Whether a mutation may leave two posts sharing a slug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugRule {
    Any,
    /// Reject with `SlugTaken` when another post already uses the slug
    Unique,
}

impl SlugRule {
    pub fn from_unique(unique: bool) -> Self {
        if unique {
            SlugRule::Unique
        } else {
            SlugRule::Any
        }
    }
}

/// Builds a patch from the current record, inside the store's critical section
pub type PatchFn = Box<dyn FnOnce(&Post) -> PostPatch + Send>;

/// Storage primitives behind the blog service
///
/// Implementations own id assignment and the `created_at`/`updated_at`
/// timestamps. Each mutation, including its slug check, is atomic.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every post, in storage order (newest insert first)
    async fn snapshot(&self) -> Vec<Post>;

    /// Insert a post and return it with id and timestamps filled in
    async fn create(&self, post: NewPost, slugs: SlugRule) -> Result<Post>;

    /// Merge a patch derived from the current record into it
    async fn update_with(&self, id: &str, derive: PatchFn, slugs: SlugRule) -> Result<Post>;

    /// Merge a partial update into an existing post
    async fn update(&self, id: &str, patch: PostPatch, slugs: SlugRule) -> Result<Post> {
        self.update_with(id, Box::new(move |_: &Post| patch), slugs).await
    }

    /// Remove a post
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Artificial delay applied before every store call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency(pub Duration);

impl Latency {
    pub const NONE: Latency = Latency(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        Latency(Duration::from_millis(ms))
    }

    /// Yield to the scheduler for the configured delay
    pub async fn wait(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}
