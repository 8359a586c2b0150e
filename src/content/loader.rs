//! Seed loader - fills a fresh store with posts

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use super::Post;

/// Sample posts bundled with the binary
const SAMPLE_POSTS: &str = include_str!("../../data/sample_posts.yml");

/// Parse a YAML list of posts
pub fn parse_posts(yaml: &str) -> Result<Vec<Post>> {
    let posts: Vec<Post> = serde_yaml::from_str(yaml)?;
    Ok(posts)
}

/// The bundled sample posts
pub fn sample_posts() -> Result<Vec<Post>> {
    parse_posts(SAMPLE_POSTS).context("Bundled sample posts are invalid")
}

/// Load seed posts from `seed_file` (relative to `base_dir`), or the bundled
/// samples when no file is configured or the file does not exist
///
/// Records that break the timestamp invariants are skipped with a warning.
pub fn load_seed(base_dir: &Path, seed_file: Option<&str>) -> Result<Vec<Post>> {
    let Some(seed_file) = seed_file else {
        return sample_posts();
    };

    let path = base_dir.join(seed_file);
    if !path.exists() {
        tracing::warn!("Seed file {:?} not found, using sample posts", path);
        return sample_posts();
    }

    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read seed file {:?}", path))?;
    let posts =
        parse_posts(&content).with_context(|| format!("Failed to parse seed file {:?}", path))?;

    let now = Utc::now();
    let posts: Vec<Post> = posts
        .into_iter()
        .filter(|post| match seed_problem(post, now) {
            Some(problem) => {
                tracing::warn!("Skipping seed post {} ({}): {}", post.id, post.slug, problem);
                false
            }
            None => true,
        })
        .collect();

    let drafts = posts.iter().filter(|p| !p.is_published).count();
    tracing::debug!(
        "Loaded {} posts ({} unpublished) from {:?}",
        posts.len(),
        drafts,
        path
    );

    Ok(posts)
}

fn seed_problem(post: &Post, now: DateTime<Utc>) -> Option<&'static str> {
    if post.updated_at < post.created_at {
        return Some("updated_at is before created_at");
    }
    if post.published_at.is_some_and(|at| at > now) {
        return Some("published_at is in the future");
    }
    None
}
