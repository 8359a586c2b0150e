//! Convert a markdown file with front-matter into a post record
//!
//! The post is created in the process-local store, so this validates the
//! file (slug conflicts with the seed data included) and prints what would be
//! stored. Nothing is persisted.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::{FrontMatter, Post};
use crate::Folio;

/// Create a post from `file` and print the resulting record as JSON
pub async fn run(folio: &Folio, file: &Path) -> Result<()> {
    let post = import_file(folio, file).await?;
    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}

pub async fn import_file(folio: &Folio, file: &Path) -> Result<Post> {
    let path = folio.base_dir.join(file);
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;

    let (front_matter, body) = FrontMatter::parse(&content);
    let new_post = front_matter
        .into_new_post(body)
        .with_context(|| format!("Invalid post in {:?}", path))?;
    let post = folio.service.create(new_post).await?;

    tracing::info!("Imported {:?} as {}", path, post.slug);
    Ok(post)
}
