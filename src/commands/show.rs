//! Show a single published post

use anyhow::{bail, Result};

use crate::service::PostDetail;
use crate::Folio;

/// Print a post's metadata followed by its rendered body
pub async fn run(folio: &Folio, slug: &str) -> Result<()> {
    let Some(detail) = folio.service.post_detail(slug).await else {
        bail!("No published post with slug: {}", slug);
    };
    print!("{}", format_detail(&detail));
    Ok(())
}

fn format_detail(detail: &PostDetail) -> String {
    let post = &detail.post;
    let mut out = format!("{}\n{}\n", post.title, "=".repeat(post.title.chars().count()));
    out.push_str(&format!("{} · {}\n", detail.date, detail.reading_time));
    if !post.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", post.tags.join(", ")));
    }
    if let Some(image) = &post.featured_image {
        out.push_str(&format!("Image: {}\n", image));
    }
    out.push('\n');
    out.push_str(&detail.html);
    out
}
