//! List published posts and tags

use anyhow::Result;

use crate::content::Post;
use crate::helpers::{display_date, strip_html, tag_summary, truncate};
use crate::query::{page_window, Paginated, PageWindow, PostQuery, MAX_VISIBLE_PAGES};
use crate::Folio;

/// Tags shown per post before collapsing into "+N"
const LISTED_TAGS: usize = 3;

const EXCERPT_WIDTH: usize = 72;

/// Print one page of the public listing
pub async fn run(folio: &Folio, query: &PostQuery) -> Result<()> {
    let page = folio.service.list_published(query).await;
    print!("{}", format_page(&page, "YYYY-MM-DD"));
    Ok(())
}

/// Print every tag used by a published post
pub async fn tags(folio: &Folio) -> Result<()> {
    let tags = folio.service.list_tags().await;
    println!("Tags ({}):", tags.len());
    for tag in tags {
        println!("  {}", tag);
    }
    Ok(())
}

fn format_page(page: &Paginated<Post>, date_format: &str) -> String {
    let mut out = String::new();

    if page.data.is_empty() {
        out.push_str("No posts found.\n");
        return out;
    }

    out.push_str(&format!(
        "Posts ({} matches, page {}/{}):\n",
        page.total, page.page, page.total_pages
    ));
    for post in &page.data {
        out.push_str(&format!(
            "  {} - {} [{}]",
            display_date(post.published_at.as_ref(), date_format),
            post.title,
            post.slug
        ));
        let (shown, hidden) = tag_summary(&post.tags, LISTED_TAGS);
        if !shown.is_empty() {
            out.push_str(&format!(" #{}", shown.join(" #")));
        }
        if hidden > 0 {
            out.push_str(&format!(" +{}", hidden));
        }
        out.push('\n');
        out.push_str(&format!(
            "      {}\n",
            truncate(&strip_html(&post.excerpt), EXCERPT_WIDTH, None)
        ));
    }

    let window = page_window(page.page, page.total_pages, MAX_VISIBLE_PAGES);
    if let Some(line) = format_window(&window) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// `< 1 ... 4 [5] 6 ... 9 >`, or `None` for a single page
fn format_window(window: &PageWindow) -> Option<String> {
    if window.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if window.has_prev {
        parts.push("<".to_string());
    }
    if window.show_first {
        parts.push("1".to_string());
    }
    if window.leading_ellipsis {
        parts.push("...".to_string());
    }
    for &n in &window.pages {
        if n == window.current {
            parts.push(format!("[{}]", n));
        } else {
            parts.push(n.to_string());
        }
    }
    if window.trailing_ellipsis {
        parts.push("...".to_string());
    }
    if window.show_last {
        parts.push(window.total_pages.to_string());
    }
    if window.has_next {
        parts.push(">".to_string());
    }
    Some(parts.join(" "))
}
