use chrono::{TimeZone, Utc};
use std::sync::Arc;

use folio::config::SiteConfig;
use folio::content::loader::sample_posts;
use folio::content::{MarkdownRenderer, NewPost, Post, PostPatch};
use folio::helpers::generate_slug;
use folio::query::PostQuery;
use folio::service::BlogService;
use folio::store::MemoryPostStore;

fn blog_with(posts: Vec<Post>) -> BlogService {
    BlogService::new(
        Arc::new(MemoryPostStore::with_posts(posts)),
        &SiteConfig::default(),
    )
}

fn sample_blog() -> BlogService {
    blog_with(sample_posts().unwrap())
}

fn post(id: &str, title: &str, published: bool, day: u32) -> Post {
    let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
    NewPost {
        title: title.to_string(),
        slug: generate_slug(title),
        content: format!("Body of {}", title),
        excerpt: "Excerpt".to_string(),
        tags: vec!["Misc".to_string()],
        is_published: published,
        published_at: published.then_some(at),
        ..Default::default()
    }
    .into_post(id.to_string(), at)
}

fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn unpublished_posts_never_reach_public_queries() {
    let mut secret = post("hidden", "Secret Draft", false, 1);
    secret.tags = vec!["Classified".to_string()];
    let blog = blog_with(vec![secret, post("open", "Open Post", true, 2)]);

    let page = blog.list_published(&PostQuery::default()).await;
    assert_eq!(ids(&page.data), vec!["open"]);
    assert_eq!(page.total, 1);

    let searched = blog.list_published(&PostQuery::default().search("secret")).await;
    assert_eq!(searched.total, 0);

    assert!(blog.get_published_by_slug("secret-draft").await.is_none());
    assert!(!blog.list_tags().await.contains(&"Classified".to_string()));

    // The admin listing still sees it
    assert_eq!(blog.list_all().await.len(), 2);
}

#[tokio::test]
async fn pages_concatenate_to_the_full_result() {
    let blog = sample_blog();
    let all = blog.list_published(&PostQuery::default().limit(100)).await;

    for limit in 1..=7 {
        let first = blog
            .list_published(&PostQuery::default().limit(limit))
            .await;
        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            let result = blog
                .list_published(&PostQuery::default().limit(limit).page(page))
                .await;
            seen.extend(result.data);
        }
        assert_eq!(seen, all.data, "limit {}", limit);
    }
}

#[tokio::test]
async fn empty_update_only_touches_updated_at() {
    let blog = sample_blog();
    let before = blog.get_published_by_slug("modern-css-grid-vs-flexbox").await.unwrap();

    let after = blog.update(&before.id, PostPatch::default()).await.unwrap();
    assert!(after.updated_at >= before.updated_at);
    assert_eq!(
        Post {
            updated_at: before.updated_at,
            ..after
        },
        before
    );
}

#[test]
fn slug_generation_is_idempotent() {
    for title in ["Hello, World!", "  Rust & Tokio 101  ", "Déjà vu"] {
        let once = generate_slug(title);
        assert_eq!(generate_slug(&once), once);
    }
}

#[tokio::test]
async fn equal_dates_keep_store_order() {
    let mut a = post("a", "First In Store", true, 5);
    let mut b = post("b", "Second In Store", true, 5);
    a.published_at = b.published_at;
    b.created_at = a.created_at;
    let blog = blog_with(vec![a, b, post("c", "Older", true, 1)]);

    let page = blog.list_published(&PostQuery::default()).await;
    assert_eq!(ids(&page.data), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let blog = blog_with(vec![
        post("1", "Getting Started with React and TypeScript", true, 1),
        post("2", "Modern CSS: Grid vs Flexbox", true, 2),
    ]);

    let page = blog.list_published(&PostQuery::default().search("REACT")).await;
    assert_eq!(ids(&page.data), vec!["1"]);
}

#[tokio::test]
async fn tag_filter_matches_substrings_case_insensitively() {
    let blog = sample_blog();
    let page = blog.list_published(&PostQuery::default().tag("backend")).await;
    assert_eq!(ids(&page.data), vec!["5", "3"]);
}

#[tokio::test]
async fn pagination_over_sample_posts() {
    let blog = sample_blog();

    let page = blog.list_published(&PostQuery::default().limit(6)).await;
    assert_eq!(page.data.len(), 6);
    assert_eq!(page.total_pages, 1);

    let page = blog
        .list_published(&PostQuery::default().limit(2).page(2))
        .await;
    assert_eq!(ids(&page.data), vec!["4", "3"]);
    assert_eq!(page.total_pages, 3);

    let past_end = blog
        .list_published(&PostQuery::default().limit(2).page(9))
        .await;
    assert!(past_end.data.is_empty());
    assert_eq!(past_end.total, 6);
}

#[tokio::test]
async fn publish_toggle_sets_and_clears_date() {
    let blog = blog_with(vec![post("d", "A Draft", false, 1)]);

    let published = blog.toggle_publish("d").await.unwrap();
    assert!(published.is_published);
    let at = published.published_at.unwrap();
    assert!(Utc::now().signed_duration_since(at).num_seconds() < 60);

    let unpublished = blog.toggle_publish("d").await.unwrap();
    assert!(!unpublished.is_published);
    assert!(unpublished.published_at.is_none());
}

#[test]
fn script_is_removed_and_following_markdown_survives() {
    let html = MarkdownRenderer::new().render(
        "Before\n\n<div onclick=\"steal()\"><script>alert('x')</script></div>\n\nAfter with **bold**",
    );
    assert!(!html.contains("<script"));
    assert!(!html.contains("alert"));
    assert!(!html.contains("onclick"));
    assert!(html.contains("After with"));
    assert!(html.contains("bold</strong>"));
}
