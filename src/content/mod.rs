//! Content module - posts, front-matter and markdown rendering

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod sanitize;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, EMPTY_PREVIEW};
pub use post::{split_tags, NewPost, Post, PostDraft, PostPatch};
