//! Domain error types

use thiserror::Error;

/// Errors surfaced by the store and the blog service
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlogError {
    #[error("Post not found: {id}")]
    NotFound { id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Slug already in use: {0}")]
    SlugTaken(String),
}

impl BlogError {
    pub fn not_found(id: impl Into<String>) -> Self {
        BlogError::NotFound { id: id.into() }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
