//! folio: a small blog engine
//!
//! An in-memory post store, a query engine for the public listing, and a
//! markdown pipeline that sanitizes and styles post bodies. The store is
//! reached through [`service::BlogService`], which the HTTP server and the
//! CLI share.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod query;
pub mod server;
pub mod service;
pub mod store;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use service::BlogService;
use store::{Latency, MemoryPostStore};

/// The main Folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Blog service over a freshly seeded store
    pub service: Arc<BlogService>,
}

impl Folio {
    /// Create a new Folio instance from a directory
    ///
    /// Reads `config_path` (relative to `base_dir`) when given, otherwise
    /// `_config.yml` if it exists.
    pub fn new<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        let config = match config_path {
            Some(path) => config::SiteConfig::load(base_dir.join(path))?,
            None => {
                let default_path = base_dir.join("_config.yml");
                if default_path.exists() {
                    config::SiteConfig::load(&default_path)?
                } else {
                    config::SiteConfig::default()
                }
            }
        };

        let posts = content::loader::load_seed(&base_dir, config.seed_file.as_deref())?;
        tracing::debug!("Seeding store with {} posts", posts.len());

        let store = MemoryPostStore::with_posts(posts).with_latency(Latency(config.latency()));
        let service = Arc::new(BlogService::new(Arc::new(store), &config));

        Ok(Self {
            config,
            base_dir,
            service,
        })
    }

    /// Start the API server
    pub async fn serve(&self, ip: &str, port: u16) -> Result<()> {
        server::start(self, ip, port).await
    }
}
