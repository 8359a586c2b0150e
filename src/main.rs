//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands;
use folio::query::PostQuery;
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A small blog engine with sanitized markdown rendering", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Config file, relative to the base directory (defaults to _config.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// List published posts
    List {
        /// Case-insensitive text to find in title, excerpt or content
        #[arg(short, long)]
        search: Option<String>,

        /// Only posts with a matching tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<usize>,

        /// Posts per page (defaults to per_page)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List tags of published posts
    Tags,

    /// Show a published post
    Show {
        /// Slug of the post
        slug: String,
    },

    /// Validate a markdown file with front-matter and print the post it
    /// becomes (dry run, nothing is saved)
    Import {
        /// Path to the markdown file
        file: PathBuf,
    },

    /// Render a markdown file to HTML
    Render {
        /// Path to the markdown file
        file: PathBuf,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let config_path = cli.config;
    let load = || Folio::new(&base_dir, config_path.as_deref());

    match cli.command {
        Commands::Serve { port, ip } => {
            let folio = load()?;
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());
            let port = port.unwrap_or(folio.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio.serve(&ip, port).await?;
        }

        Commands::List {
            search,
            tag,
            page,
            limit,
        } => {
            let folio = load()?;
            let query = PostQuery {
                search,
                tag,
                page,
                limit,
            };
            commands::list::run(&folio, &query).await?;
        }

        Commands::Tags => {
            let folio = load()?;
            commands::list::tags(&folio).await?;
        }

        Commands::Show { slug } => {
            let folio = load()?;
            commands::show::run(&folio, &slug).await?;
        }

        Commands::Import { file } => {
            let folio = load()?;
            commands::import::run(&folio, &file).await?;
        }

        Commands::Render { file } => {
            let folio = load()?;
            commands::render::run(&folio, &file)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
