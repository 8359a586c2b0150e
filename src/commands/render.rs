//! Render a markdown file to sanitized HTML

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::FrontMatter;
use crate::Folio;

/// Print the rendered body of `file`, skipping any front-matter
pub fn run(folio: &Folio, file: &Path) -> Result<()> {
    let path = folio.base_dir.join(file);
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
    println!("{}", render_source(folio, &content));
    Ok(())
}

fn render_source(folio: &Folio, content: &str) -> String {
    let (_, body) = FrontMatter::parse(content);
    folio.service.renderer().render(body)
}
