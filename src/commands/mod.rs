//! CLI commands

pub mod import;
pub mod list;
pub mod render;
pub mod show;
