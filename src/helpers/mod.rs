//! Helper functions shared by the renderer, the service and the adapters

mod date;
mod html;
mod text;

pub use date::*;
pub use html::*;
pub use text::*;
