//! Page-number window for pagination controls

use serde::Serialize;

/// Page numbers shown around the current page
pub const MAX_VISIBLE_PAGES: usize = 5;

/// What a pagination control should display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Consecutive page numbers around the current page
    pub pages: Vec<usize>,
    pub current: usize,
    pub total_pages: usize,
    /// Show a separate link to page 1
    pub show_first: bool,
    /// Gap between page 1 and `pages`
    pub leading_ellipsis: bool,
    /// Show a separate link to the last page
    pub show_last: bool,
    /// Gap between `pages` and the last page
    pub trailing_ellipsis: bool,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// No controls are rendered for a single page
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Compute the window of at most `max_visible` pages centered on `current`
pub fn page_window(current: usize, total_pages: usize, max_visible: usize) -> PageWindow {
    if total_pages <= 1 {
        return PageWindow::default();
    }

    let max_visible = max_visible.max(1);
    let current = current.clamp(1, total_pages);

    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total_pages);
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    PageWindow {
        pages: (start..=end).collect(),
        current,
        total_pages,
        show_first: start > 1,
        leading_ellipsis: start > 2,
        show_last: end < total_pages,
        trailing_ellipsis: end + 1 < total_pages,
        has_prev: current > 1,
        has_next: current < total_pages,
    }
}
