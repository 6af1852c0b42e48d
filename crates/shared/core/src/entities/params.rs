use serde::{Deserialize, Serialize};

use crate::values::SeriesTime;

/// Range and size limits that decide when a paged fetch stops.
///
/// Both window bounds are inclusive. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    #[serde(default)]
    pub window_start: Option<SeriesTime>,
    #[serde(default)]
    pub window_end: Option<SeriesTime>,
    /// Maximum number of items to accumulate
    #[serde(default)]
    pub page_cap: Option<usize>,
}

/// Where a series key falls relative to the fetch window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCheck {
    /// Newer than `window_end`: skip the item, keep reading the page
    After,
    /// Inside the window
    Inside,
    /// Older than `window_start`: stop, everything after it is older still
    Before,
}

impl FetchParams {
    /// Params with an inclusive `[start, end]` window
    pub fn window(start: SeriesTime, end: SeriesTime) -> Self {
        Self {
            window_start: Some(start),
            window_end: Some(end),
            page_cap: None,
        }
    }

    /// Params that only limit the item count
    pub fn capped(page_cap: usize) -> Self {
        Self {
            page_cap: Some(page_cap),
            ..Default::default()
        }
    }

    pub fn with_page_cap(mut self, page_cap: usize) -> Self {
        self.page_cap = Some(page_cap);
        self
    }

    /// Classify a key against the window
    pub fn check(&self, key: SeriesTime) -> WindowCheck {
        if self.window_end.is_some_and(|end| key > end) {
            WindowCheck::After
        } else if self.window_start.is_some_and(|start| key < start) {
            WindowCheck::Before
        } else {
            WindowCheck::Inside
        }
    }

    /// True once `count` items satisfy the cap
    pub fn cap_reached(&self, count: usize) -> bool {
        self.page_cap.is_some_and(|cap| count >= cap)
    }
}
