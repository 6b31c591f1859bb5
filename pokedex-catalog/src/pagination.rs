//! Compact page-number ranges for pagination controls.

use std::fmt;

/// How many pages on either side of the current page are always shown.
const WINDOW: i64 = 2;

/// One entry of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl PageItem {
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Page(n) => Some(*n),
            Self::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{}", n),
            Self::Ellipsis => write!(f, "..."),
        }
    }
}

/// Build the pagination bar for `current` out of `total` pages.
///
/// Page 1 and the last page are always present, as is every page within
/// two of `current`. A gap of exactly one page is filled with that page;
/// a wider gap becomes a single [`PageItem::Ellipsis`]. `total` is treated
/// as at least 1.
pub fn pagination_range(current: u32, total: u32) -> Vec<PageItem> {
    let total = i64::from(total.max(1));
    let current = i64::from(current);

    let mut pages: Vec<i64> = vec![1];
    if total > 1 {
        pages.extend(((current - WINDOW)..=(current + WINDOW)).filter(|&i| i > 1 && i < total));
        pages.push(total);
    }

    let mut items = Vec::with_capacity(pages.len() + 2);
    let mut last: Option<i64> = None;
    for page in pages {
        if let Some(prev) = last {
            match page - prev {
                1 => {}
                2 => items.push(PageItem::Page(to_page(prev + 1))),
                _ => items.push(PageItem::Ellipsis),
            }
        }
        items.push(PageItem::Page(to_page(page)));
        last = Some(page);
    }
    items
}

// Every value pushed above lies in 1..=total, which came from a u32.
fn to_page(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
