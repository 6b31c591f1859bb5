//! Filtering and page slicing over the in-memory catalog.
//!
//! Everything here is pure: [`filter_creatures`] keeps catalog order,
//! [`paginate`] cuts one page window out of the filtered list, and
//! [`FilterSelection`] holds the ephemeral control state that drives both.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::pagination::{PageItem, pagination_range};
use crate::types::Creature;

// ── Tag filters ─────────────────────────────────────────────────────────────

/// A type or region predicate. `All` matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    All,
    Only(String),
}

impl TagFilter {
    /// Build from an optional selection; `None`, `""` and `"all"` mean [`TagFilter::All`].
    pub fn from_selection(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case("all") => Self::Only(v.to_string()),
            _ => Self::All,
        }
    }

    /// Type membership: the selected tag is one of the record's type tags.
    pub fn matches_type(&self, creature: &Creature) -> bool {
        match self {
            Self::All => true,
            Self::Only(tag) => creature.has_type(tag),
        }
    }

    /// Region equality.
    pub fn matches_region(&self, creature: &Creature) -> bool {
        match self {
            Self::All => true,
            Self::Only(region) => creature.region == *region,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl FromStr for TagFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_selection(Some(s)))
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(tag) => write!(f, "{}", tag),
        }
    }
}

// ── Page size ───────────────────────────────────────────────────────────────

/// Page sizes offered by the page-size control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PageSize {
    Ten,
    #[default]
    Twenty,
    Fifty,
    Hundred,
    TwoHundred,
}

#[derive(Debug, Error)]
#[error("Invalid page size {0}: expected one of 10, 20, 50, 100, 200")]
pub struct InvalidPageSize(pub String);

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        Self::Ten,
        Self::Twenty,
        Self::Fifty,
        Self::Hundred,
        Self::TwoHundred,
    ];

    pub fn get(self) -> usize {
        match self {
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
            Self::TwoHundred => 200,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == n)
            .ok_or_else(|| InvalidPageSize(n.to_string()))
    }
}

impl FromStr for PageSize {
    type Err = InvalidPageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s.trim().parse().map_err(|_| InvalidPageSize(s.to_string()))?;
        Self::try_from(n)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// One page of filtered results.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    /// Records on this page; empty when `page` is out of range.
    pub items: Vec<&'a Creature>,
    /// The requested 1-based page.
    pub page: u32,
    pub page_size: PageSize,
    /// `ceil(total_items / page_size)`; zero when nothing matched.
    pub total_pages: u32,
    pub total_items: usize,
}

impl PageView<'_> {
    /// Pagination bar for this page.
    pub fn range(&self) -> Vec<PageItem> {
        pagination_range(self.page, self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Records matching both predicates, in their original order.
pub fn filter_creatures<'a>(
    creatures: &'a [Creature],
    type_filter: &TagFilter,
    region_filter: &TagFilter,
) -> Vec<&'a Creature> {
    creatures
        .iter()
        .filter(|c| type_filter.matches_type(c) && region_filter.matches_region(c))
        .collect()
}

/// Slice page `page` (1-based) out of `filtered`.
///
/// Pages below 1 or beyond the last page produce an empty slice.
pub fn paginate(filtered: Vec<&Creature>, page: u32, page_size: PageSize) -> PageView<'_> {
    let size = page_size.get();
    let total_items = filtered.len();
    let total_pages = u32::try_from(total_items.div_ceil(size)).unwrap_or(u32::MAX);

    let items = if page == 0 || page > total_pages {
        Vec::new()
    } else {
        let start = (page as usize - 1) * size;
        let end = (start + size).min(total_items);
        filtered[start..end].to_vec()
    };

    PageView {
        items,
        page,
        page_size,
        total_pages,
        total_items,
    }
}

// ── Selection state ─────────────────────────────────────────────────────────

/// Filter and paging controls. Changing a filter or the page size returns
/// to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    type_filter: TagFilter,
    region_filter: TagFilter,
    page: u32,
    page_size: PageSize,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            type_filter: TagFilter::All,
            region_filter: TagFilter::All,
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_filter(&self) -> &TagFilter {
        &self.type_filter
    }

    pub fn region_filter(&self) -> &TagFilter {
        &self.region_filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn set_type(&mut self, filter: TagFilter) {
        self.type_filter = filter;
        self.page = 1;
    }

    pub fn set_region(&mut self, filter: TagFilter) {
        self.region_filter = filter;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    /// Move forward one page; no-op on the last page.
    pub fn next_page(&mut self, total_pages: u32) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    /// Move back one page; no-op on page 1.
    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Jump to `page`, clamped into `1..=max(total_pages, 1)`.
    pub fn go_to(&mut self, page: u32, total_pages: u32) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    /// Filter and paginate `creatures` with the current selection.
    pub fn apply<'a>(&self, creatures: &'a [Creature]) -> PageView<'a> {
        let filtered = filter_creatures(creatures, &self.type_filter, &self.region_filter);
        paginate(filtered, self.page, self.page_size)
    }
}
