//! Creature catalog data model, dataset loading, and the filter/paginate engine.
//!
//! This crate has no network or UI dependencies. The favorites crate resolves
//! remote relation rows against a [`Catalog`], and the CLI renders the
//! [`PageView`] produced by [`FilterSelection::apply`].

pub mod dataset;
pub mod filter;
pub mod pagination;
pub mod types;

pub use dataset::{Catalog, DatasetError, load_catalog, load_creatures, load_regions, load_types};
pub use filter::{
    FilterSelection, InvalidPageSize, PageSize, PageView, TagFilter, filter_creatures, paginate,
};
pub use pagination::{PageItem, pagination_range};
pub use types::*;
