//! Table-view state stores.
//!
//! Each store is an independent reactive container:
//! - [`FilterStore`]: criteria-driven filtered view of a collection
//! - [`PaginationStore`]: page index and page size over a collection
//! - [`SelectionStore`]: checkbox-style selection over a tracked collection
//!
//! [`DataView`] chains the three the way a table page does.

mod filter;
mod pagination;
mod predicate;
mod selection;
mod view;

pub use filter::FilterStore;
pub use pagination::{page_count, PageRange, PaginationStore, DEFAULT_PAGE_SIZE};
pub use predicate::{
    field_equals, is_meaningful, text_contains, Criteria, Predicate, PredicateSet, ALL,
};
pub use selection::{Identify, SelectionStore};
pub use view::DataView;
