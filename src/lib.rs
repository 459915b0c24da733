//! # viewstate
//!
//! Reactive state containers for tabular views: filtering, pagination and
//! multi-selection over in-memory collections.
//!
//! ## Signals (Low-level primitives)
//!
//! - `Signal<T>` - Reactive values that notify dependents when changed
//! - `Memo<T>` - Computed values that automatically track dependencies
//! - `Effect` - Side effects that run when dependencies change
//!
//! ## Stores (Table state)
//!
//! - `FilterStore<T>` - Named criteria evaluated by named predicates
//! - `PaginationStore<T>` - Clamped page navigation and page slices
//! - `SelectionStore<T>` - Selected ids over a tracked collection
//! - `DataView<T>` - The three chained: rows → filter → page → selection
//!
//! ```
//! use viewstate::{text_contains, DataView, Identify, PredicateSet, ViewConfig};
//!
//! #[derive(Clone)]
//! struct Order { id: u64, merchant: String }
//!
//! impl Identify for Order {
//!     type Id = u64;
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! let orders: Vec<Order> = (1..=42)
//!     .map(|id| Order { id, merchant: format!("shop-{}", id % 4) })
//!     .collect();
//! let predicates = PredicateSet::new()
//!     .with("search", text_contains(|o: &Order| vec![o.merchant.as_str()]));
//! let view = DataView::new(orders, predicates, &ViewConfig::default());
//!
//! assert_eq!(view.pagination().total_pages(), 5);
//! view.set_filter("search", "SHOP-1");
//! assert_eq!(view.pagination().total_items(), 11);
//! ```

pub mod config;
pub mod runtime;
pub mod signal;
pub mod store;

// Re-export main types for convenience
pub use config::{ConfigError, ViewConfig};
pub use signal::{Effect, Memo, Signal};
pub use store::{
    field_equals, is_meaningful, text_contains, Criteria, DataView, FilterStore, Identify,
    PageRange, PaginationStore, PredicateSet, SelectionStore,
};
