use super::filter::FilterStore;
use super::pagination::PaginationStore;
use super::predicate::{Criteria, PredicateSet};
use super::selection::{Identify, SelectionStore};
use crate::config::ViewConfig;
use crate::signal::Effect;
use serde_json::Value;

/// A filtered, paginated, selectable table view.
///
/// Raw rows flow through the filter store into the pagination store, and the
/// selection tracks the current page. The stages are wired with effects, so
/// any change upstream is pushed downstream synchronously:
///
/// - a change of the active criteria resets pagination to page 1
/// - the selection follows the visible page and is cleared whenever the
///   rows on it change
///
/// # Examples
///
/// ```
/// use viewstate::{field_equals, DataView, Identify, PredicateSet, ViewConfig};
///
/// #[derive(Clone, Debug)]
/// struct Payment { id: u32, status: &'static str }
///
/// impl Identify for Payment {
///     type Id = u32;
///     fn id(&self) -> u32 { self.id }
/// }
///
/// let payments: Vec<Payment> = (1..=30)
///     .map(|id| Payment { id, status: if id % 3 == 0 { "failed" } else { "success" } })
///     .collect();
/// let predicates = PredicateSet::new().with("status", field_equals(|p: &Payment| p.status));
/// let view = DataView::new(payments, predicates, &ViewConfig::default());
///
/// view.set_filter("status", "failed");
/// assert_eq!(view.pagination().total_items(), 10);
/// assert_eq!(view.pagination().total_pages(), 1);
///
/// view.selection().select_all();
/// assert_eq!(view.selection().selected_count(), 10);
/// ```
pub struct DataView<T: Identify> {
    filter: FilterStore<T>,
    pagination: PaginationStore<T>,
    selection: SelectionStore<T>,
    page_size_options: Vec<usize>,
    _wiring: [Effect; 2],
}

impl<T> DataView<T>
where
    T: Identify + Clone + Send + Sync + 'static,
{
    pub fn new(data: Vec<T>, predicates: PredicateSet<T>, config: &ViewConfig) -> Self {
        let filter = FilterStore::new(data, predicates);
        let pagination = PaginationStore::new(Vec::new(), config.page_size);
        let selection = SelectionStore::new(Vec::new());

        let feed_pages = Effect::new({
            let filter = filter.clone();
            let pagination = pagination.clone();
            move || pagination.set_data(filter.filtered_view())
        });

        let scope_selection = Effect::new({
            let pagination = pagination.clone();
            let selection = selection.clone();
            move || {
                let rows = pagination.page_slice();
                let same_page = selection.tracks_same_ids(&rows);
                selection.set_tracked(rows);
                if !same_page {
                    selection.clear_selection();
                }
            }
        });

        Self {
            filter,
            pagination,
            selection,
            page_size_options: config.page_size_options.clone(),
            _wiring: [feed_pages, scope_selection],
        }
    }

    /// Replace the raw rows. Criteria and the current page are kept.
    pub fn set_data(&self, data: Vec<T>) {
        self.filter.set_data(data);
    }

    /// Set a filter criterion. Goes back to page 1 when the active
    /// criteria changed; placeholder values such as `"all"` keep the page.
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.refilter(|filter| filter.set_filter(key, value));
    }

    pub fn clear_filter(&self, key: &str) {
        self.refilter(|filter| filter.clear_filter(key));
    }

    /// Drop every criterion and go back to page 1.
    pub fn clear_all_filters(&self) {
        self.refilter(FilterStore::clear_all_filters);
    }

    pub fn replace_criteria(&self, criteria: Criteria) {
        self.refilter(|filter| filter.replace_criteria(criteria));
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<T> {
        self.pagination.page_slice()
    }

    pub fn filters(&self) -> &FilterStore<T> {
        &self.filter
    }

    pub fn pagination(&self) -> &PaginationStore<T> {
        &self.pagination
    }

    pub fn selection(&self) -> &SelectionStore<T> {
        &self.selection
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    fn refilter(&self, change: impl FnOnce(&FilterStore<T>) -> bool) {
        let before = self.filter.criteria_untracked();
        if change(&self.filter) && !before.same_active(&self.filter.criteria_untracked()) {
            self.pagination.reset_pagination();
        }
    }

    /// Call `f` with the visible rows now and after every change to them.
    ///
    /// The subscription lasts as long as the returned effect.
    pub fn subscribe<F>(&self, f: F) -> Effect
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        let pagination = self.pagination.clone();
        Effect::new(move || {
            let rows = pagination.page_slice();
            f(&rows);
        })
    }
}
