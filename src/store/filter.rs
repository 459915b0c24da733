use super::predicate::{Criteria, PredicateSet};
use crate::signal::{Memo, Signal};
use serde_json::Value;
use std::sync::Arc;

/// Criteria-driven filtered view over a collection.
///
/// The filtered view is a memo over the input and the criteria: it is
/// recomputed lazily on the first read after either changes, and always
/// preserves the input order.
///
/// # Examples
///
/// ```
/// use viewstate::{field_equals, FilterStore, PredicateSet};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Row { id: &'static str, status: &'static str }
///
/// let rows = vec![
///     Row { id: "1", status: "A" },
///     Row { id: "2", status: "B" },
///     Row { id: "3", status: "A" },
/// ];
/// let predicates = PredicateSet::new().with("status", field_equals(|r: &Row| r.status));
/// let store = FilterStore::new(rows, predicates);
///
/// store.set_filter("status", "A");
/// let ids: Vec<_> = store.filtered_view().iter().map(|r| r.id).collect();
/// assert_eq!(ids, ["1", "3"]);
/// ```
pub struct FilterStore<T> {
    data: Signal<Vec<T>>,
    criteria: Signal<Criteria>,
    predicates: Arc<PredicateSet<T>>,
    filtered: Memo<Vec<T>>,
}

impl<T> Clone for FilterStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            criteria: self.criteria.clone(),
            predicates: Arc::clone(&self.predicates),
            filtered: self.filtered.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> FilterStore<T> {
    /// Create a store over `data` with no active criteria.
    pub fn new(data: Vec<T>, predicates: PredicateSet<T>) -> Self {
        let data = Signal::new(data);
        let criteria = Signal::new(Criteria::new());
        let predicates = Arc::new(predicates);

        let filtered = Memo::new({
            let data = data.clone();
            let criteria = criteria.clone();
            let predicates = Arc::clone(&predicates);
            move || criteria.with(|criteria| data.with(|items| predicates.apply(items, criteria)))
        });

        Self {
            data,
            criteria,
            predicates,
            filtered,
        }
    }

    /// Replace the input collection wholesale. Criteria are kept.
    pub fn set_data(&self, data: Vec<T>) {
        tracing::debug!(items = data.len(), "filter input replaced");
        self.data.set(data);
    }

    /// Insert or overwrite a criterion. Returns whether the criteria changed.
    ///
    /// Setting the value already held changes nothing and notifies nobody.
    pub fn set_filter(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        let changed = self
            .criteria
            .with_untracked(|criteria| criteria.get(&key) != Some(&value));
        if !changed {
            return false;
        }
        tracing::debug!(key = %key, value = %value, "filter set");
        self.criteria.update(|criteria| {
            criteria.insert(key, value);
        });
        true
    }

    /// Remove a criterion, as if it had never been set.
    pub fn clear_filter(&self, key: &str) -> bool {
        let present = self
            .criteria
            .with_untracked(|criteria| criteria.get(key).is_some());
        if !present {
            return false;
        }
        tracing::debug!(key, "filter cleared");
        self.criteria.update(|criteria| {
            criteria.remove(key);
        });
        true
    }

    pub fn clear_all_filters(&self) -> bool {
        if self.criteria.with_untracked(Criteria::is_empty) {
            return false;
        }
        tracing::debug!("all filters cleared");
        self.criteria.set(Criteria::new());
        true
    }

    /// Restore a previously saved set of criteria.
    pub fn replace_criteria(&self, criteria: Criteria) -> bool {
        let count = criteria.len();
        let changed = self.criteria.set_if_changed(criteria);
        if changed {
            tracing::debug!(count, "criteria replaced");
        }
        changed
    }

    /// Snapshot of the current criteria, including non-meaningful entries.
    pub fn criteria(&self) -> Criteria {
        self.criteria.get()
    }

    pub(crate) fn criteria_untracked(&self) -> Criteria {
        self.criteria.get_untracked()
    }

    pub fn criterion(&self, key: &str) -> Option<Value> {
        self.criteria.with(|criteria| criteria.get(key).cloned())
    }

    pub fn has_active_filters(&self) -> bool {
        self.criteria.with(Criteria::has_active)
    }

    /// Items satisfying every active criterion, in input order.
    pub fn filtered_view(&self) -> Vec<T> {
        self.filtered.get()
    }

    /// Read the filtered view without cloning it.
    pub fn with_filtered<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.filtered.with(|items| f(items))
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.with(Vec::len)
    }

    /// Size of the unfiltered input.
    pub fn total_count(&self) -> usize {
        self.data.with(Vec::len)
    }

    pub fn predicates(&self) -> &PredicateSet<T> {
        &self.predicates
    }
}
