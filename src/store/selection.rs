use crate::signal::{Memo, Signal};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Items that carry a unique identifier.
pub trait Identify {
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

type Selectable<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Checkbox-style multi-selection over a tracked collection.
///
/// Only ids present in the tracked collection (and accepted by the optional
/// selectable rule) can enter the selection. Re-seeding the tracked
/// collection does not prune ids selected earlier.
///
/// # Examples
///
/// ```
/// use viewstate::{Identify, SelectionStore};
///
/// #[derive(Clone)]
/// struct Row(&'static str);
///
/// impl Identify for Row {
///     type Id = &'static str;
///     fn id(&self) -> Self::Id { self.0 }
/// }
///
/// let selection = SelectionStore::new(vec![Row("a"), Row("b"), Row("c")]);
/// selection.select_all();
/// selection.toggle_selection(&"b");
/// assert_eq!(selection.selected_count(), 2);
/// assert!(!selection.is_selected(&"b"));
/// ```
pub struct SelectionStore<T: Identify> {
    tracked: Signal<Vec<T>>,
    selected: Signal<HashSet<T::Id>>,
    selectable: Option<Selectable<T>>,
    selected_items: Memo<Vec<T>>,
}

impl<T: Identify> Clone for SelectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            tracked: self.tracked.clone(),
            selected: self.selected.clone(),
            selectable: self.selectable.clone(),
            selected_items: self.selected_items.clone(),
        }
    }
}

impl<T> SelectionStore<T>
where
    T: Identify + Clone + Send + Sync + 'static,
{
    /// Create an empty selection over `tracked`.
    pub fn new(tracked: Vec<T>) -> Self {
        let tracked = Signal::new(tracked);
        let selected = Signal::new(HashSet::new());

        let selected_items: Memo<Vec<T>> = Memo::new({
            let tracked = tracked.clone();
            let selected = selected.clone();
            move || {
                selected.with(|ids: &HashSet<T::Id>| {
                    tracked.with(|items| {
                        items
                            .iter()
                            .filter(|item| ids.contains(&item.id()))
                            .cloned()
                            .collect()
                    })
                })
            }
        });

        Self {
            tracked,
            selected,
            selectable: None,
            selected_items,
        }
    }

    /// Restrict which items can be selected, like disabled row checkboxes.
    pub fn with_selectable<F>(mut self, selectable: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.selectable = Some(Arc::new(selectable));
        self
    }

    /// Replace the tracked collection. The selection itself is kept.
    pub fn set_tracked(&self, items: Vec<T>) {
        tracing::debug!(items = items.len(), "selection tracking replaced");
        self.tracked.set(items);
    }

    /// Flip the membership of `id`.
    ///
    /// Ids that are not in the tracked collection, or whose item is not
    /// selectable, are left untouched.
    pub fn toggle_selection(&self, id: &T::Id) {
        if self.selected.with_untracked(|ids| ids.contains(id)) {
            tracing::debug!(?id, "deselected");
            self.selected.update(|ids| {
                ids.remove(id);
            });
            return;
        }

        let eligible = self.tracked.with_untracked(|items| {
            items
                .iter()
                .any(|item| &item.id() == id && self.is_selectable(item))
        });
        if !eligible {
            tracing::debug!(?id, "ignored toggle of untracked or disabled item");
            return;
        }
        tracing::debug!(?id, "selected");
        self.selected.update(|ids| {
            ids.insert(id.clone());
        });
    }

    /// Select every selectable item of the tracked collection.
    pub fn select_all(&self) {
        let ids: HashSet<T::Id> = self.tracked.with_untracked(|items| {
            items
                .iter()
                .filter(|item| self.is_selectable(item))
                .map(Identify::id)
                .collect()
        });
        tracing::debug!(count = ids.len(), "selected all");
        self.selected.set_if_changed(ids);
    }

    pub fn clear_selection(&self) {
        if self.selected.with_untracked(HashSet::is_empty) {
            return;
        }
        tracing::debug!("selection cleared");
        self.selected.set(HashSet::new());
    }

    /// Header-checkbox behaviour: clear when everything is selected,
    /// otherwise select everything.
    pub fn toggle_all(&self) {
        if self.all_selected_untracked() {
            self.clear_selection();
        } else {
            self.select_all();
        }
    }

    pub fn is_selected(&self, id: &T::Id) -> bool {
        self.selected.with(|ids| ids.contains(id))
    }

    pub fn has_selection(&self) -> bool {
        self.selected.with(|ids| !ids.is_empty())
    }

    /// Whether every selectable tracked item is selected.
    ///
    /// False when nothing in the tracked collection can be selected.
    pub fn is_all_selected(&self) -> bool {
        self.selected.with(|ids| {
            self.tracked
                .with(|items| self.covers_all_selectable(items, ids))
        })
    }

    pub fn selected_count(&self) -> usize {
        self.selected.with(HashSet::len)
    }

    pub fn selected_ids(&self) -> HashSet<T::Id> {
        self.selected.get()
    }

    /// Tracked items whose id is selected, in tracked order.
    pub fn selected_items(&self) -> Vec<T> {
        self.selected_items.get()
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.with(Vec::len)
    }

    /// Whether `items` carry exactly the tracked ids, in the same order.
    pub(crate) fn tracks_same_ids(&self, items: &[T]) -> bool {
        self.tracked.with_untracked(|tracked| {
            tracked.len() == items.len()
                && tracked.iter().zip(items).all(|(a, b)| a.id() == b.id())
        })
    }

    fn is_selectable(&self, item: &T) -> bool {
        self.selectable
            .as_ref()
            .map_or(true, |selectable| selectable(item))
    }

    fn covers_all_selectable(&self, items: &[T], ids: &HashSet<T::Id>) -> bool {
        let mut selectable = items.iter().filter(|item| self.is_selectable(item)).peekable();
        selectable.peek().is_some() && selectable.all(|item| ids.contains(&item.id()))
    }

    fn all_selected_untracked(&self) -> bool {
        self.selected.with_untracked(|ids| {
            self.tracked
                .with_untracked(|items| self.covers_all_selectable(items, ids))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: String,
        locked: bool,
    }

    impl Identify for Row {
        type Id = String;

        fn id(&self) -> String {
            self.id.clone()
        }
    }

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter()
            .map(|id| Row {
                id: id.to_string(),
                locked: false,
            })
            .collect()
    }

    fn id(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn select_all_then_toggle_one() {
        let selection = SelectionStore::new(rows(&["a", "b", "c"]));
        selection.select_all();
        assert_eq!(selection.selected_count(), 3);
        assert!(selection.is_all_selected());

        selection.toggle_selection(&id("b"));
        assert_eq!(selection.selected_count(), 2);
        assert!(!selection.is_selected(&id("b")));
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn clear_empties_everything() {
        let selection = SelectionStore::new(rows(&["a", "b"]));
        selection.toggle_selection(&id("a"));
        assert!(selection.has_selection());

        selection.clear_selection();
        assert!(!selection.has_selection());
        assert_eq!(selection.selected_count(), 0);
        assert!(selection.selected_items().is_empty());
    }

    #[test]
    fn toggle_twice_restores() {
        let selection = SelectionStore::new(rows(&["a"]));
        selection.toggle_selection(&id("a"));
        selection.toggle_selection(&id("a"));
        assert!(!selection.is_selected(&id("a")));
    }

    #[test]
    fn untracked_ids_cannot_be_selected() {
        let selection = SelectionStore::new(rows(&["a"]));
        selection.toggle_selection(&id("zzz"));
        assert!(!selection.has_selection());
    }

    #[test]
    fn selected_items_follow_tracked_order() {
        let selection = SelectionStore::new(rows(&["a", "b", "c"]));
        selection.toggle_selection(&id("c"));
        selection.toggle_selection(&id("a"));

        let ids: Vec<String> = selection.selected_items().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn empty_collection_is_never_all_selected() {
        let selection: SelectionStore<Row> = SelectionStore::new(Vec::new());
        selection.select_all();
        assert!(!selection.is_all_selected());
        assert!(!selection.has_selection());
    }

    #[test]
    fn reseeding_keeps_selection() {
        let selection = SelectionStore::new(rows(&["a", "b"]));
        selection.toggle_selection(&id("a"));
        selection.set_tracked(rows(&["c", "d"]));

        assert!(selection.is_selected(&id("a")));
        assert_eq!(selection.selected_count(), 1);
        assert!(selection.selected_items().is_empty());
        assert_eq!(selection.tracked_count(), 2);
    }

    #[test]
    fn locked_rows_are_skipped() {
        let mut items = rows(&["a", "b", "c"]);
        items[1].locked = true;
        let selection = SelectionStore::new(items).with_selectable(|row: &Row| !row.locked);

        selection.select_all();
        assert_eq!(selection.selected_count(), 2);
        assert!(!selection.is_selected(&id("b")));
        assert!(selection.is_all_selected());

        selection.toggle_selection(&id("b"));
        assert!(!selection.is_selected(&id("b")));
    }

    #[test]
    fn same_ids_ignore_row_contents() {
        let selection = SelectionStore::new(rows(&["a", "b"]));
        let mut edited = rows(&["a", "b"]);
        edited[0].locked = true;

        assert!(selection.tracks_same_ids(&edited));
        assert!(!selection.tracks_same_ids(&rows(&["b", "a"])));
        assert!(!selection.tracks_same_ids(&rows(&["a"])));
    }

    #[test]
    fn toggle_all_flips_between_all_and_none() {
        let selection = SelectionStore::new(rows(&["a", "b"]));
        selection.toggle_selection(&id("a"));

        selection.toggle_all();
        assert!(selection.is_all_selected());

        selection.toggle_all();
        assert!(!selection.has_selection());
    }
}
