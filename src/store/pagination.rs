use crate::signal::{Memo, Signal};
use std::fmt;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of pages needed for `total` items, never less than one.
///
/// An empty collection still has a single (empty) page, so page 1 is
/// always a valid position.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Human-readable item range of the current page.
///
/// Indices are 1-based and inclusive; both are 0 for an empty collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl PageRange {
    /// Range of `page` for `total` items. Out-of-range pages are clamped.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        if total == 0 {
            return Self {
                start: 0,
                end: 0,
                total: 0,
            };
        }
        let page_size = page_size.max(1);
        let page = page.clamp(1, page_count(total, page_size));
        Self {
            start: (page - 1).saturating_mul(page_size).saturating_add(1),
            end: page.saturating_mul(page_size).min(total),
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {}", self.start, self.end, self.total)
    }
}

/// Page-index and page-size state over a collection.
///
/// `current_page` is 1-based and stays within `[1, total_pages]` through
/// every operation, including page-size changes and input replacement.
///
/// # Examples
///
/// ```
/// use viewstate::PaginationStore;
///
/// let store = PaginationStore::new((1..=25).collect::<Vec<u32>>(), 10);
/// assert_eq!(store.total_pages(), 3);
///
/// store.go_to_page(5);
/// assert_eq!(store.current_page(), 3);
/// assert_eq!(store.page_slice(), vec![21, 22, 23, 24, 25]);
/// assert_eq!(store.range().to_string(), "21-25 of 25");
/// ```
pub struct PaginationStore<T> {
    data: Signal<Vec<T>>,
    current_page: Signal<usize>,
    page_size: Signal<usize>,
    total_pages: Memo<usize>,
    page_slice: Memo<Vec<T>>,
}

impl<T> Clone for PaginationStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            current_page: self.current_page.clone(),
            page_size: self.page_size.clone(),
            total_pages: self.total_pages.clone(),
            page_slice: self.page_slice.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> PaginationStore<T> {
    /// Create a store on page 1. A page size of 0 is treated as 1.
    pub fn new(data: Vec<T>, page_size: usize) -> Self {
        let data = Signal::new(data);
        let current_page = Signal::new(1usize);
        let page_size = Signal::new(page_size.max(1));

        let total_pages = Memo::new({
            let data = data.clone();
            let page_size = page_size.clone();
            move || page_count(data.with(Vec::len), page_size.get())
        });

        let page_slice = Memo::new({
            let data = data.clone();
            let current_page = current_page.clone();
            let page_size = page_size.clone();
            move || {
                let page = current_page.get();
                let size = page_size.get();
                data.with(|items| {
                    // The page may be stale while a size change is re-clamping it
                    let page = page.clamp(1, page_count(items.len(), size));
                    let start = (page - 1).saturating_mul(size).min(items.len());
                    let end = start.saturating_add(size).min(items.len());
                    items[start..end].to_vec()
                })
            }
        });

        Self {
            data,
            current_page,
            page_size,
            total_pages,
            page_slice,
        }
    }

    /// Replace the input collection and re-clamp the current page.
    pub fn set_data(&self, data: Vec<T>) {
        tracing::debug!(items = data.len(), "pagination input replaced");
        self.data.set(data);
        self.clamp_current_page();
    }

    /// Jump to page `page`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&self, page: i64) {
        let total = self.total_pages_untracked();
        let clamped = page.clamp(1, i64::try_from(total).unwrap_or(i64::MAX));
        // `clamped` is within [1, total], so it fits in usize
        let clamped = usize::try_from(clamped).unwrap_or(total);
        if self.current_page.set_if_changed(clamped) {
            tracing::debug!(requested = page, page = clamped, "page changed");
        }
    }

    pub fn go_to_next_page(&self) {
        let page = self.current_page_untracked();
        self.go_to_page(page_as_i64(page).saturating_add(1));
    }

    pub fn go_to_previous_page(&self) {
        let page = self.current_page_untracked();
        self.go_to_page(page_as_i64(page).saturating_sub(1));
    }

    /// Change the page size. Values below 1 are clamped to 1.
    pub fn set_page_size(&self, page_size: usize) {
        let page_size = page_size.max(1);
        if self.page_size.set_if_changed(page_size) {
            tracing::debug!(page_size, "page size changed");
            self.clamp_current_page();
        }
    }

    /// Return to page 1.
    pub fn reset_pagination(&self) {
        if self.current_page.set_if_changed(1) {
            tracing::debug!("pagination reset");
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page.get()
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages.get()
    }

    pub fn total_items(&self) -> usize {
        self.data.with(Vec::len)
    }

    /// Items on the current page.
    pub fn page_slice(&self) -> Vec<T> {
        self.page_slice.get()
    }

    /// Read the current page without cloning it.
    pub fn with_page_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.page_slice.with(|items| f(items))
    }

    /// 1-based index of the first item on the page, 0 when empty.
    pub fn start_index(&self) -> usize {
        self.range().start
    }

    /// 1-based index of the last item on the page, 0 when empty.
    pub fn end_index(&self) -> usize {
        self.range().end
    }

    pub fn range(&self) -> PageRange {
        PageRange::new(self.current_page(), self.page_size(), self.total_items())
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page() < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page() > 1
    }

    fn current_page_untracked(&self) -> usize {
        self.current_page.get_untracked()
    }

    fn total_pages_untracked(&self) -> usize {
        page_count(
            self.data.with_untracked(Vec::len),
            self.page_size.get_untracked(),
        )
    }

    fn clamp_current_page(&self) {
        let total = self.total_pages_untracked();
        let page = self.current_page_untracked();
        if page > total {
            tracing::debug!(from = page, to = total, "current page clamped");
            self.current_page.set(total);
        }
    }
}

fn page_as_i64(page: usize) -> i64 {
    i64::try_from(page).unwrap_or(i64::MAX)
}
