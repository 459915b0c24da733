use crate::runtime::{ReactiveRuntime, RuntimeInner};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// A memoized computed value that automatically tracks dependencies.
///
/// Memos only recompute when one of the signals or memos they read has
/// changed since the last computation, and only when they are read.
pub struct Memo<T> {
    compute: Arc<dyn Fn() -> T + Send + Sync>,
    cached: Arc<RwLock<Option<T>>>,
    id: usize,
    runtime: Weak<RuntimeInner>,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
            cached: Arc::clone(&self.cached),
            id: self.id,
            runtime: Weak::clone(&self.runtime),
        }
    }
}

impl<T> Drop for Memo<T> {
    fn drop(&mut self) {
        if Arc::strong_count(&self.cached) == 1 {
            if let Some(runtime) = self.runtime.upgrade() {
                runtime.remove_source(self.id);
            }
        }
    }
}

impl<T: Send + Sync + 'static> Memo<T> {
    /// Create a new memo with the given computation function.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let runtime = ReactiveRuntime::current().inner();
        let id = runtime.next_id();

        // Register this as a memo with the runtime
        runtime.register_memo(id);

        Self {
            compute: Arc::new(compute),
            cached: Arc::new(RwLock::new(None)),
            id,
            runtime: Arc::downgrade(&runtime),
        }
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Read the memoized value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let runtime = self.runtime.upgrade();
        // Without a runtime nothing tracks staleness, so every read recomputes.
        let dirty = runtime.as_ref().map_or(true, |runtime| {
            runtime.track_read(self.id);
            runtime.is_memo_dirty(self.id)
        });

        if dirty {
            let value = self.recompute(runtime.as_deref());
            *self.cached.write() = Some(value);
        }

        let cached = self.cached.read();
        match cached.as_ref() {
            Some(value) => f(value),
            None => {
                drop(cached);
                let value = self.recompute(runtime.as_deref());
                let result = f(&value);
                *self.cached.write() = Some(value);
                result
            }
        }
    }

    /// Whether the next read will recompute.
    pub fn is_dirty(&self) -> bool {
        self.runtime
            .upgrade()
            .map_or(true, |runtime| runtime.is_memo_dirty(self.id))
    }

    fn recompute(&self, runtime: Option<&RuntimeInner>) -> T {
        match runtime {
            Some(runtime) => {
                // Recompute within observer context to track dependencies
                let value = runtime.with_observer(self.id, || (self.compute)());
                runtime.mark_memo_clean(self.id);
                value
            }
            None => (self.compute)(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn memo_basic() {
        let count = Signal::new(5);
        let doubled = Memo::new({
            let count = count.clone();
            move || count.get() * 2
        });

        assert_eq!(doubled.get(), 10);

        count.set(10);
        assert_eq!(doubled.get(), 20);
    }

    #[test]
    fn memo_caches_until_dependency_changes() {
        let runs = Arc::new(AtomicUsize::new(0));
        let source = Signal::new(vec![1, 2, 3]);
        let total = Memo::new({
            let source = source.clone();
            let runs = Arc::clone(&runs);
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                source.with(|v| v.iter().sum::<i32>())
            }
        });

        assert_eq!(total.get(), 6);
        assert_eq!(total.with(|t| *t), 6);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        source.update(|v| v.push(4));
        assert!(total.is_dirty());
        assert_eq!(total.get(), 10);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn chained_memos_propagate() {
        let input = Signal::new(1);
        let doubled = Memo::new({
            let input = input.clone();
            move || input.get() * 2
        });
        let quadrupled = Memo::new({
            let doubled = doubled.clone();
            move || doubled.get() * 2
        });

        assert_eq!(quadrupled.get(), 4);

        input.set(5);
        assert_eq!(quadrupled.get(), 20);
    }
}
