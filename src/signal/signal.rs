use crate::runtime::{ReactiveRuntime, RuntimeInner};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// A reactive signal that holds a value and notifies dependents when changed.
///
/// Clones share the same underlying cell.
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    id: usize,
    runtime: Weak<RuntimeInner>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            id: self.id,
            runtime: Weak::clone(&self.runtime),
        }
    }
}

impl<T> Drop for Signal<T> {
    fn drop(&mut self) {
        // Last handle gone
        if Arc::strong_count(&self.value) == 1 {
            if let Some(runtime) = self.runtime.upgrade() {
                runtime.remove_source(self.id);
            }
        }
    }
}

impl<T: Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(initial: T) -> Self {
        let runtime = ReactiveRuntime::current().inner();
        let id = runtime.next_id();

        Self {
            value: Arc::new(RwLock::new(initial)),
            id,
            runtime: Arc::downgrade(&runtime),
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track();
        self.value.read().clone()
    }

    /// Get the current value without subscribing the current observer.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.read().clone()
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.value.write() = new_value;
        self.notify();
    }

    /// Set a new value, skipping the notification when it equals the current one.
    ///
    /// Returns whether the value changed.
    pub fn set_if_changed(&self, new_value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut value = self.value.write();
            if *value == new_value {
                return false;
            }
            *value = new_value;
        }
        self.notify();
        true
    }

    /// Update the value using a function.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.value.write();
        f(&mut *value);
        drop(value); // Release the write lock before notifying
        self.notify();
    }

    /// Read the value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        let value = self.value.read();
        f(&*value)
    }

    /// Read the value without cloning or subscribing the current observer.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.read();
        f(&*value)
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> usize {
        self.id
    }

    // Reads and writes go to the runtime the signal was created in, whatever
    // scope is current. Once that runtime is gone the signal is a plain cell.
    fn track(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.track_read(self.id);
        }
    }

    fn notify(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.notify_observers(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_get_set() {
        let signal = Signal::new(1);
        signal.set(2);
        assert_eq!(signal.get(), 2);

        signal.update(|n| *n += 3);
        assert_eq!(signal.get(), 5);
    }

    #[test]
    fn set_if_changed_reports_change() {
        let signal = Signal::new("a".to_string());
        assert!(!signal.set_if_changed("a".to_string()));
        assert!(signal.set_if_changed("b".to_string()));
        assert_eq!(signal.with(|s| s.len()), 1);
        assert_eq!(signal.get_untracked(), "b");
    }

    #[test]
    fn writes_from_another_scope_reach_the_owning_runtime() {
        let source = Signal::new(1);
        let doubled = crate::signal::Memo::new({
            let source = source.clone();
            move || source.get() * 2
        });
        assert_eq!(doubled.get(), 2);

        ReactiveRuntime::scope(|| source.set(4));
        assert_eq!(doubled.get(), 8);
    }

    #[test]
    fn signal_outlives_its_runtime() {
        let signal = ReactiveRuntime::scope(|| Signal::new(1));
        signal.set(3);
        assert_eq!(signal.get(), 3);
    }
}
