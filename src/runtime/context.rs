use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Observer = Arc<dyn Fn() + Send + Sync>;

/// Dependency graph for one runtime.
struct ReactiveContext {
    current_observer: Option<usize>,
    // Map from source ID (signal or memo) to the observers that depend on it
    dependencies: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to the sources it depends on
    observer_deps: HashMap<usize, HashSet<usize>>,
    // Map from effect ID to the effect function
    observers: HashMap<usize, Observer>,
    // Map from memo ID to dirty state
    memo_dirty: HashMap<usize, bool>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            current_observer: None,
            dependencies: HashMap::new(),
            observer_deps: HashMap::new(),
            observers: HashMap::new(),
            memo_dirty: HashMap::new(),
        }
    }

    fn clear(&mut self) {
        self.current_observer = None;
        self.dependencies.clear();
        self.observer_deps.clear();
        self.observers.clear();
        self.memo_dirty.clear();
    }

    fn detach(&mut self, observer_id: usize) {
        if let Some(old_deps) = self.observer_deps.remove(&observer_id) {
            for source_id in old_deps {
                if let Some(deps) = self.dependencies.get_mut(&source_id) {
                    deps.remove(&observer_id);
                }
            }
        }
    }
}

/// Dependency graph and id allocator of one runtime.
///
/// Signals, memos and effects hold a `Weak` to the inner state of the runtime
/// they were created in, and route every read, write and re-run through it.
pub struct RuntimeInner {
    next_id: AtomicUsize,
    context: Mutex<ReactiveContext>,
}

impl RuntimeInner {
    fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
            context: Mutex::new(ReactiveContext::new()),
        }
    }

    /// Generate the next unique ID for a reactive primitive.
    pub fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Track a read of a source by the current observer.
    pub fn track_read(&self, source_id: usize) {
        let mut ctx = self.context.lock();
        if let Some(current_observer) = ctx.current_observer {
            if current_observer == source_id {
                return;
            }
            ctx.dependencies
                .entry(source_id)
                .or_default()
                .insert(current_observer);
            ctx.observer_deps
                .entry(current_observer)
                .or_default()
                .insert(source_id);
        }
    }

    /// Notify all observers that depend on a source.
    pub fn notify_observers(&self, source_id: usize) {
        let observers = {
            let ctx = self.context.lock();
            ctx.dependencies
                .get(&source_id)
                .map(|obs| obs.iter().copied().collect::<Vec<_>>())
        };

        for observer_id in observers.into_iter().flatten() {
            self.mark_observer_dirty(observer_id);
        }
    }

    /// Mark an observer (memo or effect) as dirty and propagate to dependents.
    fn mark_observer_dirty(&self, observer_id: usize) {
        let mut ctx = self.context.lock();

        if let Some(already_dirty) = ctx.memo_dirty.get(&observer_id).copied() {
            if already_dirty {
                return;
            }
            ctx.memo_dirty.insert(observer_id, true);

            let dependents = ctx
                .dependencies
                .get(&observer_id)
                .map(|deps| deps.iter().copied().collect::<Vec<_>>());
            drop(ctx);

            for dependent_id in dependents.into_iter().flatten() {
                self.mark_observer_dirty(dependent_id);
            }
            return;
        }

        let effect = ctx.observers.get(&observer_id).cloned();
        drop(ctx);

        if let Some(effect) = effect {
            tracing::trace!(observer_id, "re-running effect");
            self.with_observer(observer_id, || effect());
        }
    }

    /// Register an effect function under an observer ID.
    ///
    /// Any dependencies previously recorded for this ID are dropped.
    pub fn create_observer<F>(&self, observer_id: usize, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let replaced = {
            let mut ctx = self.context.lock();
            ctx.detach(observer_id);
            ctx.observers.insert(observer_id, Arc::new(f))
        };
        drop(replaced);
    }

    /// Run a function with a specific observer as the current context.
    pub fn with_observer<F, R>(&self, observer_id: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let prev = self.context.lock().current_observer.replace(observer_id);

        let result = f();

        self.context.lock().current_observer = prev;
        result
    }

    /// Run a function without recording any reads against the current observer.
    pub fn untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let prev = self.context.lock().current_observer.take();

        let result = f();

        self.context.lock().current_observer = prev;
        result
    }

    /// Register a memo and mark it as dirty initially.
    pub fn register_memo(&self, memo_id: usize) {
        self.context.lock().memo_dirty.insert(memo_id, true);
    }

    /// Check if a memo is dirty (needs recomputation).
    pub fn is_memo_dirty(&self, memo_id: usize) -> bool {
        self.context
            .lock()
            .memo_dirty
            .get(&memo_id)
            .copied()
            .unwrap_or(true)
    }

    /// Mark a memo as clean (after recomputation).
    pub fn mark_memo_clean(&self, memo_id: usize) {
        self.context.lock().memo_dirty.insert(memo_id, false);
    }

    /// Drop an effect and every edge pointing at it.
    pub fn remove_observer(&self, observer_id: usize) {
        let removed = {
            let mut ctx = self.context.lock();
            ctx.detach(observer_id);
            ctx.observers.remove(&observer_id)
        };
        // The closure may own the last handle to a signal, whose drop locks again.
        drop(removed);
        tracing::trace!(observer_id, "observer removed");
    }

    /// Forget a signal or memo that no longer exists.
    pub fn remove_source(&self, source_id: usize) {
        let mut ctx = self.context.lock();
        ctx.dependencies.remove(&source_id);
        ctx.memo_dirty.remove(&source_id);
        ctx.detach(source_id);
    }

    fn observer_count(&self) -> usize {
        self.context.lock().observers.len()
    }

    fn clear(&self) {
        let observers = {
            let mut ctx = self.context.lock();
            let observers = std::mem::take(&mut ctx.observers);
            ctx.clear();
            observers
        };
        drop(observers);
        self.next_id.store(0, Ordering::SeqCst);
    }
}

/// Reactive runtime owning the dependency graph between signals, memos and effects.
///
/// Every thread gets its own default runtime, so stores created on one UI
/// thread never observe reads made on another. Scoped runtimes can be pushed
/// on top of the default for isolation. A primitive stays bound to the
/// runtime that was current when it was created, even when it is used later
/// inside another scope.
///
/// No lock is held while a memo computation or an effect runs, so callbacks
/// are free to read and write other reactive values.
///
/// # Examples
///
/// Using the thread's default runtime:
///
/// ```
/// use viewstate::Signal;
///
/// let signal = Signal::new(42);
/// assert_eq!(signal.get(), 42);
/// ```
///
/// Using scoped runtimes for isolation:
///
/// ```
/// use viewstate::runtime::ReactiveRuntime;
/// use viewstate::Signal;
///
/// ReactiveRuntime::scope(|| {
///     let signal = Signal::new(0);
///     assert_eq!(signal.get(), 0);
/// });
/// // Runtime and all its state is dropped here
/// ```
pub struct ReactiveRuntime {
    inner: Arc<RuntimeInner>,
}

thread_local! {
    // Stack of scoped runtimes
    static RUNTIME_STACK: RefCell<Vec<Arc<ReactiveRuntime>>> = const { RefCell::new(Vec::new()) };
    static THREAD_RUNTIME: Arc<ReactiveRuntime> = ReactiveRuntime::new();
}

impl ReactiveRuntime {
    /// Create a new isolated runtime.
    pub fn new() -> Arc<Self> {
        Arc::new(ReactiveRuntime {
            inner: Arc::new(RuntimeInner::new()),
        })
    }

    /// Run a function with a fresh isolated runtime.
    ///
    /// The runtime and all its state is dropped when the function returns.
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let runtime = Self::new();
        Self::with_runtime(runtime, f)
    }

    /// The default runtime of the calling thread.
    pub fn thread_default() -> Arc<Self> {
        THREAD_RUNTIME.with(Arc::clone)
    }

    /// Get the current reactive runtime.
    ///
    /// Returns the innermost scoped runtime, or the thread default when no
    /// scope is active.
    pub fn current() -> Arc<Self> {
        RUNTIME_STACK
            .with(|stack| stack.borrow().last().cloned())
            .unwrap_or_else(Self::thread_default)
    }

    /// Run a function with a specific runtime as the current context.
    ///
    /// # Examples
    ///
    /// ```
    /// use viewstate::runtime::ReactiveRuntime;
    /// use viewstate::Signal;
    ///
    /// let runtime = ReactiveRuntime::new();
    /// ReactiveRuntime::with_runtime(runtime, || {
    ///     let signal = Signal::new(42);
    ///     assert_eq!(signal.get(), 42);
    /// });
    /// ```
    pub fn with_runtime<F, R>(runtime: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().push(runtime);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Clear all observers, dependencies, and state from this runtime.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of live effects registered with this runtime.
    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }

    pub(crate) fn inner(&self) -> Arc<RuntimeInner> {
        Arc::clone(&self.inner)
    }

    /// Generate the next unique ID for a reactive primitive.
    pub fn next_id(&self) -> usize {
        self.inner.next_id()
    }

    /// Track a read of a source by the current observer.
    pub fn track_read(&self, source_id: usize) {
        self.inner.track_read(source_id);
    }

    /// Notify all observers that depend on a source.
    pub fn notify_observers(&self, source_id: usize) {
        self.inner.notify_observers(source_id);
    }

    /// Run a function with a specific observer as the current context.
    pub fn with_observer<F, R>(&self, observer_id: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.inner.with_observer(observer_id, f)
    }

    /// Run a function without recording any reads against the current observer.
    pub fn untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.inner.untracked(f)
    }
}
