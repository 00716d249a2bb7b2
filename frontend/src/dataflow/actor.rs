//! Single-value Actor
//!
//! An Actor owns a `Mutable<T>` and a task running its processing loop.
//! Dropping the last clone of the Actor cancels the loop.

use std::future::Future;
use std::sync::Arc;
use zoon::{Mutable, Signal, Task, TaskHandle};

/// Reactive state container mutated only by its own processing loop.
///
/// # Examples
///
/// ```rust
/// let (sort_changed_relay, mut sort_changed_stream) = relay::<SortOption>();
///
/// let filters = Actor::new(FilterState::default(), async move |state| {
///     while let Some(sort) = sort_changed_stream.next().await {
///         state.set_neq(state.get_cloned().with_sort(sort));
///     }
/// });
///
/// El::new().child_signal(filters.signal_ref(|filters| filters.sort.label()))
/// ```
#[derive(Clone, Debug)]
pub struct Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Mutable<T>,
    _task_handle: Arc<TaskHandle>,
}

impl<T> Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start the processing loop with `initial_state`.
    ///
    /// The processor usually runs a `select!` loop over the Actor's relay
    /// streams and writes through the `Mutable` it receives.
    pub fn new<F, Fut>(initial_state: T, processor: F) -> Self
    where
        F: FnOnce(Mutable<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let state = Mutable::new(initial_state);
        let task_handle = Arc::new(Task::start_droppable(processor(state.clone())));
        Self {
            state,
            _task_handle: task_handle,
        }
    }

    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        self.state.signal_cloned()
    }

    /// Derived signal without cloning the whole state on every change.
    pub fn signal_ref<U, F>(&self, f: F) -> impl Signal<Item = U> + use<T, U, F>
    where
        U: PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.state.signal_ref(f)
    }

    /// Read the current state once, e.g. to gate a UI event.
    pub fn with_state<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        f(&self.state.lock_ref())
    }
}
