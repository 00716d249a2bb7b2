//! Collection Actor
//!
//! Same contract as [`Actor`](super::Actor) but over a `MutableVec<T>`, so the
//! UI can bind with `signal_vec()` and receive only the diffs.

use std::future::Future;
use std::sync::Arc;
use zoon::{MutableVec, SignalVec, Task, TaskHandle};

/// # Examples
///
/// ```rust
/// let (toast_added_relay, mut toast_added_stream) = relay::<ErrorAlert>();
///
/// let toasts = ActorVec::new(vec![], async move |toasts| {
///     while let Some(alert) = toast_added_stream.next().await {
///         toasts.lock_mut().push_cloned(alert);
///     }
/// });
///
/// Column::new().items_signal_vec(toasts.signal_vec().map(toast_element))
/// ```
#[derive(Clone, Debug)]
pub struct ActorVec<T>
where
    T: Clone + Send + Sync + 'static,
{
    vec: MutableVec<T>,
    _task_handle: Arc<TaskHandle>,
}

impl<T> ActorVec<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(initial_items: Vec<T>, processor: F) -> Self
    where
        F: FnOnce(MutableVec<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let vec = MutableVec::new_with_values(initial_items);
        let task_handle = Arc::new(Task::start_droppable(processor(vec.clone())));
        Self {
            vec,
            _task_handle: task_handle,
        }
    }

    pub fn signal_vec(&self) -> impl SignalVec<Item = T> + use<T> {
        self.vec.signal_vec_cloned()
    }
}
