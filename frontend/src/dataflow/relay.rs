//! Event streaming Relay built on unbounded channels

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Typed event channel into an Actor.
///
/// # Examples
///
/// ```rust
/// let (filter_changed_relay, mut filter_changed_stream) = relay::<(FilterField, String)>();
///
/// // From a text input
/// filter_changed_relay.send((FilterField::Company, "Acme".to_string()));
///
/// // Inside the owning Actor
/// while let Some((field, value)) = filter_changed_stream.next().await {
///     state.set_neq(state.get_cloned().with_filter(field, value));
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T = ()>
where
    T: Clone + Send + Sync + 'static,
{
    sender: UnboundedSender<T>,
}

impl<T> Relay<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (Relay { sender }, receiver)
    }

    /// Send an event. Silently dropped when the receiver is gone.
    pub fn send(&self, value: T) {
        let _ = self.sender.unbounded_send(value);
    }
}

pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Relay::new()
}
