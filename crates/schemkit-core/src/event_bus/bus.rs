//! Event dispatcher implementation.

use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Type alias for event handler functions
type EventHandler<E> = Rc<dyn Fn(&E)>;

/// Synchronous dispatcher of events of type `E`.
///
/// Cloning a dispatcher shares the registered handlers.
pub struct EventDispatcher<E> {
    handlers: Vec<(SubscriptionId, EventHandler<E>)>,
    muted: bool,
}

impl<E> EventDispatcher<E> {
    /// Create a dispatcher with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            muted: false,
        }
    }

    /// Deliver an event to every subscriber, in subscription order.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: &E) -> usize {
        if self.muted {
            return 0;
        }
        for (_, handler) in &self.handlers {
            handler(event);
        }
        self.handlers.len()
    }

    /// Subscribe to events with a synchronous handler
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.push((id, Rc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        let removed = self.handlers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Suppress or resume delivery. Used while loading a document in bulk.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Whether delivery is currently suppressed
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            muted: self.muted,
        }
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscriber_count())
            .field("muted", &self.muted)
            .finish()
    }
}
