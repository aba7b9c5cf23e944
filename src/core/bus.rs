//! In-process publish/subscribe channel between the UI and its collaborators.
//!
//! Delivery is synchronous: `emit` runs every matching handler in
//! subscription order on the calling thread before returning. There is no
//! queue and no cross-thread delivery; a component bridging an external
//! process reads its messages and calls `emit` locally between loop ticks.
//!
//! The bus is an explicitly constructed instance handed to each component
//! (constructor injection), not a process-wide global. Calling `emit` or
//! `subscribe` from inside a running handler is not supported and will panic
//! on the interior borrow.

use std::cell::RefCell;

use crate::core::events::{EventKind, UiEvent};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Handler = Box<dyn FnMut(&UiEvent)>;

struct Subscription {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Single-threaded cooperative notification mechanism.
#[derive(Default)]
pub struct EventBus {
    inner: RefCell<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`. Handlers fire in
    /// subscription order.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: impl FnMut(&UiEvent) + 'static,
    ) -> SubscriberId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscriptions.push(Subscription {
            id,
            kind,
            handler: Box::new(handler),
        });
        SubscriberId(id)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|s| s.id != id.0);
        inner.subscriptions.len() != before
    }

    /// Deliver `event` to every handler registered for its kind, in order.
    pub fn emit(&self, event: &UiEvent) {
        let kind = event.kind();
        tracing::debug!(?kind, "emit");
        let mut inner = self.inner.borrow_mut();
        for sub in inner
            .subscriptions
            .iter_mut()
            .filter(|s| s.kind == kind)
        {
            (sub.handler)(event);
        }
    }

    /// Number of live subscriptions (all kinds).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }
}
