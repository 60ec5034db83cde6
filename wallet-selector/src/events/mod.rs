//! Typed publish/subscribe channel for wallet lifecycle events

use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// Wallet lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum WalletEvent {
    /// A wallet finished sign-in; payload is the accounts made visible
    Connected { accounts: Vec<Account> },
    /// The active wallet signed out or lost its session
    Disconnected,
    /// The provider switched to a different network
    NetworkChanged { network_id: String },
}

type Handler = Arc<dyn Fn(&WalletEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct EmitterInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Shared event channel delivering events to subscribers in registration
/// order. Cloning shares the subscriber list.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Arc<Mutex<EmitterInner>>,
}

impl EventEmitter {
    /// Create an emitter with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. The returned subscription removes the handler
    /// when dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&WalletEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver an event to every current subscriber, in registration order.
    pub fn emit(&self, event: WalletEvent) {
        // Snapshot handlers so a subscriber may emit or unsubscribe without
        // re-entering the lock.
        let handlers: Vec<Handler> = self
            .inner
            .lock()
            .unwrap()
            .subscribers
            .iter()
            .map(|subscriber| subscriber.handler.clone())
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}

/// Handle for one registered event handler
pub struct Subscription {
    inner: Weak<Mutex<EmitterInner>>,
    id: u64,
}

impl Subscription {
    /// Remove the handler from the emitter
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.subscribers.retain(|subscriber| subscriber.id != self.id);
        }
    }
}
