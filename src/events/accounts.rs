use std::sync::{Arc, Mutex, PoisonError};

use crate::presentation::SerialExecutor;

/// Receives the "accounts changed" signal.
///
/// Callbacks always run on the presentation thread.
pub trait AccountListener: Send + Sync {
    fn on_accounts_changed(&self);
}

/// Token returned by [`AccountListenerRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn AccountListener>)>,
}

/// Registry of account listeners, created at startup and passed to the
/// components that need it.
///
/// Subscription changes are serialized by a lock; notifications are delivered
/// on the presentation thread through the executor given at construction, so
/// listeners never run concurrently with display updates.
pub struct AccountListenerRegistry {
    listeners: Mutex<Listeners>,
    executor: Arc<dyn SerialExecutor>,
}

impl AccountListenerRegistry {
    pub fn new(executor: Arc<dyn SerialExecutor>) -> Self {
        Self {
            listeners: Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            }),
            executor,
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn AccountListener>) -> ListenerId {
        let mut listeners = self.lock();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        tracing::debug!("Account listener {:?} subscribed", id);
        id
    }

    /// Remove a listener; returns false if it was not subscribed
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        before != listeners.entries.len()
    }

    /// Signal every currently subscribed listener.
    ///
    /// The listener set is captured now; subscriptions made before the
    /// presentation thread gets to the job are not notified by this call.
    pub fn notify_all(&self) {
        let listeners: Vec<Arc<dyn AccountListener>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::debug!("Notifying {} account listeners", listeners.len());

        self.executor.execute(Box::new(move || {
            for listener in &listeners {
                listener.on_accounts_changed();
            }
        }));
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener, at application teardown
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
