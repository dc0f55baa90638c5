use std::fmt::Debug;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::Duration;

use crate::error::Error;

/// Callback for query execution outcomes.
pub trait QueryExecutionListener: Debug + Send + Sync {
    fn on_success(&self, action: &str, duration: Duration);

    fn on_failure(&self, action: &str, error: &Error);
}

/// Holds the query execution listeners of a session. Cloning copies the
/// registration list; the listeners themselves are shared.
#[derive(Debug, Default)]
pub struct ListenerManager {
    listeners: RwLock<Vec<Arc<dyn QueryExecutionListener>>>,
}

impl ListenerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn QueryExecutionListener>) {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner).push(listener);
    }

    /// Removes a previously registered listener, returns whether it was found.
    pub fn unregister(&self, listener: &Arc<dyn QueryExecutionListener>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|it| !Arc::ptr_eq(it, listener));
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn post_success(&self, action: &str, duration: Duration) {
        for listener in self.snapshot() {
            listener.on_success(action, duration);
        }
    }

    pub fn post_failure(&self, action: &str, error: &Error) {
        for listener in self.snapshot() {
            listener.on_failure(action, error);
        }
    }

    // listeners are called without holding the lock so they may
    // (un)register others
    fn snapshot(&self) -> Vec<Arc<dyn QueryExecutionListener>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Clone for ListenerManager {
    fn clone(&self) -> Self {
        ListenerManager { listeners: RwLock::new(self.snapshot()) }
    }
}
