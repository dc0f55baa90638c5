use std::cell::RefCell;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use url::Url;

/// The code search path shared by every session of a runtime.
///
/// Appending is process-visible: once any session adds a jar, all sessions
/// resolving through this loader see it.
#[derive(Debug, Default)]
pub struct SharedClassLoader {
    urls: RwLock<Vec<Url>>,
}

impl SharedClassLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a url to the search path, returns false if it was already
    /// present.
    pub fn add_url(&self, url: Url) -> bool {
        let mut urls = self.urls.write().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(&url) {
            return false;
        }
        urls.push(url);
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.read().unwrap_or_else(PoisonError::into_inner).contains(url)
    }

    /// The search path in insertion order.
    pub fn urls(&self) -> Vec<Url> {
        self.urls.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

thread_local! {
    static CONTEXT_CLASS_LOADER: RefCell<Option<Arc<SharedClassLoader>>> =
        const { RefCell::new(None) };
}

/// Points the calling thread's context loader at `loader`. The assignment
/// belongs to the thread, not to any session.
pub fn set_context_class_loader(loader: Arc<SharedClassLoader>) {
    CONTEXT_CLASS_LOADER.with(|it| *it.borrow_mut() = Some(loader));
}

pub fn context_class_loader() -> Option<Arc<SharedClassLoader>> {
    CONTEXT_CLASS_LOADER.with(|it| it.borrow().clone())
}
