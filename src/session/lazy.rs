use std::fmt::{Debug, Formatter};
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread::ThreadId;

use crate::error::Error;
use crate::error::Result;
use crate::internal_err;

type Init<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

enum State<T> {
    Unbuilt,
    Building(ThreadId),
    Built(T),
    Failed(Error),
}

/// A value built by its factory at most once, on first access.
///
/// The first caller runs the factory without holding the lock, callers
/// racing with it block until it completes and observe the same outcome.
/// A failed build is kept: every later call returns the same error and
/// the factory is not run again.
pub struct Lazy<T> {
    init: Init<T>,
    state: Mutex<State<T>>,
    done: Condvar,
}

impl<T: Clone> Lazy<T> {
    pub fn new(init: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Lazy { init: Box::new(init), state: Mutex::new(State::Unbuilt), done: Condvar::new() }
    }

    pub fn get(&self) -> Result<T> {
        let me = std::thread::current().id();
        let mut state = self.lock();
        loop {
            let builder = match &*state {
                State::Built(value) => return Ok(value.clone()),
                State::Failed(err) => return Err(err.clone()),
                State::Building(builder) => *builder,
                State::Unbuilt => break,
            };
            if builder == me {
                return Err(internal_err!("cyclic dependency while building lazy value"));
            }
            state = self.done.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        *state = State::Building(me);
        drop(state);

        let mut guard = BuildGuard { lazy: self, completed: false };
        let result = (self.init)();
        guard.complete(match &result {
            Ok(value) => State::Built(value.clone()),
            Err(err) => State::Failed(err.clone()),
        });
        result
    }

    /// Returns the value only if it has already been built.
    pub fn get_if_built(&self) -> Option<T> {
        match &*self.lock() {
            State::Built(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(&*self.lock(), State::Built(_))
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes the build outcome, or a failure if the factory panicked, so
/// waiting callers never block forever.
struct BuildGuard<'a, T: Clone> {
    lazy: &'a Lazy<T>,
    completed: bool,
}

impl<T: Clone> BuildGuard<'_, T> {
    fn complete(&mut self, outcome: State<T>) {
        *self.lazy.lock() = outcome;
        self.completed = true;
        self.lazy.done.notify_all();
    }
}

impl<T: Clone> Drop for BuildGuard<'_, T> {
    fn drop(&mut self) {
        if !self.completed {
            *self.lazy.lock() = State::Failed(internal_err!("lazy value factory panicked"));
            self.lazy.done.notify_all();
        }
    }
}

impl<T> Debug for Lazy<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Unbuilt => "unbuilt",
            State::Building(_) => "building",
            State::Built(_) => "built",
            State::Failed(_) => "failed",
        };
        f.debug_struct("Lazy").field("state", &state).finish()
    }
}
