use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::error::Result;
use crate::runtime::SharedRuntimeState;
use crate::session::builder::SessionStateBuilder;
use crate::session::state::SessionState;

pub mod builder;
pub mod lazy;
pub mod state;

/// Identifies a session and the runtime it runs on. Factories receive the
/// handle of the session they build for.
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    shared: Arc<SharedRuntimeState>,
}

impl SessionHandle {
    pub fn new(shared: Arc<SharedRuntimeState>) -> Self {
        SessionHandle { id: Uuid::new_v4(), shared }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shared(&self) -> &Arc<SharedRuntimeState> {
        &self.shared
    }
}

impl Debug for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// A user facing session: its own state on a runtime shared with every
/// other session of the process.
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    state: SessionState,
}

impl Session {
    /// A session with the default services.
    pub fn new(shared: Arc<SharedRuntimeState>) -> Result<Session> {
        Self::with_builder(shared, Ok)
    }

    /// A session whose state is customized by `f`, e.g. to swap factories.
    pub fn with_builder(
        shared: Arc<SharedRuntimeState>,
        f: impl FnOnce(SessionStateBuilder) -> Result<SessionStateBuilder>,
    ) -> Result<Session> {
        let handle = SessionHandle::new(shared);
        let state = f(SessionStateBuilder::new(handle.clone())?)?.build();
        info!("created session {}", handle.id());
        Ok(Session { handle, state })
    }

    /// A session on the same runtime with a fresh state built from the same
    /// factories. Configuration, functions and listeners are not inherited.
    pub fn new_session(&self) -> Result<Session> {
        let handle = SessionHandle::new(Arc::clone(self.handle.shared()));
        let state = SessionStateBuilder::new(handle.clone())?
            .with_factories(self.state.factories().clone())
            .build();
        info!("created session {} from {}", handle.id(), self.id());
        Ok(Session { handle, state })
    }

    /// A session on the same runtime whose state is cloned from this one.
    pub fn clone_session(&self) -> Result<Session> {
        let handle = SessionHandle::new(Arc::clone(self.handle.shared()));
        let state = self.state.clone_for(&handle)?;
        info!("cloned session {} into {}", self.id(), handle.id());
        Ok(Session { handle, state })
    }

    pub fn id(&self) -> Uuid {
        self.handle.id()
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn shared(&self) -> &Arc<SharedRuntimeState> {
        self.handle.shared()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
