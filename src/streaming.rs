use std::collections::BTreeMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::info;
use uuid::Uuid;

use crate::error::Result;
use crate::value_err;

/// Tracks the streaming queries active in a session. Every session starts
/// with an empty manager, cloning a session does not carry queries over.
#[derive(Debug, Default)]
pub struct StreamingQueryManager {
    active: RwLock<BTreeMap<Uuid, String>>,
}

impl StreamingQueryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a query as running, names must be unique among the
    /// active queries.
    pub fn start(&self, name: impl Into<String>) -> Result<Uuid> {
        let name = name.into();
        let mut active = self.active.write()?;
        if active.values().any(|it| *it == name) {
            return Err(value_err!("Streaming query {} is already active", name));
        }
        let id = Uuid::new_v4();
        info!("starting streaming query {} ({})", name, id);
        active.insert(id, name);
        Ok(id)
    }

    pub fn stop(&self, id: &Uuid) -> Result<()> {
        match self.active.write()?.remove(id) {
            Some(name) => {
                info!("stopped streaming query {} ({})", name, id);
                Ok(())
            }
            None => Err(value_err!("Streaming query {} is not active", id)),
        }
    }

    pub fn active(&self) -> Vec<(Uuid, String)> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        active.iter().map(|(id, name)| (*id, name.clone())).collect()
    }
}
