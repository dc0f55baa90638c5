use std::collections::BTreeMap;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::conf::entry::ConfEntry;
use crate::conf::entry::ConfType;
use crate::config_err;
use crate::error::Result;

pub mod entry;
pub mod options;

/// Session scoped configuration.
///
/// A string keyed map whose values may be null. Keys that belong to a
/// registered [`ConfEntry`] are validated on write. Cloning takes an
/// independent snapshot, later writes to either side are not observed
/// by the other.
#[derive(Debug, Default)]
pub struct SessionConf {
    settings: RwLock<BTreeMap<String, Option<String>>>,
}

impl SessionConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let conf = SessionConf::new();
        for (k, v) in entries {
            conf.set(k, v)?;
        }
        Ok(conf)
    }

    /// Sets a value, validating it if the key is a registered entry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.set_option(key, Some(value.into()))
    }

    /// Sets a possibly null value. A null value keeps the key present.
    pub fn set_option(&self, key: impl Into<String>, value: Option<String>) -> Result<()> {
        let key = key.into();
        if let (Some(entry), Some(raw)) = (entry::lookup(&key), value.as_deref()) {
            entry.validate(raw)?;
        }
        self.write().insert(key, value);
        Ok(())
    }

    pub fn set_entry<T: ConfType>(&self, entry: &ConfEntry<T>, value: &str) -> Result<()> {
        entry.parse(value)?;
        self.write().insert(entry.key().to_string(), Some(value.to_string()));
        Ok(())
    }

    pub fn unset(&self, key: &str) -> Option<Option<String>> {
        self.write().remove(key)
    }

    /// Returns the non-null value of a key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned().flatten()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Whether the key has been set, including to null.
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Returns the typed value of an entry, falling back to its default.
    /// Errors if neither is present.
    pub fn get_entry<T: ConfType>(&self, entry: &ConfEntry<T>) -> Result<T> {
        self.get_optional(entry)?
            .ok_or_else(|| config_err!("missing required configuration key {}", entry.key()))
    }

    pub fn get_optional<T: ConfType>(&self, entry: &ConfEntry<T>) -> Result<Option<T>> {
        match self.get(entry.key()) {
            Some(raw) => entry.parse(&raw).map(Some),
            None => entry.default_value(),
        }
    }

    /// All settings in key order, null values included.
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        self.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Option<String>>> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Option<String>>> {
        self.settings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for SessionConf {
    fn clone(&self) -> Self {
        SessionConf { settings: RwLock::new(self.read().clone()) }
    }
}

#[cfg(test)]
mod tests {
    use super::entry::CASE_SENSITIVE;
    use super::entry::CONNECTION_URL;
    use super::entry::DEFAULT_DATABASE;
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_set_and_get() -> Result<()> {
        let conf = SessionConf::from_entries([("a", "1")])?;
        conf.set_option("c", None)?;
        assert_eq!(Some("1".to_string()), conf.get("a"));
        assert_eq!(None, conf.get("c"));
        assert!(conf.contains("c"));
        assert!(!conf.contains("d"));
        assert_eq!("x", conf.get_or("d", "x"));

        assert_eq!(Some(None), conf.unset("c"));
        assert!(!conf.contains("c"));
        Ok(())
    }

    #[test]
    fn test_typed_entries() -> Result<()> {
        let conf = SessionConf::new();
        assert!(!conf.get_entry(&CASE_SENSITIVE)?);
        assert_eq!("default", conf.get_entry(&DEFAULT_DATABASE)?);
        assert_eq!(None, conf.get_optional(&CONNECTION_URL)?);
        assert!(matches!(conf.get_entry(&CONNECTION_URL), Err(Error::Config(_))));

        conf.set_entry(&CASE_SENSITIVE, "true")?;
        assert!(conf.get_entry(&CASE_SENSITIVE)?);

        // registered keys are validated through the untyped path too
        assert!(conf.set("sbox.sql.case_sensitive", "nope").is_err());
        assert_eq!(Some("true".to_string()), conf.get("sbox.sql.case_sensitive"));
        Ok(())
    }

    #[test]
    fn test_clone_is_independent() -> Result<()> {
        let conf = SessionConf::from_entries([("k", "v1")])?;
        let cloned = conf.clone();
        cloned.set("k", "v2")?;
        conf.set("only_original", "x")?;
        assert_eq!(Some("v1".to_string()), conf.get("k"));
        assert_eq!(Some("v2".to_string()), cloned.get("k"));
        assert!(!cloned.contains("only_original"));
        Ok(())
    }
}
