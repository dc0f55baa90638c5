use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;

/// Process level configuration shared by every session created from
/// the same runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Default location for managed tables, also exposed to the base
    /// hadoop configuration.
    pub warehouse_dir: String,

    /// Base hadoop-style configuration the execution context hands out.
    #[serde(default)]
    pub hadoop: HashMap<String, String>,

    /// Entries every new session configuration starts from.
    #[serde(default)]
    pub session: HashMap<String, String>,
}

impl Config {
    pub fn new(file: &str) -> Result<Config> {
        let mut cfg = config::Config::builder()
            .set_default("warehouse_dir", "/tmp/sboxsession/warehouse")?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(config::Environment::with_prefix("SBOXSESSION"));
        Ok(cfg.build()?.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            warehouse_dir: "/tmp/sboxsession/warehouse".to_string(),
            hadoop: HashMap::new(),
            session: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() -> Result<()> {
        let cfg = Config::new("")?;
        assert_eq!("/tmp/sboxsession/warehouse", cfg.warehouse_dir);
        assert!(cfg.hadoop.is_empty());
        Ok(())
    }
}
