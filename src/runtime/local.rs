use std::sync::Mutex;
use std::sync::PoisonError;

use log::debug;

use crate::config::Config;
use crate::error::Result;
use crate::hadoop::HadoopConf;
use crate::runtime::ExecutionContext;

/// Environment variable cluster schedulers export inside worker containers.
pub const CONTAINER_ID_ENV: &str = "CONTAINER_ID";

/// An in-process execution context. Registered jars and files are kept
/// in registration order; there are no remote workers to ship them to.
#[derive(Debug)]
pub struct LocalExecutionContext {
    hadoop_conf: HadoopConf,
    jars: Mutex<Vec<String>>,
    files: Mutex<Vec<String>>,
    managed_container: bool,
}

impl LocalExecutionContext {
    pub fn new(config: &Config) -> Self {
        let mut hadoop_conf = HadoopConf::from(&config.hadoop);
        if hadoop_conf.get("sbox.sql.warehouse.dir").is_none() {
            hadoop_conf.set("sbox.sql.warehouse.dir", config.warehouse_dir.as_str());
        }
        LocalExecutionContext {
            hadoop_conf,
            jars: Mutex::new(vec![]),
            files: Mutex::new(vec![]),
            managed_container: std::env::var_os(CONTAINER_ID_ENV).is_some(),
        }
    }

    /// Overrides the container probe, mostly for embedding and tests.
    pub fn with_managed_container(mut self, managed: bool) -> Self {
        self.managed_container = managed;
        self
    }

    pub fn jars(&self) -> Vec<String> {
        self.jars.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn files(&self) -> Vec<String> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ExecutionContext for LocalExecutionContext {
    fn add_file(&self, path: &str) -> Result<()> {
        debug!("registering file {}", path);
        let mut files = self.files.lock()?;
        if !files.iter().any(|it| it == path) {
            files.push(path.to_string());
        }
        Ok(())
    }

    fn add_jar(&self, path: &str) -> Result<()> {
        debug!("registering jar {}", path);
        let mut jars = self.jars.lock()?;
        if !jars.iter().any(|it| it == path) {
            jars.push(path.to_string());
        }
        Ok(())
    }

    fn hadoop_conf(&self) -> HadoopConf {
        self.hadoop_conf.clone()
    }

    fn is_running_in_managed_container(&self) -> bool {
        self.managed_container
    }
}
