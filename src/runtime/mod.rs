use std::fmt::Debug;
use std::sync::Arc;
use std::sync::OnceLock;

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::hadoop::HadoopConf;
use crate::runtime::classloader::SharedClassLoader;
use crate::runtime::local::LocalExecutionContext;

pub mod classloader;
pub mod local;

/// The distributed execution context sessions submit work through.
pub trait ExecutionContext: Debug + Send + Sync {
    /// Makes a file available to every worker.
    fn add_file(&self, path: &str) -> Result<()>;

    /// Makes a jar available to every worker.
    fn add_jar(&self, path: &str) -> Result<()>;

    /// Returns a copy of the base hadoop configuration.
    fn hadoop_conf(&self) -> HadoopConf;

    /// Whether this process runs inside a cluster managed container.
    fn is_running_in_managed_container(&self) -> bool;
}

/// State shared by every session of a process: the class loader jars are
/// appended to and the execution context.
#[derive(Debug)]
pub struct SharedRuntimeState {
    config: Config,
    class_loader: Arc<SharedClassLoader>,
    execution_context: Arc<dyn ExecutionContext>,
}

static GLOBAL: OnceLock<Arc<SharedRuntimeState>> = OnceLock::new();

impl SharedRuntimeState {
    pub fn new(config: Config, execution_context: Arc<dyn ExecutionContext>) -> Self {
        SharedRuntimeState {
            config,
            class_loader: Arc::new(SharedClassLoader::new()),
            execution_context,
        }
    }

    /// A runtime backed by an in-process [`LocalExecutionContext`].
    pub fn local(config: Config) -> Self {
        let ctx = Arc::new(LocalExecutionContext::new(&config));
        Self::new(config, ctx)
    }

    /// The process wide runtime. Initialised with the default config on
    /// first use unless [`SharedRuntimeState::init_global`] ran before, and
    /// never torn down.
    pub fn global() -> Arc<SharedRuntimeState> {
        Arc::clone(GLOBAL.get_or_init(|| {
            info!("initializing process runtime with default config");
            Arc::new(SharedRuntimeState::local(Config::default()))
        }))
    }

    /// Installs the process wide runtime, returns the runtime already
    /// installed if there is one.
    pub fn init_global(config: Config) -> Arc<SharedRuntimeState> {
        Arc::clone(GLOBAL.get_or_init(|| {
            info!("initializing process runtime");
            Arc::new(SharedRuntimeState::local(config))
        }))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn class_loader(&self) -> &Arc<SharedClassLoader> {
        &self.class_loader
    }

    pub fn execution_context(&self) -> &Arc<dyn ExecutionContext> {
        &self.execution_context
    }
}
