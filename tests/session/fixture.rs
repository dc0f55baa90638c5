use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sboxsession::catalog::{Catalog, SessionCatalog};
use sboxsession::config::Config;
use sboxsession::error::Result;
use sboxsession::hadoop::HadoopConf;
use sboxsession::runtime::{ExecutionContext, SharedRuntimeState};
use sboxsession::{Session, SessionStateBuilder};

/// An execution context recording every registration, duplicates included.
#[derive(Debug)]
pub struct RecordingContext {
    managed: bool,
    pub jars: Mutex<Vec<String>>,
    pub files: Mutex<Vec<String>>,
}

impl ExecutionContext for RecordingContext {
    fn add_file(&self, path: &str) -> Result<()> {
        self.files.lock()?.push(path.to_string());
        Ok(())
    }

    fn add_jar(&self, path: &str) -> Result<()> {
        self.jars.lock()?.push(path.to_string());
        Ok(())
    }

    fn hadoop_conf(&self) -> HadoopConf {
        HadoopConf::from_iter([("fs.defaultFS", "hdfs://nn:8020"), ("a", "1")])
    }

    fn is_running_in_managed_container(&self) -> bool {
        self.managed
    }
}

pub struct Fixture {
    pub ctx: Arc<RecordingContext>,
    pub shared: Arc<SharedRuntimeState>,
    /// Number of catalogs built by sessions from [`Fixture::counted_session`].
    pub catalogs: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new(managed: bool) -> Self {
        let ctx = Arc::new(RecordingContext {
            managed,
            jars: Mutex::new(vec![]),
            files: Mutex::new(vec![]),
        });
        let shared = Arc::new(SharedRuntimeState::new(Config::default(), ctx.clone()));
        Fixture { ctx, shared, catalogs: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn session(&self) -> Result<Session> {
        Session::new(Arc::clone(&self.shared))
    }

    /// A session whose catalog factory counts its invocations.
    pub fn counted_session(&self) -> Result<Session> {
        Session::with_builder(Arc::clone(&self.shared), |b| Ok(self.count_catalogs(b)))
    }

    pub fn count_catalogs(&self, builder: SessionStateBuilder) -> SessionStateBuilder {
        let counter = Arc::clone(&self.catalogs);
        builder.with_catalog_factory(move |_, conf| {
            counter.fetch_add(1, Ordering::SeqCst);
            let catalog: Arc<dyn Catalog> = Arc::new(SessionCatalog::new(Arc::clone(conf))?);
            Ok(catalog)
        })
    }

    pub fn catalogs_built(&self) -> usize {
        self.catalogs.load(Ordering::SeqCst)
    }

    pub fn jars(&self) -> Vec<String> {
        self.ctx.jars.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<String> {
        self.ctx.files.lock().unwrap().clone()
    }
}
