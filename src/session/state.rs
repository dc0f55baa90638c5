use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::debug;

use crate::catalog::Catalog;
use crate::conf::options::CaseInsensitiveMap;
use crate::conf::SessionConf;
use crate::connection;
use crate::error::Result;
use crate::function::FunctionInfo;
use crate::function::FunctionRegistry;
use crate::function::UdfRegistration;
use crate::hadoop;
use crate::hadoop::HadoopConf;
use crate::listener::ListenerManager;
use crate::resource::SessionResourceLoader;
use crate::runtime::SharedRuntimeState;
use crate::services::Analyzer;
use crate::services::Optimizer;
use crate::services::Planner;
use crate::services::SqlParser;
use crate::session::builder::Factories;
use crate::session::lazy::Lazy;
use crate::session::SessionHandle;
use crate::streaming::StreamingQueryManager;

/// The configuration and services of one session.
///
/// Eager services are built with the state. The catalog, analyzer,
/// optimizer and resource loader are built by their factory on first
/// access, at most once, and the same instance is returned afterwards.
/// Built by [`SessionStateBuilder`](crate::session::builder::SessionStateBuilder).
pub struct SessionState {
    pub(super) session: SessionHandle,
    pub(super) conf: Arc<SessionConf>,

    pub(super) function_registry: Arc<FunctionRegistry>,
    pub(super) udf_registration: UdfRegistration,
    pub(super) parser: Arc<dyn SqlParser>,
    pub(super) planner: Arc<dyn Planner>,
    pub(super) streaming_query_manager: Arc<StreamingQueryManager>,
    pub(super) listener_manager: Arc<ListenerManager>,

    pub(super) catalog: Arc<Lazy<Arc<dyn Catalog>>>,
    pub(super) analyzer: Lazy<Arc<dyn Analyzer>>,
    pub(super) optimizer: Lazy<Arc<dyn Optimizer>>,
    pub(super) resource_loader: Arc<Lazy<Arc<SessionResourceLoader>>>,

    /// Not part of the configuration, only used to rewrite outbound
    /// connection urls.
    pub(super) user: RwLock<Option<String>>,

    pub(super) factories: Factories,
}

impl SessionState {
    /// The session this state belongs to.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn shared(&self) -> &Arc<SharedRuntimeState> {
        self.session.shared()
    }

    pub fn conf(&self) -> &Arc<SessionConf> {
        &self.conf
    }

    pub fn function_registry(&self) -> &Arc<FunctionRegistry> {
        &self.function_registry
    }

    pub fn udf_registration(&self) -> &UdfRegistration {
        &self.udf_registration
    }

    pub fn parser(&self) -> &Arc<dyn SqlParser> {
        &self.parser
    }

    pub fn planner(&self) -> &Arc<dyn Planner> {
        &self.planner
    }

    pub fn streaming_query_manager(&self) -> &Arc<StreamingQueryManager> {
        &self.streaming_query_manager
    }

    pub fn listener_manager(&self) -> &Arc<ListenerManager> {
        &self.listener_manager
    }

    pub fn catalog(&self) -> Result<Arc<dyn Catalog>> {
        self.catalog.get()
    }

    pub fn analyzer(&self) -> Result<Arc<dyn Analyzer>> {
        self.analyzer.get()
    }

    pub fn optimizer(&self) -> Result<Arc<dyn Optimizer>> {
        self.optimizer.get()
    }

    pub fn resource_loader(&self) -> Result<Arc<SessionResourceLoader>> {
        self.resource_loader.get()
    }

    pub(crate) fn factories(&self) -> &Factories {
        &self.factories
    }

    /// Names of the lazily built services that have been built so far.
    pub fn built_services(&self) -> Vec<&'static str> {
        [
            ("catalog", self.catalog.is_built()),
            ("analyzer", self.analyzer.is_built()),
            ("optimizer", self.optimizer.is_built()),
            ("resource_loader", self.resource_loader.is_built()),
        ]
        .into_iter()
        .filter_map(|(name, built)| built.then_some(name))
        .collect()
    }

    /// Produces the state of `session` through this state's clone function.
    /// Unbuilt services of this state stay unbuilt.
    pub fn clone_for(&self, session: &SessionHandle) -> Result<SessionState> {
        debug!("cloning state of session {} into {}", self.session.id(), session.id());
        (self.factories.clone_fn)(session, self)
    }

    /// A fresh copy of the base hadoop configuration with the session
    /// configuration applied on top.
    pub fn new_hadoop_conf(&self) -> HadoopConf {
        let base = self.shared().execution_context().hadoop_conf();
        hadoop::project(&base, self.conf.entries())
    }

    /// Like [`SessionState::new_hadoop_conf`], then layers `options` except
    /// for null values and the `path`/`paths` location keys.
    pub fn new_hadoop_conf_with_options(&self, options: &CaseInsensitiveMap) -> HadoopConf {
        let mut conf = self.new_hadoop_conf();
        hadoop::apply_options(&mut conf, options);
        conf
    }

    pub fn refresh_table(&self, name: &str) -> Result<()> {
        let ident = self.parser.parse_table_identifier(name)?;
        self.catalog()?.refresh_table(&ident)
    }

    pub fn set_user(&self, user: impl Into<String>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user.into());
    }

    pub fn user(&self) -> Option<String> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The outbound connection url for the current user.
    pub fn connection_url(&self) -> Result<String> {
        let user = self.user();
        let ctx = self.shared().execution_context();
        connection::connection_url(&self.conf, user.as_deref(), ctx.as_ref())
    }

    pub fn add_jar(&self, path: &str) -> Result<()> {
        self.resource_loader()?.add_jar(path)
    }

    pub fn register_function(&self, info: FunctionInfo, replace: bool) -> Result<()> {
        self.udf_registration.register_function(info, replace)
    }
}

impl Debug for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("session", &self.session.id())
            .field("conf", &self.conf)
            .field("catalog", &self.catalog)
            .field("analyzer", &self.analyzer)
            .field("optimizer", &self.optimizer)
            .field("resource_loader", &self.resource_loader)
            .finish_non_exhaustive()
    }
}
