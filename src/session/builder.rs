use std::sync::Arc;

use crate::catalog::Catalog;
use crate::catalog::SessionCatalog;
use crate::conf::SessionConf;
use crate::error::Result;
use crate::function::FunctionRegistry;
use crate::function::UdfRegistration;
use crate::listener::ListenerManager;
use crate::resource::SessionResourceLoader;
use crate::services::Analyzer;
use crate::services::CatalogAnalyzer;
use crate::services::DefaultParser;
use crate::services::DefaultPlanner;
use crate::services::Optimizer;
use crate::services::Planner;
use crate::services::RuleOptimizer;
use crate::services::SqlParser;
use crate::session::lazy::Lazy;
use crate::session::state::SessionState;
use crate::session::SessionHandle;
use crate::streaming::StreamingQueryManager;

/// Builds the catalog of a session.
pub type CatalogFactory =
    Arc<dyn Fn(&SessionHandle, &Arc<SessionConf>) -> Result<Arc<dyn Catalog>> + Send + Sync>;

/// Builds a service that may depend on the session catalog.
pub type ServiceFactory<T> = Arc<dyn Fn(&ServiceContext) -> Result<T> + Send + Sync>;

/// Builds an eager service.
pub type EagerFactory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Produces the state of a new session from the state being cloned.
pub type CloneFn = Arc<dyn Fn(&SessionHandle, &SessionState) -> Result<SessionState> + Send + Sync>;

/// What lazily built services are constructed from.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub session: SessionHandle,
    pub conf: Arc<SessionConf>,
    catalog: Arc<Lazy<Arc<dyn Catalog>>>,
}

impl ServiceContext {
    /// The session catalog, built on first use.
    pub fn catalog(&self) -> Result<Arc<dyn Catalog>> {
        self.catalog.get()
    }
}

/// The construction functions a session state is assembled from. A state
/// keeps its factories so clones can be bootstrapped from them again.
#[derive(Clone)]
pub struct Factories {
    pub catalog: CatalogFactory,
    pub analyzer: ServiceFactory<Arc<dyn Analyzer>>,
    pub optimizer: ServiceFactory<Arc<dyn Optimizer>>,
    pub resource_loader: ServiceFactory<Arc<SessionResourceLoader>>,
    pub parser: EagerFactory<Arc<dyn SqlParser>>,
    pub planner: EagerFactory<Arc<dyn Planner>>,
    pub clone_fn: CloneFn,
}

impl Default for Factories {
    fn default() -> Self {
        Factories {
            catalog: Arc::new(default_catalog),
            analyzer: Arc::new(default_analyzer),
            optimizer: Arc::new(default_optimizer),
            resource_loader: Arc::new(default_resource_loader),
            parser: Arc::new(default_parser),
            planner: Arc::new(default_planner),
            clone_fn: Arc::new(default_clone),
        }
    }
}

fn default_catalog(_session: &SessionHandle, conf: &Arc<SessionConf>) -> Result<Arc<dyn Catalog>> {
    Ok(Arc::new(SessionCatalog::new(Arc::clone(conf))?))
}

fn default_analyzer(ctx: &ServiceContext) -> Result<Arc<dyn Analyzer>> {
    Ok(Arc::new(CatalogAnalyzer::new(ctx.catalog()?)))
}

fn default_optimizer(_ctx: &ServiceContext) -> Result<Arc<dyn Optimizer>> {
    Ok(Arc::new(RuleOptimizer::default()))
}

fn default_resource_loader(ctx: &ServiceContext) -> Result<Arc<SessionResourceLoader>> {
    Ok(Arc::new(SessionResourceLoader::new(Arc::clone(ctx.session.shared()))))
}

fn default_parser() -> Arc<dyn SqlParser> {
    Arc::new(DefaultParser::new())
}

fn default_planner() -> Arc<dyn Planner> {
    Arc::new(DefaultPlanner::new())
}

/// Copies configuration, functions and listeners, and installs fresh
/// unbuilt lazy services from the same factories. The clone gets its own
/// catalog.
fn default_clone(session: &SessionHandle, state: &SessionState) -> Result<SessionState> {
    Ok(SessionStateBuilder::from_parent(session.clone(), state).build())
}

/// Assembles a [`SessionState`]. Session variants are different sets of
/// factories, swapped in with the `with_*` methods.
pub struct SessionStateBuilder {
    session: SessionHandle,
    conf: SessionConf,
    functions: FunctionRegistry,
    listeners: ListenerManager,
    user: Option<String>,
    factories: Factories,
}

impl SessionStateBuilder {
    /// A builder with the default factories and a configuration seeded
    /// from the runtime's session defaults.
    pub fn new(session: SessionHandle) -> Result<Self> {
        let conf = SessionConf::from_entries(session.shared().config().session.clone())?;
        Ok(SessionStateBuilder {
            session,
            conf,
            functions: FunctionRegistry::new(),
            listeners: ListenerManager::new(),
            user: ambient_user(),
            factories: Factories::default(),
        })
    }

    /// A builder for a state cloned from `parent`: the configuration,
    /// registered functions, listeners and user are copied and the parent's
    /// factories are reused. Nothing of the parent is built here.
    pub fn from_parent(session: SessionHandle, parent: &SessionState) -> Self {
        SessionStateBuilder {
            session,
            conf: parent.conf().as_ref().clone(),
            functions: parent.function_registry().as_ref().clone(),
            listeners: parent.listener_manager().as_ref().clone(),
            user: parent.user(),
            factories: parent.factories().clone(),
        }
    }

    pub fn with_config(self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.conf.set(key, value)?;
        Ok(self)
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_factories(mut self, factories: Factories) -> Self {
        self.factories = factories;
        self
    }

    pub fn with_catalog_factory(
        mut self,
        f: impl Fn(&SessionHandle, &Arc<SessionConf>) -> Result<Arc<dyn Catalog>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.factories.catalog = Arc::new(f);
        self
    }

    pub fn with_analyzer_factory(
        mut self,
        f: impl Fn(&ServiceContext) -> Result<Arc<dyn Analyzer>> + Send + Sync + 'static,
    ) -> Self {
        self.factories.analyzer = Arc::new(f);
        self
    }

    pub fn with_optimizer_factory(
        mut self,
        f: impl Fn(&ServiceContext) -> Result<Arc<dyn Optimizer>> + Send + Sync + 'static,
    ) -> Self {
        self.factories.optimizer = Arc::new(f);
        self
    }

    pub fn with_resource_loader_factory(
        mut self,
        f: impl Fn(&ServiceContext) -> Result<Arc<SessionResourceLoader>> + Send + Sync + 'static,
    ) -> Self {
        self.factories.resource_loader = Arc::new(f);
        self
    }

    pub fn with_parser_factory(
        mut self,
        f: impl Fn() -> Arc<dyn SqlParser> + Send + Sync + 'static,
    ) -> Self {
        self.factories.parser = Arc::new(f);
        self
    }

    pub fn with_planner_factory(
        mut self,
        f: impl Fn() -> Arc<dyn Planner> + Send + Sync + 'static,
    ) -> Self {
        self.factories.planner = Arc::new(f);
        self
    }

    /// Overrides how states built by this builder are cloned.
    pub fn with_clone_fn(
        mut self,
        f: impl Fn(&SessionHandle, &SessionState) -> Result<SessionState> + Send + Sync + 'static,
    ) -> Self {
        self.factories.clone_fn = Arc::new(f);
        self
    }

    /// Builds the eager services and binds the lazy ones to this session
    /// without building them.
    pub fn build(self) -> SessionState {
        let session = self.session;
        let conf = Arc::new(self.conf);
        let factories = self.factories;

        let catalog = {
            let (f, session, conf) = (factories.catalog.clone(), session.clone(), conf.clone());
            Arc::new(Lazy::new(move || f(&session, &conf)))
        };
        let ctx = ServiceContext {
            session: session.clone(),
            conf: conf.clone(),
            catalog: catalog.clone(),
        };
        let analyzer = bind(&factories.analyzer, &ctx);
        let optimizer = bind(&factories.optimizer, &ctx);
        let resource_loader = Arc::new(bind(&factories.resource_loader, &ctx));

        let function_registry = Arc::new(self.functions);
        let udf_registration =
            UdfRegistration::new(Arc::clone(&function_registry), Arc::clone(&resource_loader));

        SessionState {
            session,
            conf,
            function_registry,
            udf_registration,
            parser: (factories.parser)(),
            planner: (factories.planner)(),
            streaming_query_manager: Arc::new(StreamingQueryManager::new()),
            listener_manager: Arc::new(self.listeners),
            catalog,
            analyzer,
            optimizer,
            resource_loader,
            user: self.user.into(),
            factories,
        }
    }
}

fn bind<T: Clone + 'static>(factory: &ServiceFactory<T>, ctx: &ServiceContext) -> Lazy<T> {
    let (f, ctx) = (Arc::clone(factory), ctx.clone());
    Lazy::new(move || f(&ctx))
}

/// The user the process runs as.
pub fn ambient_user() -> Option<String> {
    std::env::var("USER").or_else(|_| std::env::var("USERNAME")).ok()
}
