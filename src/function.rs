use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use log::info;

use crate::error::Result;
use crate::resource::FunctionResource;
use crate::resource::SessionResourceLoader;
use crate::session::lazy::Lazy;
use crate::value_err;

const BUILTIN: &str = "builtin";

/// A function known to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    /// Implementing class, `builtin` for the functions shipped with the engine.
    pub class_name: String,
    /// Artifacts loaded before the function is usable.
    pub resources: Vec<FunctionResource>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        FunctionInfo { name: name.into(), class_name: class_name.into(), resources: vec![] }
    }

    pub fn with_resource(mut self, resource: FunctionResource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.class_name == BUILTIN
    }
}

/// Functions registry, names are case insensitive. Cloning copies the
/// registered functions into an independent registry.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: RwLock<BTreeMap<String, FunctionInfo>>,
}

impl FunctionRegistry {
    /// A registry holding the builtin functions.
    pub fn new() -> Self {
        let functions = ["upper", "lower", "count", "sum"]
            .into_iter()
            .map(|name| (name.to_string(), FunctionInfo::new(name, BUILTIN)))
            .collect();
        FunctionRegistry { functions: RwLock::new(functions) }
    }

    pub fn register(&self, info: FunctionInfo, replace: bool) -> Result<()> {
        let key = info.name.to_lowercase();
        let mut functions = self.functions.write()?;
        match functions.get(&key) {
            Some(existing) if existing.is_builtin() => {
                return Err(value_err!("Can't replace builtin function {}", info.name));
            }
            Some(_) if !replace => {
                return Err(value_err!("Function {} already exists", info.name));
            }
            _ => {}
        }
        functions.insert(key, info);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<FunctionInfo> {
        self.read().get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(&name.to_lowercase())
    }

    pub fn drop_function(&self, name: &str) -> Result<()> {
        let key = name.to_lowercase();
        let mut functions = self.functions.write()?;
        match functions.get(&key) {
            None => Err(value_err!("Function {} does not exist", name)),
            Some(info) if info.is_builtin() => {
                Err(value_err!("Can't drop builtin function {}", name))
            }
            Some(_) => {
                functions.remove(&key);
                Ok(())
            }
        }
    }

    /// Names of all registered functions, sorted.
    pub fn list(&self) -> Vec<String> {
        self.read().values().map(|it| it.name.clone()).collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, FunctionInfo>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FunctionRegistry {
    fn clone(&self) -> Self {
        FunctionRegistry { functions: RwLock::new(self.read().clone()) }
    }
}

/// Registers user defined functions, loading their resources through the
/// session resource loader first.
#[derive(Debug)]
pub struct UdfRegistration {
    registry: Arc<FunctionRegistry>,
    resource_loader: Arc<Lazy<Arc<SessionResourceLoader>>>,
}

impl UdfRegistration {
    pub fn new(
        registry: Arc<FunctionRegistry>,
        resource_loader: Arc<Lazy<Arc<SessionResourceLoader>>>,
    ) -> Self {
        Self { registry, resource_loader }
    }

    pub fn register_function(&self, info: FunctionInfo, replace: bool) -> Result<()> {
        if !replace && self.registry.contains(&info.name) {
            return Err(value_err!("Function {} already exists", info.name));
        }
        if !info.resources.is_empty() {
            let loader = self.resource_loader.get()?;
            for resource in &info.resources {
                loader.load_resource(resource)?;
            }
        }
        info!("registering function {} ({})", info.name, info.class_name);
        self.registry.register(info, replace)
    }
}
