use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::info;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::error::Result;
use crate::runtime::classloader::set_context_class_loader;
use crate::runtime::SharedRuntimeState;
use crate::value_err;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Jar,
    File,
    Archive,
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Jar => write!(f, "jar"),
            ResourceType::File => write!(f, "file"),
            ResourceType::Archive => write!(f, "archive"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jar" => Ok(ResourceType::Jar),
            "file" => Ok(ResourceType::File),
            "archive" => Ok(ResourceType::Archive),
            _ => Err(value_err!("Resource Type '{}' is not supported", s)),
        }
    }
}

/// An artifact a function needs at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResource {
    pub resource_type: ResourceType,
    pub uri: String,
}

impl FunctionResource {
    pub fn new(resource_type: ResourceType, uri: impl Into<String>) -> Self {
        FunctionResource { resource_type, uri: uri.into() }
    }

    pub fn jar(uri: impl Into<String>) -> Self {
        Self::new(ResourceType::Jar, uri)
    }

    pub fn file(uri: impl Into<String>) -> Self {
        Self::new(ResourceType::File, uri)
    }

    pub fn archive(uri: impl Into<String>) -> Self {
        Self::new(ResourceType::Archive, uri)
    }
}

/// Resolves a resource location into a loadable url. A location without a
/// scheme is a local path and becomes a `file://` url, anything else is
/// used as given.
pub fn resolve_url(location: &str) -> Result<Url> {
    // a drive letter would otherwise parse as a scheme
    if Path::new(location).is_absolute() {
        return file_url(location);
    }
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => file_url(location),
        Err(err) => Err(value_err!("invalid resource location '{}': {}", location, err)),
    }
}

fn file_url(path: &str) -> Result<Url> {
    let path = std::path::absolute(path)?;
    Url::from_file_path(&path)
        .map_err(|_| value_err!("can't convert {} to a file url", path.display()))
}

/// Loads function resources into the runtime shared by all sessions.
#[derive(Debug)]
pub struct SessionResourceLoader {
    shared: Arc<SharedRuntimeState>,
}

impl SessionResourceLoader {
    pub fn new(shared: Arc<SharedRuntimeState>) -> Self {
        Self { shared }
    }

    pub fn load_resource(&self, resource: &FunctionResource) -> Result<()> {
        match resource.resource_type {
            ResourceType::Jar => self.add_jar(&resource.uri),
            ResourceType::File => self.shared.execution_context().add_file(&resource.uri),
            ResourceType::Archive => Err(Error::unsupported(format!(
                "Archive resource '{}' can't be loaded into a running session, \
                 ship it with the application at deploy time instead",
                resource.uri
            ))),
        }
    }

    /// Ships the jar to the workers and appends it to the shared class
    /// loader, which also becomes the calling thread's context loader.
    pub fn add_jar(&self, path: &str) -> Result<()> {
        let url = resolve_url(path)?;
        self.shared.execution_context().add_jar(path)?;
        let class_loader = self.shared.class_loader();
        if class_loader.add_url(url.clone()) {
            info!("added {} to the shared class loader", url);
        }
        set_context_class_loader(Arc::clone(class_loader));
        Ok(())
    }
}
