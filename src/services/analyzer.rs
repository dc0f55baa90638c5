use std::fmt::Debug;
use std::sync::Arc;

use crate::catalog::{Catalog, Table, TableIdentifier};
use crate::error::Result;

/// Resolves names in a query against the session catalog.
pub trait Analyzer: Debug + Send + Sync {
    fn resolve_table(&self, ident: &TableIdentifier) -> Result<Table>;
}

#[derive(Debug)]
pub struct CatalogAnalyzer {
    catalog: Arc<dyn Catalog>,
}

impl CatalogAnalyzer {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }
}

impl Analyzer for CatalogAnalyzer {
    fn resolve_table(&self, ident: &TableIdentifier) -> Result<Table> {
        self.catalog.must_get_table(ident)
    }
}
