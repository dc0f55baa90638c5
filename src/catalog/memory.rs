use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use log::debug;

use crate::catalog::catalog::Catalog;
use crate::catalog::table::{Table, TableIdentifier};
use crate::conf::entry::CASE_SENSITIVE;
use crate::conf::entry::DEFAULT_DATABASE;
use crate::conf::SessionConf;
use crate::error::Result;
use crate::value_err;

/// An in-memory catalog scoped to one session.
///
/// Identifiers are normalized to lower case unless the session enables
/// case sensitive resolution.
#[derive(Debug)]
pub struct SessionCatalog {
    conf: Arc<SessionConf>,
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    current_database: String,
    databases: BTreeMap<String, BTreeMap<String, Table>>,
    /// Tables whose metadata has been resolved since their last refresh.
    cached: HashSet<TableIdentifier>,
    refreshes: usize,
}

impl SessionCatalog {
    pub fn new(conf: Arc<SessionConf>) -> Result<Self> {
        let case_sensitive = conf.get_entry(&CASE_SENSITIVE)?;
        let mut default_db = conf.get_entry(&DEFAULT_DATABASE)?;
        if !case_sensitive {
            default_db = default_db.to_lowercase();
        }
        let databases = BTreeMap::from([(default_db.clone(), BTreeMap::new())]);
        let inner =
            Inner { current_database: default_db, databases, cached: HashSet::new(), refreshes: 0 };
        Ok(SessionCatalog { conf, inner: RwLock::new(inner) })
    }

    /// Whether the table's metadata is currently cached.
    pub fn is_cached(&self, ident: &TableIdentifier) -> Result<bool> {
        let inner = self.read();
        let ident = self.qualify(&inner, ident)?;
        Ok(inner.cached.contains(&ident))
    }

    /// Number of refreshes served so far.
    pub fn refresh_count(&self) -> usize {
        self.read().refreshes
    }

    fn normalize(&self, name: &str) -> Result<String> {
        if self.conf.get_entry(&CASE_SENSITIVE)? {
            Ok(name.to_string())
        } else {
            Ok(name.to_lowercase())
        }
    }

    fn qualify(&self, inner: &Inner, ident: &TableIdentifier) -> Result<TableIdentifier> {
        let database = match &ident.database {
            Some(db) => self.normalize(db)?,
            None => inner.current_database.clone(),
        };
        Ok(TableIdentifier::qualified(database, self.normalize(&ident.table)?))
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Catalog for SessionCatalog {
    fn current_database(&self) -> String {
        self.read().current_database.clone()
    }

    fn set_current_database(&self, name: &str) -> Result<()> {
        let name = self.normalize(name)?;
        let mut inner = self.write();
        if !inner.databases.contains_key(&name) {
            return Err(value_err!("Database {} does not exist", name));
        }
        inner.current_database = name;
        Ok(())
    }

    fn create_database(&self, name: &str, if_not_exists: bool) -> Result<()> {
        let name = self.normalize(name)?;
        let mut inner = self.write();
        if inner.databases.contains_key(&name) {
            if if_not_exists {
                return Ok(());
            }
            return Err(value_err!("Database {} already exists", name));
        }
        inner.databases.insert(name, BTreeMap::new());
        Ok(())
    }

    fn database_exists(&self, name: &str) -> bool {
        match self.normalize(name) {
            Ok(name) => self.read().databases.contains_key(&name),
            Err(_) => false,
        }
    }

    fn create_table(&self, mut table: Table, if_not_exists: bool) -> Result<()> {
        table.validate()?;
        table.database = self.normalize(&table.database)?;
        table.name = self.normalize(&table.name)?;
        let mut inner = self.write();
        let tables = inner
            .databases
            .get_mut(&table.database)
            .ok_or_else(|| value_err!("Database {} does not exist", table.database))?;
        if tables.contains_key(&table.name) {
            if if_not_exists {
                return Ok(());
            }
            return Err(value_err!("Table {} already exists", table.identifier()));
        }
        debug!("creating table {}", table.identifier());
        tables.insert(table.name.clone(), table);
        Ok(())
    }

    fn get_table(&self, ident: &TableIdentifier) -> Result<Option<Table>> {
        let mut inner = self.write();
        let ident = self.qualify(&inner, ident)?;
        let table = inner
            .databases
            .get(ident.database.as_deref().unwrap_or_default())
            .and_then(|tables| tables.get(&ident.table))
            .cloned();
        if table.is_some() {
            inner.cached.insert(ident);
        }
        Ok(table)
    }

    fn table_exists(&self, ident: &TableIdentifier) -> bool {
        let inner = self.read();
        match self.qualify(&inner, ident) {
            Ok(ident) => inner
                .databases
                .get(ident.database.as_deref().unwrap_or_default())
                .is_some_and(|tables| tables.contains_key(&ident.table)),
            Err(_) => false,
        }
    }

    fn refresh_table(&self, ident: &TableIdentifier) -> Result<()> {
        let mut inner = self.write();
        let ident = self.qualify(&inner, ident)?;
        debug!("refreshing table {}", ident);
        inner.cached.remove(&ident);
        inner.refreshes += 1;
        Ok(())
    }
}
