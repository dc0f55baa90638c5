use std::fmt::Debug;

use crate::catalog::table::{Table, TableIdentifier};
use crate::error::{Error, Result};

/// The catalog stores schema information. It handles database and table
/// creation, table lookup and invalidation of cached table metadata.
pub trait Catalog: Debug + Send + Sync {
    /// Database unqualified identifiers resolve against
    fn current_database(&self) -> String;

    /// Switches the current database, errors if it does not exist
    fn set_current_database(&self, name: &str) -> Result<()>;

    /// Creates a new database
    fn create_database(&self, name: &str, if_not_exists: bool) -> Result<()>;

    fn database_exists(&self, name: &str) -> bool;

    /// Creates a new table
    fn create_table(&self, table: Table, if_not_exists: bool) -> Result<()>;

    /// Gets a table, if it exists. A successful lookup caches the
    /// table metadata until it is refreshed.
    fn get_table(&self, ident: &TableIdentifier) -> Result<Option<Table>>;

    /// Gets a table, and errors if it does not exist
    fn must_get_table(&self, ident: &TableIdentifier) -> Result<Table> {
        self.get_table(ident)?
            .ok_or_else(|| Error::value(format!("Table {} does not exist", ident)))
    }

    fn table_exists(&self, ident: &TableIdentifier) -> bool;

    /// Drops cached metadata of the table so the next lookup reloads it
    fn refresh_table(&self, ident: &TableIdentifier) -> Result<()>;
}
