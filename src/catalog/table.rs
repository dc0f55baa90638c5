use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::error::Result;

/// A possibly database qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdentifier {
    pub database: Option<String>,
    pub table: String,
}

impl TableIdentifier {
    pub fn new(table: impl Into<String>) -> Self {
        TableIdentifier { database: None, table: table.into() }
    }

    pub fn qualified(database: impl Into<String>, table: impl Into<String>) -> Self {
        TableIdentifier { database: Some(database.into()), table: table.into() }
    }
}

impl Display for TableIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(db) => {
                write!(f, "`{}`.`{}`", db.replace('`', "``"), self.table.replace('`', "``"))
            }
            None => write!(f, "`{}`", self.table.replace('`', "``")),
        }
    }
}

/// Table holds metadata about table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Owning database
    pub database: String,
    /// Data location, managed tables live under the warehouse dir
    pub location: Option<String>,
}

impl Table {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Table {
        Table { name: name.into(), database: database.into(), location: None }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Table {
        self.location = Some(location.into());
        self
    }

    pub fn identifier(&self) -> TableIdentifier {
        TableIdentifier::qualified(self.database.clone(), self.name.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::value("Table name can't be empty"));
        }
        if self.database.is_empty() {
            return Err(Error::value(format!("Table {} have no database", self.name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!("`db`.`t`", TableIdentifier::qualified("db", "t").to_string());
        assert_eq!("`we``ird`", TableIdentifier::new("we`ird").to_string());
    }

    #[test]
    fn test_validate() {
        assert!(Table::new("db", "").validate().is_err());
        assert!(Table::new("", "t").validate().is_err());
        assert!(Table::new("db", "t").with_location("/tmp/t").validate().is_ok());
    }
}
