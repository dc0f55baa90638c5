pub mod catalog;
pub mod memory;
pub mod table;

pub use catalog::Catalog;
pub use memory::SessionCatalog;
pub use table::{Table, TableIdentifier};
