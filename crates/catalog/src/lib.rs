//! Catalog of master records (stock items, projects, suppliers).
//!
//! The engine treats the catalog as a read-only collaborator: records are
//! created and maintained by an external source, the engine only resolves
//! references against it.

pub mod records;
pub mod store;

pub use records::{Category, Project, ProjectStatus, StockItemRecord, Supplier};
pub use store::{Catalog, InMemoryCatalog};
