use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use fiberstock_core::{ProjectId, StockItemId, SupplierId};

use crate::records::{Project, StockItemRecord, Supplier};

/// Read-only master-record lookup used by the engine to resolve references.
///
/// Implementations must be safe to share across threads. The engine never
/// writes through this trait; record maintenance happens out of band.
pub trait Catalog: Send + Sync {
    fn stock_item(&self, item_id: &StockItemId) -> Option<StockItemRecord>;
    fn project(&self, project_id: &ProjectId) -> Option<Project>;
    fn supplier(&self, supplier_id: &SupplierId) -> Option<Supplier>;

    fn list_stock_items(&self) -> Vec<StockItemRecord>;
    fn list_suppliers(&self) -> Vec<Supplier>;
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    fn stock_item(&self, item_id: &StockItemId) -> Option<StockItemRecord> {
        (**self).stock_item(item_id)
    }

    fn project(&self, project_id: &ProjectId) -> Option<Project> {
        (**self).project(project_id)
    }

    fn supplier(&self, supplier_id: &SupplierId) -> Option<Supplier> {
        (**self).supplier(supplier_id)
    }

    fn list_stock_items(&self) -> Vec<StockItemRecord> {
        (**self).list_stock_items()
    }

    fn list_suppliers(&self) -> Vec<Supplier> {
        (**self).list_suppliers()
    }
}

/// In-memory catalog for tests/dev.
///
/// Seeded up front (or via `upsert_*`), then read concurrently.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<HashMap<StockItemId, StockItemRecord>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_stock_item(&self, record: StockItemRecord) {
        if let Ok(mut items) = self.items.write() {
            items.insert(record.item_id, record);
        }
    }

    pub fn upsert_project(&self, project: Project) {
        if let Ok(mut projects) = self.projects.write() {
            projects.insert(project.project_id, project);
        }
    }

    pub fn upsert_supplier(&self, supplier: Supplier) {
        if let Ok(mut suppliers) = self.suppliers.write() {
            suppliers.insert(supplier.supplier_id, supplier);
        }
    }
}

impl Catalog for InMemoryCatalog {
    fn stock_item(&self, item_id: &StockItemId) -> Option<StockItemRecord> {
        self.items.read().ok()?.get(item_id).cloned()
    }

    fn project(&self, project_id: &ProjectId) -> Option<Project> {
        self.projects.read().ok()?.get(project_id).cloned()
    }

    fn supplier(&self, supplier_id: &SupplierId) -> Option<Supplier> {
        self.suppliers.read().ok()?.get(supplier_id).cloned()
    }

    fn list_stock_items(&self) -> Vec<StockItemRecord> {
        match self.items.read() {
            Ok(items) => items.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn list_suppliers(&self) -> Vec<Supplier> {
        match self.suppliers.read() {
            Ok(suppliers) => suppliers.values().cloned().collect(),
            Err(_) => vec![],
        }
    }
}
