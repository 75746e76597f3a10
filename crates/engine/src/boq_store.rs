//! Version-stamped store for BOQ allocation records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use fiberstock_boq::BoqLine;
use fiberstock_core::{BoqItemId, ExpectedVersion, ProjectId, StockError, StockItemId};

#[derive(Debug, Error)]
pub enum BoqStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("unknown BOQ line: {0}")]
    UnknownLine(BoqItemId),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<BoqStoreError> for StockError {
    fn from(value: BoqStoreError) -> Self {
        match value {
            BoqStoreError::Concurrency(msg) => StockError::conflict(msg),
            BoqStoreError::UnknownLine(id) => StockError::not_found(format!("BOQ line {id}")),
            BoqStoreError::Storage(msg) => StockError::conflict(msg),
        }
    }
}

/// Store of BOQ allocation records.
///
/// Lines are seeded from the project's Bill of Quantities and then mutated
/// only through committed decision results. Commits are checked against the
/// version the writer read.
pub trait BoqStore: Send + Sync {
    fn get(&self, boq_item_id: &BoqItemId) -> Option<BoqLine>;

    /// Find the line for a (project, stock item) pair, if any.
    fn find_line(&self, project_id: &ProjectId, stock_item_id: &StockItemId) -> Option<BoqLine>;

    /// Seed or replace a line unconditionally (catalog setup path).
    fn insert(&self, line: BoqLine) -> Result<(), BoqStoreError>;

    /// Commit an updated line. `expected_version` is the version the writer
    /// read before deciding; a mismatch means a concurrent commit won.
    fn commit(&self, line: BoqLine, expected_version: ExpectedVersion) -> Result<(), BoqStoreError>;

    fn list(&self) -> Vec<BoqLine>;
}

impl<B> BoqStore for Arc<B>
where
    B: BoqStore + ?Sized,
{
    fn get(&self, boq_item_id: &BoqItemId) -> Option<BoqLine> {
        (**self).get(boq_item_id)
    }

    fn find_line(&self, project_id: &ProjectId, stock_item_id: &StockItemId) -> Option<BoqLine> {
        (**self).find_line(project_id, stock_item_id)
    }

    fn insert(&self, line: BoqLine) -> Result<(), BoqStoreError> {
        (**self).insert(line)
    }

    fn commit(&self, line: BoqLine, expected_version: ExpectedVersion) -> Result<(), BoqStoreError> {
        (**self).commit(line, expected_version)
    }

    fn list(&self) -> Vec<BoqLine> {
        (**self).list()
    }
}

/// In-memory BOQ line store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBoqStore {
    lines: RwLock<HashMap<BoqItemId, BoqLine>>,
}

impl InMemoryBoqStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BoqStore for InMemoryBoqStore {
    fn get(&self, boq_item_id: &BoqItemId) -> Option<BoqLine> {
        self.lines.read().ok()?.get(boq_item_id).cloned()
    }

    fn find_line(&self, project_id: &ProjectId, stock_item_id: &StockItemId) -> Option<BoqLine> {
        self.lines
            .read()
            .ok()?
            .values()
            .find(|l| l.project_id() == *project_id && l.stock_item_id() == *stock_item_id)
            .cloned()
    }

    fn insert(&self, line: BoqLine) -> Result<(), BoqStoreError> {
        let mut lines = self
            .lines
            .write()
            .map_err(|_| BoqStoreError::Storage("lock poisoned".to_string()))?;
        lines.insert(line.boq_item_id(), line);
        Ok(())
    }

    fn commit(&self, line: BoqLine, expected_version: ExpectedVersion) -> Result<(), BoqStoreError> {
        let mut lines = self
            .lines
            .write()
            .map_err(|_| BoqStoreError::Storage("lock poisoned".to_string()))?;

        let stored = lines
            .get(&line.boq_item_id())
            .ok_or(BoqStoreError::UnknownLine(line.boq_item_id()))?;

        if !expected_version.matches(stored.version()) {
            return Err(BoqStoreError::Concurrency(format!(
                "expected {expected_version:?}, found {}",
                stored.version()
            )));
        }

        lines.insert(line.boq_item_id(), line);
        Ok(())
    }

    fn list(&self) -> Vec<BoqLine> {
        match self.lines.read() {
            Ok(lines) => lines.values().cloned().collect(),
            Err(_) => vec![],
        }
    }
}
