//! Append-only movement log boundary.
//!
//! The log exclusively owns the historical record: movements are never
//! edited or removed, reversing an action means appending a compensating
//! adjustment. Each item's stream is version-stamped (the count of its
//! movements) so writers can append optimistically.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use fiberstock_core::{ExpectedVersion, MovementId, StockError, StockItemId};
use fiberstock_ledger::{MovementDraft, MovementFilter, StockMovement};

/// Movement log operation error (infrastructure-level).
#[derive(Debug, Error)]
pub enum MovementLogError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<MovementLogError> for StockError {
    fn from(value: MovementLogError) -> Self {
        match value {
            MovementLogError::Concurrency(msg) => StockError::conflict(msg),
            MovementLogError::InvalidAppend(msg) => StockError::validation(msg),
            MovementLogError::Storage(msg) => StockError::conflict(msg),
        }
    }
}

/// Append-only log of stock movements.
///
/// Implementations must:
/// - assign a strictly increasing global `sequence` (ledger order, tie-break
///   for equal timestamps)
/// - assign a per-item `item_sequence` starting at `current_version + 1`
/// - enforce optimistic concurrency against the item's current version
/// - never mutate or drop a stored movement
pub trait MovementLog: Send + Sync {
    /// Append a validated draft. The log assigns sequence numbers; shape
    /// validation is the caller's job.
    fn append(
        &self,
        movement_id: MovementId,
        draft: &MovementDraft,
        expected_version: ExpectedVersion,
    ) -> Result<StockMovement, MovementLogError>;

    /// Full stream for one item, in append order.
    fn item_stream(&self, item_id: &StockItemId) -> Result<Vec<StockMovement>, MovementLogError>;

    /// Current version of an item's stream (count of its movements).
    fn item_version(&self, item_id: &StockItemId) -> Result<u64, MovementLogError>;

    /// Filtered view over the whole log, in global append order.
    fn list(&self, filter: &MovementFilter) -> Result<Vec<StockMovement>, MovementLogError>;
}

impl<L> MovementLog for Arc<L>
where
    L: MovementLog + ?Sized,
{
    fn append(
        &self,
        movement_id: MovementId,
        draft: &MovementDraft,
        expected_version: ExpectedVersion,
    ) -> Result<StockMovement, MovementLogError> {
        (**self).append(movement_id, draft, expected_version)
    }

    fn item_stream(&self, item_id: &StockItemId) -> Result<Vec<StockMovement>, MovementLogError> {
        (**self).item_stream(item_id)
    }

    fn item_version(&self, item_id: &StockItemId) -> Result<u64, MovementLogError> {
        (**self).item_version(item_id)
    }

    fn list(&self, filter: &MovementFilter) -> Result<Vec<StockMovement>, MovementLogError> {
        (**self).list(filter)
    }
}

/// In-memory append-only movement log.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryMovementLog {
    movements: RwLock<Vec<StockMovement>>,
}

impl InMemoryMovementLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementLog for InMemoryMovementLog {
    fn append(
        &self,
        movement_id: MovementId,
        draft: &MovementDraft,
        expected_version: ExpectedVersion,
    ) -> Result<StockMovement, MovementLogError> {
        let mut movements = self
            .movements
            .write()
            .map_err(|_| MovementLogError::Storage("lock poisoned".to_string()))?;

        let current = movements
            .iter()
            .filter(|m| m.stock_item_id == draft.stock_item_id)
            .count() as u64;

        if !expected_version.matches(current) {
            return Err(MovementLogError::Concurrency(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        let stored = StockMovement {
            movement_id,
            sequence: movements.len() as u64 + 1,
            item_sequence: current + 1,
            stock_item_id: draft.stock_item_id,
            kind: draft.kind,
            quantity: draft.quantity,
            occurred_at: draft.occurred_at,
            performed_by: draft.performed_by.clone(),
            notes: draft.notes.clone(),
            project_id: draft.project_id,
        };

        movements.push(stored.clone());
        Ok(stored)
    }

    fn item_stream(&self, item_id: &StockItemId) -> Result<Vec<StockMovement>, MovementLogError> {
        let movements = self
            .movements
            .read()
            .map_err(|_| MovementLogError::Storage("lock poisoned".to_string()))?;

        Ok(movements
            .iter()
            .filter(|m| m.stock_item_id == *item_id)
            .cloned()
            .collect())
    }

    fn item_version(&self, item_id: &StockItemId) -> Result<u64, MovementLogError> {
        let movements = self
            .movements
            .read()
            .map_err(|_| MovementLogError::Storage("lock poisoned".to_string()))?;

        Ok(movements
            .iter()
            .filter(|m| m.stock_item_id == *item_id)
            .count() as u64)
    }

    fn list(&self, filter: &MovementFilter) -> Result<Vec<StockMovement>, MovementLogError> {
        let movements = self
            .movements
            .read()
            .map_err(|_| MovementLogError::Storage("lock poisoned".to_string()))?;

        Ok(movements.iter().filter(|m| filter.matches(m)).cloned().collect())
    }
}
