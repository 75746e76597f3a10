//! The single write path of the stock tracker.
//!
//! `StockEngine` composes the catalog, the movement log and the BOQ store,
//! and makes every state change an atomic read-modify-append unit. Writers
//! serialize on one commit gate (the single-writer-queue model); readers and
//! the analytics snapshot share the gate and run in parallel with each other.

use std::sync::RwLock;

use chrono::Utc;

use fiberstock_analytics::{AnalyticsReport, StockSnapshot, TimeWindow, build_report};
use fiberstock_boq::BoqLine;
use fiberstock_catalog::Catalog;
use fiberstock_core::{
    BoqItemId, ExpectedVersion, MovementId, StockError, StockItemId, StockResult,
};
use fiberstock_ledger::{
    MovementDraft, MovementFilter, MovementKind, StockItem, StockMovement, derive_quantity,
    ensure_sufficient,
};

use crate::boq_store::BoqStore;
use crate::movement_log::MovementLog;

/// Stock ledger and allocation consistency engine.
///
/// All mutation goes through this type; the stores behind it hold no
/// independently mutable state beyond what is recomputable from the movement
/// log and the BOQ allocation records.
#[derive(Debug)]
pub struct StockEngine<L, B, C> {
    log: L,
    boq: B,
    catalog: C,
    /// Commit gate: held exclusively for the span of each write, shared by
    /// readers and the snapshot. Guarantees no reader ever observes the
    /// movement side of an allocation without its BOQ side.
    gate: RwLock<()>,
}

impl<L, B, C> StockEngine<L, B, C> {
    pub fn new(log: L, boq: B, catalog: C) -> Self {
        Self {
            log,
            boq,
            catalog,
            gate: RwLock::new(()),
        }
    }
}

impl<L, B, C> StockEngine<L, B, C>
where
    L: MovementLog,
    B: BoqStore,
    C: Catalog,
{
    fn write_gate(&self) -> StockResult<std::sync::RwLockWriteGuard<'_, ()>> {
        self.gate
            .write()
            .map_err(|_| StockError::conflict("commit gate poisoned"))
    }

    fn read_gate(&self) -> StockResult<std::sync::RwLockReadGuard<'_, ()>> {
        self.gate
            .read()
            .map_err(|_| StockError::conflict("commit gate poisoned"))
    }

    /// Record a stock movement and return the item's updated derived state.
    ///
    /// Site allocations are rejected here: they exist only as the stock side
    /// of a BOQ allocation and are posted through [`StockEngine::allocate`].
    pub fn post_movement(&self, draft: MovementDraft) -> StockResult<StockItem> {
        if draft.kind == MovementKind::SiteAllocation {
            return Err(StockError::validation(
                "site allocations are posted through allocate(), not directly",
            ));
        }

        let _gate = self.write_gate()?;
        self.append_checked(&draft)
    }

    /// Validate a draft, check it against the ledger state immediately prior,
    /// and append it. Caller must hold the write gate.
    fn append_checked(&self, draft: &MovementDraft) -> StockResult<StockItem> {
        draft.validate()?;

        let record = self
            .catalog
            .stock_item(&draft.stock_item_id)
            .ok_or_else(|| StockError::not_found(format!("stock item {}", draft.stock_item_id)))?;

        if let Some(project_id) = draft.project_id {
            if self.catalog.project(&project_id).is_none() {
                return Err(StockError::not_found(format!("project {project_id}")));
            }
        }

        if draft.kind == MovementKind::SiteAllocation {
            let Some(project_id) = draft.project_id else {
                return Err(StockError::validation(
                    "site allocation requires a project_id",
                ));
            };
            if self
                .boq
                .find_line(&project_id, &draft.stock_item_id)
                .is_none()
            {
                return Err(StockError::not_found(format!(
                    "no BOQ line for project {project_id} and stock item {}",
                    draft.stock_item_id
                )));
            }
        }

        // The precondition uses the state immediately prior to the candidate
        // movement; the gate keeps it stable until the append lands.
        let mut stream = self.log.item_stream(&draft.stock_item_id)?;
        let current = derive_quantity(&stream);
        ensure_sufficient(current, draft.quantity)?;

        let stored = self.log.append(
            MovementId::new(),
            draft,
            ExpectedVersion::Exact(stream.len() as u64),
        )?;

        tracing::debug!(
            item = %draft.stock_item_id,
            kind = %draft.kind,
            quantity = draft.quantity,
            sequence = stored.sequence,
            "movement recorded"
        );

        stream.push(stored);
        Ok(StockItem::derive(&record, &stream))
    }

    /// Current derived state of one item. Idempotent: the same log yields
    /// the same view.
    pub fn get_item_state(&self, item_id: &StockItemId) -> StockResult<StockItem> {
        let record = self
            .catalog
            .stock_item(item_id)
            .ok_or_else(|| StockError::not_found(format!("stock item {item_id}")))?;

        let _gate = self.read_gate()?;
        let stream = self.log.item_stream(item_id)?;
        Ok(StockItem::derive(&record, &stream))
    }

    /// Movements matching the filter, in append (global sequence) order.
    pub fn list_movements(&self, filter: &MovementFilter) -> StockResult<Vec<StockMovement>> {
        let _gate = self.read_gate()?;
        Ok(self.log.list(filter)?)
    }

    pub fn boq_line(&self, boq_item_id: &BoqItemId) -> StockResult<BoqLine> {
        let _gate = self.read_gate()?;
        self.boq
            .get(boq_item_id)
            .ok_or_else(|| StockError::not_found(format!("BOQ line {boq_item_id}")))
    }

    /// Allocate stock against a BOQ line.
    ///
    /// All-or-nothing: the −quantity site-allocation movement and the line
    /// update commit inside one gated section, and a failure on either
    /// precondition leaves both exactly as they were.
    pub fn allocate(
        &self,
        boq_item_id: &BoqItemId,
        quantity: u64,
        performed_by: &str,
    ) -> StockResult<BoqLine> {
        let signed = signed_magnitude(quantity)?;
        let _gate = self.write_gate()?;

        let line = self
            .boq
            .get(boq_item_id)
            .ok_or_else(|| StockError::not_found(format!("BOQ line {boq_item_id}")))?;
        let read_version = line.version();

        // BOQ-side decision first: positive quantity, remaining capacity,
        // not Ordered/Delivered.
        let updated = line.allocate(quantity)?;

        // Stock side: fails without touching the line.
        let draft = MovementDraft {
            stock_item_id: line.stock_item_id(),
            kind: MovementKind::SiteAllocation,
            quantity: -signed,
            occurred_at: Utc::now(),
            performed_by: performed_by.to_string(),
            notes: None,
            project_id: Some(line.project_id()),
        };
        self.append_checked(&draft)?;

        // The gate is held exclusively, so this commit cannot race.
        self.boq
            .commit(updated.clone(), ExpectedVersion::Exact(read_version))?;

        tracing::info!(
            boq_line = %boq_item_id,
            quantity,
            allocated = updated.allocated_quantity(),
            remaining = updated.remaining_quantity(),
            "stock allocated to BOQ line"
        );

        Ok(updated)
    }

    /// Release previously allocated stock back to the warehouse.
    ///
    /// The compensating movement is a positive adjustment carrying the
    /// project reference; the original site allocation stays in the log.
    pub fn deallocate(
        &self,
        boq_item_id: &BoqItemId,
        quantity: u64,
        performed_by: &str,
    ) -> StockResult<BoqLine> {
        let signed = signed_magnitude(quantity)?;
        let _gate = self.write_gate()?;

        let line = self
            .boq
            .get(boq_item_id)
            .ok_or_else(|| StockError::not_found(format!("BOQ line {boq_item_id}")))?;
        let read_version = line.version();

        let updated = line.deallocate(quantity)?;

        let draft = MovementDraft {
            stock_item_id: line.stock_item_id(),
            kind: MovementKind::Adjustment,
            quantity: signed,
            occurred_at: Utc::now(),
            performed_by: performed_by.to_string(),
            notes: Some(format!("deallocation for BOQ line {boq_item_id}")),
            project_id: Some(line.project_id()),
        };
        self.append_checked(&draft)?;

        self.boq
            .commit(updated.clone(), ExpectedVersion::Exact(read_version))?;

        tracing::info!(
            boq_line = %boq_item_id,
            quantity,
            allocated = updated.allocated_quantity(),
            "stock deallocated from BOQ line"
        );

        Ok(updated)
    }

    /// Downstream procurement hook: mark a line as ordered. Forward-only,
    /// quantities untouched.
    pub fn mark_ordered(&self, boq_item_id: &BoqItemId) -> StockResult<BoqLine> {
        self.transition_line(boq_item_id, BoqLine::mark_ordered)
    }

    /// Downstream procurement hook: mark an ordered line as delivered.
    pub fn mark_delivered(&self, boq_item_id: &BoqItemId) -> StockResult<BoqLine> {
        self.transition_line(boq_item_id, BoqLine::mark_delivered)
    }

    fn transition_line(
        &self,
        boq_item_id: &BoqItemId,
        decide: impl FnOnce(&BoqLine) -> StockResult<BoqLine>,
    ) -> StockResult<BoqLine> {
        let _gate = self.write_gate()?;

        let line = self
            .boq
            .get(boq_item_id)
            .ok_or_else(|| StockError::not_found(format!("BOQ line {boq_item_id}")))?;
        let read_version = line.version();

        let updated = decide(&line)?;
        self.boq
            .commit(updated.clone(), ExpectedVersion::Exact(read_version))?;
        Ok(updated)
    }

    /// Point-in-time copy of ledger + allocation state, consistent with
    /// respect to writers.
    pub fn snapshot(&self) -> StockResult<StockSnapshot> {
        let _gate = self.read_gate()?;

        let movements = self.log.list(&MovementFilter::default())?;
        let items = self
            .catalog
            .list_stock_items()
            .iter()
            .map(|record| {
                let stream: Vec<StockMovement> = movements
                    .iter()
                    .filter(|m| m.stock_item_id == record.item_id)
                    .cloned()
                    .collect();
                StockItem::derive(record, &stream)
            })
            .collect();

        Ok(StockSnapshot {
            items,
            lines: self.boq.list(),
            suppliers: self.catalog.list_suppliers(),
            movements,
        })
    }

    /// Full analytics report over the current snapshot. `window` narrows the
    /// movement-type totals only; `None` covers the full log.
    pub fn analytics_report(&self, window: Option<TimeWindow>) -> StockResult<AnalyticsReport> {
        Ok(build_report(&self.snapshot()?, window))
    }
}

fn signed_magnitude(quantity: u64) -> StockResult<i64> {
    i64::try_from(quantity)
        .map_err(|_| StockError::validation(format!("quantity {quantity} out of range")))
}
