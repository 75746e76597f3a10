use serde::{Deserialize, Serialize};

use fiberstock_core::{BoqItemId, ProjectId, StockError, StockItemId, StockResult};

/// BOQ line fulfillment status.
///
/// `Planned`, `PartiallyAllocated` and `FullyAllocated` are derived from the
/// allocated quantity. `Ordered` and `Delivered` are driven by the downstream
/// procurement flow and are terminal with respect to allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoqStatus {
    Planned,
    PartiallyAllocated,
    FullyAllocated,
    Ordered,
    Delivered,
}

impl BoqStatus {
    /// True once the line left the allocation phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BoqStatus::Ordered | BoqStatus::Delivered)
    }
}

/// One line of a project's Bill of Quantities.
///
/// `allocated_quantity` never exceeds `required_quantity`; the remaining
/// quantity and the status are derived from it. Mutation goes through the
/// decision methods, which return an updated copy for the store to commit
/// (the receiver is never changed in place).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoqLine {
    boq_item_id: BoqItemId,
    project_id: ProjectId,
    stock_item_id: StockItemId,
    required_quantity: u64,
    allocated_quantity: u64,
    /// Unit price in the smallest currency unit.
    unit_price: u64,
    status: BoqStatus,
    /// Bumped on every committed change (optimistic concurrency stamp).
    version: u64,
}

impl BoqLine {
    pub fn new(
        boq_item_id: BoqItemId,
        project_id: ProjectId,
        stock_item_id: StockItemId,
        required_quantity: u64,
        unit_price: u64,
    ) -> Self {
        Self {
            boq_item_id,
            project_id,
            stock_item_id,
            required_quantity,
            allocated_quantity: 0,
            unit_price,
            status: BoqStatus::Planned,
            version: 0,
        }
    }

    pub fn boq_item_id(&self) -> BoqItemId {
        self.boq_item_id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn stock_item_id(&self) -> StockItemId {
        self.stock_item_id
    }

    pub fn required_quantity(&self) -> u64 {
        self.required_quantity
    }

    pub fn allocated_quantity(&self) -> u64 {
        self.allocated_quantity
    }

    pub fn remaining_quantity(&self) -> u64 {
        self.required_quantity - self.allocated_quantity
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn total_price(&self) -> u128 {
        self.required_quantity as u128 * self.unit_price as u128
    }

    pub fn allocated_value(&self) -> u128 {
        self.allocated_quantity as u128 * self.unit_price as u128
    }

    pub fn status(&self) -> BoqStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn derived_status(&self) -> BoqStatus {
        if self.allocated_quantity == 0 {
            BoqStatus::Planned
        } else if self.allocated_quantity < self.required_quantity {
            BoqStatus::PartiallyAllocated
        } else {
            BoqStatus::FullyAllocated
        }
    }

    /// Decide an allocation of `quantity` units against this line.
    ///
    /// Returns the updated line; the stock-side check (on-hand quantity) and
    /// the commit are the engine's responsibility.
    pub fn allocate(&self, quantity: u64) -> StockResult<BoqLine> {
        if quantity == 0 {
            return Err(StockError::validation("allocation quantity must be positive"));
        }
        if self.status.is_terminal() {
            return Err(StockError::validation(format!(
                "BOQ line is {:?}; allocation is closed",
                self.status
            )));
        }
        if quantity > self.remaining_quantity() {
            return Err(StockError::over_allocation(
                self.remaining_quantity(),
                quantity,
            ));
        }

        let mut next = self.clone();
        next.allocated_quantity += quantity;
        next.status = next.derived_status();
        next.version += 1;
        Ok(next)
    }

    /// Reverse of `allocate`: release `quantity` previously allocated units.
    pub fn deallocate(&self, quantity: u64) -> StockResult<BoqLine> {
        if quantity == 0 {
            return Err(StockError::validation(
                "deallocation quantity must be positive",
            ));
        }
        if self.status.is_terminal() {
            return Err(StockError::validation(format!(
                "BOQ line is {:?}; allocation is closed",
                self.status
            )));
        }
        if quantity > self.allocated_quantity {
            return Err(StockError::validation(format!(
                "cannot deallocate {quantity} units; only {} allocated",
                self.allocated_quantity
            )));
        }

        let mut next = self.clone();
        next.allocated_quantity -= quantity;
        next.status = next.derived_status();
        next.version += 1;
        Ok(next)
    }

    /// Downstream procurement marks the line as ordered. Forward-only; the
    /// allocated quantity is untouched.
    pub fn mark_ordered(&self) -> StockResult<BoqLine> {
        if self.status.is_terminal() {
            return Err(StockError::validation(format!(
                "BOQ line is already {:?}",
                self.status
            )));
        }
        let mut next = self.clone();
        next.status = BoqStatus::Ordered;
        next.version += 1;
        Ok(next)
    }

    /// Downstream procurement marks the line as delivered. Only valid from
    /// `Ordered`.
    pub fn mark_delivered(&self) -> StockResult<BoqLine> {
        if self.status != BoqStatus::Ordered {
            return Err(StockError::validation(format!(
                "BOQ line must be ordered before delivery (currently {:?})",
                self.status
            )));
        }
        let mut next = self.clone();
        next.status = BoqStatus::Delivered;
        next.version += 1;
        Ok(next)
    }
}
