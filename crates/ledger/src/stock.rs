use serde::{Deserialize, Serialize};

use fiberstock_catalog::{Category, StockItemRecord};
use fiberstock_core::{StockError, StockItemId, StockResult, SupplierId};

use crate::movement::StockMovement;

/// Stock-health status, a pure function of quantity vs. the minimum threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// Derive the status from a quantity and a minimum-stock threshold.
///
/// 0 is out of stock; anything up to and including the threshold is low.
pub fn status_for(quantity: i64, minimum_stock: u64) -> StockStatus {
    if quantity <= 0 {
        StockStatus::OutOfStock
    } else if quantity as u64 <= minimum_stock {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Signed sum of movement quantities. Commutative, so the final quantity is
/// order-independent; the log order still matters for audit display and for
/// checking the insufficient-stock condition at proposal time.
pub fn derive_quantity(movements: &[StockMovement]) -> i64 {
    movements.iter().map(|m| m.quantity).sum()
}

/// Fail when a stock-decreasing delta would drive the quantity below zero.
///
/// `current` is the ledger state immediately prior to the candidate movement,
/// never a post-hoc sum over a log that already contains it.
pub fn ensure_sufficient(current: i64, delta: i64) -> StockResult<()> {
    if delta < 0 && current + delta < 0 {
        return Err(StockError::insufficient_stock(current, -delta));
    }
    Ok(())
}

/// Derived view of one stock item: master attributes joined with the
/// quantities computed from the movement log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub item_id: StockItemId,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub quantity_in_stock: i64,
    pub minimum_stock: u64,
    pub supplier_id: SupplierId,
    pub last_purchase_price: u64,
    pub warehouse_location: String,
    pub status: StockStatus,
    /// Number of movements applied (the item's stream version).
    pub version: u64,
}

impl StockItem {
    /// Derive the current view from the master record and the item's
    /// movement stream. Idempotent: same inputs, same view.
    pub fn derive(record: &StockItemRecord, movements: &[StockMovement]) -> Self {
        let quantity_in_stock = derive_quantity(movements);
        Self {
            item_id: record.item_id,
            name: record.name.clone(),
            category: record.category,
            unit: record.unit.clone(),
            quantity_in_stock,
            minimum_stock: record.minimum_stock,
            supplier_id: record.supplier_id,
            last_purchase_price: record.last_purchase_price,
            warehouse_location: record.warehouse_location.clone(),
            status: status_for(quantity_in_stock, record.minimum_stock),
            version: movements.len() as u64,
        }
    }

    /// Current stock value in the smallest currency unit.
    pub fn stock_value(&self) -> u128 {
        if self.quantity_in_stock <= 0 {
            0
        } else {
            self.quantity_in_stock as u128 * self.last_purchase_price as u128
        }
    }

    /// Deficit against the minimum threshold, zero when at or above it.
    pub fn shortfall_quantity(&self) -> u64 {
        let q = self.quantity_in_stock.max(0) as u64;
        self.minimum_stock.saturating_sub(q)
    }
}
