use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fiberstock_core::{ProjectId, StockItemId, SupplierId};

/// Stock item category used for grouping and analytics rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fibre,
    Poles,
    Equipment,
    Tools,
    Consumables,
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Category::Fibre => "fibre",
            Category::Poles => "poles",
            Category::Equipment => "equipment",
            Category::Tools => "tools",
            Category::Consumables => "consumables",
        };
        f.write_str(s)
    }
}

/// Master record for a stock item.
///
/// Holds the static attributes only. On-hand quantity and stock-health
/// status are derived from the movement log, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItemRecord {
    pub item_id: StockItemId,
    pub name: String,
    pub category: Category,
    /// Unit of measure, e.g. "m", "pcs", "roll".
    pub unit: String,
    /// Threshold below (or at) which the item is considered low on stock.
    pub minimum_stock: u64,
    pub supplier_id: SupplierId,
    /// Last purchase price in the smallest currency unit (e.g. cents).
    pub last_purchase_price: u64,
    pub warehouse_location: String,
}

/// Project lifecycle status (maintained externally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planned,
    Active,
    Completed,
}

/// Master record for a fiber-deployment project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub manager: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub location: String,
    /// Budget in the smallest currency unit.
    pub budget: u64,
}

/// Master record for a supplier (read-only analytics join key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_id: SupplierId,
    pub name: String,
    pub contact: String,
    pub payment_terms: String,
    /// Rating on a 1..=5 scale.
    pub rating: u8,
}
