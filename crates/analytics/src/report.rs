use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fiberstock_boq::BoqLine;
use fiberstock_catalog::{Category, Supplier};
use fiberstock_core::{ProjectId, SupplierId};
use fiberstock_ledger::{MovementKind, StockItem, StockMovement};

/// Optional time window for movement-type totals. Open bounds are inclusive
/// of everything on that side; the default window covers the full log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if at > to {
                return false;
            }
        }
        true
    }
}

/// Point-in-time copy of the state the reports are computed from.
///
/// The engine captures this atomically with respect to writers, so the
/// allocation side and the stock side always describe the same instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockSnapshot {
    pub items: Vec<StockItem>,
    pub lines: Vec<BoqLine>,
    pub suppliers: Vec<Supplier>,
    pub movements: Vec<StockMovement>,
}

/// BOQ allocation progress for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAllocation {
    pub project_id: ProjectId,
    pub line_count: usize,
    pub total_value: u128,
    pub allocated_value: u128,
    /// allocated / total × 100; 0 when the total is 0, never NaN.
    pub completion_pct: f64,
}

/// Restock deficit for one supplier, valued at last purchase price.
/// Suppliers without any below-minimum item are excluded from the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierShortfall {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub item_count: usize,
    pub shortfall_value: u128,
}

/// Stock value held in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: Category,
    pub value: u128,
    pub pct_of_total: f64,
}

/// Count and absolute volume per movement kind inside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTotal {
    pub kind: MovementKind,
    pub count: u64,
    pub total_quantity: u64,
}

/// The full report surfaced to UI/API collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub stock_value: u128,
    pub boq_allocation: Vec<ProjectAllocation>,
    pub supplier_shortfall: Vec<SupplierShortfall>,
    pub category_values: Vec<CategoryValue>,
    pub movement_totals: Vec<MovementTotal>,
}

fn pct(numerator: u128, denominator: u128) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Build the full report from a snapshot.
pub fn build_report(snapshot: &StockSnapshot, window: Option<TimeWindow>) -> AnalyticsReport {
    AnalyticsReport {
        stock_value: stock_value(&snapshot.items),
        boq_allocation: boq_allocation(&snapshot.lines),
        supplier_shortfall: supplier_shortfall(&snapshot.items, &snapshot.suppliers),
        category_values: category_values(&snapshot.items),
        movement_totals: movement_totals(&snapshot.movements, window.unwrap_or_default()),
    }
}

/// Total stock value: Σ quantity_in_stock × last_purchase_price.
pub fn stock_value(items: &[StockItem]) -> u128 {
    items.iter().map(|i| i.stock_value()).sum()
}

fn boq_allocation(lines: &[BoqLine]) -> Vec<ProjectAllocation> {
    let mut per_project: HashMap<ProjectId, (usize, u128, u128)> = HashMap::new();
    for line in lines {
        let entry = per_project.entry(line.project_id()).or_default();
        entry.0 += 1;
        entry.1 += line.total_price();
        entry.2 += line.allocated_value();
    }

    let mut rows: Vec<ProjectAllocation> = per_project
        .into_iter()
        .map(
            |(project_id, (line_count, total_value, allocated_value))| ProjectAllocation {
                project_id,
                line_count,
                total_value,
                allocated_value,
                completion_pct: pct(allocated_value, total_value),
            },
        )
        .collect();

    rows.sort_by_key(|r| *r.project_id.as_uuid().as_bytes());
    rows
}

fn supplier_shortfall(items: &[StockItem], suppliers: &[Supplier]) -> Vec<SupplierShortfall> {
    let names: HashMap<SupplierId, &str> = suppliers
        .iter()
        .map(|s| (s.supplier_id, s.name.as_str()))
        .collect();

    let mut per_supplier: HashMap<SupplierId, (usize, u128)> = HashMap::new();
    for item in items {
        let deficit = item.shortfall_quantity();
        if deficit == 0 {
            continue;
        }
        let entry = per_supplier.entry(item.supplier_id).or_default();
        entry.0 += 1;
        entry.1 += deficit as u128 * item.last_purchase_price as u128;
    }

    let mut rows: Vec<SupplierShortfall> = per_supplier
        .into_iter()
        .map(|(supplier_id, (item_count, shortfall_value))| SupplierShortfall {
            supplier_id,
            supplier_name: names.get(&supplier_id).unwrap_or(&"").to_string(),
            item_count,
            shortfall_value,
        })
        .collect();

    rows.sort_by_key(|r| *r.supplier_id.as_uuid().as_bytes());
    rows
}

fn category_values(items: &[StockItem]) -> Vec<CategoryValue> {
    let total = stock_value(items);

    let mut per_category: HashMap<Category, u128> = HashMap::new();
    for item in items {
        *per_category.entry(item.category).or_default() += item.stock_value();
    }

    let mut rows: Vec<CategoryValue> = per_category
        .into_iter()
        .map(|(category, value)| CategoryValue {
            category,
            value,
            pct_of_total: pct(value, total),
        })
        .collect();

    rows.sort_by_key(|r| r.category.to_string());
    rows
}

fn movement_totals(movements: &[StockMovement], window: TimeWindow) -> Vec<MovementTotal> {
    let mut per_kind: HashMap<MovementKind, (u64, u64)> = HashMap::new();
    for movement in movements {
        if !window.contains(movement.occurred_at) {
            continue;
        }
        let entry = per_kind.entry(movement.kind).or_default();
        entry.0 += 1;
        entry.1 += movement.quantity.unsigned_abs();
    }

    let mut rows: Vec<MovementTotal> = per_kind
        .into_iter()
        .map(|(kind, (count, total_quantity))| MovementTotal {
            kind,
            count,
            total_quantity,
        })
        .collect();

    rows.sort_by_key(|r| r.kind.as_str());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fiberstock_catalog::StockItemRecord;
    use fiberstock_core::{BoqItemId, MovementId, StockItemId};
    use fiberstock_ledger::StockItem;

    fn test_item(
        category: Category,
        supplier_id: SupplierId,
        quantity: i64,
        minimum: u64,
        price: u64,
    ) -> StockItem {
        let record = StockItemRecord {
            item_id: StockItemId::new(),
            name: "item".to_string(),
            category,
            unit: "pcs".to_string(),
            minimum_stock: minimum,
            supplier_id,
            last_purchase_price: price,
            warehouse_location: "A-01".to_string(),
        };
        let movements = if quantity == 0 {
            vec![]
        } else {
            vec![StockMovement {
                movement_id: MovementId::new(),
                sequence: 1,
                item_sequence: 1,
                stock_item_id: record.item_id,
                kind: MovementKind::Adjustment,
                quantity,
                occurred_at: Utc::now(),
                performed_by: "tester".to_string(),
                notes: None,
                project_id: None,
            }]
        };
        StockItem::derive(&record, &movements)
    }

    fn test_supplier(name: &str) -> Supplier {
        Supplier {
            supplier_id: SupplierId::new(),
            name: name.to_string(),
            contact: "ops@example.com".to_string(),
            payment_terms: "net 30".to_string(),
            rating: 4,
        }
    }

    #[test]
    fn empty_snapshot_yields_zeroes_not_nan() {
        let report = build_report(&StockSnapshot::default(), None);
        assert_eq!(report.stock_value, 0);
        assert!(report.boq_allocation.is_empty());
        assert!(report.supplier_shortfall.is_empty());
        assert!(report.category_values.is_empty());
        assert!(report.movement_totals.is_empty());
    }

    #[test]
    fn stock_value_sums_quantity_times_price() {
        let supplier = test_supplier("FiberCo");
        let items = vec![
            test_item(Category::Fibre, supplier.supplier_id, 10, 2, 100),
            test_item(Category::Poles, supplier.supplier_id, 3, 1, 2000),
        ];
        assert_eq!(stock_value(&items), 10 * 100 + 3 * 2000);
    }

    #[test]
    fn completion_pct_is_zero_for_empty_boq() {
        // A project whose only line has required_quantity 0 must report 0%,
        // not NaN.
        let line = BoqLine::new(
            BoqItemId::new(),
            ProjectId::new(),
            StockItemId::new(),
            0,
            500,
        );
        let rows = boq_allocation(&[line]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_value, 0);
        assert_eq!(rows[0].completion_pct, 0.0);
    }

    #[test]
    fn project_completion_tracks_allocated_value() {
        let project_id = ProjectId::new();
        let full = BoqLine::new(BoqItemId::new(), project_id, StockItemId::new(), 10, 100)
            .allocate(10)
            .unwrap();
        let half = BoqLine::new(BoqItemId::new(), project_id, StockItemId::new(), 10, 100)
            .allocate(5)
            .unwrap();

        let rows = boq_allocation(&[full, half]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line_count, 2);
        assert_eq!(rows[0].total_value, 2000);
        assert_eq!(rows[0].allocated_value, 1500);
        assert!((rows[0].completion_pct - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn suppliers_without_shortfall_are_excluded() {
        let low = test_supplier("LowCo");
        let fine = test_supplier("FineCo");
        let items = vec![
            // quantity 2 with minimum 10: deficit 8 × 50
            test_item(Category::Tools, low.supplier_id, 2, 10, 50),
            test_item(Category::Tools, fine.supplier_id, 100, 10, 50),
        ];

        let rows = supplier_shortfall(&items, &[low.clone(), fine]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].supplier_id, low.supplier_id);
        assert_eq!(rows[0].supplier_name, "LowCo");
        assert_eq!(rows[0].item_count, 1);
        assert_eq!(rows[0].shortfall_value, 8 * 50);
    }

    #[test]
    fn category_percentages_sum_to_hundred() {
        let supplier = test_supplier("FiberCo");
        let items = vec![
            test_item(Category::Fibre, supplier.supplier_id, 10, 0, 100),
            test_item(Category::Equipment, supplier.supplier_id, 5, 0, 200),
        ];

        let rows = category_values(&items);
        assert_eq!(rows.len(), 2);
        let total_pct: f64 = rows.iter().map(|r| r.pct_of_total).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        for row in &rows {
            assert!((row.pct_of_total - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn movement_totals_respect_the_window() {
        let item_id = StockItemId::new();
        let now = Utc::now();
        let movement = |seq: u64, kind: MovementKind, quantity: i64, at: DateTime<Utc>| StockMovement {
            movement_id: MovementId::new(),
            sequence: seq,
            item_sequence: seq,
            stock_item_id: item_id,
            kind,
            quantity,
            occurred_at: at,
            performed_by: "tester".to_string(),
            notes: None,
            project_id: None,
        };

        let movements = vec![
            movement(1, MovementKind::Addition, 10, now - Duration::days(3)),
            movement(2, MovementKind::Consumption, -4, now - Duration::days(1)),
            movement(3, MovementKind::Consumption, -2, now),
        ];

        // Full log by default.
        let rows = movement_totals(&movements, TimeWindow::default());
        assert_eq!(rows.len(), 2);
        let consumption = rows.iter().find(|r| r.kind == MovementKind::Consumption).unwrap();
        assert_eq!(consumption.count, 2);
        assert_eq!(consumption.total_quantity, 6);

        // Window excluding the oldest movement.
        let rows = movement_totals(
            &movements,
            TimeWindow {
                from: Some(now - Duration::days(2)),
                to: None,
            },
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, MovementKind::Consumption);
        assert_eq!(rows[0].total_quantity, 6);
    }
}
