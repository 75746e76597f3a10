//! Read-only analytics rollups over ledger and allocation state.
//!
//! Everything here is a pure function of a point-in-time snapshot; nothing
//! mutates, and all percentages guard division by zero.

pub mod report;

pub use report::{
    AnalyticsReport, CategoryValue, MovementTotal, ProjectAllocation, StockSnapshot,
    SupplierShortfall, TimeWindow, build_report,
};
