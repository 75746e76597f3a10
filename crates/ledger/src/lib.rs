//! Stock ledger domain module.
//!
//! This crate contains the business rules for the movement log and the
//! derived stock view, implemented purely as deterministic domain logic
//! (no IO, no storage). The append-only movement history is the single
//! source of truth; everything here derives from it.

pub mod movement;
pub mod stock;

pub use movement::{MovementDraft, MovementFilter, MovementKind, StockMovement};
pub use stock::{StockItem, StockStatus, derive_quantity, ensure_sufficient, status_for};
