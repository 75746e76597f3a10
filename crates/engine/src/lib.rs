//! Infrastructure layer: movement log and BOQ line stores, plus the
//! `StockEngine` orchestrator that ties them to the pure domain crates.
//!
//! Storage backends here are in-memory; the `MovementLog` and `BoqStore`
//! traits are the seams a persistent implementation would fill.

pub mod boq_store;
pub mod engine;
pub mod movement_log;


pub use boq_store::{BoqStore, BoqStoreError, InMemoryBoqStore};
pub use engine::StockEngine;
pub use movement_log::{InMemoryMovementLog, MovementLog, MovementLogError};
