//! `fiberstock-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod version;

pub use error::{StockError, StockResult};
pub use id::{BoqItemId, MovementId, ProjectId, StockItemId, SupplierId};
pub use version::ExpectedVersion;
