//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type StockResult<T> = Result<T, StockError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// reference checks, stock invariants). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A value failed validation (e.g. malformed input). Caller must fix the input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist (item/project/supplier/BOQ line).
    #[error("not found: {0}")]
    NotFound(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A stock-decreasing movement would drive the item's quantity below zero.
    /// Nothing is appended; the caller may retry with a smaller quantity or restock.
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// An allocation exceeds the BOQ line's remaining quantity.
    #[error("over-allocation: remaining {remaining}, requested {requested}")]
    OverAllocation { remaining: u64, requested: u64 },

    /// Optimistic-concurrency conflict on the same item/BOQ line.
    /// Safe to retry the whole operation from scratch.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StockError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn insufficient_stock(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn over_allocation(remaining: u64, requested: u64) -> Self {
        Self::OverAllocation {
            remaining,
            requested,
        }
    }

    /// True when the caller may safely retry the whole operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
