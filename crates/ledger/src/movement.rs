use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fiberstock_core::{MovementId, ProjectId, StockError, StockItemId, StockResult};

/// Kind of stock movement.
///
/// Transfers are modeled as two paired movements (debit the source with
/// `TransferOut`, credit the destination with `TransferIn`) rather than one
/// ambiguous record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Addition,
    Consumption,
    TransferIn,
    TransferOut,
    Adjustment,
    SiteAllocation,
}

impl MovementKind {
    /// Stable kind name for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Addition => "addition",
            MovementKind::Consumption => "consumption",
            MovementKind::TransferIn => "transfer_in",
            MovementKind::TransferOut => "transfer_out",
            MovementKind::Adjustment => "adjustment",
            MovementKind::SiteAllocation => "site_allocation",
        }
    }

    /// Sign convention for the kind, if fixed.
    ///
    /// Addition and inbound transfers are stock-increasing; consumption,
    /// outbound transfers and site allocations are stock-decreasing.
    /// Adjustments carry their own sign and return `None`.
    pub fn fixed_sign(&self) -> Option<i8> {
        match self {
            MovementKind::Addition | MovementKind::TransferIn => Some(1),
            MovementKind::Consumption
            | MovementKind::TransferOut
            | MovementKind::SiteAllocation => Some(-1),
            MovementKind::Adjustment => None,
        }
    }

    /// Apply the kind's sign to a magnitude. Adjustments keep the magnitude
    /// positive; callers pass negative adjustments as signed drafts directly.
    pub fn signed(&self, magnitude: u64) -> i64 {
        let m = magnitude as i64;
        match self.fixed_sign() {
            Some(s) => m * s as i64,
            None => m,
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed movement, not yet validated or appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub stock_item_id: StockItemId,
    pub kind: MovementKind,
    /// Signed quantity. The sign must match the kind's convention.
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub performed_by: String,
    pub notes: Option<String>,
    pub project_id: Option<ProjectId>,
}

impl MovementDraft {
    /// Validate draft shape: non-zero quantity, sign convention, required
    /// project reference for site allocations.
    ///
    /// Reference existence (item/project/BOQ line) is checked by the engine
    /// against the catalog; this is the pure, shape-level part.
    pub fn validate(&self) -> StockResult<()> {
        if self.quantity == 0 {
            return Err(StockError::validation("quantity cannot be zero"));
        }

        if self.performed_by.trim().is_empty() {
            return Err(StockError::validation("performed_by cannot be empty"));
        }

        if let Some(sign) = self.kind.fixed_sign() {
            if (self.quantity > 0) != (sign > 0) {
                return Err(StockError::validation(format!(
                    "{} movements must carry a {} quantity",
                    self.kind,
                    if sign > 0 { "positive" } else { "negative" }
                )));
            }
        }

        if self.kind == MovementKind::SiteAllocation && self.project_id.is_none() {
            return Err(StockError::validation(
                "site allocation requires a project_id",
            ));
        }

        Ok(())
    }
}

/// A recorded movement in the append-only log (immutable once stored).
///
/// `sequence` is the strictly increasing global append position; it defines
/// the ledger order and breaks ties between equal timestamps.
/// `item_sequence` is the position within the item's own stream and doubles
/// as the item's version stamp for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub movement_id: MovementId,
    pub sequence: u64,
    pub item_sequence: u64,
    pub stock_item_id: StockItemId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub performed_by: String,
    pub notes: Option<String>,
    pub project_id: Option<ProjectId>,
}

/// Filter for listing movements. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub stock_item_id: Option<StockItemId>,
    pub kind: Option<MovementKind>,
    pub project_id: Option<ProjectId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &StockMovement) -> bool {
        if let Some(item_id) = self.stock_item_id {
            if movement.stock_item_id != item_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if movement.kind != kind {
                return false;
            }
        }
        if let Some(project_id) = self.project_id {
            if movement.project_id != Some(project_id) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if movement.occurred_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if movement.occurred_at > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: MovementKind, quantity: i64) -> MovementDraft {
        MovementDraft {
            stock_item_id: StockItemId::new(),
            kind,
            quantity,
            occurred_at: Utc::now(),
            performed_by: "tester".to_string(),
            notes: None,
            project_id: None,
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = draft(MovementKind::Addition, 0).validate().unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn sign_convention_is_enforced_per_kind() {
        assert!(draft(MovementKind::Addition, 5).validate().is_ok());
        assert!(draft(MovementKind::Addition, -5).validate().is_err());

        assert!(draft(MovementKind::Consumption, -5).validate().is_ok());
        assert!(draft(MovementKind::Consumption, 5).validate().is_err());

        assert!(draft(MovementKind::TransferIn, 3).validate().is_ok());
        assert!(draft(MovementKind::TransferOut, -3).validate().is_ok());
        assert!(draft(MovementKind::TransferOut, 3).validate().is_err());

        // Adjustments go either way.
        assert!(draft(MovementKind::Adjustment, 7).validate().is_ok());
        assert!(draft(MovementKind::Adjustment, -7).validate().is_ok());
    }

    #[test]
    fn site_allocation_requires_project() {
        let mut d = draft(MovementKind::SiteAllocation, -4);
        assert!(d.validate().is_err());

        d.project_id = Some(ProjectId::new());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn empty_actor_is_rejected() {
        let mut d = draft(MovementKind::Addition, 5);
        d.performed_by = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn filter_narrows_by_item_kind_project_and_window() {
        let item_id = StockItemId::new();
        let project_id = ProjectId::new();
        let now = Utc::now();

        let movement = StockMovement {
            movement_id: MovementId::new(),
            sequence: 1,
            item_sequence: 1,
            stock_item_id: item_id,
            kind: MovementKind::SiteAllocation,
            quantity: -4,
            occurred_at: now,
            performed_by: "tester".to_string(),
            notes: None,
            project_id: Some(project_id),
        };

        assert!(MovementFilter::default().matches(&movement));
        assert!(
            MovementFilter {
                stock_item_id: Some(item_id),
                kind: Some(MovementKind::SiteAllocation),
                project_id: Some(project_id),
                ..Default::default()
            }
            .matches(&movement)
        );
        assert!(
            !MovementFilter {
                kind: Some(MovementKind::Addition),
                ..Default::default()
            }
            .matches(&movement)
        );
        assert!(
            !MovementFilter {
                from: Some(now + chrono::Duration::seconds(1)),
                ..Default::default()
            }
            .matches(&movement)
        );
        assert!(
            !MovementFilter {
                to: Some(now - chrono::Duration::seconds(1)),
                ..Default::default()
            }
            .matches(&movement)
        );
    }
}
