use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a ledger entry exists. Mirrors the backend's reason column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsReason {
    EarnedPurchase,
    Redeemed,
    Refund,
    AdminAdjustment,
    Expired,
}

/// One row of the points ledger; `points_change` is signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsEntry {
    pub id: Uuid,
    pub reason: PointsReason,
    pub points_change: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
