//! Payment-method directory and seller withdrawal methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Reference data mapping a method code to deposit instructions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentMethod {
    #[schema(example = "USDT_TRC20")]
    pub code: String,
    #[schema(example = "USDT (TRC-20)")]
    pub label: String,
    /// Opaque structured instructions, e.g. `{"address": ..., "note": ...}`.
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub active: bool,
}

/// Deposit instructions resolved for a specific escrow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepositInstructions {
    pub escrow_id: Uuid,
    pub payment_method: String,
    pub address: Option<String>,
    pub note: Option<String>,
    /// Advisory only; the escrow is never auto-cancelled at this time.
    pub expires_at: DateTime<Utc>,
    /// True when the method code was unknown and placeholder demo
    /// instructions were substituted.
    pub fallback: bool,
}

/// A seller's configured payout destination. At most one active record per
/// seller; `set` upserts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalMethod {
    pub user_id: Uuid,
    #[schema(example = "USDT_TRC20")]
    pub method_code: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
