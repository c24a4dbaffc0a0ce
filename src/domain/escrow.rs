//! Escrow entity and lifecycle state machine.
//!
//! The escrow status only advances along the edges of the transition table
//! encoded in [`EscrowTransition`]. Each transition names the roles allowed
//! to drive it, the statuses it may start from, the status it produces, and
//! the audit-log entry type recorded alongside it. Services apply
//! transitions inside a single database transaction so validation and
//! mutation always see the same row state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserRole;

/// Escrow lifecycle status.
///
/// The happy path is `pending -> awaiting_deposit -> funded -> delivered ->
/// release_requested -> released`. `confirmed`, `paid`, `awaiting_delivery`,
/// `payment_pending_release` and `payment_pending_confirmation` are legacy
/// statuses carried by pre-existing rows; no operation produces them but
/// they remain legal transition sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Pending,
    AwaitingDeposit,
    Funded,
    Confirmed,
    Paid,
    AwaitingDelivery,
    Delivered,
    ReleaseRequested,
    PaymentPendingRelease,
    PaymentPendingConfirmation,
    Released,
    Rejected,
    Cancelled,
}

impl EscrowStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: &'static [EscrowStatus] = &[
        EscrowStatus::Pending,
        EscrowStatus::AwaitingDeposit,
        EscrowStatus::Funded,
        EscrowStatus::Confirmed,
        EscrowStatus::Paid,
        EscrowStatus::AwaitingDelivery,
        EscrowStatus::Delivered,
        EscrowStatus::ReleaseRequested,
        EscrowStatus::PaymentPendingRelease,
        EscrowStatus::PaymentPendingConfirmation,
        EscrowStatus::Released,
        EscrowStatus::Rejected,
        EscrowStatus::Cancelled,
    ];

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EscrowStatus::Released | EscrowStatus::Rejected | EscrowStatus::Cancelled
        )
    }

    /// Parse a stored status string; unknown values are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        EscrowStatus::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EscrowStatus::Pending => "pending",
            EscrowStatus::AwaitingDeposit => "awaiting_deposit",
            EscrowStatus::Funded => "funded",
            EscrowStatus::Confirmed => "confirmed",
            EscrowStatus::Paid => "paid",
            EscrowStatus::AwaitingDelivery => "awaiting_delivery",
            EscrowStatus::Delivered => "delivered",
            EscrowStatus::ReleaseRequested => "release_requested",
            EscrowStatus::PaymentPendingRelease => "payment_pending_release",
            EscrowStatus::PaymentPendingConfirmation => "payment_pending_confirmation",
            EscrowStatus::Released => "released",
            EscrowStatus::Rejected => "rejected",
            EscrowStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit-log entry type, one per state-changing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    Create,
    Deposit,
    Release,
    ReleaseRequest,
    Reject,
    Delivery,
    Cancel,
}

impl AuditType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditType::Create),
            "deposit" => Some(AuditType::Deposit),
            "release" => Some(AuditType::Release),
            "release_request" => Some(AuditType::ReleaseRequest),
            "reject" => Some(AuditType::Reject),
            "delivery" => Some(AuditType::Delivery),
            "cancel" => Some(AuditType::Cancel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::Create => "create",
            AuditType::Deposit => "deposit",
            AuditType::Release => "release",
            AuditType::ReleaseRequest => "release_request",
            AuditType::Reject => "reject",
            AuditType::Delivery => "delivery",
            AuditType::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status-changing operation on an existing escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowTransition {
    /// Buyer picks a payment method; a deposit address is written.
    AssignDeposit,
    /// Buyer (or admin) marks the off-platform deposit as made.
    ConfirmDeposit,
    /// Seller submits the deliverable.
    SubmitDelivery,
    /// Seller asks the buyer to release.
    RequestRelease,
    /// Seller backs out; reason recorded.
    Reject,
    /// Buyer releases funds to the seller.
    Release,
    /// Admin cancels an open escrow.
    Cancel,
}

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The caller's role may never drive this transition.
    #[error("Role '{role}' may not {action}")]
    RoleNotAllowed {
        role: UserRole,
        action: &'static str,
    },
    /// The escrow's current status is outside the transition's source set.
    #[error("Cannot {action} for escrow in status '{current}'")]
    IllegalFrom {
        action: &'static str,
        current: EscrowStatus,
    },
}

impl EscrowTransition {
    /// Roles allowed to drive this transition. Party membership is checked
    /// separately by the data layer (non-parties see "not found").
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            EscrowTransition::AssignDeposit | EscrowTransition::Release => &[UserRole::Buyer],
            EscrowTransition::ConfirmDeposit => &[UserRole::Buyer, UserRole::Admin],
            EscrowTransition::SubmitDelivery
            | EscrowTransition::RequestRelease
            | EscrowTransition::Reject => &[UserRole::Seller],
            EscrowTransition::Cancel => &[UserRole::Admin],
        }
    }

    /// Whether `current` is a legal source status.
    pub fn allows_from(&self, current: EscrowStatus) -> bool {
        use EscrowStatus::*;
        match self {
            EscrowTransition::AssignDeposit => matches!(current, Pending | AwaitingDeposit),
            EscrowTransition::ConfirmDeposit => matches!(current, AwaitingDeposit),
            EscrowTransition::SubmitDelivery => {
                matches!(current, Confirmed | Paid | AwaitingDelivery)
            }
            EscrowTransition::RequestRelease => matches!(current, Delivered | Confirmed | Paid),
            // release_requested is part of the canonical release-eligible
            // set so the seller-request flow can complete; the two
            // payment_pending_* aliases stay legal for legacy rows.
            EscrowTransition::Release => matches!(
                current,
                Delivered | ReleaseRequested | PaymentPendingRelease | PaymentPendingConfirmation
            ),
            EscrowTransition::Reject => {
                !matches!(current, Rejected | Cancelled | Confirmed | Released)
            }
            EscrowTransition::Cancel => !current.is_terminal(),
        }
    }

    /// The status a successful transition produces.
    pub fn target(&self) -> EscrowStatus {
        match self {
            EscrowTransition::AssignDeposit => EscrowStatus::AwaitingDeposit,
            EscrowTransition::ConfirmDeposit => EscrowStatus::Funded,
            EscrowTransition::SubmitDelivery => EscrowStatus::Delivered,
            EscrowTransition::RequestRelease => EscrowStatus::ReleaseRequested,
            EscrowTransition::Reject => EscrowStatus::Rejected,
            EscrowTransition::Release => EscrowStatus::Released,
            EscrowTransition::Cancel => EscrowStatus::Cancelled,
        }
    }

    /// Audit entry appended on success. `AssignDeposit` records none.
    pub fn audit_type(&self) -> Option<AuditType> {
        match self {
            EscrowTransition::AssignDeposit => None,
            EscrowTransition::ConfirmDeposit => Some(AuditType::Deposit),
            EscrowTransition::SubmitDelivery => Some(AuditType::Delivery),
            EscrowTransition::RequestRelease => Some(AuditType::ReleaseRequest),
            EscrowTransition::Reject => Some(AuditType::Reject),
            EscrowTransition::Release => Some(AuditType::Release),
            EscrowTransition::Cancel => Some(AuditType::Cancel),
        }
    }

    /// Verb phrase used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            EscrowTransition::AssignDeposit => "assign a deposit address",
            EscrowTransition::ConfirmDeposit => "confirm deposit",
            EscrowTransition::SubmitDelivery => "submit delivery",
            EscrowTransition::RequestRelease => "request release",
            EscrowTransition::Reject => "reject escrow",
            EscrowTransition::Release => "release funds",
            EscrowTransition::Cancel => "cancel escrow",
        }
    }

    /// Validate the transition against the caller's role and the escrow's
    /// current status, returning the resulting status.
    ///
    /// Role is checked first so a wrong-role caller learns nothing about
    /// the escrow's state.
    pub fn apply(&self, role: UserRole, current: EscrowStatus) -> Result<EscrowStatus, TransitionError> {
        if !self.allowed_roles().contains(&role) {
            return Err(TransitionError::RoleNotAllowed {
                role,
                action: self.describe(),
            });
        }
        if !self.allows_from(current) {
            return Err(TransitionError::IllegalFrom {
                action: self.describe(),
                current,
            });
        }
        Ok(self.target())
    }
}

/// Escrow domain entity.
///
/// `buyer_id` is immutable after creation; `seller_id`, once set, is
/// immutable; `status` only moves along [`EscrowTransition`] edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escrow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_method: String,
    /// Opaque structured deposit instructions (method-specific).
    pub payment_details: Option<serde_json::Value>,
    pub deposit_address: Option<String>,
    pub status: EscrowStatus,
    /// Terms agreed at creation.
    pub agreement: Option<String>,
    pub seller_terms: Option<String>,
    pub seller_deliverables: Option<String>,
    pub buyer_release_note: Option<String>,
    pub seller_reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub seller_request_time: Option<DateTime<Utc>>,
}

impl Escrow {
    /// Whether the given user is a party (buyer or assigned seller).
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.buyer_id == user_id || self.seller_id == Some(user_id)
    }
}

/// Audit-log row: the durable record of "what happened and when",
/// independent of the mutable escrow row. Append-only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub escrow_id: Uuid,
    #[schema(value_type = String, example = "release_request")]
    pub entry_type: AuditType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use EscrowStatus::*;

    const TRANSITIONS: &[EscrowTransition] = &[
        EscrowTransition::AssignDeposit,
        EscrowTransition::ConfirmDeposit,
        EscrowTransition::SubmitDelivery,
        EscrowTransition::RequestRelease,
        EscrowTransition::Reject,
        EscrowTransition::Release,
        EscrowTransition::Cancel,
    ];

    #[test]
    fn status_round_trips_through_storage_string() {
        for status in EscrowStatus::ALL {
            assert_eq!(EscrowStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(EscrowStatus::parse("refunded"), None);
    }

    #[test]
    fn terminal_statuses_admit_no_transition() {
        for status in [Released, Rejected, Cancelled] {
            for t in TRANSITIONS {
                assert!(
                    !t.allows_from(status),
                    "{:?} must not be legal from {:?}",
                    t,
                    status
                );
            }
        }
    }

    #[test]
    fn happy_path_buyer_flow() {
        // pending -> awaiting_deposit -> funded
        assert_eq!(
            EscrowTransition::AssignDeposit.apply(UserRole::Buyer, Pending),
            Ok(AwaitingDeposit)
        );
        assert_eq!(
            EscrowTransition::ConfirmDeposit.apply(UserRole::Buyer, AwaitingDeposit),
            Ok(Funded)
        );
        // admin may also confirm
        assert_eq!(
            EscrowTransition::ConfirmDeposit.apply(UserRole::Admin, AwaitingDeposit),
            Ok(Funded)
        );
    }

    #[test]
    fn assign_deposit_is_reentrant_from_awaiting_deposit() {
        // Re-picking the method before funding is legal.
        assert_eq!(
            EscrowTransition::AssignDeposit.apply(UserRole::Buyer, AwaitingDeposit),
            Ok(AwaitingDeposit)
        );
    }

    #[test]
    fn seller_delivery_and_release_request() {
        for source in [Confirmed, Paid, AwaitingDelivery] {
            assert_eq!(
                EscrowTransition::SubmitDelivery.apply(UserRole::Seller, source),
                Ok(Delivered)
            );
        }
        // A second delivery on a delivered escrow is illegal.
        assert_eq!(
            EscrowTransition::SubmitDelivery.apply(UserRole::Seller, Delivered),
            Err(TransitionError::IllegalFrom {
                action: "submit delivery",
                current: Delivered,
            })
        );

        for source in [Delivered, Confirmed, Paid] {
            assert_eq!(
                EscrowTransition::RequestRelease.apply(UserRole::Seller, source),
                Ok(ReleaseRequested)
            );
        }
    }

    #[test]
    fn release_is_legal_from_request_and_legacy_sources() {
        for source in [
            Delivered,
            ReleaseRequested,
            PaymentPendingRelease,
            PaymentPendingConfirmation,
        ] {
            assert_eq!(
                EscrowTransition::Release.apply(UserRole::Buyer, source),
                Ok(Released)
            );
        }
        // Double release fails naming the current status.
        let err = EscrowTransition::Release
            .apply(UserRole::Buyer, Released)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot release funds for escrow in status 'released'"
        );
    }

    #[test]
    fn reject_is_legal_from_everything_but_the_blocked_set() {
        let blocked = [Rejected, Cancelled, Confirmed, Released];
        for status in EscrowStatus::ALL {
            let result = EscrowTransition::Reject.apply(UserRole::Seller, *status);
            if blocked.contains(status) {
                assert!(result.is_err(), "reject must fail from {:?}", status);
            } else {
                assert_eq!(result, Ok(Rejected), "reject must succeed from {:?}", status);
            }
        }
    }

    #[test]
    fn reject_succeeds_on_funded_escrow() {
        // Scenario: pending -> awaiting_deposit -> funded, then seller rejects.
        assert_eq!(
            EscrowTransition::Reject.apply(UserRole::Seller, Funded),
            Ok(Rejected)
        );
    }

    #[test]
    fn roles_are_checked_before_status() {
        // A seller probing release never learns the current status.
        let err = EscrowTransition::Release
            .apply(UserRole::Seller, Released)
            .unwrap_err();
        assert!(matches!(err, TransitionError::RoleNotAllowed { .. }));

        let err = EscrowTransition::SubmitDelivery
            .apply(UserRole::Buyer, Confirmed)
            .unwrap_err();
        assert!(matches!(err, TransitionError::RoleNotAllowed { .. }));
    }

    #[test]
    fn cancel_is_admin_only_and_non_terminal_only() {
        assert_eq!(
            EscrowTransition::Cancel.apply(UserRole::Admin, Funded),
            Ok(Cancelled)
        );
        assert!(EscrowTransition::Cancel
            .apply(UserRole::Buyer, Funded)
            .is_err());
        assert!(EscrowTransition::Cancel
            .apply(UserRole::Admin, Released)
            .is_err());
    }

    #[test]
    fn every_transition_but_assign_deposit_has_an_audit_type() {
        for t in TRANSITIONS {
            match t {
                EscrowTransition::AssignDeposit => assert_eq!(t.audit_type(), None),
                _ => assert!(t.audit_type().is_some()),
            }
        }
    }

    #[test]
    fn party_check_covers_buyer_and_assigned_seller() {
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let escrow = Escrow {
            id: Uuid::new_v4(),
            buyer_id: buyer,
            seller_id: Some(seller),
            amount: Decimal::new(100, 0),
            payment_method: "USDT_TRC20".into(),
            payment_details: None,
            deposit_address: None,
            status: Pending,
            agreement: None,
            seller_terms: None,
            seller_deliverables: None,
            buyer_release_note: None,
            seller_reject_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
            released_at: None,
            seller_request_time: None,
        };
        assert!(escrow.is_party(buyer));
        assert!(escrow.is_party(seller));
        assert!(!escrow.is_party(stranger));
    }
}
