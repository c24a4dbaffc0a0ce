//! Escrow lifecycle service.
//!
//! Every state-changing operation runs as one transaction: lock the row,
//! validate the transition against the caller's role and the current
//! status, write the new status plus its timestamps, and append the audit
//! entry. A failed validation leaves the escrow untouched.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    DEFAULT_REJECT_REASON, DEPOSIT_ADDRESS_TTL_HOURS, FALLBACK_DEPOSIT_ADDRESS,
    FALLBACK_DEPOSIT_NOTE,
};
use crate::domain::{
    AuditEntry, AuditType, DepositInstructions, Escrow, EscrowTransition, FilePurpose, Identity,
    TransitionError, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{EscrowFilter, EscrowListItem, FileStore, NewEscrow, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields accepted when a buyer opens an escrow.
#[derive(Debug, Clone)]
pub struct CreateEscrowInput {
    pub seller_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_method: String,
    pub preferred_wallet: Option<String>,
    pub agreement: Option<String>,
}

/// A decoded attachment upload.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// An escrow together with its full audit trail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EscrowDetail {
    #[schema(value_type = Object)]
    pub escrow: Escrow,
    pub audit_log: Vec<AuditEntry>,
}

/// Escrow lifecycle operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EscrowService: Send + Sync {
    /// Open a new escrow in status `pending` (buyer only).
    async fn create_escrow(&self, identity: Identity, input: CreateEscrowInput)
        -> AppResult<Escrow>;

    /// Pick a payment method and assign deposit instructions (buyer only).
    async fn assign_deposit(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        method_code: String,
    ) -> AppResult<DepositInstructions>;

    /// Mark the off-platform deposit as made (buyer, or admin).
    async fn confirm_deposit(&self, identity: Identity, escrow_id: Uuid) -> AppResult<Escrow>;

    /// An escrow visible to the calling party, with audit trail.
    async fn get_escrow(&self, identity: Identity, escrow_id: Uuid) -> AppResult<EscrowDetail>;

    /// The caller's escrows, scoped by their role, newest first.
    async fn list_my_escrows(
        &self,
        identity: Identity,
        filter: EscrowFilter,
    ) -> AppResult<Vec<EscrowListItem>>;

    /// Submit the deliverable, optionally with attachments (seller only).
    async fn submit_delivery(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        terms: Option<String>,
        content: Option<String>,
        attachments: Vec<AttachmentUpload>,
    ) -> AppResult<Escrow>;

    /// Ask the buyer to release (seller only).
    async fn request_release(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        note: Option<String>,
    ) -> AppResult<Escrow>;

    /// Back out of the escrow, recording a reason (seller only).
    async fn reject_escrow(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Escrow>;

    /// Release funds to the seller (buyer only).
    async fn release_funds(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        note: Option<String>,
    ) -> AppResult<Escrow>;

    /// Every escrow on the platform (admin only).
    async fn list_all_escrows(
        &self,
        identity: Identity,
        filter: EscrowFilter,
    ) -> AppResult<Vec<Escrow>>;

    /// Any escrow with its audit trail, no party scoping (admin only).
    async fn get_escrow_admin(&self, identity: Identity, escrow_id: Uuid)
        -> AppResult<EscrowDetail>;

    /// Cancel any non-terminal escrow (admin only).
    async fn cancel_escrow(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Escrow>;
}

/// Map a refused transition onto the error taxonomy. A role refusal is
/// Forbidden; a bad source status is Conflict naming the current status.
fn transition_error(err: TransitionError) -> AppError {
    match err {
        TransitionError::RoleNotAllowed { .. } => AppError::Forbidden,
        TransitionError::IllegalFrom { .. } => AppError::Conflict(err.to_string()),
    }
}

/// Concrete implementation of EscrowService using Unit of Work.
pub struct EscrowManager<U: UnitOfWork> {
    uow: Arc<U>,
    files: FileStore,
}

impl<U: UnitOfWork> EscrowManager<U> {
    pub fn new(uow: Arc<U>, files: FileStore) -> Self {
        Self { uow, files }
    }

    /// Remove blobs written ahead of a transaction that then failed.
    async fn discard_blobs(&self, stored_names: &[String]) {
        for stored_name in stored_names {
            if let Err(e) = self.files.remove(stored_name).await {
                tracing::warn!(stored_name = %stored_name, error = %e, "Orphaned blob left behind");
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> EscrowService for EscrowManager<U> {
    async fn create_escrow(
        &self,
        identity: Identity,
        input: CreateEscrowInput,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Buyer])?;

        if input.amount <= Decimal::ZERO {
            return Err(AppError::validation("Amount must be greater than zero"));
        }

        // The assigned seller, when named up front, must be a real seller
        // account.
        if let Some(seller_id) = input.seller_id {
            let seller = self
                .uow
                .users()
                .find_by_id(seller_id)
                .await?
                .ok_or_else(|| AppError::validation("Unknown seller"))?;
            if seller.role != UserRole::Seller {
                return Err(AppError::validation("Named user is not a seller"));
            }
        }

        let buyer_id = identity.user_id;
        let payment_details = input
            .preferred_wallet
            .filter(|w| !w.is_empty())
            .map(|w| serde_json::json!({ "preferred_wallet": w }));

        let new = NewEscrow {
            buyer_id,
            seller_id: input.seller_id,
            amount: input.amount,
            payment_method: input.payment_method,
            payment_details,
            agreement: input.agreement.filter(|a| !a.is_empty()),
        };

        let escrow = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    // The seller check above ran before this transaction
                    // opened; repeat it here so the insert and the check
                    // see the same state.
                    if let Some(seller_id) = new.seller_id {
                        match ctx.users().find_by_id(seller_id).await? {
                            Some(seller) if seller.role == UserRole::Seller => {}
                            Some(_) => {
                                return Err(AppError::validation("Named user is not a seller"))
                            }
                            None => return Err(AppError::validation("Unknown seller")),
                        }
                    }

                    let escrow = ctx.escrows().create(new).await?;
                    ctx.audit()
                        .append(escrow.id, AuditType::Create, "Escrow created".to_string())
                        .await?;
                    Ok(escrow)
                })
            })
            .await?;

        tracing::info!(escrow_id = %escrow.id, buyer_id = %buyer_id, "Escrow created");
        Ok(escrow)
    }

    async fn assign_deposit(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        method_code: String,
    ) -> AppResult<DepositInstructions> {
        identity.require_role(&[UserRole::Buyer])?;

        // Reference data; reading it outside the escrow transaction is fine.
        let method = self
            .uow
            .payment_methods()
            .find_active_by_code(&method_code)
            .await?;

        let fallback = method.is_none();
        let (details, address, note) = match method {
            Some(method) => {
                let address = method.details.get("address").and_then(|v| v.as_str()).map(String::from);
                let note = method.details.get("note").and_then(|v| v.as_str()).map(String::from);
                (method.details, address, note)
            }
            None => {
                // Unknown code: substitute placeholder demo instructions,
                // clearly flagged in the response.
                tracing::warn!(method_code = %method_code, "Unknown payment method, using fallback instructions");
                (
                    serde_json::json!({
                        "address": FALLBACK_DEPOSIT_ADDRESS,
                        "note": FALLBACK_DEPOSIT_NOTE,
                    }),
                    Some(FALLBACK_DEPOSIT_ADDRESS.to_string()),
                    Some(FALLBACK_DEPOSIT_NOTE.to_string()),
                )
            }
        };

        let user_id = identity.user_id;
        let role = identity.role;
        let tx_address = address.clone();
        let tx_details = details.clone();

        let escrow = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_party_for_update(escrow_id, user_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::AssignDeposit
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    escrow.status = new_status;
                    escrow.payment_method = method_code;
                    escrow.payment_details = Some(tx_details);
                    escrow.deposit_address = tx_address;
                    escrow.updated_at = Utc::now();

                    ctx.escrows().update(&escrow).await
                })
            })
            .await?;

        // Advisory only; nothing auto-cancels the escrow at this time.
        let expires_at = Utc::now() + Duration::hours(DEPOSIT_ADDRESS_TTL_HOURS);

        Ok(DepositInstructions {
            escrow_id: escrow.id,
            payment_method: escrow.payment_method,
            address,
            note,
            expires_at,
            fallback,
        })
    }

    async fn confirm_deposit(&self, identity: Identity, escrow_id: Uuid) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Buyer, UserRole::Admin])?;

        let user_id = identity.user_id;
        let role = identity.role;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    // Admin is exempt from the party check.
                    let found = if role.is_admin() {
                        ctx.escrows().find_for_update(escrow_id).await?
                    } else {
                        ctx.escrows()
                            .find_for_party_for_update(escrow_id, user_id)
                            .await?
                    };
                    let mut escrow = found.ok_or_not_found()?;

                    let new_status = EscrowTransition::ConfirmDeposit
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    escrow.status = new_status;
                    escrow.updated_at = Utc::now();

                    let escrow = ctx.escrows().update(&escrow).await?;
                    ctx.audit()
                        .append(
                            escrow.id,
                            AuditType::Deposit,
                            "Deposit confirmed".to_string(),
                        )
                        .await?;
                    Ok(escrow)
                })
            })
            .await
    }

    async fn get_escrow(&self, identity: Identity, escrow_id: Uuid) -> AppResult<EscrowDetail> {
        let escrow = self
            .uow
            .escrows()
            .find_for_party(escrow_id, identity.user_id)
            .await?
            .ok_or_not_found()?;
        let audit_log = self.uow.escrows().audit_log(escrow_id).await?;
        Ok(EscrowDetail { escrow, audit_log })
    }

    async fn list_my_escrows(
        &self,
        identity: Identity,
        filter: EscrowFilter,
    ) -> AppResult<Vec<EscrowListItem>> {
        match identity.role {
            UserRole::Buyer => self.uow.escrows().list_for_buyer(identity.user_id, filter).await,
            UserRole::Seller => {
                self.uow
                    .escrows()
                    .list_for_seller(identity.user_id, filter)
                    .await
            }
            // Admins use the unscoped listing instead.
            UserRole::Admin => Err(AppError::Forbidden),
        }
    }

    async fn submit_delivery(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        terms: Option<String>,
        content: Option<String>,
        attachments: Vec<AttachmentUpload>,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Seller])?;

        // Blobs are written ahead of the transaction and rolled back by
        // hand if it fails; metadata rows commit with the transition so a
        // row never points at a missing blob.
        let mut stored: Vec<(String, String)> = Vec::with_capacity(attachments.len());
        for upload in &attachments {
            let stored_name = self.files.store(&upload.file_name, &upload.bytes).await?;
            stored.push((upload.file_name.clone(), stored_name));
        }

        let user_id = identity.user_id;
        let role = identity.role;
        let tx_stored = stored.clone();

        let result = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_party_for_update(escrow_id, user_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::SubmitDelivery
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    let now = Utc::now();
                    escrow.status = new_status;
                    escrow.seller_terms = terms.filter(|t| !t.is_empty());
                    escrow.seller_deliverables = content.filter(|c| !c.is_empty());
                    escrow.delivered_at = Some(now);
                    escrow.updated_at = now;

                    let escrow = ctx.escrows().update(&escrow).await?;
                    ctx.audit()
                        .append(
                            escrow.id,
                            AuditType::Delivery,
                            "Seller submitted delivery".to_string(),
                        )
                        .await?;

                    for (file_name, stored_name) in tx_stored {
                        ctx.files()
                            .record(
                                Some(escrow.id),
                                file_name,
                                stored_name,
                                FilePurpose::Delivery,
                            )
                            .await?;
                    }

                    Ok(escrow)
                })
            })
            .await;

        if result.is_err() {
            let names: Vec<String> = stored.into_iter().map(|(_, n)| n).collect();
            self.discard_blobs(&names).await;
        }

        result
    }

    async fn request_release(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        note: Option<String>,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Seller])?;

        let user_id = identity.user_id;
        let role = identity.role;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_party_for_update(escrow_id, user_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::RequestRelease
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    let now = Utc::now();
                    escrow.status = new_status;
                    escrow.seller_request_time = Some(now);
                    escrow.updated_at = now;

                    let escrow = ctx.escrows().update(&escrow).await?;

                    let description = match note.filter(|n| !n.is_empty()) {
                        Some(note) => format!("Seller requested release: {}", note),
                        None => "Seller requested release".to_string(),
                    };
                    ctx.audit()
                        .append(escrow.id, AuditType::ReleaseRequest, description)
                        .await?;
                    Ok(escrow)
                })
            })
            .await
    }

    async fn reject_escrow(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Seller])?;

        let user_id = identity.user_id;
        let role = identity.role;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_party_for_update(escrow_id, user_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::Reject
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    let reason = reason
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string());

                    escrow.status = new_status;
                    escrow.seller_reject_reason = Some(reason.clone());
                    escrow.updated_at = Utc::now();

                    let escrow = ctx.escrows().update(&escrow).await?;
                    ctx.audit()
                        .append(
                            escrow.id,
                            AuditType::Reject,
                            format!("Seller rejected escrow: {}", reason),
                        )
                        .await?;
                    Ok(escrow)
                })
            })
            .await
    }

    async fn release_funds(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        note: Option<String>,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Buyer])?;

        let user_id = identity.user_id;
        let role = identity.role;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_party_for_update(escrow_id, user_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::Release
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    let now = Utc::now();
                    escrow.status = new_status;
                    escrow.buyer_release_note = note.filter(|n| !n.is_empty());
                    escrow.released_at = Some(now);
                    escrow.updated_at = now;

                    let escrow = ctx.escrows().update(&escrow).await?;
                    ctx.audit()
                        .append(
                            escrow.id,
                            AuditType::Release,
                            "Buyer released funds".to_string(),
                        )
                        .await?;
                    Ok(escrow)
                })
            })
            .await
    }

    async fn list_all_escrows(
        &self,
        identity: Identity,
        filter: EscrowFilter,
    ) -> AppResult<Vec<Escrow>> {
        identity.require_role(&[UserRole::Admin])?;
        self.uow.escrows().list_all(filter).await
    }

    async fn get_escrow_admin(
        &self,
        identity: Identity,
        escrow_id: Uuid,
    ) -> AppResult<EscrowDetail> {
        identity.require_role(&[UserRole::Admin])?;
        let escrow = self
            .uow
            .escrows()
            .find_by_id(escrow_id)
            .await?
            .ok_or_not_found()?;
        let audit_log = self.uow.escrows().audit_log(escrow_id).await?;
        Ok(EscrowDetail { escrow, audit_log })
    }

    async fn cancel_escrow(
        &self,
        identity: Identity,
        escrow_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<Escrow> {
        identity.require_role(&[UserRole::Admin])?;

        let role = identity.role;

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut escrow = ctx
                        .escrows()
                        .find_for_update(escrow_id)
                        .await?
                        .ok_or_not_found()?;

                    let new_status = EscrowTransition::Cancel
                        .apply(role, escrow.status)
                        .map_err(transition_error)?;

                    escrow.status = new_status;
                    escrow.updated_at = Utc::now();

                    let escrow = ctx.escrows().update(&escrow).await?;

                    let description = match reason.filter(|r| !r.is_empty()) {
                        Some(reason) => format!("Escrow cancelled by admin: {}", reason),
                        None => "Escrow cancelled by admin".to_string(),
                    };
                    ctx.audit()
                        .append(escrow.id, AuditType::Cancel, description)
                        .await?;
                    Ok(escrow)
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EscrowStatus;

    #[test]
    fn transition_errors_map_onto_the_error_taxonomy() {
        let role_err = TransitionError::RoleNotAllowed {
            role: UserRole::Seller,
            action: "release funds",
        };
        assert!(matches!(transition_error(role_err), AppError::Forbidden));

        let status_err = TransitionError::IllegalFrom {
            action: "release funds",
            current: EscrowStatus::Released,
        };
        match transition_error(status_err) {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Cannot release funds for escrow in status 'released'")
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }
}
