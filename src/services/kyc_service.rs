//! KYC submission tracking.
//!
//! Submissions always start `pending`; review happens in external
//! tooling, so nothing here mutates a submission after creation.

use async_trait::async_trait;
use std::sync::Arc;

use super::escrow_service::AttachmentUpload;
use crate::domain::{FilePurpose, Identity, KycSubmission, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{FileStore, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// KYC operations, seller-facing.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait KycService: Send + Sync {
    /// File a new submission with supporting documents.
    async fn submit_kyc(
        &self,
        identity: Identity,
        kyc_type: String,
        attachments: Vec<AttachmentUpload>,
    ) -> AppResult<KycSubmission>;

    /// The caller's most recent submission, if any.
    async fn kyc_status(&self, identity: Identity) -> AppResult<Option<KycSubmission>>;
}

/// Concrete implementation of KycService using Unit of Work.
pub struct KycTracker<U: UnitOfWork> {
    uow: Arc<U>,
    files: FileStore,
}

impl<U: UnitOfWork> KycTracker<U> {
    pub fn new(uow: Arc<U>, files: FileStore) -> Self {
        Self { uow, files }
    }
}

#[async_trait]
impl<U: UnitOfWork> KycService for KycTracker<U> {
    async fn submit_kyc(
        &self,
        identity: Identity,
        kyc_type: String,
        attachments: Vec<AttachmentUpload>,
    ) -> AppResult<KycSubmission> {
        identity.require_role(&[UserRole::Seller])?;

        if kyc_type.trim().is_empty() {
            return Err(AppError::validation("KYC type is required"));
        }

        // Blobs first, metadata with the submission row; failed commits
        // clean the blobs back up.
        let mut stored: Vec<(String, String)> = Vec::with_capacity(attachments.len());
        for upload in &attachments {
            let stored_name = self.files.store(&upload.file_name, &upload.bytes).await?;
            stored.push((upload.file_name.clone(), stored_name));
        }

        let user_id = identity.user_id;
        let tx_stored = stored.clone();

        let result = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let submission = ctx.kyc().create(user_id, kyc_type).await?;

                    // KYC files attach to the submission's user, not an
                    // escrow, so escrow_id stays NULL.
                    for (file_name, stored_name) in tx_stored {
                        ctx.files()
                            .record(None, file_name, stored_name, FilePurpose::Kyc)
                            .await?;
                    }

                    Ok(submission)
                })
            })
            .await;

        if result.is_err() {
            for (_, stored_name) in &stored {
                if let Err(e) = self.files.remove(stored_name).await {
                    tracing::warn!(stored_name = %stored_name, error = %e, "Orphaned blob left behind");
                }
            }
        }

        result
    }

    async fn kyc_status(&self, identity: Identity) -> AppResult<Option<KycSubmission>> {
        identity.require_role(&[UserRole::Seller])?;
        self.uow.kyc().find_latest_for_user(identity.user_id).await
    }
}
