use crate::database::sqlite::now;
use crate::database::{AuditRepo, DocumentRepo, IdentityRepo, KycRequestRepo, SqliteDatabase};
use crate::errors::{AppError, Result};
use crate::models::{AuditAction, AuditLogEntry, KycRequest, KycStatus, VerificationLevel};
use crate::services::kyc_evaluator::{self, KycDecision};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const APPROVED_NOTES: &str = "All documents verified and requirements met.";
pub const REJECTED_NOTES: &str = "Insufficient verified documents or requirements not met.";

pub struct KycService {
    db: Arc<SqliteDatabase>,
}

impl KycService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    /// Opens a request for `level`, freezing the identity's currently
    /// verified documents into the request.
    pub async fn initiate_kyc(&self, identity_id: &Uuid, level: VerificationLevel) -> Result<KycRequest> {
        if level == VerificationLevel::Unverified {
            return Err(AppError::ValidationError(
                "KYC can only be requested for basic, standard or enhanced".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let snapshot = DocumentRepo::verified_ids(&mut *tx, identity_id).await?;

        let request = KycRequest::new(*identity_id, level, snapshot);
        KycRequestRepo::insert(&mut *tx, &request).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                Some(*identity_id),
                AuditAction::InitiateKyc,
                format!("KYC {} requested for level {}", request.request_id, level),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(
            action = "initiate_kyc",
            identity_id = %identity_id,
            request_id = %request.request_id,
            level = %level,
            documents = request.documents_submitted.len()
        );
        Ok(request)
    }

    /// Evaluates a pending request exactly once. The request moves through
    /// PROCESSING to its final status inside one transaction.
    pub async fn process_kyc(&self, request_id: &Uuid) -> Result<KycRequest> {
        let mut tx = self.db.begin().await?;
        let mut request = KycRequestRepo::get_by_id(&mut *tx, request_id).await?;

        if request.status != KycStatus::Pending {
            warn!(action = "process_kyc_rejected", request_id = %request_id, status = %request.status);
            return Err(AppError::InvalidState(format!(
                "KYC request {} is not in pending state (status: {})",
                request_id, request.status
            )));
        }

        let now = now();
        KycRequestRepo::update_status(&mut *tx, request_id, KycStatus::Processing, "", &now).await?;

        let docs = DocumentRepo::get_many(&mut *tx, &request.documents_submitted).await?;
        let decision = if docs.len() == request.documents_submitted.len() {
            kyc_evaluator::evaluate(request.requested_level, &docs)
        } else {
            KycDecision::Rejected
        };

        let (status, notes) = match decision {
            KycDecision::Approved => {
                let identity = IdentityRepo::get_by_id(&mut *tx, &request.identity_id).await?;
                if request.requested_level > identity.verification_level {
                    IdentityRepo::update_level(&mut *tx, &request.identity_id, request.requested_level).await?;
                }
                (KycStatus::Approved, APPROVED_NOTES)
            }
            KycDecision::Rejected => (KycStatus::Rejected, REJECTED_NOTES),
        };

        KycRequestRepo::update_status(&mut *tx, request_id, status, notes, &now).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                Some(request.identity_id),
                AuditAction::ProcessKyc,
                format!("KYC {}: {}", request_id, status),
            ),
        )
        .await?;
        tx.commit().await?;

        match decision {
            KycDecision::Approved => info!(
                action = "process_kyc",
                request_id = %request_id,
                identity_id = %request.identity_id,
                level = %request.requested_level,
                status = %status
            ),
            KycDecision::Rejected => warn!(
                action = "process_kyc",
                request_id = %request_id,
                identity_id = %request.identity_id,
                level = %request.requested_level,
                status = %status
            ),
        }

        request.status = status;
        request.notes = notes.to_string();
        request.processed_at = Some(now);
        Ok(request)
    }

    pub async fn get_request(&self, request_id: &Uuid) -> Result<KycRequest> {
        let mut conn = self.db.pool().acquire().await?;
        KycRequestRepo::get_by_id(&mut *conn, request_id).await
    }

    /// Newest first.
    pub async fn get_kyc_history(&self, identity_id: &Uuid) -> Result<Vec<KycRequest>> {
        let mut tx = self.db.begin().await?;
        IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let history = KycRequestRepo::list_by_identity(&mut *tx, identity_id).await?;
        tx.commit().await?;
        Ok(history)
    }
}
