use crate::database::sqlite::now;
use crate::database::{AuditRepo, DocumentRepo, IdentityRepo, KycRequestRepo, SqliteDatabase};
use crate::errors::{AppError, Result};
use crate::models::{
    AuditAction, AuditLogEntry, Identity, IdentityStats, IdentityStatus, VerificationLevel, VerificationSummary,
};
use crate::utils::crypto::BiometricHasher;
use crate::utils::validation::Validator;
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct IdentityService {
    db: Arc<SqliteDatabase>,
    validity: Duration,
}

impl IdentityService {
    pub fn new(db: Arc<SqliteDatabase>, validity: Duration) -> Self {
        Self { db, validity }
    }

    pub async fn create_identity(&self, name: &str, email: &str, biometric_data: Option<&str>) -> Result<Identity> {
        Validator::validate_holder_name(name)?;
        Validator::validate_email(email)?;

        let biometric_hash = biometric_data.map(BiometricHasher::hash);
        let identity = Identity::new(name.trim(), email, biometric_hash, self.validity)?;

        let mut tx = self.db.begin().await?;
        IdentityRepo::insert(&mut *tx, &identity).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                Some(identity.identity_id),
                AuditAction::CreateIdentity,
                format!("Created identity for {}", email),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(action = "create_identity", identity_id = %identity.identity_id, email = %email);
        Ok(identity)
    }

    pub async fn get_identity(&self, identity_id: &Uuid) -> Result<Identity> {
        let mut conn = self.db.pool().acquire().await?;
        IdentityRepo::get_by_id(&mut *conn, identity_id).await
    }

    pub async fn check_verification_level(&self, identity_id: &Uuid) -> Result<VerificationSummary> {
        let mut tx = self.db.begin().await?;
        let identity = IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let documents = DocumentRepo::list_by_identity(&mut *tx, identity_id).await?;
        let requests = KycRequestRepo::list_by_identity(&mut *tx, identity_id).await?;
        tx.commit().await?;

        Ok(VerificationSummary {
            identity_id: identity.identity_id,
            holder_name: identity.holder_name,
            holder_email: identity.holder_email,
            verification_level: identity.verification_level,
            status: identity.status,
            issued_at: identity.issued_at,
            expires_at: identity.expires_at,
            total_documents: documents.len(),
            verified_documents: documents.iter().filter(|d| d.verified).count(),
            pending_kyc_requests: requests.iter().filter(|r| r.status.is_open()).count(),
            last_kyc_status: requests.first().map(|r| r.status),
        })
    }

    pub async fn list_identities(
        &self,
        status: Option<IdentityStatus>,
        level: Option<VerificationLevel>,
    ) -> Result<Vec<Identity>> {
        let mut conn = self.db.pool().acquire().await?;
        IdentityRepo::list(&mut *conn, status, level).await
    }

    pub async fn search_identities(&self, query: &str) -> Result<Vec<Identity>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::ValidationError("Search query cannot be empty".to_string()));
        }
        let mut conn = self.db.pool().acquire().await?;
        IdentityRepo::search(&mut *conn, query).await
    }

    pub async fn identity_stats(&self) -> Result<IdentityStats> {
        let mut tx = self.db.begin().await?;
        let total_identities = IdentityRepo::count(&mut *tx).await?;
        let by_verification_level = IdentityRepo::count_by_level(&mut *tx).await?;
        let by_status = IdentityRepo::count_by_status(&mut *tx).await?;
        let pending_kyc_requests = KycRequestRepo::count_open(&mut *tx).await?;
        let (total_documents, verified_documents) = DocumentRepo::counts(&mut *tx).await?;
        tx.commit().await?;

        let verification_rate = if total_documents > 0 {
            (verified_documents as f64 / total_documents as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(IdentityStats {
            total_identities,
            by_verification_level,
            by_status,
            pending_kyc_requests,
            total_documents,
            verified_documents,
            verification_rate,
        })
    }

    /// Revoking is terminal. A second revoke succeeds and leaves the identity
    /// revoked; an expired identity cannot be revoked.
    pub async fn revoke_identity(&self, identity_id: &Uuid, reason: &str) -> Result<Identity> {
        let mut tx = self.db.begin().await?;
        let mut identity = IdentityRepo::get_by_id(&mut *tx, identity_id).await?;

        if identity.status == IdentityStatus::Expired {
            warn!(action = "revoke_identity_rejected", identity_id = %identity_id, status = %identity.status);
            return Err(AppError::InvalidState(format!(
                "Identity {} is expired and cannot be revoked",
                identity_id
            )));
        }

        IdentityRepo::update_status(&mut *tx, identity_id, IdentityStatus::Revoked).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(Some(*identity_id), AuditAction::RevokeIdentity, format!("Reason: {}", reason)),
        )
        .await?;
        tx.commit().await?;

        info!(action = "revoke_identity", identity_id = %identity_id, previous_status = %identity.status);
        identity.status = IdentityStatus::Revoked;
        Ok(identity)
    }

    pub async fn suspend_identity(&self, identity_id: &Uuid, reason: &str) -> Result<Identity> {
        self.transition(
            identity_id,
            IdentityStatus::Active,
            IdentityStatus::Suspended,
            AuditAction::SuspendIdentity,
            format!("Reason: {}", reason),
        )
        .await
    }

    pub async fn reactivate_identity(&self, identity_id: &Uuid) -> Result<Identity> {
        self.transition(
            identity_id,
            IdentityStatus::Suspended,
            IdentityStatus::Active,
            AuditAction::ReactivateIdentity,
            "Identity reactivated".to_string(),
        )
        .await
    }

    async fn transition(
        &self,
        identity_id: &Uuid,
        from: IdentityStatus,
        to: IdentityStatus,
        action: AuditAction,
        details: String,
    ) -> Result<Identity> {
        let mut tx = self.db.begin().await?;
        let mut identity = IdentityRepo::get_by_id(&mut *tx, identity_id).await?;

        if identity.status != from {
            warn!(action = %action, identity_id = %identity_id, status = %identity.status, "status transition refused");
            return Err(AppError::InvalidState(format!(
                "Identity {} is {}, expected {}",
                identity_id, identity.status, from
            )));
        }

        IdentityRepo::update_status(&mut *tx, identity_id, to).await?;
        AuditRepo::append(&mut *tx, &AuditLogEntry::new(Some(*identity_id), action, details)).await?;
        tx.commit().await?;

        info!(action = %action, identity_id = %identity_id, from = %from, to = %to);
        identity.status = to;
        Ok(identity)
    }

    /// Sweeps ACTIVE identities past their expiry to EXPIRED. One audit entry
    /// records the whole sweep.
    pub async fn expire_identities(&self) -> Result<u64> {
        let now = now();
        let mut tx = self.db.begin().await?;
        let expired = IdentityRepo::expire_active_before(&mut *tx, &now).await?;

        let ids = expired.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                None,
                AuditAction::ExpireIdentities,
                format!("Expired {} identities: [{}]", expired.len(), ids),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(action = "expire_identities", count = expired.len());
        Ok(expired.len() as u64)
    }
}
