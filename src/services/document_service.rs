use crate::database::sqlite::now;
use crate::database::{AuditRepo, DocumentRepo, IdentityRepo, SqliteDatabase};
use crate::errors::{AppError, Result};
use crate::models::{AuditAction, AuditLogEntry, DocType, Document};
use crate::utils::validation::Validator;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct DocumentService {
    db: Arc<SqliteDatabase>,
}

impl DocumentService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub async fn submit_document(
        &self,
        identity_id: &Uuid,
        doc_type: DocType,
        number: &str,
        country: &str,
        expiry: NaiveDate,
    ) -> Result<Document> {
        Validator::validate_document_number(number)?;
        Validator::validate_country_code(country)?;

        let doc = Document::new(*identity_id, doc_type, number.trim(), country.trim(), expiry);

        let mut tx = self.db.begin().await?;
        IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        DocumentRepo::insert(&mut *tx, &doc).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                Some(*identity_id),
                AuditAction::SubmitDocument,
                format!("Submitted {} document {}", doc_type, doc.doc_id),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(action = "submit_document", identity_id = %identity_id, doc_id = %doc.doc_id, doc_type = %doc_type);
        Ok(doc)
    }

    /// Verification happens once; there is no way back to unverified.
    pub async fn verify_document(&self, identity_id: &Uuid, doc_id: &Uuid) -> Result<Document> {
        let mut tx = self.db.begin().await?;
        let mut doc = DocumentRepo::get_for_identity(&mut *tx, identity_id, doc_id).await?;

        if doc.verified {
            warn!(
                action = "verify_document_rejected",
                identity_id = %identity_id,
                doc_id = %doc_id,
                "already verified"
            );
            return Err(AppError::InvalidState(format!("Document {} is already verified", doc_id)));
        }

        let now = now();
        DocumentRepo::mark_verified(&mut *tx, doc_id, &now).await?;
        AuditRepo::append(
            &mut *tx,
            &AuditLogEntry::new(
                Some(*identity_id),
                AuditAction::VerifyDocument,
                format!("Document {} verified", doc_id),
            ),
        )
        .await?;
        tx.commit().await?;

        info!(action = "verify_document", identity_id = %identity_id, doc_id = %doc_id);
        doc.verified = true;
        doc.verified_at = Some(now);
        Ok(doc)
    }

    pub async fn get_documents(&self, identity_id: &Uuid) -> Result<Vec<Document>> {
        let mut tx = self.db.begin().await?;
        IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let docs = DocumentRepo::list_by_identity(&mut *tx, identity_id).await?;
        tx.commit().await?;
        Ok(docs)
    }
}
