use crate::database::{AuditRepo, IdentityRepo, SqliteDatabase};
use crate::errors::Result;
use crate::models::AuditLogEntry;
use std::sync::Arc;
use uuid::Uuid;

/// Read side of the audit log. Entries are only ever written by the
/// operation they describe, inside that operation's transaction.
pub struct AuditService {
    db: Arc<SqliteDatabase>,
}

impl AuditService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    /// Oldest first.
    pub async fn get_audit_trail(&self, identity_id: &Uuid) -> Result<Vec<AuditLogEntry>> {
        let mut tx = self.db.begin().await?;
        IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let entries = AuditRepo::list_by_identity(&mut *tx, identity_id).await?;
        tx.commit().await?;
        Ok(entries)
    }

    /// Every entry, including sweeps not tied to one identity.
    pub async fn get_full_log(&self) -> Result<Vec<AuditLogEntry>> {
        let mut conn = self.db.pool().acquire().await?;
        AuditRepo::list_all(&mut *conn).await
    }
}
