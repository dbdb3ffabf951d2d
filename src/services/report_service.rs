use crate::database::{AuditRepo, DocumentRepo, IdentityRepo, KycRequestRepo, SqliteDatabase};
use crate::errors::Result;
use crate::models::{AuditLogEntry, Document, Identity, KycRequest};
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

const RULE_WIDTH: usize = 60;
const RECENT_AUDIT_ENTRIES: usize = 5;

pub struct ReportService {
    db: Arc<SqliteDatabase>,
}

impl ReportService {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }

    pub async fn generate_identity_report(&self, identity_id: &Uuid) -> Result<String> {
        let mut tx = self.db.begin().await?;
        let identity = IdentityRepo::get_by_id(&mut *tx, identity_id).await?;
        let documents = DocumentRepo::list_by_identity(&mut *tx, identity_id).await?;
        let requests = KycRequestRepo::list_by_identity(&mut *tx, identity_id).await?;
        let audit = AuditRepo::list_by_identity(&mut *tx, identity_id).await?;
        tx.commit().await?;

        Ok(render_report(&identity, &documents, &requests, &audit))
    }
}

pub fn render_report(
    identity: &Identity,
    documents: &[Document],
    requests: &[KycRequest],
    audit: &[AuditLogEntry],
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let verified = documents.iter().filter(|d| d.verified).count();
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "DIGITAL IDENTITY REPORT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Identity ID   : {}", identity.identity_id);
    let _ = writeln!(out, "Holder Name   : {}", identity.holder_name);
    let _ = writeln!(out, "Holder Email  : {}", identity.holder_email);
    let _ = writeln!(out, "Status        : {}", identity.status.as_str().to_uppercase());
    let _ = writeln!(out, "Level         : {}", identity.verification_level.as_str().to_uppercase());
    let _ = writeln!(out, "Issued        : {}", identity.issued_at.format("%Y-%m-%d"));
    let _ = writeln!(out, "Expires       : {}", identity.expires_at.format("%Y-%m-%d"));
    let _ = writeln!(out);

    let _ = writeln!(out, "Documents ({} total, {} verified):", documents.len(), verified);
    for doc in documents {
        let mark = if doc.verified { "✓" } else { "✗" };
        let _ = writeln!(
            out,
            "  [{}] {} - {} - Exp: {}",
            mark,
            doc.doc_type,
            doc.issuing_country,
            doc.expiry.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "KYC Requests ({}):", requests.len());
    for request in requests {
        let _ = writeln!(
            out,
            "  [{}] {} - {}",
            request.status.as_str().to_uppercase(),
            request.requested_level,
            request.created_at.format("%Y-%m-%d")
        );
        if !request.notes.is_empty() {
            let _ = writeln!(out, "       Notes: {}", request.notes);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Audit Trail ({} entries):", audit.len());
    let skip = audit.len().saturating_sub(RECENT_AUDIT_ENTRIES);
    for entry in &audit[skip..] {
        let _ = writeln!(out, "  {} - {}", entry.timestamp.format("%Y-%m-%dT%H:%M:%S"), entry.action);
    }
    let _ = write!(out, "{}", rule);

    out
}
