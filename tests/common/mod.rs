#![allow(dead_code)]

use chrono::Duration;
use digital_identity::database::SqliteDatabase;
use digital_identity::models::{DocType, Document, Identity};
use digital_identity::services::{AuditService, DocumentService, IdentityService, KycService, ReportService};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

pub struct TestLedger {
    // Keeps the database directory alive for the duration of the test.
    _dir: TempDir,
    pub db: Arc<SqliteDatabase>,
    pub identities: IdentityService,
    pub documents: DocumentService,
    pub kyc: KycService,
    pub audit: AuditService,
    pub reports: ReportService,
}

impl TestLedger {
    pub async fn new() -> Self {
        let dir = tempdir().unwrap();
        let db = Arc::new(SqliteDatabase::new(dir.path().join("identity.db")).await.unwrap());
        Self {
            identities: IdentityService::new(db.clone(), Duration::days(365 * 5)),
            documents: DocumentService::new(db.clone()),
            kyc: KycService::new(db.clone()),
            audit: AuditService::new(db.clone()),
            reports: ReportService::new(db.clone()),
            _dir: dir,
            db,
        }
    }

    /// A service over the same database whose identities are born already expired.
    pub fn expired_identities(&self) -> IdentityService {
        IdentityService::new(self.db.clone(), Duration::days(-1))
    }

    pub async fn identity(&self, name: &str, email: &str) -> Identity {
        self.identities.create_identity(name, email, None).await.unwrap()
    }

    pub async fn verified_doc(&self, identity_id: &Uuid, doc_type: DocType) -> Document {
        let doc = self.document(identity_id, doc_type).await;
        self.documents.verify_document(identity_id, &doc.doc_id).await.unwrap()
    }

    pub async fn document(&self, identity_id: &Uuid, doc_type: DocType) -> Document {
        let expiry = chrono::NaiveDate::from_ymd_opt(2031, 1, 1).unwrap();
        self.documents
            .submit_document(identity_id, doc_type, "DOC-001", "US", expiry)
            .await
            .unwrap()
    }
}
