mod common;

use chrono::Duration;
use common::TestLedger;
use digital_identity::errors::AppError;
use digital_identity::models::{AuditAction, DocType, IdentityStatus, VerificationLevel};
use digital_identity::services::IdentityService;
use digital_identity::utils::crypto::BiometricHasher;
use uuid::Uuid;

#[tokio::test]
async fn test_create_identity_defaults() {
    let ledger = TestLedger::new().await;
    let identity = ledger
        .identities
        .create_identity("Alice Smith", "alice@example.com", Some("fingerprint-scan"))
        .await
        .unwrap();

    assert_eq!(identity.status, IdentityStatus::Active);
    assert_eq!(identity.verification_level, VerificationLevel::Unverified);
    assert_eq!(identity.biometric_hash, Some(BiometricHasher::hash("fingerprint-scan")));
    assert!(identity.expires_at > identity.issued_at);

    let stored = ledger.identities.get_identity(&identity.identity_id).await.unwrap();
    assert_eq!(stored.holder_name, "Alice Smith");
    assert_eq!(stored.holder_email, "alice@example.com");
    assert_eq!(stored.biometric_hash, identity.biometric_hash);

    let trail = ledger.audit.get_audit_trail(&identity.identity_id).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::CreateIdentity.as_str());
}

#[tokio::test]
async fn test_duplicate_and_invalid_email_rejected() {
    let ledger = TestLedger::new().await;
    ledger.identity("Bob Jones", "bob@example.com").await;

    let dup = ledger.identities.create_identity("Robert Jones", "bob@example.com", None).await;
    assert!(matches!(dup, Err(AppError::ValidationError(_))));

    let bad = ledger.identities.create_identity("Bob Two", "not-an-email", None).await;
    assert!(matches!(bad, Err(AppError::ValidationError(_))));

    let blank = ledger.identities.create_identity("   ", "blank@example.com", None).await;
    assert!(matches!(blank, Err(AppError::ValidationError(_))));

    // Rejected creations leave no trace in the log.
    assert_eq!(ledger.audit.get_full_log().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_suspend_and_reactivate() {
    let ledger = TestLedger::new().await;
    let id = ledger.identity("Carol White", "carol@example.com").await.identity_id;

    let err = ledger.identities.reactivate_identity(&id).await.unwrap_err();
    assert!(err.is_invalid_state());

    let suspended = ledger.identities.suspend_identity(&id, "fraud review").await.unwrap();
    assert_eq!(suspended.status, IdentityStatus::Suspended);
    assert!(ledger.identities.suspend_identity(&id, "again").await.unwrap_err().is_invalid_state());

    let active = ledger.identities.reactivate_identity(&id).await.unwrap();
    assert_eq!(active.status, IdentityStatus::Active);
    assert_eq!(
        ledger.identities.get_identity(&id).await.unwrap().status,
        IdentityStatus::Active
    );
}

#[tokio::test]
async fn test_revoke_is_terminal_and_repeatable() {
    let ledger = TestLedger::new().await;
    let id = ledger.identity("Dan Gray", "dan@example.com").await.identity_id;
    ledger.identities.suspend_identity(&id, "pending review").await.unwrap();

    let revoked = ledger.identities.revoke_identity(&id, "confirmed fraud").await.unwrap();
    assert_eq!(revoked.status, IdentityStatus::Revoked);
    let again = ledger.identities.revoke_identity(&id, "duplicate request").await.unwrap();
    assert_eq!(again.status, IdentityStatus::Revoked);

    assert!(ledger.identities.reactivate_identity(&id).await.unwrap_err().is_invalid_state());
    assert!(ledger.identities.suspend_identity(&id, "x").await.unwrap_err().is_invalid_state());

    let revokes = ledger
        .audit
        .get_audit_trail(&id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::RevokeIdentity.as_str())
        .count();
    assert_eq!(revokes, 2);
}

#[tokio::test]
async fn test_expire_sweep() {
    let ledger = TestLedger::new().await;
    let stale = ledger.expired_identities();
    let current = ledger.identity("Eve Current", "eve@example.com").await.identity_id;
    let old = stale.create_identity("Oscar Old", "oscar@example.com", None).await.unwrap().identity_id;
    let old_revoked = stale.create_identity("Rick Revoked", "rick@example.com", None).await.unwrap().identity_id;
    ledger.identities.revoke_identity(&old_revoked, "closed").await.unwrap();

    assert_eq!(ledger.identities.expire_identities().await.unwrap(), 1);
    assert_eq!(ledger.identities.get_identity(&old).await.unwrap().status, IdentityStatus::Expired);
    assert_eq!(ledger.identities.get_identity(&current).await.unwrap().status, IdentityStatus::Active);
    assert_eq!(
        ledger.identities.get_identity(&old_revoked).await.unwrap().status,
        IdentityStatus::Revoked
    );

    let log = ledger.audit.get_full_log().await.unwrap();
    let sweep = log.last().unwrap();
    assert_eq!(sweep.action, AuditAction::ExpireIdentities.as_str());
    assert_eq!(sweep.identity_id, None);
    assert!(sweep.details.contains(&old.to_string()));

    // Expired identities stay expired and cannot be revoked.
    assert_eq!(ledger.identities.expire_identities().await.unwrap(), 0);
    assert!(ledger.identities.revoke_identity(&old, "late").await.unwrap_err().is_invalid_state());
    assert!(ledger.identities.suspend_identity(&old, "late").await.unwrap_err().is_invalid_state());
}

#[tokio::test]
async fn test_audit_log_grows_one_entry_per_mutation() {
    let ledger = TestLedger::new().await;
    let id = ledger.identity("Gina Log", "gina@example.com").await.identity_id;
    let doc = ledger.document(&id, DocType::Passport).await;
    ledger.documents.verify_document(&id, &doc.doc_id).await.unwrap();
    let request = ledger.kyc.initiate_kyc(&id, VerificationLevel::Basic).await.unwrap();
    ledger.kyc.process_kyc(&request.request_id).await.unwrap();
    ledger.identities.suspend_identity(&id, "check").await.unwrap();
    ledger.identities.reactivate_identity(&id).await.unwrap();
    ledger.identities.revoke_identity(&id, "done").await.unwrap();

    // Reads add nothing.
    ledger.identities.check_verification_level(&id).await.unwrap();
    ledger.reports.generate_identity_report(&id).await.unwrap();

    let actions: Vec<String> = ledger
        .audit
        .get_audit_trail(&id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    let expected: Vec<String> = [
        AuditAction::CreateIdentity,
        AuditAction::SubmitDocument,
        AuditAction::VerifyDocument,
        AuditAction::InitiateKyc,
        AuditAction::ProcessKyc,
        AuditAction::SuspendIdentity,
        AuditAction::ReactivateIdentity,
        AuditAction::RevokeIdentity,
    ]
    .iter()
    .map(|a| a.as_str().to_string())
    .collect();
    assert_eq!(actions, expected);
    assert_eq!(ledger.audit.get_full_log().await.unwrap().len(), expected.len());
}

#[tokio::test]
async fn test_document_errors() {
    let ledger = TestLedger::new().await;
    let owner = ledger.identity("Hal Owner", "hal@example.com").await.identity_id;
    let other = ledger.identity("Ivy Other", "ivy@example.com").await.identity_id;
    let doc = ledger.document(&owner, DocType::License).await;
    let expiry = chrono::NaiveDate::from_ymd_opt(2030, 6, 30).unwrap();

    let missing = ledger
        .documents
        .submit_document(&Uuid::new_v4(), DocType::Passport, "P1", "US", expiry)
        .await;
    assert!(missing.unwrap_err().is_not_found());

    let bad_country = ledger
        .documents
        .submit_document(&owner, DocType::Passport, "P1", "U5", expiry)
        .await;
    assert!(matches!(bad_country, Err(AppError::ValidationError(_))));

    // A document can only be verified through its own identity.
    assert!(ledger.documents.verify_document(&other, &doc.doc_id).await.unwrap_err().is_not_found());

    let verified = ledger.documents.verify_document(&owner, &doc.doc_id).await.unwrap();
    assert!(verified.verified);
    assert!(verified.verified_at.is_some());
    assert!(ledger.documents.verify_document(&owner, &doc.doc_id).await.unwrap_err().is_invalid_state());

    let docs = ledger.documents.get_documents(&owner).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].verified);
    assert!(ledger.documents.get_documents(&other).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_and_list() {
    let ledger = TestLedger::new().await;
    let helen = ledger.identity("Helen Troy", "helen@sparta.gr").await.identity_id;
    ledger.identity("Paris Prince", "paris@troy.org").await;
    let menelaus = ledger.identity("Menelaus", "king@sparta.gr").await.identity_id;
    ledger.identities.suspend_identity(&menelaus, "war").await.unwrap();

    assert_eq!(ledger.identities.search_identities("helen").await.unwrap().len(), 1);
    assert_eq!(ledger.identities.search_identities("troy").await.unwrap().len(), 2);
    assert_eq!(ledger.identities.search_identities("sparta.gr").await.unwrap().len(), 2);
    assert!(ledger.identities.search_identities("%").await.unwrap().is_empty());
    assert!(matches!(
        ledger.identities.search_identities("  ").await,
        Err(AppError::ValidationError(_))
    ));

    assert_eq!(ledger.identities.list_identities(None, None).await.unwrap().len(), 3);
    let suspended = ledger
        .identities
        .list_identities(Some(IdentityStatus::Suspended), None)
        .await
        .unwrap();
    assert_eq!(suspended.len(), 1);
    assert_eq!(suspended[0].identity_id, menelaus);

    let active_unverified = ledger
        .identities
        .list_identities(Some(IdentityStatus::Active), Some(VerificationLevel::Unverified))
        .await
        .unwrap();
    assert_eq!(active_unverified.len(), 2);
    assert!(active_unverified.iter().any(|i| i.identity_id == helen));
}

#[tokio::test]
async fn test_stats() {
    let ledger = TestLedger::new().await;
    let empty = ledger.identities.identity_stats().await.unwrap();
    assert_eq!(empty.total_identities, 0);
    assert_eq!(empty.verification_rate, 0.0);

    let id = ledger.identity("Jill Stats", "jill@example.com").await.identity_id;
    ledger.identity("Kurt Stats", "kurt@example.com").await;
    ledger.verified_doc(&id, DocType::Passport).await;
    ledger.document(&id, DocType::UtilityBill).await;
    ledger.verified_doc(&id, DocType::License).await;
    let request = ledger.kyc.initiate_kyc(&id, VerificationLevel::Basic).await.unwrap();
    ledger.kyc.process_kyc(&request.request_id).await.unwrap();
    ledger.kyc.initiate_kyc(&id, VerificationLevel::Enhanced).await.unwrap();

    let stats = ledger.identities.identity_stats().await.unwrap();
    assert_eq!(stats.total_identities, 2);
    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.verified_documents, 2);
    assert_eq!(stats.verification_rate, 66.67);
    assert_eq!(stats.pending_kyc_requests, 1);
    assert_eq!(stats.by_verification_level["basic"], 1);
    assert_eq!(stats.by_verification_level["unverified"], 1);
    assert_eq!(stats.by_verification_level["enhanced"], 0);
    assert_eq!(stats.by_status["active"], 2);
    assert_eq!(stats.by_status["revoked"], 0);
}

#[tokio::test]
async fn test_report_for_identity() {
    let ledger = TestLedger::new().await;
    let id = ledger.identity("Liam Report", "liam@example.com").await.identity_id;
    ledger.verified_doc(&id, DocType::Passport).await;
    let request = ledger.kyc.initiate_kyc(&id, VerificationLevel::Basic).await.unwrap();
    ledger.kyc.process_kyc(&request.request_id).await.unwrap();

    let report = ledger.reports.generate_identity_report(&id).await.unwrap();
    assert!(report.contains("DIGITAL IDENTITY REPORT"));
    assert!(report.contains("Liam Report"));
    assert!(report.contains("liam@example.com"));
    assert!(report.contains("passport"));

    assert!(ledger
        .reports
        .generate_identity_report(&Uuid::new_v4())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_returned_records_match_stored_rows() {
    let ledger = TestLedger::new().await;
    let created = ledger.identity("Nina Exact", "nina@example.com").await;
    assert_eq!(ledger.identities.get_identity(&created.identity_id).await.unwrap(), created);

    let id = created.identity_id;
    let verified = ledger.verified_doc(&id, DocType::Passport).await;
    assert_eq!(ledger.documents.get_documents(&id).await.unwrap(), vec![verified]);

    let opened = ledger.kyc.initiate_kyc(&id, VerificationLevel::Basic).await.unwrap();
    assert_eq!(ledger.kyc.get_request(&opened.request_id).await.unwrap(), opened);

    let processed = ledger.kyc.process_kyc(&opened.request_id).await.unwrap();
    assert_eq!(processed.created_at, opened.created_at);
    assert_eq!(ledger.kyc.get_request(&opened.request_id).await.unwrap(), processed);
}

#[tokio::test]
async fn test_validity_beyond_timestamp_range_is_rejected() {
    let ledger = TestLedger::new().await;
    let far_future = IdentityService::new(ledger.db.clone(), Duration::days(365 * 9000));

    let err = far_future.create_identity("Zed Forever", "zed@example.com", None).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(ledger.identities.list_identities(None, None).await.unwrap().is_empty());
    assert!(ledger.audit.get_full_log().await.unwrap().is_empty());
}
