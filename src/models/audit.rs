use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::database::sqlite::now;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateIdentity,
    SubmitDocument,
    VerifyDocument,
    InitiateKyc,
    ProcessKyc,
    RevokeIdentity,
    SuspendIdentity,
    ReactivateIdentity,
    ExpireIdentities,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateIdentity => "CREATE_IDENTITY",
            AuditAction::SubmitDocument => "SUBMIT_DOCUMENT",
            AuditAction::VerifyDocument => "VERIFY_DOCUMENT",
            AuditAction::InitiateKyc => "INITIATE_KYC",
            AuditAction::ProcessKyc => "PROCESS_KYC",
            AuditAction::RevokeIdentity => "REVOKE_IDENTITY",
            AuditAction::SuspendIdentity => "SUSPEND_IDENTITY",
            AuditAction::ReactivateIdentity => "REACTIVATE_IDENTITY",
            AuditAction::ExpireIdentities => "EXPIRE_IDENTITIES",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only record of a mutating action. Sweeps that are not tied to a
/// single identity carry no `identity_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub log_id: Uuid,
    pub identity_id: Option<Uuid>,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(identity_id: Option<Uuid>, action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            identity_id,
            action: action.as_str().to_string(),
            details: details.into(),
            timestamp: now(),
        }
    }
}
