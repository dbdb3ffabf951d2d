use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::sqlite::now;
use crate::errors::AppError;
use crate::models::identity::VerificationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Processing => "processing",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        }
    }

    /// Pending and processing requests are still open.
    pub fn is_open(&self) -> bool {
        matches!(self, KycStatus::Pending | KycStatus::Processing)
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(KycStatus::Pending),
            "processing" => Ok(KycStatus::Processing),
            "approved" => Ok(KycStatus::Approved),
            "rejected" => Ok(KycStatus::Rejected),
            other => Err(AppError::ValidationError(format!("Unknown KYC status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycRequest {
    pub request_id: Uuid,
    pub identity_id: Uuid,
    pub requested_level: VerificationLevel,
    /// Verified document ids at the moment the request was created. Never updated.
    pub documents_submitted: Vec<Uuid>,
    pub status: KycStatus,
    pub notes: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl KycRequest {
    pub fn new(identity_id: Uuid, requested_level: VerificationLevel, documents_submitted: Vec<Uuid>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            identity_id,
            requested_level,
            documents_submitted,
            status: KycStatus::Pending,
            notes: String::new(),
            processed_at: None,
            created_at: now(),
        }
    }
}
