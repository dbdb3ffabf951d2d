use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::sqlite::now;
use crate::errors::AppError;
use crate::models::kyc::KycStatus;

/// Ordinal trust tier of an identity. Ordering follows the tier, so
/// `Unverified < Basic < Standard < Enhanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    Unverified,
    Basic,
    Standard,
    Enhanced,
}

impl VerificationLevel {
    pub const ALL: [VerificationLevel; 4] = [
        VerificationLevel::Unverified,
        VerificationLevel::Basic,
        VerificationLevel::Standard,
        VerificationLevel::Enhanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationLevel::Unverified => "unverified",
            VerificationLevel::Basic => "basic",
            VerificationLevel::Standard => "standard",
            VerificationLevel::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerificationLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unverified" => Ok(VerificationLevel::Unverified),
            "basic" => Ok(VerificationLevel::Basic),
            "standard" => Ok(VerificationLevel::Standard),
            "enhanced" => Ok(VerificationLevel::Enhanced),
            other => Err(AppError::ValidationError(format!(
                "Unknown verification level '{}' (expected unverified, basic, standard or enhanced)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    Active,
    Revoked,
    Expired,
    Suspended,
}

impl IdentityStatus {
    pub const ALL: [IdentityStatus; 4] = [
        IdentityStatus::Active,
        IdentityStatus::Revoked,
        IdentityStatus::Expired,
        IdentityStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityStatus::Active => "active",
            IdentityStatus::Revoked => "revoked",
            IdentityStatus::Expired => "expired",
            IdentityStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IdentityStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(IdentityStatus::Active),
            "revoked" => Ok(IdentityStatus::Revoked),
            "expired" => Ok(IdentityStatus::Expired),
            "suspended" => Ok(IdentityStatus::Suspended),
            other => Err(AppError::ValidationError(format!(
                "Unknown identity status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub identity_id: Uuid,
    pub holder_name: String,
    pub holder_email: String,
    pub biometric_hash: Option<String>,
    pub verification_level: VerificationLevel,
    pub status: IdentityStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// Fails when `validity` would put the expiry outside the four-digit
    /// years the timestamp column can hold.
    pub fn new(
        holder_name: &str,
        holder_email: &str,
        biometric_hash: Option<String>,
        validity: chrono::Duration,
    ) -> crate::errors::Result<Self> {
        let issued_at = now();
        let expires_at = issued_at
            .checked_add_signed(validity)
            .filter(|t| (0..=9999).contains(&t.year()))
            .ok_or_else(|| {
                AppError::ValidationError(format!("Identity validity of {} days is out of range", validity.num_days()))
            })?;

        Ok(Self {
            identity_id: Uuid::new_v4(),
            holder_name: holder_name.to_string(),
            holder_email: holder_email.to_string(),
            biometric_hash,
            verification_level: VerificationLevel::Unverified,
            status: IdentityStatus::Active,
            issued_at,
            expires_at,
        })
    }

    pub fn short_id(&self) -> String {
        self.identity_id.to_string().chars().take(8).collect()
    }
}

/// Point-in-time view of an identity's verification state.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub identity_id: Uuid,
    pub holder_name: String,
    pub holder_email: String,
    pub verification_level: VerificationLevel,
    pub status: IdentityStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub total_documents: usize,
    pub verified_documents: usize,
    pub pending_kyc_requests: usize,
    pub last_kyc_status: Option<KycStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityStats {
    pub total_identities: i64,
    pub by_verification_level: std::collections::BTreeMap<String, i64>,
    pub by_status: std::collections::BTreeMap<String, i64>,
    pub pending_kyc_requests: i64,
    pub total_documents: i64,
    pub verified_documents: i64,
    pub verification_rate: f64,
}
