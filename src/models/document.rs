use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Passport,
    License,
    NationalId,
    UtilityBill,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Passport => "passport",
            DocType::License => "license",
            DocType::NationalId => "national_id",
            DocType::UtilityBill => "utility_bill",
        }
    }

    /// Government-issued photo documents that count as primary evidence.
    pub fn is_primary(&self) -> bool {
        matches!(self, DocType::Passport | DocType::NationalId)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "passport" => Ok(DocType::Passport),
            "license" => Ok(DocType::License),
            "national_id" => Ok(DocType::NationalId),
            "utility_bill" => Ok(DocType::UtilityBill),
            other => Err(AppError::ValidationError(format!(
                "Unknown document type '{}' (expected passport, license, national_id or utility_bill)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: Uuid,
    pub identity_id: Uuid,
    pub doc_type: DocType,
    pub number: String,
    pub issuing_country: String,
    pub expiry: NaiveDate,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(identity_id: Uuid, doc_type: DocType, number: &str, issuing_country: &str, expiry: NaiveDate) -> Self {
        Self {
            doc_id: Uuid::new_v4(),
            identity_id,
            doc_type,
            number: number.to_string(),
            issuing_country: issuing_country.to_uppercase(),
            expiry,
            verified: false,
            verified_at: None,
        }
    }
}
