//! Document requirements per verification level.
//!
//! | level      | verified documents | extra                              |
//! |------------|--------------------|------------------------------------|
//! | basic      | >= 1               |                                    |
//! | standard   | >= 2               |                                    |
//! | enhanced   | >= 3               | one passport or national id        |
//! | unverified | never satisfied    | not a level anyone can apply for   |
//!
//! The evaluator is pure: it sees only the documents it is handed and never
//! touches storage.

use crate::models::{Document, VerificationLevel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KycDecision {
    Approved,
    Rejected,
}

impl KycDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, KycDecision::Approved)
    }
}

pub fn meets_document_requirements(level: VerificationLevel, docs: &[Document]) -> bool {
    match level {
        VerificationLevel::Basic => !docs.is_empty(),
        VerificationLevel::Standard => docs.len() >= 2,
        VerificationLevel::Enhanced => docs.len() >= 3 && docs.iter().any(|d| d.doc_type.is_primary()),
        VerificationLevel::Unverified => false,
    }
}

/// Approves only when there is at least one document, every document is
/// currently verified, and the level's count/type requirement holds.
pub fn evaluate(level: VerificationLevel, docs: &[Document]) -> KycDecision {
    let all_verified = !docs.is_empty() && docs.iter().all(|d| d.verified);
    if all_verified && meets_document_requirements(level, docs) {
        KycDecision::Approved
    } else {
        KycDecision::Rejected
    }
}
