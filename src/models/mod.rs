pub mod audit;
pub mod document;
pub mod identity;
pub mod kyc;

pub use audit::{AuditAction, AuditLogEntry};
pub use document::{DocType, Document};
pub use identity::{Identity, IdentityStats, IdentityStatus, VerificationLevel, VerificationSummary};
pub use kyc::{KycRequest, KycStatus};
