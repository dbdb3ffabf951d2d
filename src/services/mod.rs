pub mod audit_service;
pub mod document_service;
pub mod identity_service;
pub mod kyc_evaluator;
pub mod kyc_service;
pub mod report_service;

pub use audit_service::AuditService;
pub use document_service::DocumentService;
pub use identity_service::IdentityService;
pub use kyc_evaluator::KycDecision;
pub use kyc_service::KycService;
pub use report_service::ReportService;
