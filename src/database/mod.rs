pub mod repos;
pub mod sqlite;

pub use repos::{AuditRepo, DocumentRepo, IdentityRepo, KycRequestRepo};
pub use sqlite::SqliteDatabase;
