use crate::errors::{AppError, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let database_path = database_path.as_ref();

        // Ensure the directory exists
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::DatabaseError(format!("Failed to create database directory: {}", e)))?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {}", e)))?;

        let db = Self { pool };

        // Create tables if they don't exist
        db.create_tables().await?;

        debug!(action = "database_opened", path = %database_path.display());
        Ok(db)
    }

    async fn create_tables(&self) -> Result<()> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS identities (
                identity_id        TEXT PRIMARY KEY,
                holder_name        TEXT NOT NULL,
                holder_email       TEXT UNIQUE NOT NULL,
                biometric_hash     TEXT,
                verification_level TEXT NOT NULL DEFAULT 'unverified',
                status             TEXT NOT NULL DEFAULT 'active',
                issued_at          TEXT NOT NULL,
                expires_at         TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
                doc_id          TEXT PRIMARY KEY,
                identity_id     TEXT NOT NULL,
                doc_type        TEXT NOT NULL,
                number          TEXT NOT NULL,
                issuing_country TEXT NOT NULL,
                expiry          TEXT NOT NULL,
                verified        BOOLEAN NOT NULL DEFAULT FALSE,
                verified_at     TEXT,
                FOREIGN KEY (identity_id) REFERENCES identities (identity_id)
            );

            CREATE TABLE IF NOT EXISTS kyc_requests (
                request_id          TEXT PRIMARY KEY,
                identity_id         TEXT NOT NULL,
                requested_level     TEXT NOT NULL,
                documents_submitted TEXT NOT NULL DEFAULT '[]',
                status              TEXT NOT NULL DEFAULT 'pending',
                notes               TEXT NOT NULL DEFAULT '',
                processed_at        TEXT,
                created_at          TEXT NOT NULL,
                FOREIGN KEY (identity_id) REFERENCES identities (identity_id)
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                log_id      TEXT PRIMARY KEY,
                identity_id TEXT,
                action      TEXT NOT NULL,
                details     TEXT NOT NULL DEFAULT '',
                timestamp   TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_identities_status ON identities(status);
            CREATE INDEX IF NOT EXISTS idx_identities_level ON identities(verification_level);
            CREATE INDEX IF NOT EXISTS idx_documents_identity_id ON documents(identity_id);
            CREATE INDEX IF NOT EXISTS idx_kyc_requests_identity_id ON kyc_requests(identity_id);
            CREATE INDEX IF NOT EXISTS idx_kyc_requests_status ON kyc_requests(status);
            CREATE INDEX IF NOT EXISTS idx_audit_log_identity_id ON audit_log(identity_id);
        "#;

        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens the transaction that bounds a single public operation.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Current time at the precision timestamps are stored with, so a value
/// handed back to the caller equals the one later read from the database.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
// lexicographic comparison in SQL matches chronological order.
pub(crate) fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::DatabaseError(format!("Invalid {} timestamp '{}': {}", field, value, e)))
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::DatabaseError(format!("Invalid {} date '{}': {}", field, value, e)))
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::DatabaseError(format!("Invalid {} '{}': {}", field, value, e)))
}
