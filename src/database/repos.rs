//! Row-level access to the four ledger tables.
//!
//! Every function takes a plain connection so callers decide the
//! transaction boundary.

use crate::database::sqlite::{format_timestamp, parse_date, parse_timestamp, parse_uuid};
use crate::errors::{AppError, Result};
use crate::models::{
    AuditLogEntry, DocType, Document, Identity, IdentityStatus, KycRequest, KycStatus, VerificationLevel,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// Identities
// ============================================================================

pub struct IdentityRepo;

impl IdentityRepo {
    pub async fn insert(conn: &mut SqliteConnection, identity: &Identity) -> Result<()> {
        let query = r#"
            INSERT INTO identities
                (identity_id, holder_name, holder_email, biometric_hash,
                 verification_level, status, issued_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        sqlx::query(query)
            .bind(identity.identity_id.to_string())
            .bind(&identity.holder_name)
            .bind(&identity.holder_email)
            .bind(&identity.biometric_hash)
            .bind(identity.verification_level.as_str())
            .bind(identity.status.as_str())
            .bind(format_timestamp(&identity.issued_at))
            .bind(format_timestamp(&identity.expires_at))
            .execute(&mut *conn)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::ValidationError(format!(
                    "An identity with email {} already exists",
                    identity.holder_email
                )),
                _ => AppError::DatabaseError(format!("Failed to create identity: {}", e)),
            })?;

        Ok(())
    }

    pub async fn get_by_id(conn: &mut SqliteConnection, identity_id: &Uuid) -> Result<Identity> {
        let row = sqlx::query("SELECT * FROM identities WHERE identity_id = ?1")
            .bind(identity_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => identity_from_row(&row),
            None => Err(AppError::not_found("Identity", identity_id)),
        }
    }

    pub async fn update_status(conn: &mut SqliteConnection, identity_id: &Uuid, status: IdentityStatus) -> Result<()> {
        let result = sqlx::query("UPDATE identities SET status = ?1 WHERE identity_id = ?2")
            .bind(status.as_str())
            .bind(identity_id.to_string())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Identity", identity_id));
        }
        Ok(())
    }

    pub async fn update_level(conn: &mut SqliteConnection, identity_id: &Uuid, level: VerificationLevel) -> Result<()> {
        let result = sqlx::query("UPDATE identities SET verification_level = ?1 WHERE identity_id = ?2")
            .bind(level.as_str())
            .bind(identity_id.to_string())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Identity", identity_id));
        }
        Ok(())
    }

    pub async fn list(
        conn: &mut SqliteConnection,
        status: Option<IdentityStatus>,
        level: Option<VerificationLevel>,
    ) -> Result<Vec<Identity>> {
        let mut query = String::from("SELECT * FROM identities WHERE 1=1");
        if status.is_some() {
            query.push_str(" AND status = ?");
        }
        if level.is_some() {
            query.push_str(" AND verification_level = ?");
        }
        query.push_str(" ORDER BY issued_at ASC, rowid ASC");

        let mut q = sqlx::query(&query);
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }
        if let Some(level) = level {
            q = q.bind(level.as_str());
        }

        let rows = q.fetch_all(&mut *conn).await?;
        rows.iter().map(identity_from_row).collect()
    }

    /// Case-insensitive substring match on holder name or email.
    pub async fn search(conn: &mut SqliteConnection, needle: &str) -> Result<Vec<Identity>> {
        let pattern = format!("%{}%", escape_like(needle));
        let rows = sqlx::query(
            r#"
            SELECT * FROM identities
            WHERE holder_name LIKE ?1 ESCAPE '\' OR holder_email LIKE ?1 ESCAPE '\'
            ORDER BY issued_at ASC, rowid ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(identity_from_row).collect()
    }

    /// Moves every ACTIVE identity whose expiry lies before `now` to EXPIRED
    /// and returns the affected ids.
    pub async fn expire_active_before(conn: &mut SqliteConnection, now: &DateTime<Utc>) -> Result<Vec<Uuid>> {
        let cutoff = format_timestamp(now);
        let rows =
            sqlx::query("SELECT identity_id FROM identities WHERE expires_at < ?1 AND status = ?2 ORDER BY rowid")
                .bind(&cutoff)
                .bind(IdentityStatus::Active.as_str())
                .fetch_all(&mut *conn)
                .await?;

        let ids = rows
            .iter()
            .map(|row| parse_uuid(&row.try_get::<String, _>("identity_id")?, "identity_id"))
            .collect::<Result<Vec<_>>>()?;

        sqlx::query("UPDATE identities SET status = ?1 WHERE expires_at < ?2 AND status = ?3")
            .bind(IdentityStatus::Expired.as_str())
            .bind(&cutoff)
            .bind(IdentityStatus::Active.as_str())
            .execute(&mut *conn)
            .await?;

        Ok(ids)
    }

    pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM identities")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.try_get("count")?)
    }

    pub async fn count_by_level(conn: &mut SqliteConnection) -> Result<BTreeMap<String, i64>> {
        let mut counts: BTreeMap<String, i64> = VerificationLevel::ALL
            .iter()
            .map(|level| (level.as_str().to_string(), 0))
            .collect();

        let rows =
            sqlx::query("SELECT verification_level, COUNT(*) AS count FROM identities GROUP BY verification_level")
                .fetch_all(&mut *conn)
                .await?;
        for row in rows {
            counts.insert(row.try_get("verification_level")?, row.try_get("count")?);
        }
        Ok(counts)
    }

    pub async fn count_by_status(conn: &mut SqliteConnection) -> Result<BTreeMap<String, i64>> {
        let mut counts: BTreeMap<String, i64> = IdentityStatus::ALL
            .iter()
            .map(|status| (status.as_str().to_string(), 0))
            .collect();

        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM identities GROUP BY status")
            .fetch_all(&mut *conn)
            .await?;
        for row in rows {
            counts.insert(row.try_get("status")?, row.try_get("count")?);
        }
        Ok(counts)
    }
}

fn identity_from_row(row: &SqliteRow) -> Result<Identity> {
    Ok(Identity {
        identity_id: parse_uuid(&row.try_get::<String, _>("identity_id")?, "identity_id")?,
        holder_name: row.try_get("holder_name")?,
        holder_email: row.try_get("holder_email")?,
        biometric_hash: row.try_get("biometric_hash")?,
        verification_level: row.try_get::<String, _>("verification_level")?.parse()?,
        status: row.try_get::<String, _>("status")?.parse()?,
        issued_at: parse_timestamp(&row.try_get::<String, _>("issued_at")?, "issued_at")?,
        expires_at: parse_timestamp(&row.try_get::<String, _>("expires_at")?, "expires_at")?,
    })
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ============================================================================
// Documents
// ============================================================================

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn insert(conn: &mut SqliteConnection, doc: &Document) -> Result<()> {
        let query = r#"
            INSERT INTO documents
                (doc_id, identity_id, doc_type, number, issuing_country, expiry, verified, verified_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        sqlx::query(query)
            .bind(doc.doc_id.to_string())
            .bind(doc.identity_id.to_string())
            .bind(doc.doc_type.as_str())
            .bind(&doc.number)
            .bind(&doc.issuing_country)
            .bind(doc.expiry.format("%Y-%m-%d").to_string())
            .bind(doc.verified)
            .bind(doc.verified_at.as_ref().map(format_timestamp))
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to store document: {}", e)))?;

        Ok(())
    }

    /// Fetches a document only if it belongs to `identity_id`.
    pub async fn get_for_identity(conn: &mut SqliteConnection, identity_id: &Uuid, doc_id: &Uuid) -> Result<Document> {
        let row = sqlx::query("SELECT * FROM documents WHERE doc_id = ?1 AND identity_id = ?2")
            .bind(doc_id.to_string())
            .bind(identity_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => document_from_row(&row),
            None => Err(AppError::not_found("Document", format!("{} for identity {}", doc_id, identity_id))),
        }
    }

    pub async fn mark_verified(conn: &mut SqliteConnection, doc_id: &Uuid, verified_at: &DateTime<Utc>) -> Result<()> {
        let result = sqlx::query("UPDATE documents SET verified = TRUE, verified_at = ?1 WHERE doc_id = ?2")
            .bind(format_timestamp(verified_at))
            .bind(doc_id.to_string())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Document", doc_id));
        }
        Ok(())
    }

    pub async fn list_by_identity(conn: &mut SqliteConnection, identity_id: &Uuid) -> Result<Vec<Document>> {
        let rows = sqlx::query("SELECT * FROM documents WHERE identity_id = ?1 ORDER BY rowid ASC")
            .bind(identity_id.to_string())
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(document_from_row).collect()
    }

    pub async fn verified_ids(conn: &mut SqliteConnection, identity_id: &Uuid) -> Result<Vec<Uuid>> {
        let rows =
            sqlx::query("SELECT doc_id FROM documents WHERE identity_id = ?1 AND verified = TRUE ORDER BY rowid ASC")
                .bind(identity_id.to_string())
                .fetch_all(&mut *conn)
                .await?;

        rows.iter()
            .map(|row| parse_uuid(&row.try_get::<String, _>("doc_id")?, "doc_id"))
            .collect()
    }

    pub async fn get_many(conn: &mut SqliteConnection, doc_ids: &[Uuid]) -> Result<Vec<Document>> {
        if doc_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; doc_ids.len()].join(",");
        let query = format!("SELECT * FROM documents WHERE doc_id IN ({}) ORDER BY rowid ASC", placeholders);

        let mut q = sqlx::query(&query);
        for id in doc_ids {
            q = q.bind(id.to_string());
        }

        let rows = q.fetch_all(&mut *conn).await?;
        rows.iter().map(document_from_row).collect()
    }

    /// Returns `(total, verified)` across all identities.
    pub async fn counts(conn: &mut SqliteConnection) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total, COALESCE(SUM(CASE WHEN verified THEN 1 ELSE 0 END), 0) AS verified
            FROM documents
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;
        Ok((row.try_get("total")?, row.try_get("verified")?))
    }
}

fn document_from_row(row: &SqliteRow) -> Result<Document> {
    Ok(Document {
        doc_id: parse_uuid(&row.try_get::<String, _>("doc_id")?, "doc_id")?,
        identity_id: parse_uuid(&row.try_get::<String, _>("identity_id")?, "identity_id")?,
        doc_type: row.try_get::<String, _>("doc_type")?.parse::<DocType>()?,
        number: row.try_get("number")?,
        issuing_country: row.try_get("issuing_country")?,
        expiry: parse_date(&row.try_get::<String, _>("expiry")?, "expiry")?,
        verified: row.try_get("verified")?,
        verified_at: row
            .try_get::<Option<String>, _>("verified_at")?
            .map(|s| parse_timestamp(&s, "verified_at"))
            .transpose()?,
    })
}

// ============================================================================
// KYC requests
// ============================================================================

pub struct KycRequestRepo;

impl KycRequestRepo {
    pub async fn insert(conn: &mut SqliteConnection, request: &KycRequest) -> Result<()> {
        let query = r#"
            INSERT INTO kyc_requests
                (request_id, identity_id, requested_level, documents_submitted, status, notes, processed_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        let snapshot = serde_json::to_string(&request.documents_submitted)?;

        sqlx::query(query)
            .bind(request.request_id.to_string())
            .bind(request.identity_id.to_string())
            .bind(request.requested_level.as_str())
            .bind(snapshot)
            .bind(request.status.as_str())
            .bind(&request.notes)
            .bind(request.processed_at.as_ref().map(format_timestamp))
            .bind(format_timestamp(&request.created_at))
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create KYC request: {}", e)))?;

        Ok(())
    }

    pub async fn get_by_id(conn: &mut SqliteConnection, request_id: &Uuid) -> Result<KycRequest> {
        let row = sqlx::query("SELECT * FROM kyc_requests WHERE request_id = ?1")
            .bind(request_id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => kyc_request_from_row(&row),
            None => Err(AppError::not_found("KYC request", request_id)),
        }
    }

    /// The snapshot column is deliberately absent: it is written once on insert.
    pub async fn update_status(
        conn: &mut SqliteConnection,
        request_id: &Uuid,
        status: KycStatus,
        notes: &str,
        processed_at: &DateTime<Utc>,
    ) -> Result<()> {
        let result =
            sqlx::query("UPDATE kyc_requests SET status = ?1, notes = ?2, processed_at = ?3 WHERE request_id = ?4")
                .bind(status.as_str())
                .bind(notes)
                .bind(format_timestamp(processed_at))
                .bind(request_id.to_string())
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("KYC request", request_id));
        }
        Ok(())
    }

    /// Newest first.
    pub async fn list_by_identity(conn: &mut SqliteConnection, identity_id: &Uuid) -> Result<Vec<KycRequest>> {
        let rows = sqlx::query("SELECT * FROM kyc_requests WHERE identity_id = ?1 ORDER BY created_at DESC, rowid DESC")
            .bind(identity_id.to_string())
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(kyc_request_from_row).collect()
    }

    pub async fn count_open(conn: &mut SqliteConnection) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM kyc_requests WHERE status IN (?1, ?2)")
            .bind(KycStatus::Pending.as_str())
            .bind(KycStatus::Processing.as_str())
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.try_get("count")?)
    }
}

fn kyc_request_from_row(row: &SqliteRow) -> Result<KycRequest> {
    let snapshot: String = row.try_get("documents_submitted")?;
    Ok(KycRequest {
        request_id: parse_uuid(&row.try_get::<String, _>("request_id")?, "request_id")?,
        identity_id: parse_uuid(&row.try_get::<String, _>("identity_id")?, "identity_id")?,
        requested_level: row.try_get::<String, _>("requested_level")?.parse()?,
        documents_submitted: serde_json::from_str(&snapshot)?,
        status: row.try_get::<String, _>("status")?.parse()?,
        notes: row.try_get("notes")?,
        processed_at: row
            .try_get::<Option<String>, _>("processed_at")?
            .map(|s| parse_timestamp(&s, "processed_at"))
            .transpose()?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

// ============================================================================
// Audit log
// ============================================================================

pub struct AuditRepo;

impl AuditRepo {
    pub async fn append(conn: &mut SqliteConnection, entry: &AuditLogEntry) -> Result<()> {
        let query = r#"
            INSERT INTO audit_log (log_id, identity_id, action, details, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
        "#;
        sqlx::query(query)
            .bind(entry.log_id.to_string())
            .bind(entry.identity_id.map(|id| id.to_string()))
            .bind(&entry.action)
            .bind(&entry.details)
            .bind(format_timestamp(&entry.timestamp))
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to write audit entry: {}", e)))?;
        Ok(())
    }

    /// Oldest first; insertion order breaks timestamp ties.
    pub async fn list_by_identity(conn: &mut SqliteConnection, identity_id: &Uuid) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query("SELECT * FROM audit_log WHERE identity_id = ?1 ORDER BY timestamp ASC, rowid ASC")
            .bind(identity_id.to_string())
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(audit_entry_from_row).collect()
    }

    pub async fn list_all(conn: &mut SqliteConnection) -> Result<Vec<AuditLogEntry>> {
        let rows = sqlx::query("SELECT * FROM audit_log ORDER BY timestamp ASC, rowid ASC")
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(audit_entry_from_row).collect()
    }
}

fn audit_entry_from_row(row: &SqliteRow) -> Result<AuditLogEntry> {
    Ok(AuditLogEntry {
        log_id: parse_uuid(&row.try_get::<String, _>("log_id")?, "log_id")?,
        identity_id: row
            .try_get::<Option<String>, _>("identity_id")?
            .map(|s| parse_uuid(&s, "identity_id"))
            .transpose()?,
        action: row.try_get("action")?,
        details: row.try_get("details")?,
        timestamp: parse_timestamp(&row.try_get::<String, _>("timestamp")?, "timestamp")?,
    })
}
