use crate::cli::{Command, CLI};
use crate::config::AppConfig;
use crate::database::SqliteDatabase;
use crate::errors::Result;
use crate::models::{Identity, KycStatus};
use crate::services::{AuditService, DocumentService, IdentityService, KycService, ReportService};
use crate::utils::validation::Validator;
use colored::Colorize;
use std::sync::Arc;

pub async fn run_command(command: Command, config: &AppConfig) -> Result<()> {
    let db = Arc::new(SqliteDatabase::new(&config.database_path).await?);
    let result = dispatch(command, db.clone(), config).await;
    db.close().await;
    result
}

async fn dispatch(command: Command, db: Arc<SqliteDatabase>, config: &AppConfig) -> Result<()> {
    let identities = IdentityService::new(db.clone(), config.identity_validity()?);

    match command {
        Command::Create { name, email, biometric } => {
            let identity = identities.create_identity(&name, &email, biometric.as_deref()).await?;
            CLI::print_success(&format!("Created identity: {}", identity.identity_id));
        }
        Command::SubmitDoc { identity_id, doc_type, number, country, expiry } => {
            let expiry = Validator::parse_expiry_date(&expiry)?;
            let doc = DocumentService::new(db)
                .submit_document(&identity_id, doc_type, &number, &country, expiry)
                .await?;
            CLI::print_success(&format!("Submitted {} document: {}", doc.doc_type, doc.doc_id));
        }
        Command::VerifyDoc { identity_id, doc_id } => {
            let doc = DocumentService::new(db).verify_document(&identity_id, &doc_id).await?;
            CLI::print_success(&format!("Document {} verified", doc.doc_id));
        }
        Command::Kyc { identity_id, level } => {
            let request = KycService::new(db).initiate_kyc(&identity_id, level).await?;
            CLI::print_success(&format!(
                "KYC request {} opened for level {} ({} verified documents)",
                request.request_id,
                request.requested_level,
                request.documents_submitted.len()
            ));
        }
        Command::ProcessKyc { request_id } => {
            let request = KycService::new(db).process_kyc(&request_id).await?;
            let line = format!(
                "KYC {}: {} - {}",
                request.request_id,
                request.status.as_str().to_uppercase(),
                request.notes
            );
            match request.status {
                KycStatus::Approved => CLI::print_success(&line),
                _ => CLI::print_warning(&line),
            }
        }
        Command::Check { identity_id } => {
            let summary = identities.check_verification_level(&identity_id).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Revoke { identity_id, reason } => {
            identities.revoke_identity(&identity_id, &reason).await?;
            CLI::print_success(&format!("Identity {} revoked", identity_id));
        }
        Command::Suspend { identity_id, reason } => {
            identities.suspend_identity(&identity_id, &reason).await?;
            CLI::print_success(&format!("Identity {} suspended", identity_id));
        }
        Command::Reactivate { identity_id } => {
            identities.reactivate_identity(&identity_id).await?;
            CLI::print_success(&format!("Identity {} reactivated", identity_id));
        }
        Command::Stats => {
            let stats = identities.identity_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Report { identity_id } => {
            let report = ReportService::new(db).generate_identity_report(&identity_id).await?;
            println!("{}", report);
        }
        Command::List { status, level } => {
            let list = identities.list_identities(status, level).await?;
            print_identities(&list);
        }
        Command::Expire => {
            let count = identities.expire_identities().await?;
            CLI::print_info(&format!("Expired {} identities", count));
        }
        Command::Search { query } => {
            let results = identities.search_identities(&query).await?;
            print_identities(&results);
        }
        Command::Docs { identity_id } => {
            let docs = DocumentService::new(db).get_documents(&identity_id).await?;
            if docs.is_empty() {
                println!("{}", "No documents found.".yellow());
            }
            for doc in docs {
                let mark = if doc.verified { "✓".green() } else { "✗".red() };
                println!(
                    "[{}] {} {} {} ({}) exp {}",
                    mark,
                    doc.doc_id,
                    doc.doc_type.as_str().cyan(),
                    doc.number,
                    doc.issuing_country,
                    doc.expiry.format("%Y-%m-%d")
                );
            }
        }
        Command::History { identity_id } => {
            let history = KycService::new(db).get_kyc_history(&identity_id).await?;
            if history.is_empty() {
                println!("{}", "No KYC requests found.".yellow());
            }
            for request in history {
                println!(
                    "{} [{}] {} docs={} created {}",
                    request.request_id,
                    request.status.as_str().to_uppercase().bold(),
                    request.requested_level,
                    request.documents_submitted.len(),
                    request.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                if !request.notes.is_empty() {
                    println!("    {}", request.notes);
                }
            }
        }
        Command::Audit { identity_id } => {
            let trail = AuditService::new(db).get_audit_trail(&identity_id).await?;
            CLI::print_header(&format!("Audit trail for {}", identity_id));
            for entry in trail {
                println!(
                    "{} {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().blue(),
                    entry.action.cyan(),
                    entry.details
                );
            }
        }
    }

    Ok(())
}

fn print_identities(list: &[Identity]) {
    if list.is_empty() {
        println!("{}", "No identities found.".yellow());
        return;
    }
    for identity in list {
        println!(
            "{}... {} <{}> [{}] {}",
            identity.short_id(),
            identity.holder_name,
            identity.holder_email,
            identity.verification_level,
            identity.status
        );
    }
}
