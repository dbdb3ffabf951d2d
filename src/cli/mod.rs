mod commands;
pub use commands::*;

use crate::models::{DocType, IdentityStatus, VerificationLevel};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use uuid::Uuid;

/// Digital identity records and KYC verification
#[derive(Parser, Debug)]
#[command(name = "digital-identity")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Database file path (overrides IDENTITY_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new identity
    Create {
        name: String,
        email: String,
        /// Raw biometric data; only its SHA-256 digest is stored
        #[arg(long)]
        biometric: Option<String>,
    },

    /// Attach a document to an identity
    #[command(name = "submit-doc")]
    SubmitDoc {
        identity_id: Uuid,
        /// passport, license, national_id or utility_bill
        doc_type: DocType,
        number: String,
        /// Issuing country code (e.g. US, DEU)
        country: String,
        /// Expiry date (YYYY-MM-DD)
        expiry: String,
    },

    /// Mark a submitted document as verified
    #[command(name = "verify-doc")]
    VerifyDoc { identity_id: Uuid, doc_id: Uuid },

    /// Open a KYC request for a verification level
    Kyc {
        identity_id: Uuid,
        /// basic, standard or enhanced
        level: VerificationLevel,
    },

    /// Evaluate a pending KYC request
    #[command(name = "process-kyc")]
    ProcessKyc { request_id: Uuid },

    /// Show verification level and status of an identity
    Check { identity_id: Uuid },

    /// Revoke an identity permanently
    Revoke { identity_id: Uuid, reason: String },

    /// Suspend an active identity
    Suspend { identity_id: Uuid, reason: String },

    /// Reactivate a suspended identity
    Reactivate { identity_id: Uuid },

    /// Aggregate statistics
    Stats,

    /// Human-readable identity report
    Report { identity_id: Uuid },

    /// List identities
    List {
        #[arg(long)]
        status: Option<IdentityStatus>,
        #[arg(long)]
        level: Option<VerificationLevel>,
    },

    /// Expire active identities past their expiry date
    Expire,

    /// Search identities by name or email
    Search { query: String },

    /// List documents of an identity
    Docs { identity_id: Uuid },

    /// KYC request history of an identity
    History { identity_id: Uuid },

    /// Audit trail of an identity
    Audit { identity_id: Uuid },
}

pub struct CLI;

impl CLI {
    pub fn print_header(title: &str) {
        println!("{}", "=".repeat(50).bright_blue());
        println!("{}", format!("  {}", title).bright_yellow().bold());
        println!("{}", "=".repeat(50).bright_blue());
    }

    pub fn print_success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    pub fn print_warning(message: &str) {
        println!("{} {}", "⚠️".yellow(), message.yellow());
    }

    pub fn print_info(message: &str) {
        println!("{} {}", "ℹ️".blue(), message.blue());
    }

    pub fn print_error(message: &str) {
        eprintln!("{} {}", "❌".red(), message.red());
    }
}
