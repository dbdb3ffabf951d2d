//! Digital identity records and KYC verification.
//!
//! Identities carry documents; a KYC request freezes the identity's verified
//! documents and is evaluated once against the requested level. Every
//! mutating operation runs in a single SQLite transaction together with its
//! audit log entry.

pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
