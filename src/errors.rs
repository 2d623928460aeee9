//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid event type: {0}")]
    InvalidEventType(String),

    #[error("Invalid event source: {0}")]
    InvalidEventSource(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid mood: {0}")]
    InvalidMood(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    // ---------------------------
    // Session / account logic
    // ---------------------------
    #[error("Clock-out {clock_out} is earlier than clock-in {clock_in}")]
    InvalidBounds { clock_in: String, clock_out: String },

    #[error("Session {0} not found")]
    SessionNotFound(i64),

    #[error("Account '{account}' already has an open session (id {session_id})")]
    SessionAlreadyOpen { account: String, session_id: i64 },

    #[error("No open session for account '{0}'")]
    NoOpenSession(String),

    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Account '{0}' already exists")]
    AccountExists(String),

    #[error("Account '{0}' is disabled")]
    AccountInactive(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Report output
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Background tasks
    // ---------------------------
    #[error("Background task failed: {0}")]
    Task(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
