use std::path::PathBuf;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Failed to prepare audit log directory {path}: {source}")]
    AuditSetup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to append audit event to {path}: {source}")]
    AuditWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Detection worker failed for {frame_id}: {reason}")]
    Worker { frame_id: String, reason: String },
}
