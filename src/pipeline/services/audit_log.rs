use crate::error::AppError;
use crate::pipeline::types::AuditEvent;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Append-only destination for audit events. Events must be persisted in
/// submission order; a failed write is returned, never swallowed.
pub trait AuditSink: Send {
    fn write_event(&mut self, event: &AuditEvent) -> Result<(), AppError>;

    fn write_many(&mut self, events: &[AuditEvent]) -> Result<(), AppError> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    /// Human-readable location reported in the run summary.
    fn location(&self) -> String;
}

/// Writes one JSON object per line to a file, creating parent directories
/// up front.
#[derive(Debug, Clone)]
pub struct JsonlAuditLogger {
    path: PathBuf,
}

impl JsonlAuditLogger {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AppError::AuditSetup {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditLogger {
    fn write_event(&mut self, event: &AuditEvent) -> Result<(), AppError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let write_err = |source| AppError::AuditWrite {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        // Single write call per line keeps records whole.
        file.write_all(line.as_bytes()).map_err(write_err)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory sink (for testing and embedding). The event list is shared so
/// callers can inspect it after handing the sink to an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_shared(&self) -> Arc<Mutex<Vec<AuditEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn write_event(&mut self, event: &AuditEvent) -> Result<(), AppError> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
