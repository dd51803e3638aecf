use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    MitigationApplied,
    DetectionOnly,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::MitigationApplied => "mitigation_applied",
            AuditEventType::DetectionOnly => "detection_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Structured record appended to the audit log, one per processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub session_id: String,
    pub event_type: AuditEventType,
    pub active_app: String,
    pub media_saved: bool,
    pub summary: String,
    pub risk_level: RiskLevel,
    pub details: IndexMap<String, serde_json::Value>,
}

/// Builder for creating audit events
pub struct AuditEventBuilder {
    session_id: String,
    event_type: AuditEventType,
    active_app: String,
    media_saved: bool,
    summary: String,
    risk_level: RiskLevel,
    details: IndexMap<String, serde_json::Value>,
}

impl AuditEventBuilder {
    pub fn new(session_id: impl Into<String>, event_type: AuditEventType) -> Self {
        Self {
            session_id: session_id.into(),
            event_type,
            active_app: String::new(),
            media_saved: false,
            summary: String::new(),
            risk_level: RiskLevel::Low,
            details: IndexMap::new(),
        }
    }

    pub fn active_app(mut self, active_app: impl Into<String>) -> Self {
        self.active_app = active_app.into();
        self
    }

    pub fn media_saved(mut self, media_saved: bool) -> Self {
        self.media_saved = media_saved;
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn build(self) -> AuditEvent {
        AuditEvent {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            session_id: self.session_id,
            event_type: self.event_type,
            active_app: self.active_app,
            media_saved: self.media_saved,
            summary: self.summary,
            risk_level: self.risk_level,
            details: self.details,
        }
    }
}
