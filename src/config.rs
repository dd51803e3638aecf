use crate::error::AppError;
use crate::pipeline::services::{EvaluationSettings, PolicyConfig, StressSweepConfig};
use crate::pipeline::types::ObjectClass;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "DOCUSHIELD";

/// Application settings. Layered as: built-in defaults, optional config
/// file, then `DOCUSHIELD_<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene: SceneSettings,
    pub sweep: StressSweepConfig,
    pub detector: DetectorSettings,
    pub policy: PolicyConfig,
    pub evaluation: EvaluationSettings,
    pub audit: AuditSettings,
    pub execution: ExecutionSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub seed: u64,
    pub sensitive_classes: Vec<ObjectClass>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            seed: 11,
            sensitive_classes: ObjectClass::SENSITIVE.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub path: PathBuf,
    pub active_app: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("artifacts/audit_log.jsonl"),
            active_app: "virtual_office_tester".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One shared random stream consumed in sweep order.
    Sequential,
    /// Concurrent detection with per-frame random streams.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub mode: ExecutionMode,
    pub max_in_flight: usize,
    pub frame_deadline_ms: Option<u64>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_in_flight: 4,
            frame_deadline_ms: None,
        }
    }
}

impl ExecutionSettings {
    pub fn frame_deadline(&self) -> Option<Duration> {
        self.frame_deadline_ms.map(Duration::from_millis)
    }
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate().map_err(AppError::InvalidSettings)?;
        Ok(settings)
    }

    /// Rejects structurally impossible values. Policy thresholds are
    /// deliberately left unchecked.
    pub fn validate(&self) -> Result<(), String> {
        if self.scene.width == 0 || self.scene.height == 0 {
            return Err("Scene dimensions must be greater than 0".to_string());
        }

        if self.execution.max_in_flight == 0 {
            return Err("max_in_flight must be greater than 0".to_string());
        }

        if self.execution.frame_deadline_ms == Some(0) {
            return Err("frame_deadline_ms must be greater than 0 when set".to_string());
        }

        self.evaluation.validate()
    }

    pub fn with_audit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit.path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_run() {
        let settings = Settings::default();
        assert_eq!(settings.scene, SceneSettings::default());
        assert_eq!(settings.detector.seed, 11);
        assert_eq!(settings.detector.sensitive_classes.len(), 4);
        assert_eq!(settings.policy.mitigation_threshold, 0.45);
        assert_eq!(settings.evaluation.peak_memory_mb, 220.0);
        assert_eq!(settings.sweep.combination_count(), 243);
        assert_eq!(settings.execution.mode, ExecutionMode::Sequential);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[policy]
sharing_active = true
mitigation_threshold = 1.5

[sweep]
lighting = [1.0]

[detector]
sensitive_classes = ["document", "whiteboard"]

[execution]
mode = "parallel"
frame_deadline_ms = 250
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert!(settings.policy.sharing_active);
        // Out-of-range thresholds are accepted as-is.
        assert_eq!(settings.policy.mitigation_threshold, 1.5);
        assert_eq!(settings.policy.sharing_threshold, 0.30);
        assert_eq!(settings.sweep.lighting, vec![1.0]);
        assert_eq!(settings.sweep.combination_count(), 81);
        assert_eq!(
            settings.detector.sensitive_classes,
            vec![ObjectClass::Document, ObjectClass::Whiteboard]
        );
        assert_eq!(settings.execution.mode, ExecutionMode::Parallel);
        assert_eq!(
            settings.execution.frame_deadline(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(settings.scene.seed, 7);
    }

    #[test]
    fn test_validation_rejects_impossible_values() {
        let mut settings = Settings::default();
        settings.scene.width = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.execution.max_in_flight = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.execution.frame_deadline_ms = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[policy]
sharing_active = false
mitigation_threshold = 0.6

[execution]
mode = "sequential"
"#
        )
        .unwrap();

        // Environment is process-wide; these values agree with what the
        // other file-based test expects.
        std::env::set_var("DOCUSHIELD_POLICY__SHARING_ACTIVE", "true");
        std::env::set_var("DOCUSHIELD_EXECUTION__MODE", "parallel");
        let loaded = Settings::load(Some(file.path()));
        std::env::remove_var("DOCUSHIELD_POLICY__SHARING_ACTIVE");
        std::env::remove_var("DOCUSHIELD_EXECUTION__MODE");

        let settings = loaded.unwrap();
        assert!(settings.policy.sharing_active);
        assert_eq!(settings.execution.mode, ExecutionMode::Parallel);
        // Keys without an env var keep the file value.
        assert_eq!(settings.policy.mitigation_threshold, 0.6);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/docushield.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
