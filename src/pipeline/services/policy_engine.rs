use crate::pipeline::types::RiskAssessment;
use serde::{Deserialize, Serialize};

/// User-facing privacy policy, fixed for the duration of a sweep.
/// Values are taken as given; nothing here is range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub work_mode_enabled: bool,
    pub sharing_active: bool,
    pub mitigation_threshold: f64,
    pub sharing_threshold: f64,
    pub quick_override: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            work_mode_enabled: true,
            sharing_active: false,
            mitigation_threshold: 0.45,
            sharing_threshold: 0.30,
            quick_override: false,
        }
    }
}

pub const SHARING_STRENGTH: f64 = 0.95;
pub const WORK_MODE_STRENGTH: f64 = 0.75;
pub const IDLE_STRENGTH: f64 = 0.40;

#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn should_run_detection(&self) -> bool {
        self.config.work_mode_enabled && !self.config.quick_override
    }

    /// Inclusive threshold check; the sharing threshold applies while sharing.
    pub fn should_mitigate(&self, assessment: &RiskAssessment) -> bool {
        if self.config.quick_override {
            return false;
        }
        let threshold = if self.config.sharing_active {
            self.config.sharing_threshold
        } else {
            self.config.mitigation_threshold
        };
        assessment.risk_score >= threshold
    }

    pub fn mitigation_strength(&self) -> f64 {
        if self.config.sharing_active {
            SHARING_STRENGTH
        } else if self.config.work_mode_enabled {
            WORK_MODE_STRENGTH
        } else {
            IDLE_STRENGTH
        }
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(risk_score: f64) -> RiskAssessment {
        RiskAssessment::new(risk_score, Vec::new())
    }

    #[test]
    fn test_detection_gate() {
        let mut config = PolicyConfig::default();
        assert!(PolicyEngine::new(config.clone()).should_run_detection());

        config.quick_override = true;
        assert!(!PolicyEngine::new(config.clone()).should_run_detection());

        config.quick_override = false;
        config.work_mode_enabled = false;
        assert!(!PolicyEngine::new(config).should_run_detection());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let engine = PolicyEngine::default();
        assert!(engine.should_mitigate(&assessment(0.45)));
        assert!(!engine.should_mitigate(&assessment(0.4499)));
    }

    #[test]
    fn test_sharing_threshold_selected() {
        let engine = PolicyEngine::new(PolicyConfig {
            sharing_active: true,
            ..PolicyConfig::default()
        });
        assert!(engine.should_mitigate(&assessment(0.30)));
        assert!(!engine.should_mitigate(&assessment(0.29)));
    }

    #[test]
    fn test_quick_override_blocks_mitigation() {
        let engine = PolicyEngine::new(PolicyConfig {
            quick_override: true,
            mitigation_threshold: 0.0,
            ..PolicyConfig::default()
        });
        assert!(!engine.should_mitigate(&assessment(1.0)));
    }

    #[test]
    fn test_out_of_range_threshold_never_triggers() {
        let engine = PolicyEngine::new(PolicyConfig {
            mitigation_threshold: 1.5,
            ..PolicyConfig::default()
        });
        assert!(!engine.should_mitigate(&assessment(1.0)));
    }

    #[test]
    fn test_mitigate_monotonic_in_risk() {
        for config in [
            PolicyConfig::default(),
            PolicyConfig {
                sharing_active: true,
                ..PolicyConfig::default()
            },
            PolicyConfig {
                mitigation_threshold: 0.0,
                ..PolicyConfig::default()
            },
        ] {
            let engine = PolicyEngine::new(config);
            let scores: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
            for (i, a) in scores.iter().enumerate() {
                if !engine.should_mitigate(&assessment(*a)) {
                    continue;
                }
                for b in &scores[i..] {
                    assert!(engine.should_mitigate(&assessment(*b)));
                }
            }
        }
    }

    #[test]
    fn test_strength_precedence() {
        let sharing_and_work = PolicyEngine::new(PolicyConfig {
            sharing_active: true,
            work_mode_enabled: true,
            ..PolicyConfig::default()
        });
        assert_eq!(sharing_and_work.mitigation_strength(), SHARING_STRENGTH);

        assert_eq!(PolicyEngine::default().mitigation_strength(), WORK_MODE_STRENGTH);

        let idle = PolicyEngine::new(PolicyConfig {
            work_mode_enabled: false,
            ..PolicyConfig::default()
        });
        assert_eq!(idle.mitigation_strength(), IDLE_STRENGTH);
    }

    #[test]
    fn test_decisions_are_idempotent() {
        let engine = PolicyEngine::new(PolicyConfig {
            sharing_active: true,
            ..PolicyConfig::default()
        });
        let a = assessment(0.62);
        let first = (
            engine.should_run_detection(),
            engine.should_mitigate(&a),
            engine.mitigation_strength(),
        );
        let second = (
            engine.should_run_detection(),
            engine.should_mitigate(&a),
            engine.mitigation_strength(),
        );
        assert_eq!(first, second);
        assert_eq!(engine.config().sharing_threshold, 0.30);
    }
}
