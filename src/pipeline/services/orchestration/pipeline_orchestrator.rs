use super::frame_outcome::{FrameOutcome, FrameStatus, SweepReport};
use crate::config::{ExecutionMode, ExecutionSettings, Settings};
use crate::error::AppError;
use crate::pipeline::services::{
    AuditSink, DetectionJob, DetectionService, DetectorFactory, Evaluator, GroundTruthDetector,
    JsonlAuditLogger, OverlayMitigator, PolicyEngine, RiskDetector, StressSweepConfig,
    TimedAssessment, VirtualHomeOffice,
};
use crate::pipeline::types::{
    AuditEventBuilder, AuditEventType, Detection, Frame, ObjectClass, RiskAssessment, RiskLevel,
    RunSummary,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tower::timeout::{error::Elapsed, Timeout};
use tower::{BoxError, ServiceExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
pub const UNMITIGATED_SUMMARY: &str = "Frame processed without mitigation.";

/// Drives frames through detection, policy, mitigation and audit, then
/// hands the accumulated run to the evaluator.
pub struct PipelineOrchestrator {
    session_id: String,
    environment: VirtualHomeOffice,
    sweep_config: StressSweepConfig,
    detector: Box<dyn RiskDetector>,
    detector_factory: DetectorFactory,
    detector_seed: u64,
    policy: PolicyEngine,
    mitigator: OverlayMitigator,
    evaluator: Evaluator,
    audit: Box<dyn AuditSink>,
    active_app: String,
    peak_memory_mb: f64,
    execution: ExecutionSettings,
}

/// Index-aligned per-frame records collected during a run.
#[derive(Default)]
struct RunAccumulator {
    detections_per_frame: Vec<Vec<Detection>>,
    mitigation_applied: Vec<bool>,
    latencies_ms: Vec<f64>,
    outcomes: Vec<FrameOutcome>,
}

impl RunAccumulator {
    fn with_capacity(frames: usize) -> Self {
        Self {
            detections_per_frame: Vec::with_capacity(frames),
            mitigation_applied: Vec::with_capacity(frames),
            latencies_ms: Vec::with_capacity(frames),
            outcomes: Vec::with_capacity(frames),
        }
    }

    fn record_skipped(&mut self, frame: &Frame, status: FrameStatus) {
        self.detections_per_frame.push(Vec::new());
        self.mitigation_applied.push(false);
        self.outcomes.push(FrameOutcome::skipped(frame.frame_id.clone(), status));
    }
}

impl PipelineOrchestrator {
    pub fn builder(settings: Settings) -> PipelineOrchestratorBuilder {
        PipelineOrchestratorBuilder::new(settings)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Render the sweep, truncated to `limit_frames`, in sweep order.
    pub fn render_frames(&mut self, limit_frames: Option<usize>) -> Vec<Frame> {
        let sweep = self.environment.sweep(&self.sweep_config);
        match limit_frames {
            Some(limit) => sweep.take(limit).collect(),
            None => sweep.collect(),
        }
    }

    /// Sequential sweep with a single random stream consumed in frame order.
    pub fn run_sweep(&mut self, limit_frames: Option<usize>) -> Result<SweepReport, AppError> {
        let frames = self.render_frames(limit_frames);
        self.process_frames(&frames)
    }

    /// Sweep using the configured execution mode.
    pub async fn run_configured_sweep(
        &mut self,
        limit_frames: Option<usize>,
    ) -> Result<SweepReport, AppError> {
        let frames = self.render_frames(limit_frames);
        match self.execution.mode {
            ExecutionMode::Sequential => self.process_frames(&frames),
            ExecutionMode::Parallel => self.process_frames_parallel(frames).await,
        }
    }

    #[instrument(skip(self, frames), fields(session = %self.session_id, frames = frames.len()))]
    pub fn process_frames(&mut self, frames: &[Frame]) -> Result<SweepReport, AppError> {
        info!("Starting sequential sweep with {}", self.detector.name());
        let mut run = RunAccumulator::with_capacity(frames.len());
        let deadline = self.execution.frame_deadline();

        for frame in frames {
            if !self.policy.should_run_detection() {
                run.record_skipped(frame, FrameStatus::Skipped);
                continue;
            }

            let start = Instant::now();
            let assessment = self.detector.infer(frame);
            let elapsed = start.elapsed();

            if exceeded(deadline, elapsed) {
                warn!(
                    "{}: detection took {:?}, over deadline; treating as skipped",
                    frame.frame_id, elapsed
                );
                run.record_skipped(frame, FrameStatus::DeadlineExceeded);
                continue;
            }

            let latency_ms = elapsed.as_secs_f64() * 1000.0;
            self.settle_frame(frame, assessment, latency_ms, &mut run)?;
        }

        Ok(self.finish(frames, run))
    }

    /// Concurrent detection over the tokio blocking pool. Each frame gets its
    /// own seeded detector; results are settled in frame order.
    #[instrument(skip(self, frames), fields(session = %self.session_id, frames = frames.len()))]
    pub async fn process_frames_parallel(
        &mut self,
        frames: Vec<Frame>,
    ) -> Result<SweepReport, AppError> {
        info!(
            "Starting parallel sweep, max {} in flight",
            self.execution.max_in_flight
        );
        let frames: Vec<Arc<Frame>> = frames.into_iter().map(Arc::new).collect();
        let mut results: Vec<Option<TimedAssessment>> = (0..frames.len()).map(|_| None).collect();

        if self.policy.should_run_detection() {
            self.dispatch_detection(&frames, &mut results).await?;
        }

        let mut run = RunAccumulator::with_capacity(frames.len());
        let detection_ran = self.policy.should_run_detection();
        for (frame, result) in frames.iter().zip(results) {
            match result {
                Some(timed) => {
                    self.settle_frame(frame, timed.assessment, timed.latency_ms, &mut run)?
                }
                None if detection_ran => run.record_skipped(frame, FrameStatus::DeadlineExceeded),
                None => run.record_skipped(frame, FrameStatus::Skipped),
            }
        }

        let frames: Vec<Frame> = frames
            .into_iter()
            .map(|f| Arc::try_unwrap(f).unwrap_or_else(|shared| (*shared).clone()))
            .collect();
        Ok(self.finish(&frames, run))
    }

    async fn dispatch_detection(
        &self,
        frames: &[Arc<Frame>],
        results: &mut [Option<TimedAssessment>],
    ) -> Result<(), AppError> {
        let service = DetectionService::new(Arc::clone(&self.detector_factory), self.detector_seed);
        // Slots travel with the job into the blocking worker, so work
        // abandoned at the deadline still counts against the limit.
        let limiter = Arc::new(Semaphore::new(self.execution.max_in_flight));
        let deadline = self.execution.frame_deadline();

        let mut tasks = JoinSet::new();
        for (index, frame) in frames.iter().enumerate() {
            let service = service.clone();
            let limiter = Arc::clone(&limiter);
            let job = DetectionJob::new(index, Arc::clone(frame));
            tasks.spawn(async move {
                let result = match limiter.acquire_owned().await {
                    // The deadline covers detection only, not the wait for a slot.
                    Ok(slot) => match deadline {
                        Some(limit) => {
                            Timeout::new(service, limit)
                                .oneshot(job.with_slot(slot))
                                .await
                        }
                        None => service
                            .oneshot(job.with_slot(slot))
                            .await
                            .map_err(BoxError::from),
                    },
                    Err(closed) => Err(BoxError::from(closed)),
                };
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| AppError::Worker {
                frame_id: "unknown".to_string(),
                reason: e.to_string(),
            })?;
            match result {
                Ok(timed) => results[index] = Some(timed),
                Err(err) if err.is::<Elapsed>() => {
                    warn!(
                        "{}: detection over deadline; treating as skipped",
                        frames[index].frame_id
                    );
                }
                Err(err) => {
                    return Err(match err.downcast::<AppError>() {
                        Ok(app_error) => *app_error,
                        Err(other) => AppError::Worker {
                            frame_id: frames[index].frame_id.clone(),
                            reason: other.to_string(),
                        },
                    });
                }
            }
        }
        Ok(())
    }

    /// Policy decision, optional mitigation and one audit event for a frame
    /// whose detection completed.
    fn settle_frame(
        &mut self,
        frame: &Frame,
        assessment: RiskAssessment,
        latency_ms: f64,
        run: &mut RunAccumulator,
    ) -> Result<(), AppError> {
        run.latencies_ms.push(latency_ms);
        let should_mitigate = self.policy.should_mitigate(&assessment);

        let (mitigation, event_type, risk_level, summary) = if should_mitigate {
            let mitigation = self.mitigator.apply(
                frame,
                &assessment.detections,
                self.policy.mitigation_strength(),
            );
            let risk_level = if assessment.risk_score >= HIGH_RISK_THRESHOLD {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            let summary = mitigation.prompt.clone();
            (
                Some(mitigation),
                AuditEventType::MitigationApplied,
                risk_level,
                summary,
            )
        } else {
            (
                None,
                AuditEventType::DetectionOnly,
                RiskLevel::Low,
                UNMITIGATED_SUMMARY.to_string(),
            )
        };

        debug!(
            "{}: risk {:.3}, {} detections, {} in {:.3}ms",
            frame.frame_id,
            assessment.risk_score,
            assessment.detections.len(),
            event_type.as_str(),
            latency_ms
        );

        let event = AuditEventBuilder::new(self.session_id.clone(), event_type)
            .active_app(self.active_app.clone())
            .media_saved(false)
            .summary(summary)
            .risk_level(risk_level)
            .with_detail("frame_id", json!(frame.frame_id))
            .with_detail("risk_score", json!(round_to(assessment.risk_score, 3)))
            .with_detail("detections", serde_json::to_value(&assessment.detections)?)
            .build();
        self.audit.write_event(&event)?;

        run.detections_per_frame.push(assessment.detections.clone());
        run.mitigation_applied.push(should_mitigate);
        run.outcomes.push(FrameOutcome {
            frame_id: frame.frame_id.clone(),
            status: FrameStatus::Processed,
            assessment: Some(assessment),
            mitigation,
            latency_ms: Some(latency_ms),
        });
        Ok(())
    }

    fn finish(&self, frames: &[Frame], run: RunAccumulator) -> SweepReport {
        let evaluation = self.evaluator.compute(
            frames,
            &run.detections_per_frame,
            &run.mitigation_applied,
            &run.latencies_ms,
            self.peak_memory_mb,
        );
        let mitigation_rate = if run.mitigation_applied.is_empty() {
            0.0
        } else {
            run.mitigation_applied.iter().filter(|m| **m).count() as f64
                / run.mitigation_applied.len() as f64
        };

        info!(
            "Sweep finished: {} frames, mitigation rate {:.3}, recall {:.3}",
            frames.len(),
            mitigation_rate,
            evaluation.recall
        );

        SweepReport {
            summary: RunSummary {
                frames_processed: frames.len(),
                mitigation_rate,
                evaluation,
                audit_log: self.audit.location(),
            },
            outcomes: run.outcomes,
        }
    }
}

fn exceeded(deadline: Option<Duration>, elapsed: Duration) -> bool {
    deadline.is_some_and(|limit| elapsed > limit)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn ground_truth_factory(classes: Vec<ObjectClass>) -> DetectorFactory {
    Arc::new(move |seed| {
        Box::new(GroundTruthDetector::new(classes.iter().copied(), seed)) as Box<dyn RiskDetector>
    })
}

pub struct PipelineOrchestratorBuilder {
    settings: Settings,
    session_id: Option<String>,
    detector: Option<Box<dyn RiskDetector>>,
    detector_factory: Option<DetectorFactory>,
    audit: Option<Box<dyn AuditSink>>,
}

impl PipelineOrchestratorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            session_id: None,
            detector: None,
            detector_factory: None,
            audit: None,
        }
    }

    /// Defaults to a random UUID.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Replaces the ground-truth detector used by sequential sweeps.
    pub fn detector(mut self, detector: Box<dyn RiskDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Replaces the per-frame detector factory used by parallel sweeps.
    pub fn detector_factory(mut self, factory: DetectorFactory) -> Self {
        self.detector_factory = Some(factory);
        self
    }

    /// Defaults to a JSONL file at the configured audit path.
    pub fn audit_sink(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> Result<PipelineOrchestrator, AppError> {
        let settings = self.settings;
        settings.validate().map_err(AppError::InvalidSettings)?;

        let audit: Box<dyn AuditSink> = match self.audit {
            Some(audit) => audit,
            None => Box::new(JsonlAuditLogger::new(settings.audit.path.clone())?),
        };
        let classes = settings.detector.sensitive_classes.clone();
        let detector = self.detector.unwrap_or_else(|| {
            Box::new(GroundTruthDetector::new(
                classes.iter().copied(),
                settings.detector.seed,
            )) as Box<dyn RiskDetector>
        });
        let detector_factory = self
            .detector_factory
            .unwrap_or_else(|| ground_truth_factory(classes));

        Ok(PipelineOrchestrator {
            session_id: self
                .session_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            environment: VirtualHomeOffice::new(
                settings.scene.width,
                settings.scene.height,
                settings.scene.seed,
            ),
            sweep_config: settings.sweep,
            detector,
            detector_factory,
            detector_seed: settings.detector.seed,
            policy: PolicyEngine::new(settings.policy),
            mitigator: OverlayMitigator::new(),
            evaluator: Evaluator::new(settings.evaluation.clone()),
            audit,
            active_app: settings.audit.active_app,
            peak_memory_mb: settings.evaluation.peak_memory_mb,
            execution: settings.execution,
        })
    }
}
