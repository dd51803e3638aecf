use super::risk_detector::{frame_seed, DetectorFactory};
use crate::error::AppError;
use crate::pipeline::types::{Frame, RiskAssessment};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::OwnedSemaphorePermit;
use tower::Service;

/// One frame submitted for detection, tagged with its sweep position.
#[derive(Debug)]
pub struct DetectionJob {
    pub index: usize,
    pub frame: Arc<Frame>,
    /// Concurrency slot, held by the blocking worker until the detector
    /// returns. Callers that stop waiting do not free it early.
    pub slot: Option<OwnedSemaphorePermit>,
}

impl DetectionJob {
    pub fn new(index: usize, frame: Arc<Frame>) -> Self {
        Self {
            index,
            frame,
            slot: None,
        }
    }

    pub fn with_slot(mut self, slot: OwnedSemaphorePermit) -> Self {
        self.slot = Some(slot);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TimedAssessment {
    pub assessment: RiskAssessment,
    pub latency_ms: f64,
}

/// Tower service that runs detection for a single frame on the blocking pool.
/// Every call builds a fresh detector seeded from the frame index, so the
/// outcome does not depend on which worker picks the job up.
#[derive(Clone)]
pub struct DetectionService {
    factory: DetectorFactory,
    base_seed: u64,
}

impl DetectionService {
    pub fn new(factory: DetectorFactory, base_seed: u64) -> Self {
        Self { factory, base_seed }
    }
}

impl Service<DetectionJob> for DetectionService {
    type Response = TimedAssessment;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, job: DetectionJob) -> Self::Future {
        let factory = Arc::clone(&self.factory);
        let seed = frame_seed(self.base_seed, job.index);

        Box::pin(async move {
            let DetectionJob { frame, slot, .. } = job;
            let frame_id = frame.frame_id.clone();
            tokio::task::spawn_blocking(move || {
                let _slot = slot;
                let mut detector = factory(seed);
                let start = Instant::now();
                let assessment = detector.infer(&frame);
                TimedAssessment {
                    assessment,
                    latency_ms: start.elapsed().as_secs_f64() * 1000.0,
                }
            })
            .await
            .map_err(|e| AppError::Worker {
                frame_id,
                reason: e.to_string(),
            })
        })
    }
}
