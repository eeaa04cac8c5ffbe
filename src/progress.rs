//! Staged identification pipeline.
//!
//! Runs the progress stages in order on the tokio runtime. Timed stages are
//! cosmetic and stop early when the attempt's token is cancelled; the
//! request stage always awaits the predictor to completion. Every step is
//! reported back to the UI thread as a `WorkerMessage`.

use crate::constants::{Stage, StageWait};
use crate::error::IdentifyError;
use crate::intake;
use crate::predictor::Predictor;
use crate::types::{RawPrediction, UploadedImage};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Messages from background work to the UI thread
#[derive(Debug)]
pub enum WorkerMessage {
    Progress { attempt: u64, percent: u8, text: &'static str },
    Finished { attempt: u64, outcome: Result<RawPrediction, IdentifyError> },
    FileLoaded { seq: u64, result: Result<UploadedImage, IdentifyError> },
}

/// Orders file loads so that only the most recently offered file lands,
/// whatever order the decodes finish in.
#[derive(Debug, Default)]
pub struct LoadTracker {
    offered: u64,
    settled: u64,
}

impl LoadTracker {
    /// Sequence number for a newly offered file
    pub fn offer(&mut self) -> u64 {
        self.offered += 1;
        self.offered
    }

    /// Record a finished load. Returns false when a later file was offered
    /// in the meantime and this result should be dropped.
    pub fn settle(&mut self, seq: u64) -> bool {
        if seq != self.offered {
            return false;
        }
        self.settled = seq;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.settled < self.offered
    }
}

pub type Repaint = Arc<dyn Fn() + Send + Sync>;

pub struct IdentificationJob {
    pub attempt: u64,
    pub image: UploadedImage,
    pub predictor: Arc<dyn Predictor>,
    pub stages: &'static [Stage],
    /// Multiplier for timed stages; 0.0 skips them
    pub pacing: f32,
    pub token: CancellationToken,
    pub tx: UnboundedSender<WorkerMessage>,
    pub repaint: Repaint,
}

impl IdentificationJob {
    fn send(&self, msg: WorkerMessage) {
        if self.tx.send(msg).is_err() {
            debug!(attempt = self.attempt, "UI receiver gone, dropping message");
        }
        (self.repaint)();
    }
}

/// Run a job and convert a panic inside it into an `Unexpected` failure
pub async fn supervise(job: IdentificationJob) {
    let attempt = job.attempt;
    let tx = job.tx.clone();
    let repaint = job.repaint.clone();

    let handle = tokio::spawn(run_stages(job));
    if let Err(e) = handle.await {
        error!(attempt, error = %e, "Identification task aborted");
        let _ = tx.send(WorkerMessage::Finished {
            attempt,
            outcome: Err(IdentifyError::Unexpected(
                "Error occurred during processing, please restart the application and try again."
                    .into(),
            )),
        });
        repaint();
    }
}

async fn run_stages(job: IdentificationJob) {
    info!(attempt = job.attempt, predictor = %job.predictor.describe(), "Identification started");
    let mut prediction = None;

    for stage in job.stages {
        job.send(WorkerMessage::Progress {
            attempt: job.attempt,
            percent: stage.percent,
            text: stage.text,
        });

        match stage.wait {
            StageWait::Delay(delay) => {
                let delay = delay.mul_f32(job.pacing.max(0.0));
                tokio::select! {
                    _ = job.token.cancelled() => {
                        debug!(attempt = job.attempt, "Attempt abandoned, stopping stages");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            StageWait::Reveal => {
                job.send(WorkerMessage::Finished { attempt: job.attempt, outcome: finish(&job, prediction) });
                return;
            }
            StageWait::Request => match request(&job).await {
                Ok(p) => prediction = Some(p),
                Err(e) => {
                    warn!(attempt = job.attempt, error = %e, "Identification failed");
                    job.send(WorkerMessage::Finished { attempt: job.attempt, outcome: Err(e) });
                    return;
                }
            },
        }
    }

    job.send(WorkerMessage::Finished { attempt: job.attempt, outcome: finish(&job, prediction) });
}

fn finish(job: &IdentificationJob, prediction: Option<RawPrediction>) -> Result<RawPrediction, IdentifyError> {
    let outcome = prediction.ok_or_else(|| {
        IdentifyError::Unexpected("No prediction request was made".into())
    });
    if let Ok(p) = &outcome {
        info!(attempt = job.attempt, model = %p.shoe_model, confidence = p.confidence, "Identification finished");
    }
    outcome
}

async fn request(job: &IdentificationJob) -> Result<RawPrediction, IdentifyError> {
    let pixels = job.image.pixels.clone();
    let data_url = tokio::task::spawn_blocking(move || intake::to_jpeg_data_url(&pixels))
        .await
        .map_err(|e| IdentifyError::Unexpected(format!("Image encoding task failed: {}", e)))??;
    job.predictor.predict(data_url).await
}

/// Decode a file off the UI thread and report it back
pub async fn load_file(
    seq: u64,
    candidate: intake::FileCandidate,
    tx: UnboundedSender<WorkerMessage>,
    repaint: Repaint,
) {
    let name = candidate.name.clone();
    let result = tokio::task::spawn_blocking(move || intake::load(candidate))
        .await
        .unwrap_or_else(|e| Err(IdentifyError::ReadFailure(format!("Loading task failed: {}", e))));
    if let Err(e) = &result {
        warn!(file = %name, error = %e, "Image rejected");
    }
    let _ = tx.send(WorkerMessage::FileLoaded { seq, result });
    repaint();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{Stage, StageWait, STAGES};
    use crate::predictor::MockPredictor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn image() -> UploadedImage {
        UploadedImage {
            name: "kick.png".into(),
            mime: "image/png".into(),
            size_bytes: 10,
            pixels: Arc::new(image::RgbaImage::from_pixel(8, 8, image::Rgba([9, 9, 9, 255]))),
        }
    }

    fn prediction() -> RawPrediction {
        RawPrediction { shoe_model: "AirMax90".into(), confidence: 92.5, top5: vec![], bounding_box: None }
    }

    fn job(
        predictor: Arc<dyn Predictor>,
        token: CancellationToken,
        pacing: f32,
    ) -> (IdentificationJob, UnboundedReceiver<WorkerMessage>, Arc<AtomicUsize>) {
        let (tx, rx) = unbounded_channel();
        let repaints = Arc::new(AtomicUsize::new(0));
        let counter = repaints.clone();
        let job = IdentificationJob {
            attempt: 7,
            image: image(),
            predictor,
            stages: STAGES,
            pacing,
            token,
            tx,
            repaint: Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        };
        (job, rx, repaints)
    }

    fn drain(rx: &mut UnboundedReceiver<WorkerMessage>) -> Vec<WorkerMessage> {
        let mut out = vec![];
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn reports_every_stage_then_success() {
        let mock = Arc::new(MockPredictor::succeeding(prediction()));
        let (job, mut rx, repaints) = job(mock.clone(), CancellationToken::new(), 0.0);
        supervise(job).await;

        let msgs = drain(&mut rx);
        let percents: Vec<u8> = msgs
            .iter()
            .filter_map(|m| match m {
                WorkerMessage::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![10, 25, 50, 75, 90, 100]);
        match msgs.last() {
            Some(WorkerMessage::Finished { attempt: 7, outcome: Ok(p) }) => assert_eq!(p.shoe_model, "AirMax90"),
            other => panic!("unexpected final message: {:?}", other),
        }
        assert_eq!(mock.calls(), 1);
        assert_eq!(repaints.load(Ordering::SeqCst), msgs.len());
    }

    #[tokio::test]
    async fn failure_stops_after_request_stage() {
        let mock = Arc::new(MockPredictor::failing(IdentifyError::ServerFailure("model unavailable".into())));
        let (job, mut rx, _) = job(mock, CancellationToken::new(), 0.0);
        supervise(job).await;

        let msgs = drain(&mut rx);
        assert!(!msgs.iter().any(|m| matches!(m, WorkerMessage::Progress { percent: 90, .. })));
        match msgs.last() {
            Some(WorkerMessage::Finished { outcome: Err(e), .. }) => assert_eq!(e.to_string(), "model unavailable"),
            other => panic!("unexpected final message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn cancelled_token_stops_timed_stages() {
        let mock = Arc::new(MockPredictor::succeeding(prediction()));
        let token = CancellationToken::new();
        token.cancel();
        let (job, mut rx, _) = job(mock.clone(), token, 1.0);
        supervise(job).await;

        let msgs = drain(&mut rx);
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], WorkerMessage::Progress { percent: 10, .. }));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn cancel_during_request_does_not_abort_it() {
        let mock = Arc::new(MockPredictor::succeeding(prediction()).with_delay(Duration::from_millis(50)));
        let token = CancellationToken::new();
        let (mut job, mut rx, _) = job(mock.clone(), token.clone(), 0.0);
        job.stages = &STAGES[3..4];

        let handle = tokio::spawn(supervise(job));
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        handle.await.unwrap();

        let msgs = drain(&mut rx);
        assert_eq!(mock.calls(), 1);
        assert!(matches!(msgs.last(), Some(WorkerMessage::Finished { outcome: Ok(_), .. })));
    }

    #[tokio::test]
    async fn load_file_reports_rejection() {
        let (tx, mut rx) = unbounded_channel();
        let candidate = intake::FileCandidate {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
            size: 3,
            source: intake::FileSource::Bytes(Arc::from(vec![1u8, 2, 3])),
        };
        load_file(3, candidate, tx, Arc::new(|| {})).await;
        match rx.try_recv() {
            Ok(WorkerMessage::FileLoaded { seq: 3, result: Err(IdentifyError::InvalidFile(_)) }) => {}
            other => panic!("unexpected message: {:?}", other),
        }
    }

    fn png_candidate(name: &str, side: u32) -> intake::FileCandidate {
        let img = image::RgbaImage::from_pixel(side, side, image::Rgba([40, 40, 40, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        intake::FileCandidate {
            name: name.into(),
            mime: "image/png".into(),
            size: buf.len() as u64,
            source: intake::FileSource::Bytes(Arc::from(buf)),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn latest_offered_file_wins_when_loads_finish_out_of_order() {
        let (tx, mut rx) = unbounded_channel();
        let mut loads = LoadTracker::default();

        let big = loads.offer();
        let small = loads.offer();
        let first = tokio::spawn(load_file(big, png_candidate("big.png", 2000), tx.clone(), Arc::new(|| {})));
        let second = tokio::spawn(load_file(small, png_candidate("small.png", 8), tx, Arc::new(|| {})));
        first.await.unwrap();
        second.await.unwrap();
        assert!(loads.is_pending());

        let mut landed = vec![];
        for msg in drain(&mut rx) {
            if let WorkerMessage::FileLoaded { seq, result } = msg {
                if loads.settle(seq) {
                    landed.push(result.unwrap().name);
                }
            }
        }
        assert_eq!(landed, vec!["small.png".to_string()]);
        assert!(!loads.is_pending());
    }

    #[test]
    fn superseded_load_is_dropped_in_either_order() {
        let mut loads = LoadTracker::default();
        assert!(!loads.is_pending());
        let a = loads.offer();
        let b = loads.offer();
        assert!(!loads.settle(a));
        assert!(loads.is_pending());
        assert!(loads.settle(b));
        assert!(!loads.is_pending());

        let c = loads.offer();
        let d = loads.offer();
        assert!(loads.settle(d));
        assert!(!loads.settle(c));
        assert!(!loads.is_pending());
    }

    #[tokio::test]
    async fn result_is_revealed_before_the_completion_wait() {
        static REVEAL_FIRST: &[Stage] = &[
            Stage { percent: 75, text: "AI Model Analysing...", wait: StageWait::Request },
            Stage { percent: 100, text: "Identification Completed!", wait: StageWait::Reveal },
            Stage { percent: 100, text: "never shown", wait: StageWait::Delay(Duration::from_secs(60)) },
        ];
        let mock = Arc::new(MockPredictor::succeeding(prediction()));
        let (mut job, mut rx, _) = job(mock, CancellationToken::new(), 1.0);
        job.stages = REVEAL_FIRST;
        supervise(job).await;

        let msgs = drain(&mut rx);
        assert!(matches!(msgs.last(), Some(WorkerMessage::Finished { outcome: Ok(_), .. })));
        assert!(!msgs.iter().any(|m| matches!(m, WorkerMessage::Progress { text: "never shown", .. })));
    }
}
