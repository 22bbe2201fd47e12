use crate::*;
use anyhow::Result;
use tracing::warn;

/// Produces the detections of one frame.
///
/// `Ok(vec![])` means the frame was processed and nothing was found. `Err` means the provider itself failed.
pub trait DetectionProvider<F> {
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>>;
}

/// Produces decorative landmarks for a region of a frame.
pub trait LandmarkProvider<F> {
    fn landmarks(&mut self, frame: &F, bbox: &BoundingBox) -> Result<Option<Vec<Landmark>>>;
}

/// A landmark provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLandmarks;

impl<F> LandmarkProvider<F> for NoLandmarks {
    fn landmarks(&mut self, _frame: &F, _bbox: &BoundingBox) -> Result<Option<Vec<Landmark>>> {
        Ok(None)
    }
}

/// What a [`FrameProcessor`] does when the detection provider fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Treat the frame as empty so tracks keep aging.
    #[default]
    AgeTracks,
    /// Return [`Error::Provider`] and leave the tracker untouched.
    Propagate,
}

/// Runs detection, boundary validation, landmark enrichment and tracking for each frame.
pub struct FrameProcessor<D, L = NoLandmarks> {
    detector: D,
    landmarks: L,
    policy: FailurePolicy,
    tracker: SharedTracker,
}

impl<D> FrameProcessor<D, NoLandmarks> {
    /// Returns a new FrameProcessor without landmark enrichment.
    pub fn new(detector: D, tracker: SharedTracker) -> Self {
        FrameProcessor {
            detector,
            landmarks: NoLandmarks,
            policy: FailurePolicy::default(),
            tracker,
        }
    }
}

impl<D, L> FrameProcessor<D, L> {
    /// Replace the landmark provider.
    pub fn with_landmarks<M>(self, landmarks: M) -> FrameProcessor<D, M> {
        FrameProcessor {
            detector: self.detector,
            landmarks,
            policy: self.policy,
            tracker: self.tracker,
        }
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Return the shared tracker handle
    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }

    /// Process one frame.
    ///
    /// # Parameters
    ///
    /// * `frame`: The frame handed to the providers.
    /// * `now`: The frame timestamp in seconds.
    pub fn process<F>(&mut self, frame: &F, now: f64) -> Result<TrackerOutput, Error>
    where
        D: DetectionProvider<F>,
        L: LandmarkProvider<F>,
    {
        let detections = match self.detector.detect(frame) {
            Ok(detections) => detections,
            Err(err) => match self.policy {
                FailurePolicy::AgeTracks => {
                    warn!(error = %err, "detection provider failed, treating frame as empty");
                    Vec::new()
                }
                FailurePolicy::Propagate => return Err(Error::Provider(err)),
            },
        };

        let detections = detections
            .into_iter()
            .filter(|detection| match detection.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(id = %detection.id(), error = %err, "dropping invalid detection");
                    false
                }
            })
            .map(|mut detection| {
                if detection.landmarks().is_none() {
                    match self.landmarks.landmarks(frame, detection.bbox()) {
                        Ok(landmarks) => *detection.landmarks_mut() = landmarks,
                        Err(err) => {
                            warn!(id = %detection.id(), error = %err, "landmark provider failed")
                        }
                    }
                }
                detection
            })
            .collect::<Vec<_>>();

        Ok(self.tracker.update(detections, now))
    }
}
