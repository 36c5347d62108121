//! The frame update loop.
//!
//! Every frame propagates the feature list with optical flow. The list is
//! first re-seeded from scratch when it is empty or every `reseed_interval`
//! frames; long-lived tracks are traded for periodic recovery from drift and
//! occlusion.

use crate::config::TrackerConfig;
use flowcam_core::{GrayFrame, Point2};
use flowcam_vision::{FeatureDetector, FlowEstimator, GoodFeatures, PyramidalLk};
use tracing::{debug, info, warn};

/// Current and previous feature positions with per-feature match flags.
///
/// `previous[i]` pairs with `current[i]` only when `status[i]` is true. After
/// a re-seed `status` is empty until the next flow estimation, so always read
/// it with `status.get(i)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub current: Vec<Point2>,
    pub previous: Vec<Point2>,
    pub status: Vec<bool>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// True when all three sequences come from the same flow estimation.
    pub fn is_aligned(&self) -> bool {
        self.current.len() == self.previous.len() && self.status.len() == self.current.len()
    }

    /// Number of features matched by the last flow estimation.
    pub fn matched_count(&self) -> usize {
        self.status.iter().filter(|&&s| s).count()
    }

    /// `(previous, current)` pairs for every matched feature.
    pub fn flow_segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        self.current
            .iter()
            .zip(&self.previous)
            .enumerate()
            .filter(|(i, _)| self.status.get(*i).copied().unwrap_or(false))
            .map(|(_, (&cur, &prev))| (prev, cur))
    }

    fn reseed(&mut self, points: Vec<Point2>) {
        self.previous = points.clone();
        self.current = points;
        self.status.clear();
    }

    fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
        self.status.clear();
    }
}

/// What a call to [`FlowTracker::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No previous frame existed; the frame was stored and nothing else ran.
    Primed,
    /// Features were detected afresh and no flow was estimated, either
    /// because nothing was found or because re-seed frames only detect.
    Reseeded { detected: usize },
    /// Flow was estimated. `reseeded` is set when detection ran first on the
    /// same frame.
    Tracked {
        matched: usize,
        lost: usize,
        reseeded: bool,
    },
}

impl Tick {
    pub fn reseeded(&self) -> bool {
        matches!(
            self,
            Self::Reseeded { .. } | Self::Tracked { reseeded: true, .. }
        )
    }

    pub fn tracked(&self) -> bool {
        matches!(self, Self::Tracked { .. })
    }
}

/// Frame-to-frame feature tracking state.
pub struct FlowTracker<D = GoodFeatures, E = PyramidalLk> {
    config: TrackerConfig,
    detector: D,
    estimator: E,
    prev_frame: Option<GrayFrame>,
    features: FeatureSet,
    errors: Vec<f32>,
    frame_count: u64,
}

impl FlowTracker {
    /// Tracker with the bundled Shi-Tomasi detector and Lucas-Kanade estimator.
    pub fn with_defaults() -> Self {
        Self::new(
            TrackerConfig::default(),
            GoodFeatures::default(),
            PyramidalLk::default(),
        )
    }
}

impl<D: FeatureDetector, E: FlowEstimator> FlowTracker<D, E> {
    pub fn new(config: TrackerConfig, detector: D, estimator: E) -> Self {
        Self {
            config,
            detector,
            estimator,
            prev_frame: None,
            features: FeatureSet::default(),
            errors: Vec::new(),
            frame_count: 0,
        }
    }

    /// Feed the next frame.
    pub fn update(&mut self, frame: GrayFrame) -> Tick {
        let index = self.frame_count;
        self.frame_count += 1;

        let Some(prev) = self.prev_frame.take() else {
            debug!(frame = index, "Stored first frame");
            self.prev_frame = Some(frame);
            return Tick::Primed;
        };

        if prev.dimensions() != frame.dimensions() {
            warn!(
                frame = index,
                "Frame size changed from {:?} to {:?}, restarting",
                prev.dimensions(),
                frame.dimensions()
            );
            self.features.clear();
            self.errors.clear();
            self.prev_frame = Some(frame);
            return Tick::Primed;
        }

        let interval = self.config.reseed_interval.max(1);
        let reseed = self.features.is_empty() || index % interval == 0;

        let tick = if reseed {
            let points = self
                .detector
                .detect(&frame, &self.config.detect_params());
            info!(frame = index, detected = points.len(), "Re-seeded features");
            let detected = points.len();
            self.features.reseed(points);
            self.errors.clear();

            if self.config.track_after_reseed && !self.features.is_empty() {
                self.track(&prev, &frame, true)
            } else {
                Tick::Reseeded { detected }
            }
        } else {
            self.features.previous.clone_from(&self.features.current);
            self.track(&prev, &frame, false)
        };

        debug!(frame = index, ?tick, "Frame processed");
        self.prev_frame = Some(frame);
        tick
    }

    fn track(&mut self, prev: &GrayFrame, next: &GrayFrame, reseeded: bool) -> Tick {
        let result = self
            .estimator
            .estimate(prev, next, &self.features.previous);
        let matched = result.found_count();
        let lost = result.len() - matched;

        self.features.current = result.points;
        self.features.status = result.status;
        // Recorded only; matches are never filtered by error
        self.errors = result.errors;

        Tick::Tracked {
            matched,
            lost,
            reseeded,
        }
    }

    /// Forget the previous frame, all features and the frame counter.
    pub fn reset(&mut self) {
        self.prev_frame = None;
        self.features.clear();
        self.errors.clear();
        self.frame_count = 0;
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Per-feature errors from the last flow estimation.
    pub fn last_errors(&self) -> &[f32] {
        &self.errors
    }

    /// Number of frames passed to [`update`](Self::update) since creation or reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn has_previous_frame(&self) -> bool {
        self.prev_frame.is_some()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }
}
