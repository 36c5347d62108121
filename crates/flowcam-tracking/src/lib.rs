//! FlowCam Tracking - the frame update loop.
//!
//! [`FlowTracker`] decides per frame whether to re-detect features or
//! propagate the existing ones with optical flow. [`Overlay`] turns the
//! resulting [`FeatureSet`] into drawing primitives for any renderer.

pub mod config;
pub mod error;
pub mod overlay;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{TrackingError, TrackingResult};
pub use overlay::{Overlay, OverlayStyle, Primitive};
pub use tracker::{FeatureSet, FlowTracker, Tick};
