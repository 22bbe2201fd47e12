//! Greedy IoU tracking that gives per-frame person detections a stable identity.

mod bounding_box;
mod config;
mod detection;
mod error;
pub mod greedy_assignment;
pub mod iou_matching;
mod provider;
mod shared;
mod track;
mod tracker;

pub use bounding_box::BoundingBox;
pub use config::TrackerConfig;
pub use detection::{Detection, Landmark};
pub use error::Error;
pub use provider::{
    DetectionProvider, FailurePolicy, FrameProcessor, LandmarkProvider, NoLandmarks,
};
pub use shared::SharedTracker;
pub use track::Track;
pub use tracker::{Tracker, TrackerOutput};
