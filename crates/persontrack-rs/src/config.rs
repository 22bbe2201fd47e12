use crate::Error;
use serde::{Deserialize, Serialize};

/// Tracker parameters, fixed once a [`Tracker`](crate::Tracker) has been built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum gap in seconds between sightings before a track is discarded. Default `2.0`.
    pub max_age: f64,
    /// Minimum intersection over union (exclusive) required to accept a match. Default `0.3`.
    pub iou_threshold: f32,
    /// Number of past boxes kept per track. Default `10`.
    pub history_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            max_age: 2.0,
            iou_threshold: 0.3,
            history_capacity: 10,
        }
    }
}

impl TrackerConfig {
    /// Set max_age
    pub fn with_max_age(&mut self, max_age: f64) -> &mut Self {
        self.max_age = max_age;
        self
    }

    /// Set iou_threshold
    pub fn with_iou_threshold(&mut self, iou_threshold: f32) -> &mut Self {
        self.iou_threshold = iou_threshold;
        self
    }

    /// Set history_capacity
    pub fn with_history_capacity(&mut self, history_capacity: usize) -> &mut Self {
        self.history_capacity = history_capacity;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.max_age.is_finite() && self.max_age >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_age must be a finite number of seconds >= 0, got {}",
                self.max_age
            )));
        }
        if !(0.0..1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be in [0, 1), got {}",
                self.iou_threshold
            )));
        }
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
