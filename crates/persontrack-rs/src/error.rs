use thiserror::Error;

/// Errors raised at the boundary of the tracker.
///
/// [`Tracker::update`](crate::Tracker::update) itself never fails, these only describe rejected configuration,
/// rejected input records and failing providers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error("bounding box ({x}, {y}, {width}, {height}) is outside the normalized frame")]
    InvalidBoundingBox {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f32),

    #[error("detection provider failed: {0}")]
    Provider(#[source] anyhow::Error),
}
