use crate::{BoundingBox, Error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A normalized 2-D point produced by a landmark provider (eyes, nose, mouth corners).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Landmark {
        Landmark { x, y }
    }
}

/// Detection represents a bounding box detection in a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Unique detection identifier
    id: Uuid,
    /// Bounding box in left, top, width, height format.
    bbox: BoundingBox,
    /// Detection confidence score.
    confidence: f32,
    /// Optional display label
    label: Option<String>,
    /// Optional landmarks, carried through the tracker unmodified.
    landmarks: Option<Vec<Landmark>>,
    /// Identifier of the track this detection was associated with. `None` until the tracker has seen it.
    track_id: Option<usize>,
}

impl Detection {
    /// Returns a new Detection
    ///
    /// # Parameters
    ///
    /// * `id`: An optional identifier, a random one is generated if `None`.
    /// * `bbox`: A bounding box object.
    /// * `confidence`: Detection confidence score.
    /// * `label`: An optional display label.
    /// * `landmarks`: Optional landmark payload.
    pub fn new(
        id: Option<Uuid>,
        bbox: BoundingBox,
        confidence: f32,
        label: Option<String>,
        landmarks: Option<Vec<Landmark>>,
    ) -> Detection {
        Detection {
            id: id.unwrap_or_else(Uuid::new_v4),
            bbox,
            confidence,
            label,
            landmarks,
            track_id: None,
        }
    }

    /// Returns the unique id of the detection
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// Returns a BoundingBox of the detection co-ordinates
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the confidence of the detection
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns the label of the detection
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the landmarks of the detection
    pub fn landmarks(&self) -> Option<&[Landmark]> {
        self.landmarks.as_deref()
    }

    /// Returns the mutable landmarks of the detection
    pub fn landmarks_mut(&mut self) -> &mut Option<Vec<Landmark>> {
        &mut self.landmarks
    }

    /// Returns the track identifier assigned by the tracker
    pub fn track_id(&self) -> Option<usize> {
        self.track_id
    }

    pub(crate) fn set_track_id(&mut self, track_id: usize) {
        self.track_id = Some(track_id);
    }

    /// Checks the box and the confidence before the detection is handed to the tracker.
    pub fn validate(&self) -> Result<(), Error> {
        self.bbox.validate()?;
        if (0.0..=1.0).contains(&self.confidence) {
            Ok(())
        } else {
            Err(Error::InvalidConfidence(self.confidence))
        }
    }
}
