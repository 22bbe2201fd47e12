use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use crate::*;

/// A single target track: the last matched box of one subject plus a short position history.
#[derive(Debug, Clone)]
pub struct Track {
    /// A unique track identifier.
    track_id: usize,
    /// The most recently matched bounding box.
    bbox: BoundingBox,
    /// Confidence of the most recently matched detection.
    confidence: f32,
    /// Timestamp (seconds) of track creation.
    first_seen: f64,
    /// Timestamp (seconds) of the most recent match.
    last_seen: f64,
    /// Total number of detections associated with this track.
    hits: usize,
    /// Past boxes, oldest first.
    history: VecDeque<BoundingBox>,
    /// Maximum length of `history`.
    history_capacity: usize,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.track_id == other.track_id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.track_id.hash(state);
    }
}

impl Track {
    /// Returns a new Track
    ///
    /// # Parameters
    ///
    /// * `track_id`: A unique track identifier.
    /// * `detection`: The detection this track originates from.
    /// * `now`: Timestamp of the frame in seconds.
    /// * `history_capacity`: Maximum number of boxes kept in the history. Values below 1 are treated as 1.
    pub fn new(track_id: usize, detection: &Detection, now: f64, history_capacity: usize) -> Track {
        let history_capacity = history_capacity.max(1);
        let mut history = VecDeque::with_capacity(history_capacity);
        history.push_back(*detection.bbox());

        Track {
            track_id,
            bbox: *detection.bbox(),
            confidence: detection.confidence(),
            first_seen: now,
            last_seen: now,
            hits: 1,
            history,
            history_capacity,
        }
    }

    /// Return the identifier of the track
    pub fn track_id(&self) -> usize {
        self.track_id
    }

    /// Returns the most recently matched bounding box
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Return the confidence of the latest match
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Return the creation timestamp
    pub fn first_seen(&self) -> f64 {
        self.first_seen
    }

    /// Return the timestamp of the latest match
    pub fn last_seen(&self) -> f64 {
        self.last_seen
    }

    /// Return the number of associated detections
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Return the position history, oldest first
    pub fn history(&self) -> &VecDeque<BoundingBox> {
        &self.history
    }

    /// Seconds elapsed since the latest match.
    pub fn time_since_update(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    /// Returns true unless the track was matched within the last `max_age` seconds.
    ///
    /// An undefined age (a NaN timestamp on either side) counts as stale.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_stale(&self, now: f64, max_age: f64) -> bool {
        !(self.time_since_update(now) <= max_age)
    }

    /// Associate a detection with this track.
    ///
    /// # Parameters
    ///
    /// * `detection`: The associated detection.
    /// * `now`: Timestamp of the frame in seconds.
    pub fn update(&mut self, detection: &Detection, now: f64) -> &Self {
        self.bbox = *detection.bbox();
        self.confidence = detection.confidence();
        self.last_seen = now;
        self.hits += 1;

        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(self.bbox);

        self
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn detection(x: f32) -> Detection {
        Detection::new(None, BoundingBox::new(x, 0.1, 0.1, 0.1), 0.8, None, None)
    }

    #[test]
    fn new() {
        let track = Track::new(7, &detection(0.0), 1.5, 10);
        assert_eq!(track.track_id(), 7);
        assert_eq!(track.hits(), 1);
        assert_eq!(track.first_seen(), 1.5);
        assert_eq!(track.last_seen(), 1.5);
        assert_eq!(track.history().len(), 1);
        assert_eq!(track.history()[0], *detection(0.0).bbox());
    }

    #[test]
    fn update() {
        let mut track = Track::new(1, &detection(0.0), 0.0, 10);
        track.update(&detection(0.05), 0.5);

        assert_eq!(track.hits(), 2);
        assert_eq!(track.first_seen(), 0.0);
        assert_eq!(track.last_seen(), 0.5);
        assert_eq!(track.bbox(), detection(0.05).bbox());
        assert_eq!(track.history().len(), 2);
    }

    #[test]
    fn history_drops_oldest() {
        let mut track = Track::new(1, &detection(0.0), 0.0, 3);
        (1..6).for_each(|i| {
            track.update(&detection(i as f32 * 0.1), i as f64);
        });

        assert_eq!(track.history().len(), 3);
        let xs = track.history().iter().map(|b| b.x()).collect::<Vec<_>>();
        let expected = (3..6).map(|i| i as f32 * 0.1).collect::<Vec<_>>();
        assert_eq!(xs, expected);
    }

    #[test]
    fn stale() {
        let track = Track::new(1, &detection(0.0), 1.0, 10);
        assert!(!track.is_stale(3.0, 2.0));
        assert!(track.is_stale(3.01, 2.0));
    }

    #[test]
    fn nan_age_is_stale() {
        let track = Track::new(1, &detection(0.0), f64::NAN, 10);
        assert!(track.is_stale(100.0, 2.0));

        let track = Track::new(1, &detection(0.0), 1.0, 10);
        assert!(track.is_stale(f64::NAN, 2.0));
    }
}
