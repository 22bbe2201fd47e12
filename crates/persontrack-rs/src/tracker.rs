use std::collections::BTreeMap;

use crate::*;
use serde::Serialize;
use tracing::{debug, trace};

/// The result of one [`Tracker::update`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerOutput {
    /// The input detections, in input order, each carrying its `track_id`.
    pub detections: Vec<Detection>,
    /// Number of live tracks after eviction and creation.
    pub active_track_count: usize,
    /// Tracks removed by this call's eviction pass, ascending.
    pub evicted_track_ids: Vec<usize>,
}

/// This is the multi-target tracker.
///
/// Tracks are kept in ascending id order and that order is the scan order used during matching, which makes the
/// result of [`Tracker::update`] a deterministic function of the track table, the detections and `now`.
///
/// # Examples
///
/// ```
/// use persontrack_rs::{BoundingBox, Detection, Tracker};
///
/// // instantiate tracker with default parameters
/// let mut tracker = Tracker::default();
///
/// // create a detection in normalized image co-ordinates
/// let detection = Detection::new(
///     None,
///     BoundingBox::new(0.1, 0.2, 0.3, 0.4),
///     0.9,
///     None,
///     None,
/// );
///
/// // add 0..n detections with the frame timestamp in seconds
/// let output = tracker.update(vec![detection.clone()], 0.0);
/// assert_eq!(output.detections[0].track_id(), Some(1));
///
/// let output = tracker.update(vec![detection], 0.1);
/// assert_eq!(output.detections[0].track_id(), Some(1));
/// assert_eq!(output.active_track_count, 1);
///
/// // print tracks
/// for track in tracker.tracks() {
///     println!("{} {:?} {}", track.track_id(), track.bbox(), track.hits());
/// }
///```
#[derive(Debug, Clone)]
pub struct Tracker {
    /// Tracker parameters.
    config: TrackerConfig,
    /// The live tracks keyed by track id.
    tracks: BTreeMap<usize, Track>,
    /// Used to allocate identifiers to new tracks.
    next_id: usize,
}

impl Default for Tracker {
    fn default() -> Self {
        Tracker {
            config: TrackerConfig::default(),
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Tracker {
    /// Returns a new Tracker
    ///
    /// # Arguments
    ///
    /// * `config`: Tracker parameters, rejected if [`TrackerConfig::validate`] fails.
    pub fn new(config: TrackerConfig) -> Result<Tracker, Error> {
        config.validate()?;
        Ok(Tracker {
            config,
            ..Default::default()
        })
    }

    /// Return the tracker parameters
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Iterate over the live tracks in ascending id order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Return a live track by id
    pub fn track(&self, track_id: usize) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Number of live tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The id the next new track will receive
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Drop every live track. The id counter is kept so ids are still never reused.
    pub fn reset(&mut self) {
        debug!(dropped = self.tracks.len(), "reset tracker");
        self.tracks.clear();
    }

    /// Perform eviction, matching and track management for one frame.
    ///
    /// # Parameters
    ///
    /// * `detections`: A list of detections at the current time step, possibly empty.
    /// * `now`: The frame timestamp in seconds.
    pub fn update(&mut self, mut detections: Vec<Detection>, now: f64) -> TrackerOutput {
        // Step 1
        // Remove stale tracks before matching so they can never be matched again.
        let evicted_track_ids = self.evict(now);

        // Step 2
        // Greedy association of detections (input order) with tracks (ascending id).
        let (track_ids, assignment) = {
            let tracks = self.tracks.values().collect::<Vec<_>>();
            let iou_matrix = iou_matching::iou_matrix(&tracks, &detections);
            (
                tracks
                    .iter()
                    .map(|track| track.track_id())
                    .collect::<Vec<_>>(),
                greedy_assignment::greedy_matching(&iou_matrix, self.config.iou_threshold),
            )
        };

        // Step 3
        // Update matched tracks with the detection.
        assignment.matches.iter().for_each(|m| {
            let track_id = track_ids[m.track_idx];
            let detection = &mut detections[m.detection_idx];
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.update(detection, now);
                trace!(track_id, iou = m.iou, "matched detection");
            }
            detection.set_track_id(track_id);
        });

        // Step 4
        // Initialize new tracks for detections that matched nothing.
        assignment
            .unmatched_detections
            .iter()
            .for_each(|&detection_idx| {
                let detection = &mut detections[detection_idx];
                let track_id = self.activate(detection, now);
                detection.set_track_id(track_id);
            });

        TrackerOutput {
            detections,
            active_track_count: self.tracks.len(),
            evicted_track_ids,
        }
    }

    fn evict(&mut self, now: f64) -> Vec<usize> {
        let max_age = self.config.max_age;
        let mut evicted = Vec::new();

        self.tracks.retain(|&track_id, track| {
            let stale = track.is_stale(now, max_age);
            if stale {
                debug!(
                    track_id,
                    idle = track.time_since_update(now),
                    hits = track.hits(),
                    "evicted track"
                );
                evicted.push(track_id);
            }
            !stale
        });

        evicted
    }

    fn activate(&mut self, detection: &Detection, now: f64) -> usize {
        let track_id = self.next_id;
        self.next_id += 1;

        let track = Track::new(track_id, detection, now, self.config.history_capacity);
        debug!(track_id, bbox = ?track.bbox(), "created track");
        self.tracks.insert(track_id, track);

        track_id
    }
}
