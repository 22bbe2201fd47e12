use std::sync::Arc;

use crate::*;
use parking_lot::Mutex;

/// A cloneable handle to a single [`Tracker`] shared between request handlers.
///
/// Every [`SharedTracker::update`] holds the lock for the whole call (eviction, matching and mutation), so concurrent
/// frames are applied one after another and never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedTracker {
    inner: Arc<Mutex<Tracker>>,
}

impl SharedTracker {
    pub fn new(tracker: Tracker) -> SharedTracker {
        SharedTracker {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Build a shared tracker from a configuration.
    pub fn with_config(config: TrackerConfig) -> Result<SharedTracker, Error> {
        Ok(SharedTracker::new(Tracker::new(config)?))
    }

    /// See [`Tracker::update`].
    pub fn update(&self, detections: Vec<Detection>, now: f64) -> TrackerOutput {
        self.inner.lock().update(detections, now)
    }

    /// Run `f` against the tracker while holding the lock.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&mut Tracker) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn active_track_count(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use itertools::Itertools;
    use std::thread;

    #[test]
    fn concurrent_updates_keep_ids_unique() {
        let tracker = SharedTracker::default();

        let handles = (0..8)
            .map(|camera| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    (0..25)
                        .flat_map(|frame| {
                            // every camera sees a disjoint box, and frames are far enough apart to always evict
                            let x = camera as f32 * 0.1;
                            let detection = Detection::new(
                                None,
                                BoundingBox::new(x, 0.0, 0.05, 0.05),
                                1.0,
                                None,
                                None,
                            );
                            let now = (camera * 1000 + frame * 10) as f64;
                            tracker
                                .update(vec![detection], now)
                                .detections
                                .into_iter()
                                .filter_map(|detection| detection.track_id())
                                .collect::<Vec<_>>()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let ids = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all_unique());
        assert_eq!(tracker.with_tracker(|tracker| tracker.next_id()), 201);
    }

    #[test]
    fn shared_state() {
        let tracker = SharedTracker::with_config(TrackerConfig::default()).unwrap();
        let handle = tracker.clone();

        let detection = Detection::new(None, BoundingBox::new(0.1, 0.1, 0.2, 0.2), 1.0, None, None);
        tracker.update(vec![detection.clone()], 0.0);
        let output = handle.update(vec![detection], 0.5);

        assert_eq!(output.detections[0].track_id(), Some(1));
        assert_eq!(handle.active_track_count(), 1);
        assert_eq!(tracker.active_track_count(), 1);
    }
}
