use fixedbitset::FixedBitSet;
use ndarray::*;

/// A track row paired with a detection column of an IoU matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub track_idx: usize,
    pub detection_idx: usize,
    pub iou: f32,
}

impl Match {
    /// Return a new Match
    ///
    /// # Parameters
    ///
    /// * `track_idx`: The matched track row.
    /// * `detection_idx`: The matched detection column.
    /// * `iou`: Match strength.
    pub fn new(track_idx: usize, detection_idx: usize, iou: f32) -> Match {
        Match {
            track_idx,
            detection_idx,
            iou,
        }
    }
}

/// Result of a greedy pass over an IoU matrix.
#[derive(Debug, Default, PartialEq)]
pub struct Assignment {
    /// Matches in detection order.
    pub matches: Vec<Match>,
    /// Detection columns that claimed no track, ascending.
    pub unmatched_detections: Vec<usize>,
    /// Track rows that no detection claimed, ascending.
    pub unmatched_tracks: Vec<usize>,
}

/// Greedy nearest-match assignment.
///
/// Detections (columns) are visited in order. Each one claims the not yet claimed track (row) with the highest IoU,
/// provided that IoU is strictly greater than `iou_threshold`. Rows are scanned in ascending order and only a strictly
/// larger IoU replaces the current best, so ties go to the lowest row. A claimed row is unavailable to later columns.
///
/// # Parameters
///
/// * `iou_matrix`: Matrix of shape `(tracks, detections)`.
/// * `iou_threshold`: Minimum IoU (exclusive) to accept a match.
pub fn greedy_matching(iou_matrix: &Array2<f32>, iou_threshold: f32) -> Assignment {
    let (n_tracks, n_detections) = iou_matrix.dim();
    let mut claimed = FixedBitSet::with_capacity(n_tracks);
    let mut assignment = Assignment::default();

    for (detection_idx, column) in iou_matrix.axis_iter(Axis(1)).enumerate() {
        let mut best: Option<usize> = None;
        let mut best_iou = iou_threshold;

        for (track_idx, &iou) in column.iter().enumerate() {
            if claimed.contains(track_idx) {
                continue;
            }
            if iou > best_iou {
                best_iou = iou;
                best = Some(track_idx);
            }
        }

        match best {
            Some(track_idx) => {
                claimed.insert(track_idx);
                assignment
                    .matches
                    .push(Match::new(track_idx, detection_idx, best_iou));
            }
            None => assignment.unmatched_detections.push(detection_idx),
        }
    }

    debug_assert_eq!(
        assignment.matches.len() + assignment.unmatched_detections.len(),
        n_detections
    );

    assignment.unmatched_tracks = (0..n_tracks)
        .filter(|track_idx| !claimed.contains(*track_idx))
        .collect();

    assignment
}

#[cfg(test)]
mod tests {
    use crate::greedy_assignment::*;
    use ndarray::*;

    #[test]
    fn picks_highest() {
        let matrix = arr2::<f32, _>(&[[0.4, 0.0], [0.8, 0.1], [0.0, 0.9]]);
        let assignment = greedy_matching(&matrix, 0.3);

        assert_eq!(
            assignment.matches,
            vec![Match::new(1, 0, 0.8), Match::new(2, 1, 0.9)]
        );
        assert!(assignment.unmatched_detections.is_empty());
        assert_eq!(assignment.unmatched_tracks, vec![0]);
    }

    #[test]
    fn first_detection_claims_track() {
        // both detections overlap track 0, the first has the lower IoU but is processed first
        let matrix = arr2::<f32, _>(&[[0.5, 0.9]]);
        let assignment = greedy_matching(&matrix, 0.3);

        assert_eq!(assignment.matches, vec![Match::new(0, 0, 0.5)]);
        assert_eq!(assignment.unmatched_detections, vec![1]);
        assert!(assignment.unmatched_tracks.is_empty());
    }

    #[test]
    fn tie_goes_to_lowest_row() {
        let matrix = arr2::<f32, _>(&[[0.6], [0.6], [0.6]]);
        let assignment = greedy_matching(&matrix, 0.3);

        assert_eq!(assignment.matches, vec![Match::new(0, 0, 0.6)]);
        assert_eq!(assignment.unmatched_tracks, vec![1, 2]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let matrix = arr2::<f32, _>(&[[0.3], [0.2]]);
        let assignment = greedy_matching(&matrix, 0.3);

        assert!(assignment.matches.is_empty());
        assert_eq!(assignment.unmatched_detections, vec![0]);
        assert_eq!(assignment.unmatched_tracks, vec![0, 1]);
    }

    #[test]
    fn empty() {
        let assignment = greedy_matching(&Array2::<f32>::zeros((0, 2)), 0.3);
        assert_eq!(assignment.unmatched_detections, vec![0, 1]);

        let assignment = greedy_matching(&Array2::<f32>::zeros((2, 0)), 0.3);
        assert!(assignment.matches.is_empty());
        assert_eq!(assignment.unmatched_tracks, vec![0, 1]);
    }
}
