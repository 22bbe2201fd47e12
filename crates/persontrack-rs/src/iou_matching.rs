use crate::*;
use ndarray::*;

/// Build a `(n, 4)` matrix of boxes in `(top left x, top left y, width, height)` format, one box per row.
pub fn tlwh_matrix(boxes: &[&BoundingBox]) -> Array2<f32> {
    Array2::from_shape_fn((boxes.len(), 4), |(row, col)| {
        let bbox = boxes[row];
        match col {
            0 => bbox.x(),
            1 => bbox.y(),
            2 => bbox.width(),
            _ => bbox.height(),
        }
    })
}

/// Compute intersection over union.
///
/// # Parameters
///
/// * `bbox`: A bounding box in format `(top left x, top left y, width, height)`.
/// * `candidates`: A matrix of candidate bounding boxes (one per row) in the same format as `bbox`.
///
/// # Returns
///
/// The intersection over union in [0.0, 1.0] between the `bbox` and each candidate. Disjoint or degenerate pairs
/// score `0.0`.
///
/// Rows are not processed as a batch: each candidate row is turned back into a [`BoundingBox`] and scored with
/// [`BoundingBox::iou`], so every entry is bit-identical to the scalar result for the same pair.
pub fn intersection_over_union(bbox: &Array1<f32>, candidates: &Array2<f32>) -> Array1<f32> {
    let bbox = BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3]);

    Zip::from(candidates.rows()).map_collect(|candidate| {
        bbox.iou(&BoundingBox::new(
            candidate[0],
            candidate[1],
            candidate[2],
            candidate[3],
        ))
    })
}

/// Intersection over union between every track and every detection.
///
/// # Parameters
///
/// * `tracks`: A list of tracks, in the order the caller wants rows to be scanned.
/// * `detections`: A list of detections.
///
/// # Returns
///
/// A matrix of shape `(tracks.len(), detections.len())` where entry `(i, j)` is `iou(tracks[i], detections[j])`.
pub fn iou_matrix(tracks: &[&Track], detections: &[Detection]) -> Array2<f32> {
    let mut matrix = Array2::<f32>::zeros((tracks.len(), detections.len()));
    if tracks.is_empty() || detections.is_empty() {
        return matrix;
    }

    let candidates = tlwh_matrix(
        &detections
            .iter()
            .map(|detection| detection.bbox())
            .collect::<Vec<_>>(),
    );

    matrix
        .outer_iter_mut()
        .zip(tracks)
        .for_each(|(mut row, track)| {
            row.assign(&intersection_over_union(
                &track.bbox().to_tlwh(),
                &candidates,
            ));
        });

    matrix
}

#[cfg(test)]
mod tests {
    use crate::*;
    use assert_approx_eq::assert_approx_eq;
    use itertools::Itertools;
    use ndarray::*;

    #[test]
    fn iou() {
        let iou = iou_matching::intersection_over_union(
            &arr1::<f32>(&[0.0, 0.0, 5.0, 5.0]),
            &arr2::<f32, _>(&[
                [0.0, 0.0, 5.0, 5.0],
                [1.0, 1.0, 5.0, 5.0],
                [2.0, 2.0, 5.0, 5.0],
                [3.0, 3.0, 5.0, 5.0],
                [4.0, 4.0, 5.0, 5.0],
                [5.0, 5.0, 5.0, 5.0],
            ]),
        );

        let expected = [1.0, 0.47058824, 0.21951219, 0.08695652, 0.020408163, 0.0];
        assert_eq!(iou.len(), expected.len());
        iou.iter()
            .zip(expected.iter())
            .for_each(|(actual, expected)| assert_approx_eq!(*actual, *expected, 1e-6));
    }

    #[test]
    fn iou_agrees_with_scalar() {
        let boxes = vec![
            BoundingBox::new(0.1, 0.1, 0.3, 0.3),
            BoundingBox::new(0.2, 0.15, 0.3, 0.35),
            BoundingBox::new(0.6, 0.6, 0.2, 0.2),
            BoundingBox::new(0.3, 0.3, 0.0, 0.2),
            BoundingBox::new(0.05, 0.4, 0.5, 0.1),
        ];
        let candidates = iou_matching::tlwh_matrix(&boxes.iter().collect::<Vec<_>>());

        boxes.iter().cartesian_product(0..boxes.len()).for_each(|(a, j)| {
            let vectorised = iou_matching::intersection_over_union(&a.to_tlwh(), &candidates);
            assert_eq!(vectorised[j], a.iou(&boxes[j]));
        });
    }

    #[test]
    fn iou_matrix() {
        let d0 = Detection::new(None, BoundingBox::new(0.0, 0.0, 0.5, 0.5), 1.0, None, None);
        let d1 = Detection::new(None, BoundingBox::new(0.5, 0.5, 0.5, 0.5), 1.0, None, None);
        let d2 = Detection::new(None, BoundingBox::new(0.25, 0.0, 0.5, 0.5), 1.0, None, None);

        let t0 = Track::new(1, &d0, 0.0, 10);
        let t1 = Track::new(2, &d1, 0.0, 10);

        let matrix =
            iou_matching::iou_matrix(&[&t0, &t1], &[d0.clone(), d1.clone(), d2.clone()]);

        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 0.0);
        assert_approx_eq!(matrix[[0, 2]], 1.0 / 3.0, 1e-6);
        assert_eq!(matrix[[1, 0]], 0.0);
        assert_eq!(matrix[[1, 1]], 1.0);
        assert_eq!(matrix[[1, 2]], 0.0);
    }

    #[test]
    fn iou_matrix_empty() {
        let d0 = Detection::new(None, BoundingBox::new(0.0, 0.0, 0.5, 0.5), 1.0, None, None);
        let t0 = Track::new(1, &d0, 0.0, 10);

        assert_eq!(iou_matching::iou_matrix(&[&t0], &[]).dim(), (1, 0));
        assert_eq!(iou_matching::iou_matrix(&[], &[d0]).dim(), (0, 1));
    }
}
