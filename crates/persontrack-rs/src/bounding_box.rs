use crate::Error;
use ndarray::*;
use serde::{Deserialize, Serialize};

/// Tolerance for boxes that touch the right or bottom edge of the frame.
const EDGE_EPSILON: f32 = 1e-4;

/// BoundingBox represents the bounding box of a detection in normalized image co-ordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left of the bounding box (i.e. min-x)
    x: f32,
    /// Top of the bounding box (i.e. min-y)
    y: f32,
    /// Width of the bounding box
    width: f32,
    /// Height of the bounding box
    height: f32,
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl BoundingBox {
    /// Returns a new BoundingBox
    ///
    /// # Parameters
    ///
    /// * `x`: Bounding box left.
    /// * `y`: Bounding box top.
    /// * `width`: Bounding box width.
    /// * `height`: Bounding box height.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x of the bounding box
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Returns the y of the bounding box
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Returns the width of the bounding box
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the height of the bounding box
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the area of the bounding box
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Returns the centre point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns true if the box has no positive area (including NaN dimensions).
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Returns the bounding box in left, top, width, height format, i.e., `(min x, min y, width, height)`.
    pub fn to_tlwh(&self) -> Array1<f32> {
        arr1::<f32>(&[self.x, self.y, self.width, self.height])
    }

    /// Returns the bounding box in top-left, bottom-right format, i.e., `(min x, min y, max x, max y)`.
    pub fn to_tlbr(&self) -> Array1<f32> {
        arr1::<f32>(&[self.x, self.y, self.x + self.width, self.y + self.height])
    }

    /// Intersection over union with another box.
    ///
    /// Returns `0.0` when the rectangles do not overlap, when either box is degenerate or when the union is not
    /// positive, so the result is always a finite value in `[0.0, 1.0]`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let (ax1, ay1, ax2, ay2) = (self.x, self.y, self.x + self.width, self.y + self.height);
        let (bx1, by1, bx2, by2) = (
            other.x,
            other.y,
            other.x + other.width,
            other.y + other.height,
        );

        let ix1 = ax1.max(bx1);
        let iy1 = ay1.max(by1);
        let ix2 = ax2.min(bx2);
        let iy2 = ay2.min(by2);

        if !(ix2 > ix1 && iy2 > iy1) {
            return 0.0;
        }

        // areas from the corner form so that a box compared with itself is exactly 1.0
        let intersection = (ix2 - ix1) * (iy2 - iy1);
        let union = (ax2 - ax1) * (ay2 - ay1) + (bx2 - bx1) * (by2 - by1) - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Checks that the box lies inside the normalized `[0, 1]` frame with non-negative dimensions.
    pub fn validate(&self) -> Result<(), Error> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        let inside = (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 1.0 + EDGE_EPSILON
            && self.y + self.height <= 1.0 + EDGE_EPSILON;

        if finite && inside {
            Ok(())
        } else {
            Err(Error::InvalidBoundingBox {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use assert_approx_eq::assert_approx_eq;
    use ndarray::*;

    #[test]
    fn to_tlwh() {
        let bbox = BoundingBox::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(bbox.to_tlwh(), arr1::<f32>(&[0.1, 0.2, 0.3, 0.4]));
    }

    #[test]
    fn to_tlbr() {
        let bbox = BoundingBox::new(1.0, 2.0, 13.0, 4.0);
        assert_eq!(bbox.to_tlbr(), arr1::<f32>(&[1.0, 2.0, 14.0, 6.0]));
    }

    #[test]
    fn iou_identical() {
        let bbox = BoundingBox::new(0.2, 0.3, 0.25, 0.4);
        assert_eq!(bbox.iou(&bbox), 1.0);
    }

    #[test]
    fn iou_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 0.2, 0.2);
        let b = BoundingBox::new(0.5, 0.5, 0.2, 0.2);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(b.iou(&a), 0.0);
    }

    #[test]
    fn iou_touching_edges() {
        let a = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let b = BoundingBox::new(0.5, 0.0, 0.5, 0.5);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_partial() {
        // intersection 0.25 * 0.5, union 0.25 + 0.25 - 0.125
        let a = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let b = BoundingBox::new(0.25, 0.0, 0.5, 0.5);
        assert_approx_eq!(a.iou(&b), 0.125 / 0.375, 1e-6);
    }

    #[test]
    fn iou_degenerate() {
        let a = BoundingBox::new(0.2, 0.2, 0.0, 0.3);
        let b = BoundingBox::new(0.1, 0.1, 0.5, 0.5);
        let c = BoundingBox::new(0.3, 0.3, -0.1, 0.2);
        let d = BoundingBox::new(0.3, 0.3, f32::NAN, 0.2);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(a.iou(&a), 0.0);
        assert_eq!(c.iou(&b), 0.0);
        assert_eq!(d.iou(&b), 0.0);
        assert!(a.is_degenerate());
        assert!(d.is_degenerate());
        assert!(!b.is_degenerate());
    }

    #[test]
    fn validate() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).validate().is_ok());
        assert!(BoundingBox::new(0.5, 0.5, 0.0, 0.0).validate().is_ok());
        assert!(BoundingBox::new(-0.1, 0.5, 0.1, 0.1).validate().is_err());
        assert!(BoundingBox::new(0.5, 0.5, 0.6, 0.1).validate().is_err());
        assert!(BoundingBox::new(0.5, 0.5, -0.1, 0.1).validate().is_err());
        assert!(BoundingBox::new(f32::NAN, 0.5, 0.1, 0.1).validate().is_err());
    }
}
