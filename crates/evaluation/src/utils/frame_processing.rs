use persontrack_rs::BoundingBox;
use std::num::NonZeroU32;

/// Convert a pixel space `(x, y, width, height)` box into normalized co-ordinates of a `frame_width` x `frame_height` frame.
/// The corners are clamped to the frame first, so a box hanging over the edge is cut at the edge.
pub fn normalize(
  x: f32,
  y: f32,
  width: f32,
  height: f32,
  frame_width: NonZeroU32,
  frame_height: NonZeroU32,
) -> BoundingBox {
  let frame_width = frame_width.get() as f32;
  let frame_height = frame_height.get() as f32;

  let x0 = x.clamp(0.0, frame_width);
  let y0 = y.clamp(0.0, frame_height);
  let x1 = (x + width).clamp(0.0, frame_width);
  let y1 = (y + height).clamp(0.0, frame_height);

  BoundingBox::new(
    x0 / frame_width,
    y0 / frame_height,
    (x1 - x0).max(0.0) / frame_width,
    (y1 - y0).max(0.0) / frame_height,
  )
}

/// Scale a normalized box back to pixel space, returned as `(x, y, width, height)`.
pub fn denormalize(
  bbox: &BoundingBox,
  frame_width: NonZeroU32,
  frame_height: NonZeroU32,
) -> (f32, f32, f32, f32) {
  let frame_width = frame_width.get() as f32;
  let frame_height = frame_height.get() as f32;

  (
    bbox.x() * frame_width,
    bbox.y() * frame_height,
    bbox.width() * frame_width,
    bbox.height() * frame_height,
  )
}
