use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use persontrack_rs::{BoundingBox, Detection, DetectionProvider};
use serde::Deserialize;
use std::{io::Read, num::NonZeroU32};
use tracing::debug;

use crate::utils::frame_processing;

/// One row of the input file.
///
/// ```text
/// frame,timestamp,x,y,width,height,confidence
/// 1,0.000,0.10,0.20,0.15,0.40,0.91
/// 2,0.033,,,,,
/// ```
///
/// A row with empty box columns declares a frame with no detections. An empty timestamp is derived from the frame index
/// and the replay frame rate.
#[derive(Debug, Deserialize)]
struct Record {
    frame: u32,
    timestamp: Option<f64>,
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    confidence: Option<f32>,
}

/// Pixel dimensions of the source frames, when the input is not already normalized.
#[derive(Debug, Clone, Copy)]
pub struct FrameSize {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

#[derive(Debug)]
struct Frame {
    timestamp: f64,
    detections: Vec<Detection>,
}

/// Serves per-frame detections recorded in a CSV file.
#[derive(Debug)]
pub struct CsvDetectionProvider {
    frames: IndexMap<u32, Frame>,
}

impl CsvDetectionProvider {
    /// Parse a detections file.
    ///
    /// # Parameters
    ///
    /// * `reader`: CSV source with a header row.
    /// * `fps`: Frame rate used for rows without a timestamp.
    /// * `frame_size`: If set, boxes are in pixels and are normalized against this size.
    pub fn from_reader<R: Read>(
        reader: R,
        fps: f64,
        frame_size: Option<FrameSize>,
    ) -> Result<CsvDetectionProvider> {
        let mut frames = IndexMap::<u32, Frame>::new();

        for record in csv::Reader::from_reader(reader).deserialize() {
            let record: Record = record?;
            let timestamp = record
                .timestamp
                .unwrap_or_else(|| record.frame as f64 / fps);
            if !timestamp.is_finite() {
                return Err(anyhow!(
                    "frame {} has a non-finite timestamp {timestamp}",
                    record.frame
                ));
            }

            let frame = frames.entry(record.frame).or_insert_with(|| Frame {
                timestamp,
                detections: Vec::new(),
            });

            if let (Some(x), Some(y), Some(width), Some(height)) =
                (record.x, record.y, record.width, record.height)
            {
                let bbox = match frame_size {
                    Some(size) => {
                        frame_processing::normalize(x, y, width, height, size.width, size.height)
                    }
                    None => BoundingBox::new(x, y, width, height),
                };
                let label = format!("Person {}", frame.detections.len() + 1);
                frame.detections.push(Detection::new(
                    None,
                    bbox,
                    record.confidence.unwrap_or(1.0),
                    Some(label),
                    None,
                ));
            }
        }

        debug!(frames = frames.len(), "loaded detections");
        Ok(CsvDetectionProvider { frames })
    }

    /// The frames in file order with their timestamps.
    pub fn frames(&self) -> Vec<(u32, f64)> {
        self.frames
            .iter()
            .map(|(index, frame)| (*index, frame.timestamp))
            .collect()
    }
}

impl DetectionProvider<u32> for CsvDetectionProvider {
    fn detect(&mut self, frame: &u32) -> Result<Vec<Detection>> {
        self.frames
            .get_mut(frame)
            .map(|frame| std::mem::take(&mut frame.detections))
            .ok_or_else(|| anyhow!("frame {frame} is not in the detections file"))
    }
}
