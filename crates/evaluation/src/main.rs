mod utils;
use anyhow::{Context, Ok, Result};
use clap::Parser;
use itertools::Itertools;
use persontrack_rs::{FailurePolicy, FrameProcessor, SharedTracker, TrackerConfig};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufWriter, Write},
    num::NonZeroU32,
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::*;

/// Replay recorded per-frame detections through the tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The input detections CSV (`frame,timestamp,x,y,width,height,confidence`)
    #[arg(short, long)]
    input: PathBuf,

    /// The output tracks file
    #[arg(short, long)]
    output: PathBuf,

    /// Optional JSON summary of every frame
    #[arg(short, long)]
    summary: Option<PathBuf>,

    /// JSON file with tracker parameters, individual flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum gap in seconds between sightings before a track is discarded
    #[arg(long)]
    max_age: Option<f64>,

    /// Minimum intersection over union (exclusive) to accept a match
    #[arg(long)]
    iou_threshold: Option<f32>,

    /// Number of past boxes kept per track
    #[arg(long)]
    history_capacity: Option<usize>,

    /// Frame rate used for rows without a timestamp
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Source frame width, set together with `frame_height` when the input boxes are in pixels
    #[arg(long, requires = "frame_height")]
    frame_width: Option<NonZeroU32>,

    /// Source frame height, set together with `frame_width` when the input boxes are in pixels
    #[arg(long, requires = "frame_width")]
    frame_height: Option<NonZeroU32>,

    /// Stop on a frame the provider cannot serve instead of treating it as empty
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Debug, Serialize)]
struct FrameSummary {
    frame: u32,
    timestamp: f64,
    track_ids: Vec<usize>,
    active_track_count: usize,
    evicted_track_ids: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct Summary {
    config: TrackerConfig,
    tracks_created: usize,
    detections_per_track: BTreeMap<usize, usize>,
    frames: Vec<FrameSummary>,
}

fn load_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {}", path.display()))?;
            serde_json::from_reader::<_, TrackerConfig>(file)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => TrackerConfig::default(),
    };

    if let Some(max_age) = args.max_age {
        config.with_max_age(max_age);
    }
    if let Some(iou_threshold) = args.iou_threshold {
        config.with_iou_threshold(iou_threshold);
    }
    if let Some(history_capacity) = args.history_capacity {
        config.with_history_capacity(history_capacity);
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(?config, "tracker configuration");

    let frame_size = args
        .frame_width
        .zip(args.frame_height)
        .map(|(width, height)| csv_provider::FrameSize { width, height });

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let provider = csv_provider::CsvDetectionProvider::from_reader(input, args.fps, frame_size)?;
    let frames = provider.frames();

    let tracker = SharedTracker::with_config(config.clone())?;
    let policy = if args.strict {
        FailurePolicy::Propagate
    } else {
        FailurePolicy::AgeTracks
    };
    let mut processor = FrameProcessor::new(provider, tracker.clone()).with_policy(policy);

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(&args.output)?);
    let mut summaries = Vec::with_capacity(frames.len());

    frames.into_iter().try_for_each(|(frame_index, timestamp)| {
        let output = processor
            .process(&frame_index, timestamp)
            .with_context(|| format!("frame {frame_index}"))?;

        output.detections.iter().try_for_each(|detection| {
            let (x, y, width, height) = match frame_size {
                Some(size) => frame_processing::denormalize(detection.bbox(), size.width, size.height),
                None => (
                    detection.bbox().x(),
                    detection.bbox().y(),
                    detection.bbox().width(),
                    detection.bbox().height(),
                ),
            };

            // output format
            // <frame>, <id>, <bb_left>, <bb_top>, <bb_width>, <bb_height>, <conf>, <x>, <y>, <z>
            writeln!(
                file,
                "{frame_index},{},{x:.4},{y:.4},{width:.4},{height:.4},{:.3},-1,-1,-1",
                detection.track_id().unwrap_or_default(),
                detection.confidence(),
            )
        })?;

        summaries.push(FrameSummary {
            frame: frame_index,
            timestamp,
            track_ids: output
                .detections
                .iter()
                .filter_map(|detection| detection.track_id())
                .collect(),
            active_track_count: output.active_track_count,
            evicted_track_ids: output.evicted_track_ids,
        });

        Ok(())
    })?;
    file.flush()?;

    let tracks_created = tracker.with_tracker(|tracker| tracker.next_id() - 1);
    info!(
        frames = summaries.len(),
        tracks_created,
        active = tracker.active_track_count(),
        "replay complete"
    );

    if let Some(path) = &args.summary {
        let detections_per_track = summaries
            .iter()
            .flat_map(|summary| summary.track_ids.iter().copied())
            .counts()
            .into_iter()
            .collect::<BTreeMap<_, _>>();

        let summary = Summary {
            config,
            tracks_created,
            detections_per_track,
            frames: summaries,
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &summary)?;
    }

    Ok(())
}
