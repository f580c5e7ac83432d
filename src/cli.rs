use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::change::DEFAULT_DIFF_THRESHOLD;
use crate::pipeline::types::{PipelineError, Rect};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract timestamped burned-in captions from a video", long_about = None)]
pub struct Args {
    /// Path to the video file
    pub video: PathBuf,

    /// Top-left corner of the caption region, as "x,y"
    #[arg(long, value_name = "X,Y", value_parser = parse_coordinate)]
    pub top_left: (u32, u32),

    /// Bottom-right corner of the caption region, as "x,y"
    #[arg(long, value_name = "X,Y", value_parser = parse_coordinate)]
    pub bottom_right: (u32, u32),

    /// First second of the video to consider (inclusive)
    #[arg(long)]
    pub start: Option<u64>,

    /// Last second of the video to consider (inclusive)
    #[arg(long)]
    pub end: Option<u64>,

    /// RMS luminance-difference threshold above which the caption region
    /// counts as changed
    #[arg(long, env = "HARDSUB_SCAN_DIFF_THRESHOLD", default_value_t = DEFAULT_DIFF_THRESHOLD)]
    pub diff_threshold: f64,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The crop rectangle described by the two corner flags.
    pub fn rect(&self) -> Result<Rect, PipelineError> {
        Rect::new(
            self.top_left.0,
            self.top_left.1,
            self.bottom_right.0,
            self.bottom_right.1,
        )
    }
}

/// Parses a comma-separated "x,y" coordinate pair.
fn parse_coordinate(raw: &str) -> Result<(u32, u32), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{raw}\""))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid x coordinate \"{x}\""))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid y coordinate \"{y}\""))?;
    Ok((x, y))
}
