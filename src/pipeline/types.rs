use std::fmt;
use thiserror::Error;

/// Errors that abort a run. Anything local to a single frame's recognition is
/// handled inside the orchestrator and never surfaces as one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid rectangle ({x1},{y1})-({x2},{y2}): corners must satisfy x1 < x2 and y1 < y2")]
    InvalidRectangle { x1: u32, y1: u32, x2: u32, y2: u32 },

    #[error("crop rectangle {rect} exceeds image bounds {width}x{height}")]
    InvalidRegion { rect: Rect, width: u32, height: u32 },

    #[error("region dimensions differ: {prev_width}x{prev_height} vs {cur_width}x{cur_height}")]
    DimensionMismatch {
        prev_width: u32,
        prev_height: u32,
        cur_width: u32,
        cur_height: u32,
    },

    #[error("cannot compare empty {width}x{height} regions")]
    EmptyRegion { width: u32, height: u32 },
}

/// Pixel-space crop rectangle. Construction enforces `x1 < x2` and `y1 < y2`,
/// so every crop made with a Rect has at least one pixel and all regions in a
/// run share dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Result<Self, PipelineError> {
        if x1 >= x2 || y1 >= y2 {
            return Err(PipelineError::InvalidRectangle { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// One emitted caption line: a formatted display time plus the recognized
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedCaption {
    pub display_time: String,
    pub text: String,
}
