pub mod ffmpeg_sampler;

use anyhow::Result;
use image::RgbImage;

/// One frame pulled from the sampler, positioned at a whole-second offset
/// into the video.
pub struct SampledFrame {
    pub position: u64,
    pub image: RgbImage,
}

/// Pull-based source of sampled frames. Implementations yield frames in
/// strictly increasing position order, already filtered to the configured
/// second range.
pub trait FrameSource {
    /// Number of frames this source will yield in total.
    fn frame_count(&self) -> usize;

    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<SampledFrame>>;
}
