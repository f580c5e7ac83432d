use super::{FrameSource, SampledFrame};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Frames sampled per second of real time. At 1 fps the numeric stem of each
/// still ffmpeg writes is the frame's position in seconds.
pub const SAMPLE_RATE_FPS: u32 = 1;

/// Samples a video into per-second stills with ffmpeg, then serves them in
/// position order. Sampling happens once, up front, in `new`; the stills live
/// in a temporary directory that is removed when the sampler is dropped.
/// Images are decoded lazily, one per `next_frame` call.
pub struct FfmpegSampler {
    _frames_dir: TempDir,
    frames: std::vec::IntoIter<(u64, PathBuf)>,
    total: usize,
}

impl FfmpegSampler {
    pub fn new(video: &Path, start: Option<u64>, end: Option<u64>) -> Result<Self> {
        if !video.exists() {
            anyhow::bail!("video file not found: {}", video.display());
        }

        let frames_dir =
            TempDir::new().context("failed to create temporary frame directory")?;
        extract_frames(video, frames_dir.path())?;

        let frames = list_frames(frames_dir.path(), start, end);
        tracing::info!(
            "sampled {} frames from {} at {} fps",
            frames.len(),
            video.display(),
            SAMPLE_RATE_FPS
        );

        let total = frames.len();
        Ok(Self {
            _frames_dir: frames_dir,
            frames: frames.into_iter(),
            total,
        })
    }
}

/// Runs ffmpeg once, writing one still per sampled instant as `%04d.jpg`.
/// Any failure here is fatal: no frame has been processed yet.
fn extract_frames(video: &Path, out_dir: &Path) -> Result<()> {
    let pattern = out_dir.join("%04d.jpg");
    let output = Command::new("ffmpeg")
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(video)
        .arg("-vf")
        .arg(format!("fps={SAMPLE_RATE_FPS}"))
        .arg(&pattern)
        .output()
        .context("failed to run ffmpeg; is it installed?")?;

    if !output.status.success() {
        anyhow::bail!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Lists extracted stills sorted by numeric stem, keeping only positions
/// inside the inclusive `[start, end]` second range. Files without a numeric
/// stem or a jpg extension are ignored.
fn list_frames(dir: &Path, start: Option<u64>, end: Option<u64>) -> Vec<(u64, PathBuf)> {
    let mut frames: Vec<(u64, PathBuf)> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("jpg"))
                .unwrap_or(false)
        })
        .filter_map(|e| {
            let position = e
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())?;
            Some((position, e.path().to_path_buf()))
        })
        .filter(|(position, _)| {
            start.map_or(true, |s| *position >= s) && end.map_or(true, |e| *position <= e)
        })
        .collect();

    frames.sort_by_key(|(position, _)| *position);
    frames
}

impl FrameSource for FfmpegSampler {
    fn frame_count(&self) -> usize {
        self.total
    }

    fn next_frame(&mut self) -> Result<Option<SampledFrame>> {
        let Some((position, path)) = self.frames.next() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .with_context(|| format!("failed to decode sampled frame {}", path.display()))?
            .to_rgb8();
        Ok(Some(SampledFrame { position, image }))
    }
}
