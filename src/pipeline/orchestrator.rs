// Pipeline orchestrator: drains the frame source in position order and
// decides, frame by frame, whether recognition is worth running.

use anyhow::Result;
use image::RgbImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use crate::ocr::Recognizer;
use crate::pipeline::change::regions_differ;
use crate::pipeline::crop::extract_region;
use crate::pipeline::gate::{passes_gate, MIN_CONFIDENCE};
use crate::pipeline::timecode::format_display_time;
use crate::pipeline::types::{Rect, TimedCaption};
use crate::video::{FrameSource, SampledFrame};

/// Seconds subtracted (floored at zero) from a frame's position before
/// display, compensating for the caption having appeared shortly before the
/// sampled instant that first shows it.
pub const TIME_OFFSET_SECS: u64 = 2;

/// Whether the pipeline has a region to compare against yet. The first frame
/// always triggers recognition; after that the primed region is the one from
/// the most recently considered frame, whether or not it produced a caption.
enum RegionState {
    Empty,
    Primed(RgbImage),
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub frames: usize,
    pub recognitions: usize,
    pub captions: usize,
}

pub struct CaptionPipeline {
    rect: Rect,
    diff_threshold: f64,
    min_confidence: i32,
    state: RegionState,
    recognitions: usize,
}

impl CaptionPipeline {
    pub fn new(rect: Rect, diff_threshold: f64) -> Self {
        Self {
            rect,
            diff_threshold,
            min_confidence: MIN_CONFIDENCE,
            state: RegionState::Empty,
            recognitions: 0,
        }
    }

    /// Considers one frame: crop, change-gate, recognize, confidence-gate.
    /// The crop becomes the new comparison region regardless of the outcome.
    ///
    /// Crop and dimension failures are fatal; a recognition failure only
    /// skips this frame's caption.
    pub fn process_frame(
        &mut self,
        frame: &SampledFrame,
        recognizer: &dyn Recognizer,
    ) -> Result<Option<TimedCaption>> {
        let region = extract_region(&frame.image, &self.rect)?;

        let changed = match &self.state {
            RegionState::Empty => true,
            RegionState::Primed(previous) => {
                regions_differ(previous, &region, self.diff_threshold)?
            }
        };

        let caption = if changed {
            self.recognize_region(&region, frame.position, recognizer)
        } else {
            None
        };

        self.state = RegionState::Primed(region);
        Ok(caption)
    }

    fn recognize_region(
        &mut self,
        region: &RgbImage,
        position: u64,
        recognizer: &dyn Recognizer,
    ) -> Option<TimedCaption> {
        self.recognitions += 1;
        let result = match recognizer.recognize(region) {
            Ok(result) => result,
            Err(err) => {
                // OCR engines legitimately fail on blank or noisy crops;
                // treat it as "no result" and keep going.
                tracing::warn!("recognition failed at {}s, skipping frame: {:#}", position, err);
                return None;
            }
        };

        if !passes_gate(&result, self.min_confidence) {
            return None;
        }

        let adjusted = position.saturating_sub(TIME_OFFSET_SECS);
        Some(TimedCaption {
            display_time: format_display_time(adjusted),
            text: result.joined_text(),
        })
    }

    /// Drains `source` in order, handing each caption to `emit` as soon as it
    /// is computed. No caption is ever buffered, so aborting mid-run loses
    /// nothing already emitted.
    pub fn run<F>(
        &mut self,
        source: &mut dyn FrameSource,
        recognizer: &dyn Recognizer,
        mut emit: F,
    ) -> Result<RunStats>
    where
        F: FnMut(&TimedCaption),
    {
        let start_time = Instant::now();
        let pb = ProgressBar::new(source.frame_count() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})")?
                .progress_chars("#>-"),
        );

        let mut stats = RunStats {
            frames: 0,
            recognitions: 0,
            captions: 0,
        };

        while let Some(frame) = source.next_frame()? {
            if let Some(caption) = self.process_frame(&frame, recognizer)? {
                emit(&caption);
                stats.captions += 1;
            }
            stats.frames += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        stats.recognitions = self.recognitions;
        tracing::info!(
            "considered {} frames, ran {} recognitions, emitted {} captions in {:.2}s",
            stats.frames,
            stats.recognitions,
            stats.captions,
            start_time.elapsed().as_secs_f64()
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{RecognitionResult, TextToken};
    use image::Rgb;
    use std::cell::RefCell;

    struct VecSource {
        frames: std::vec::IntoIter<SampledFrame>,
        total: usize,
    }

    impl VecSource {
        fn new(frames: Vec<SampledFrame>) -> Self {
            let total = frames.len();
            Self {
                frames: frames.into_iter(),
                total,
            }
        }
    }

    impl FrameSource for VecSource {
        fn frame_count(&self) -> usize {
            self.total
        }

        fn next_frame(&mut self) -> Result<Option<SampledFrame>> {
            Ok(self.frames.next())
        }
    }

    /// Deterministic recognizer: a fixed token list per call, a call counter,
    /// and an optional hard failure.
    struct FakeRecognizer {
        tokens: Vec<TextToken>,
        fail: bool,
        calls: RefCell<usize>,
    }

    impl FakeRecognizer {
        fn confident(text: &str, confidence: i32) -> Self {
            Self {
                tokens: vec![TextToken {
                    text: text.to_string(),
                    confidence,
                }],
                fail: false,
                calls: RefCell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                tokens: Vec::new(),
                fail: true,
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl Recognizer for FakeRecognizer {
        fn recognize(&self, _region: &RgbImage) -> Result<RecognitionResult> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                anyhow::bail!("engine crashed");
            }
            Ok(RecognitionResult {
                tokens: self.tokens.clone(),
            })
        }
    }

    fn uniform_frame(position: u64, fill: u8) -> SampledFrame {
        SampledFrame {
            position,
            image: RgbImage::from_pixel(32, 16, Rgb([fill, fill, fill])),
        }
    }

    fn full_rect() -> Rect {
        Rect::new(0, 0, 32, 16).unwrap()
    }

    fn run_collecting(
        pipeline: &mut CaptionPipeline,
        frames: Vec<SampledFrame>,
        recognizer: &dyn Recognizer,
    ) -> (Vec<TimedCaption>, RunStats) {
        let mut source = VecSource::new(frames);
        let mut captions = Vec::new();
        let stats = pipeline
            .run(&mut source, recognizer, |caption| {
                captions.push(caption.clone())
            })
            .unwrap();
        (captions, stats)
    }

    /// Frames 1 and 2 identical, frame 3 sharply different, frames 4 and 5
    /// identical to 3: only the first frame and the change trigger
    /// recognition, so exactly two captions come out.
    #[test]
    fn test_five_frame_sequence_emits_twice() {
        let frames = vec![
            uniform_frame(1, 10),
            uniform_frame(2, 10),
            uniform_frame(3, 200),
            uniform_frame(4, 200),
            uniform_frame(5, 200),
        ];
        let recognizer = FakeRecognizer::confident("hello", 90);
        let mut pipeline = CaptionPipeline::new(full_rect(), 30.0);

        let (captions, stats) = run_collecting(&mut pipeline, frames, &recognizer);

        assert_eq!(recognizer.calls(), 2);
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.recognitions, 2);
        assert_eq!(captions.len(), 2);
        // position 1 floors to 0; position 3 adjusts to 1.
        assert_eq!(captions[0].display_time, "00:00");
        assert_eq!(captions[1].display_time, "00:01");
        assert_eq!(captions[1].text, "hello");
    }

    #[test]
    fn test_offset_and_floor() {
        let recognizer = FakeRecognizer::confident("line", 99);
        let mut pipeline = CaptionPipeline::new(full_rect(), 30.0);

        let caption = pipeline
            .process_frame(&uniform_frame(1, 40), &recognizer)
            .unwrap()
            .unwrap();
        assert_eq!(caption.display_time, "00:00");

        let mut pipeline = CaptionPipeline::new(full_rect(), 30.0);
        let caption = pipeline
            .process_frame(&uniform_frame(10, 40), &recognizer)
            .unwrap()
            .unwrap();
        assert_eq!(caption.display_time, "00:08");
    }

    /// A gate failure emits nothing, but the frame still becomes the
    /// comparison region: an identical follow-up frame skips recognition.
    #[test]
    fn test_gate_failure_still_primes_state() {
        let frames = vec![uniform_frame(1, 10), uniform_frame(2, 10)];
        let recognizer = FakeRecognizer::confident("noise", 40);
        let mut pipeline = CaptionPipeline::new(full_rect(), 30.0);

        let (captions, stats) = run_collecting(&mut pipeline, frames, &recognizer);

        assert!(captions.is_empty());
        assert_eq!(recognizer.calls(), 1);
        assert_eq!(stats.frames, 2);
    }

    /// An engine failure on one frame is skipped, not fatal, and the frame
    /// still primes the state.
    #[test]
    fn test_recognition_failure_skips_frame() {
        let frames = vec![uniform_frame(1, 10), uniform_frame(2, 10)];
        let recognizer = FakeRecognizer::failing();
        let mut pipeline = CaptionPipeline::new(full_rect(), 30.0);

        let (captions, stats) = run_collecting(&mut pipeline, frames, &recognizer);

        assert!(captions.is_empty());
        assert_eq!(recognizer.calls(), 1);
        assert_eq!(stats.frames, 2);
    }

    /// A rectangle outside the sampled frames is a configuration error that
    /// aborts the run.
    #[test]
    fn test_out_of_bounds_rect_is_fatal() {
        let rect = Rect::new(0, 0, 64, 64).unwrap();
        let recognizer = FakeRecognizer::confident("x", 90);
        let mut pipeline = CaptionPipeline::new(rect, 30.0);
        let mut source = VecSource::new(vec![uniform_frame(1, 10)]);

        let result = pipeline.run(&mut source, &recognizer, |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn test_runs_are_deterministic() {
        let build_frames = || {
            vec![
                uniform_frame(1, 10),
                uniform_frame(2, 220),
                uniform_frame(3, 220),
                uniform_frame(4, 90),
            ]
        };
        let recognizer = FakeRecognizer::confident("same", 85);

        let mut first = CaptionPipeline::new(full_rect(), 30.0);
        let (captions_a, stats_a) = run_collecting(&mut first, build_frames(), &recognizer);

        let mut second = CaptionPipeline::new(full_rect(), 30.0);
        let (captions_b, stats_b) = run_collecting(&mut second, build_frames(), &recognizer);

        assert_eq!(captions_a, captions_b);
        assert_eq!(stats_a.frames, stats_b.frames);
        assert_eq!(stats_a.captions, stats_b.captions);
    }
}
