// OCR port: the pipeline only sees this trait, so tests substitute
// deterministic fakes for the external engine.

pub mod tesseract;

use anyhow::Result;
use image::RgbImage;

/// Confidence value the engine reports for rows that carry no usable score.
pub const NO_CONFIDENCE: i32 = -1;

/// One recognized token with a confidence in [0, 100], or [`NO_CONFIDENCE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    pub text: String,
    pub confidence: i32,
}

/// Everything the engine recognized in one region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionResult {
    pub tokens: Vec<TextToken>,
}

impl RecognitionResult {
    /// Token texts joined with single spaces, trimmed. Empty when nothing
    /// was recognized.
    pub fn joined_text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    /// Minimum confidence across tokens with a usable score, or `None` when
    /// every token carries the sentinel.
    pub fn min_confidence(&self) -> Option<i32> {
        self.tokens
            .iter()
            .map(|token| token.confidence)
            .filter(|&confidence| confidence != NO_CONFIDENCE)
            .min()
    }
}

/// Port to the external recognition engine. Implementations report per-token
/// confidences; whether a line is trustworthy is the confidence gate's call.
pub trait Recognizer {
    fn recognize(&self, region: &RgbImage) -> Result<RecognitionResult>;
}
