use crate::ocr::RecognitionResult;

/// Minimum per-token confidence a line must reach before it is trusted.
pub const MIN_CONFIDENCE: i32 = 70;

/// Applies the confidence gate. A result with empty (or whitespace-only)
/// text, or with no usable confidence on any token, is "no result" and fails
/// regardless of threshold. Otherwise the *minimum* usable token confidence
/// must reach `threshold`: one low-confidence token anywhere invalidates the
/// whole line.
pub fn passes_gate(result: &RecognitionResult, threshold: i32) -> bool {
    if result.joined_text().is_empty() {
        return false;
    }
    match result.min_confidence() {
        Some(min) => min >= threshold,
        None => false,
    }
}
