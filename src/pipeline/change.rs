// Change detection: a single global RMS luminance-difference metric over the
// whole region. No edge detection, no per-pixel masking.

use crate::pipeline::types::PipelineError;
use image::RgbImage;

/// Default RMS threshold above which a region counts as changed.
pub const DEFAULT_DIFF_THRESHOLD: f64 = 30.0;

/// Histogram of per-pixel luminance differences between two same-sized
/// regions, one bucket per possible 0-255 difference value. The RGB channels
/// are differenced first and the difference image is then reduced to
/// luminance with ITU-R 601 integer weights.
fn luma_diff_histogram(prev: &RgbImage, cur: &RgbImage) -> Result<[u64; 256], PipelineError> {
    let (prev_width, prev_height) = prev.dimensions();
    let (cur_width, cur_height) = cur.dimensions();
    if (prev_width, prev_height) != (cur_width, cur_height) {
        return Err(PipelineError::DimensionMismatch {
            prev_width,
            prev_height,
            cur_width,
            cur_height,
        });
    }
    if prev_width == 0 || prev_height == 0 {
        return Err(PipelineError::EmptyRegion {
            width: prev_width,
            height: prev_height,
        });
    }

    let mut hist = [0u64; 256];
    for (a, b) in prev.pixels().zip(cur.pixels()) {
        let dr = a.0[0].abs_diff(b.0[0]) as u32;
        let dg = a.0[1].abs_diff(b.0[1]) as u32;
        let db = a.0[2].abs_diff(b.0[2]) as u32;
        let luma = (dr * 299 + dg * 587 + db * 114) / 1000;
        hist[luma as usize] += 1;
    }
    Ok(hist)
}

/// Root-mean-square of the per-pixel luminance difference over the whole
/// region: `sqrt(sum(count[b] * b^2) / (width * height))`.
pub fn rms_difference(prev: &RgbImage, cur: &RgbImage) -> Result<f64, PipelineError> {
    let hist = luma_diff_histogram(prev, cur)?;
    let pixels = prev.width() as u64 * prev.height() as u64;
    let sum_of_squares: u64 = hist
        .iter()
        .enumerate()
        .map(|(value, &count)| count * (value as u64).pow(2))
        .sum();
    Ok((sum_of_squares as f64 / pixels as f64).sqrt())
}

/// Whether two regions differ enough to warrant re-running recognition.
pub fn regions_differ(prev: &RgbImage, cur: &RgbImage, threshold: f64) -> Result<bool, PipelineError> {
    Ok(rms_difference(prev, cur)? > threshold)
}
