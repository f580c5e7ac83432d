use crate::pipeline::types::{PipelineError, Rect};
use image::RgbImage;

/// Crops `image` to `rect`. Pure; the source image is left untouched.
///
/// A rectangle reaching outside the image is a configuration error, not
/// something to clamp: a silently shrunken region would break the
/// same-dimensions invariant the change detector relies on.
pub fn extract_region(image: &RgbImage, rect: &Rect) -> Result<RgbImage, PipelineError> {
    let (width, height) = image.dimensions();
    if rect.x2 > width || rect.y2 > height {
        return Err(PipelineError::InvalidRegion {
            rect: *rect,
            width,
            height,
        });
    }

    let view = image::imageops::crop_imm(image, rect.x1, rect.y1, rect.width(), rect.height());
    Ok(view.to_image())
}
