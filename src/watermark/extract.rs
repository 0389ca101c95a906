//! Watermark extraction.
//!
//! Recovers a mask embedded with [`embed_watermark`](super::embed_watermark)
//! given the untouched carrier and the embedding key.
use tracing::debug;

use super::{WatermarkError, shape};
use crate::catmap;
use crate::grid::PixelGrid;
use crate::key::WatermarkKey;

/// Recovers the watermark hidden in `watermarked`.
///
/// The result has the carrier's shape. Values where the carrier and the
/// watermarked image agree become white (255) and values where they differ
/// become black (0), after the difference is scrambled back into place. With
/// the right key the mask reappears in the centered region on a white
/// background; with a wrong key the black values land elsewhere.
///
/// # Errors
///
/// Returns [`WatermarkError::ShapeMismatch`] when the two images differ in
/// height, width or channel count.
pub fn extract_watermark(
    original: &PixelGrid,
    watermarked: &PixelGrid,
    key: &WatermarkKey,
) -> Result<PixelGrid, WatermarkError>
{
    if !original.same_shape(watermarked)
    {
        return Err(WatermarkError::ShapeMismatch {
            original: shape(original),
            watermarked: shape(watermarked),
        });
    }

    let diff: Vec<u8> = original
        .as_raw()
        .iter()
        .zip(watermarked.as_raw())
        .map(|(a, b)| a ^ b)
        .collect();
    let diff = PixelGrid::from_raw(
        original.height(),
        original.width(),
        original.channels(),
        diff,
    )?;

    let changed = diff.as_raw().iter().filter(|&&v| v != 0).count();
    debug!(?key, changed, "extracting watermark");

    let mut recovered = catmap::forward(&diff, key);
    for value in recovered.as_raw_mut()
    {
        // threshold to 255 then invert
        *value = if *value > 0 { 0 } else { 255 };
    }

    Ok(recovered)
}
