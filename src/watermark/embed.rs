//! Watermark embedding.
//!
//! Hides a binary mask in the least significant bits of a scrambled carrier.
//! Only channel values under black mask pixels are flipped, so the
//! watermarked image differs from the carrier by at most one in any value.
use tracing::debug;

use super::{Region, WatermarkError};
use crate::catmap;
use crate::grid::PixelGrid;
use crate::key::WatermarkKey;

/// Embeds `mask` into `carrier` using the permutation `key`.
///
/// The mask is binarized per channel value (non-zero is white). Every black
/// value flips the low bit of one carrier value in the centered region of
/// the scrambled carrier. The carrier is then unscrambled, which spreads the
/// flipped bits over the whole image.
///
/// # Errors
///
/// Returns [`WatermarkError::SizeMismatch`] when the mask is taller or wider
/// than the carrier, or [`WatermarkError::ChannelMismatch`] when the two
/// grids disagree on channel count.
pub fn embed_watermark(
    carrier: &PixelGrid,
    mask: &PixelGrid,
    key: &WatermarkKey,
) -> Result<PixelGrid, WatermarkError>
{
    let region = Region::centered(carrier, mask)?;
    if mask.channels() != carrier.channels()
    {
        return Err(WatermarkError::ChannelMismatch {
            mask: mask.channels(),
            carrier: carrier.channels(),
        });
    }

    debug!(?region, ?key, "embedding watermark");

    let mut scrambled = catmap::forward(carrier, key);
    for row in 0..region.height
    {
        for col in 0..region.width
        {
            let bits = mask.pixel(row, col);
            let target =
                scrambled.pixel_mut(region.top + row, region.left + col);
            for (value, &bit) in target.iter_mut().zip(bits)
            {
                *value ^= 1 - binarize(bit);
            }
        }
    }

    Ok(catmap::inverse(&scrambled, key))
}

/// Maps a mask value to its bit
const fn binarize(value: u8) -> u8
{
    if value > 0 { 1 } else { 0 }
}
