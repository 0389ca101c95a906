//! Watermark embedding and extraction.
//!
//! # Scheme
//!
//! - The carrier is scrambled with [`catmap::forward`](crate::catmap::forward)
//! - The complemented, binarized mask is XORed into the centered region of
//!   the scrambled carrier (one bit per channel value)
//! - The result is unscrambled with [`catmap::inverse`](crate::catmap::inverse)
//!
//! Extraction XORs the carrier with the watermarked image and scrambles the
//! difference with the same key, which brings the flipped bits back into the
//! centered region.
//!
//! # Errors
//!
//! Returns [`WatermarkError`] when the inputs do not fit together.
use thiserror::Error;

use crate::grid::{GridError, PixelGrid};

mod embed;
mod extract;

pub use embed::embed_watermark;
pub use extract::extract_watermark;

/// Errors that can be emitted while embedding or extracting a watermark
#[derive(Debug, Error)]
pub enum WatermarkError
{
    /// The mask does not fit inside the carrier
    #[error(
        "watermark of {mask_height}x{mask_width} does not fit in a \
         {carrier_height}x{carrier_width} image"
    )]
    SizeMismatch
    {
        mask_height: usize,
        mask_width: usize,
        carrier_height: usize,
        carrier_width: usize,
    },

    /// The carrier and the watermarked image differ in shape
    #[error(
        "original image is {original:?} but watermarked image is \
         {watermarked:?} (height, width, channels)"
    )]
    ShapeMismatch
    {
        original: (usize, usize, usize),
        watermarked: (usize, usize, usize),
    },

    /// The mask and the carrier disagree on channel count
    #[error("watermark has {mask} channels but the image has {carrier}")]
    ChannelMismatch
    {
        mask: usize, carrier: usize
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Rectangle a mask occupies inside a carrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region
{
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

impl Region
{
    /// Centers a `mask` sized region inside `carrier`, rounding towards the
    /// top-left corner.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::SizeMismatch`] when the mask is taller or
    /// wider than the carrier.
    pub fn centered(
        carrier: &PixelGrid,
        mask: &PixelGrid,
    ) -> Result<Self, WatermarkError>
    {
        let mismatch = || WatermarkError::SizeMismatch {
            mask_height: mask.height(),
            mask_width: mask.width(),
            carrier_height: carrier.height(),
            carrier_width: carrier.width(),
        };

        let top = carrier
            .height()
            .checked_sub(mask.height())
            .ok_or_else(mismatch)?
            / 2;
        let left = carrier
            .width()
            .checked_sub(mask.width())
            .ok_or_else(mismatch)?
            / 2;

        Ok(Self {
            top,
            left,
            height: mask.height(),
            width: mask.width(),
        })
    }

    /// Returns `true` when `(row, col)` lies inside the region.
    #[cfg(test)]
    const fn contains(&self, row: usize, col: usize) -> bool
    {
        row >= self.top
            && row < self.top + self.height
            && col >= self.left
            && col < self.left + self.width
    }
}

/// Shape triple used in error reports
const fn shape(grid: &PixelGrid) -> (usize, usize, usize)
{
    (grid.height(), grid.width(), grid.channels())
}
