//! Dense in-memory pixel storage.
//!
//! A [`PixelGrid`] keeps every byte of an image in a single row-major buffer
//! addressed by `(row, column, channel)`. Both the permutation and the XOR
//! steps touch pixels in a scattered order, so a flat buffer with computed
//! offsets keeps those accesses cheap.
use image::RgbImage;
use thiserror::Error;

/// Number of channels in an RGB8 image
pub const RGB_CHANNELS: usize = 3;

/// Errors that can be emitted while building or converting a grid
#[derive(Debug, Error)]
pub enum GridError
{
    /// The raw buffer does not match the declared dimensions
    #[error(
        "buffer of {actual} bytes does not fit a {height}x{width}x{channels} \
         grid ({expected} bytes)"
    )]
    BufferSize
    {
        height: usize,
        width: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    /// The grid cannot be turned into an RGB image
    #[error("expected {RGB_CHANNELS} channels but the grid has {channels}")]
    UnsupportedChannels
    {
        channels: usize
    },

    /// The grid is larger than an image can describe
    #[error("grid of {height}x{width} exceeds the image dimension limit")]
    TooLarge
    {
        height: usize, width: usize
    },
}

/// Fixed-size 2D grid of fixed-channel byte pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid
{
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelGrid
{
    /// Allocates a zero-filled grid.
    #[must_use]
    pub fn new(height: usize, width: usize, channels: usize) -> Self
    {
        Self {
            height,
            width,
            channels,
            data: vec![0; height * width * channels],
        }
    }

    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BufferSize`] when `data` does not hold exactly
    /// `height * width * channels` bytes.
    pub fn from_raw(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, GridError>
    {
        let expected = height * width * channels;
        if data.len() != expected
        {
            return Err(GridError::BufferSize {
                height,
                width,
                channels,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Allocates a zero-filled grid with the same shape as `self`.
    #[must_use]
    pub fn zeroed_like(&self) -> Self
    {
        Self::new(self.height, self.width, self.channels)
    }

    #[must_use]
    pub const fn height(&self) -> usize
    {
        self.height
    }

    #[must_use]
    pub const fn width(&self) -> usize
    {
        self.width
    }

    #[must_use]
    pub const fn channels(&self) -> usize
    {
        self.channels
    }

    /// Returns `true` when the grid holds no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool
    {
        self.height == 0 || self.width == 0
    }

    /// Returns `true` when both grids agree on height, width and channels.
    #[must_use]
    pub const fn same_shape(&self, other: &Self) -> bool
    {
        self.height == other.height
            && self.width == other.width
            && self.channels == other.channels
    }

    /// The raw row-major buffer.
    #[must_use]
    pub fn as_raw(&self) -> &[u8]
    {
        &self.data
    }

    /// Mutable access to the raw row-major buffer.
    pub fn as_raw_mut(&mut self) -> &mut [u8]
    {
        &mut self.data
    }

    /// Channel values of the pixel at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> &[u8]
    {
        let start = self.offset(row, col);
        &self.data[start..start + self.channels]
    }

    /// Mutable channel values of the pixel at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    pub fn pixel_mut(&mut self, row: usize, col: usize) -> &mut [u8]
    {
        let start = self.offset(row, col);
        &mut self.data[start..start + self.channels]
    }

    /// Converts the grid into an RGB8 image.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsupportedChannels`] unless the grid has exactly
    /// three channels, or [`GridError::TooLarge`] when a dimension does not
    /// fit in `u32`.
    pub fn into_rgb_image(self) -> Result<RgbImage, GridError>
    {
        if self.channels != RGB_CHANNELS
        {
            return Err(GridError::UnsupportedChannels {
                channels: self.channels,
            });
        }

        let too_large = || GridError::TooLarge {
            height: self.height,
            width: self.width,
        };
        let width = u32::try_from(self.width).map_err(|_| too_large())?;
        let height = u32::try_from(self.height).map_err(|_| too_large())?;

        // length was validated on construction
        RgbImage::from_raw(width, height, self.data).ok_or_else(too_large)
    }

    /// Start of the pixel at `(row, col)` in the flat buffer
    fn offset(&self, row: usize, col: usize) -> usize
    {
        assert!(
            row < self.height && col < self.width,
            "pixel ({row}, {col}) is outside a {}x{} grid",
            self.height,
            self.width
        );
        (row * self.width + col) * self.channels
    }
}

impl From<RgbImage> for PixelGrid
{
    fn from(image: RgbImage) -> Self
    {
        let height = image.height() as usize;
        let width = image.width() as usize;
        Self {
            height,
            width,
            channels: RGB_CHANNELS,
            data: image.into_raw(),
        }
    }
}
