//! Arnold's cat map over pixel positions.
//!
//! The forward map shears columns by rows and then rows by the new columns:
//!
//! - `y' = (y + dx * x) mod width`
//! - `x' = (x + dy * y') mod height`
//!
//! [`inverse`] undoes the two shears in reverse order. Each shear is a
//! bijection for any integer offset, so the pair is one as well, square grid
//! or not.
//!
//! # Repeat count
//!
//! The key's `iterations` controls how many passes are run, with at least one
//! pass. Every pass reads the original input, never the output of the
//! previous pass, so the result equals a single pass while the cost grows
//! linearly with `iterations`. Extraction depends on this exact behavior.
use tracing::trace;

use crate::grid::PixelGrid;
use crate::key::WatermarkKey;

/// Scrambles pixel positions of `grid` with the key.
#[must_use]
pub fn forward(grid: &PixelGrid, key: &WatermarkKey) -> PixelGrid
{
    remap(grid, key, |shear, x, y| {
        let y = shear.add_col(y, x);
        let x = shear.add_row(x, y);
        (x, y)
    })
}

/// Restores pixel positions scrambled by [`forward`] with the same key.
#[must_use]
pub fn inverse(grid: &PixelGrid, key: &WatermarkKey) -> PixelGrid
{
    remap(grid, key, |shear, x, y| {
        let x = shear.sub_row(x, y);
        let y = shear.sub_col(y, x);
        (x, y)
    })
}

/// Number of full passes run for a key, never fewer than one
#[must_use]
pub fn passes(key: &WatermarkKey) -> u64
{
    u64::try_from(key.iterations).unwrap_or(0).max(1)
}

/// Copies every pixel of `grid` to the position chosen by `map`, once per
/// pass.
fn remap<F>(grid: &PixelGrid, key: &WatermarkKey, map: F) -> PixelGrid
where
    F: Fn(&Shear, usize, usize) -> (usize, usize),
{
    let mut output = grid.zeroed_like();
    if grid.is_empty()
    {
        return output;
    }

    let shear = Shear::new(key, grid.height(), grid.width());
    trace!(
        ?key,
        height = grid.height(),
        width = grid.width(),
        passes = passes(key),
        "remapping grid"
    );

    for _ in 0..passes(key)
    {
        for x in 0..grid.height()
        {
            for y in 0..grid.width()
            {
                let (to_x, to_y) = map(&shear, x, y);
                output
                    .pixel_mut(to_x, to_y)
                    .copy_from_slice(grid.pixel(x, y));
            }
        }
    }

    output
}

/// Key offsets reduced into the grid's index ranges.
///
/// Both factors of every product are reduced below the same dimension, so
/// intermediate values stay under the square of that dimension.
struct Shear
{
    height: usize,
    width: usize,
    /// `dx mod width`
    dx: usize,
    /// `dy mod height`
    dy: usize,
}

impl Shear
{
    fn new(key: &WatermarkKey, height: usize, width: usize) -> Self
    {
        Self {
            height,
            width,
            dx: reduce(key.dx, width),
            dy: reduce(key.dy, height),
        }
    }

    /// `(y + dx * x) mod width`
    const fn add_col(&self, y: usize, x: usize) -> usize
    {
        (y + self.dx * (x % self.width)) % self.width
    }

    /// `(x + dy * y) mod height`
    const fn add_row(&self, x: usize, y: usize) -> usize
    {
        (x + self.dy * (y % self.height)) % self.height
    }

    /// `(y - dx * x) mod width`
    const fn sub_col(&self, y: usize, x: usize) -> usize
    {
        let step = self.dx * (x % self.width) % self.width;
        (y + self.width - step) % self.width
    }

    /// `(x - dy * y) mod height`
    const fn sub_row(&self, x: usize, y: usize) -> usize
    {
        let step = self.dy * (y % self.height) % self.height;
        (x + self.height - step) % self.height
    }
}

/// Euclidean remainder of a signed offset
fn reduce(offset: i64, modulus: usize) -> usize
{
    // grid dimensions of an in-memory image fit in i128 and the result is
    // below `modulus`
    let reduced = i128::from(offset).rem_euclid(modulus as i128);
    reduced as usize
}
