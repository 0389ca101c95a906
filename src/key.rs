//! Permutation keys.
//!
//! A [`WatermarkKey`] is the shared secret between embedding and extraction.
//! It is either generated at embed time from image-size-dependent bounds or
//! supplied verbatim by the operator.
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

/// Errors that can be emitted while parsing a key from text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError
{
    /// The text did not hold exactly three values
    #[error("a key needs exactly 3 integers (dx dy iterations), got {found}")]
    WrongArity
    {
        found: usize
    },

    /// One of the values is not an integer
    #[error("invalid {field} value {value:?}: {source}")]
    InvalidInteger
    {
        /// Name of the offending component
        field: &'static str,
        /// Text that failed to parse
        value: Box<str>,
        #[source]
        source: ParseIntError,
    },
}

/// Offsets and repeat count of the cat map.
///
/// `dx` shears columns by rows and `dy` shears rows by columns. Both are
/// reduced modulo the grid dimensions when applied, so any integer is valid.
/// `iterations` below one still runs a single pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatermarkKey
{
    pub dx: i64,
    pub dy: i64,
    pub iterations: i64,
}

impl WatermarkKey
{
    #[must_use]
    pub const fn new(dx: i64, dy: i64, iterations: i64) -> Self
    {
        Self { dx, dy, iterations }
    }
}

impl Display for WatermarkKey
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} {} {}", self.dx, self.dy, self.iterations)
    }
}

impl FromStr for WatermarkKey
{
    type Err = KeyParseError;

    /// Parses `"dx dy iterations"`, with commas and/or whitespace between the
    /// values.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();

        let [dx, dy, iterations] = parts.as_slice()
        else
        {
            return Err(KeyParseError::WrongArity { found: parts.len() });
        };

        Ok(Self {
            dx: parse_field("dx", dx)?,
            dy: parse_field("dy", dy)?,
            iterations: parse_field("iterations", iterations)?,
        })
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T, KeyParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .parse()
        .map_err(|source| KeyParseError::InvalidInteger {
            field,
            value: value.into(),
            source,
        })
}

/// Source of uniformly distributed integers.
///
/// Every [`rand::Rng`] is a source; tests plug in fixed sequences.
pub trait UniformSource
{
    /// Draws an integer from the inclusive range `low..=high`.
    ///
    /// Callers guarantee `low <= high`.
    fn uniform_int(&mut self, low: i64, high: i64) -> i64;
}

impl<R: Rng> UniformSource for R
{
    fn uniform_int(&mut self, low: i64, high: i64) -> i64
    {
        self.random_range(low..=high)
    }
}

/// Inclusive ranges random keys are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBounds
{
    pub dx: (i64, i64),
    pub dy: (i64, i64),
    pub iterations: (i64, i64),
}

impl KeyBounds
{
    /// Bounds for a `height x width` carrier: each component lies between a
    /// tenth and nine tenths of its dimension, using integer division.
    ///
    /// The upper bound is `9 * extent / 10`, which for extents that are not
    /// multiples of ten exceeds `extent / 10 * 9` (95 gives 85, not 81).
    #[must_use]
    pub fn for_dimensions(height: u32, width: u32) -> Self
    {
        let tenths = |extent: u32| {
            let extent = i64::from(extent);
            (extent / 10, 9 * extent / 10)
        };

        Self {
            dx: tenths(width),
            dy: tenths(height),
            iterations: tenths(height.min(width)),
        }
    }
}

/// Draws a random key for a `height x width` carrier.
///
/// Components are drawn in `dx`, `dy`, `iterations` order.
pub fn generate_key<S>(height: u32, width: u32, source: &mut S) -> WatermarkKey
where
    S: UniformSource + ?Sized,
{
    let bounds = KeyBounds::for_dimensions(height, width);
    let dx = source.uniform_int(bounds.dx.0, bounds.dx.1);
    let dy = source.uniform_int(bounds.dy.0, bounds.dy.1);
    let iterations =
        source.uniform_int(bounds.iterations.0, bounds.iterations.1);

    WatermarkKey { dx, dy, iterations }
}

#[cfg(test)]
mod tests
{
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// Replays fixed values and records the requested ranges
    struct FixedSequence
    {
        values: Vec<i64>,
        requested: Vec<(i64, i64)>,
    }

    impl FixedSequence
    {
        fn new(values: &[i64]) -> Self
        {
            Self {
                values: values.iter().rev().copied().collect(),
                requested: Vec::new(),
            }
        }
    }

    impl UniformSource for FixedSequence
    {
        fn uniform_int(&mut self, low: i64, high: i64) -> i64
        {
            self.requested.push((low, high));
            self.values.pop().expect("fixed sequence exhausted")
        }
    }

    #[test]
    fn bounds_use_integer_tenths()
    {
        let bounds = KeyBounds::for_dimensions(480, 640);
        assert_eq!(bounds.dx, (64, 576));
        assert_eq!(bounds.dy, (48, 432));
        assert_eq!(bounds.iterations, (48, 432));

        let bounds = KeyBounds::for_dimensions(105, 99);
        assert_eq!(bounds.dx, (9, 89));
        assert_eq!(bounds.dy, (10, 94));
        assert_eq!(bounds.iterations, (9, 89));
    }

    #[test]
    fn upper_bound_scales_before_dividing()
    {
        let bounds = KeyBounds::for_dimensions(95, 95);
        assert_eq!(bounds.dx, (9, 85));
        assert_eq!(bounds.dy, (9, 85));
    }

    #[test]
    fn tiny_images_collapse_to_zero_bounds()
    {
        let bounds = KeyBounds::for_dimensions(5, 9);
        assert_eq!(bounds.dx, (0, 8));
        assert_eq!(bounds.dy, (0, 4));
        assert_eq!(bounds.iterations, (0, 4));
    }

    #[test]
    fn generation_draws_dx_dy_iterations_in_order()
    {
        let mut source = FixedSequence::new(&[7, 13, 4]);
        let key = generate_key(100, 200, &mut source);

        assert_eq!(key, WatermarkKey::new(7, 13, 4));
        assert_eq!(source.requested, [(20, 180), (10, 90), (10, 90)]);
    }

    #[test]
    fn random_keys_stay_within_bounds()
    {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let bounds = KeyBounds::for_dimensions(300, 200);

        for _ in 0..500
        {
            let key = generate_key(300, 200, &mut rng);
            assert!((bounds.dx.0..=bounds.dx.1).contains(&key.dx));
            assert!((bounds.dy.0..=bounds.dy.1).contains(&key.dy));
            assert!(
                (bounds.iterations.0..=bounds.iterations.1)
                    .contains(&key.iterations)
            );
        }
    }

    #[test]
    fn seeded_generation_is_reproducible()
    {
        let first = generate_key(640, 480, &mut ChaCha8Rng::seed_from_u64(42));
        let second = generate_key(640, 480, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn display_matches_decode_argument_order()
    {
        assert_eq!(WatermarkKey::new(-3, 17, 2).to_string(), "-3 17 2");
    }

    #[test]
    fn parses_comma_and_space_separated_keys()
    {
        let expected = WatermarkKey::new(7, 13, 4);
        assert_eq!("7,13,4".parse(), Ok(expected));
        assert_eq!("7 13 4".parse(), Ok(expected));
        assert_eq!(" 7, 13,  4 ".parse(), Ok(expected));
        assert_eq!("-1,-2,0".parse(), Ok(WatermarkKey::new(-1, -2, 0)));
    }

    #[test]
    fn rejects_wrong_number_of_values()
    {
        assert_eq!(
            "7,13".parse::<WatermarkKey>(),
            Err(KeyParseError::WrongArity { found: 2 })
        );
        assert_eq!(
            "1 2 3 4".parse::<WatermarkKey>(),
            Err(KeyParseError::WrongArity { found: 4 })
        );
    }

    #[test]
    fn accepts_any_integer_iterations()
    {
        assert_eq!("1,2,-3".parse(), Ok(WatermarkKey::new(1, 2, -3)));
        assert_eq!(
            "1 2 5000000000".parse(),
            Ok(WatermarkKey::new(1, 2, 5_000_000_000))
        );
    }

    #[test]
    fn rejects_non_integer_values()
    {
        let error = "1,2,three"
            .parse::<WatermarkKey>()
            .expect_err("iterations must be an integer");

        assert!(matches!(
            error,
            KeyParseError::InvalidInteger {
                field: "iterations",
                ..
            }
        ));
    }
}
