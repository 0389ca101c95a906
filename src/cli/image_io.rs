//! CLI image helpers.
//!
//! Resolves output formats, loads RGB buffers, and writes files with the
//! appropriate encoder.
use std::fs;
use std::io::{Cursor, Error, ErrorKind};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::codecs::tiff::TiffEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};

use super::AppError;

/// Lossless formats an output image can be written in.
///
/// Lossy formats would destroy the low bits carrying the watermark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum OutputFormat
{
    Png,
    Bmp,
    Tiff,
    Ppm,
}

impl OutputFormat
{
    /// Picks the format from the (case-insensitive) extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnsupportedFormat`] for any other extension.
    pub(super) fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError>
    {
        let extension = normalized_extension(path);
        match extension.as_deref()
        {
            Some("png") => Ok(Self::Png),
            Some("bmp") => Ok(Self::Bmp),
            Some("tiff" | "tif") => Ok(Self::Tiff),
            Some("ppm") => Ok(Self::Ppm),
            other =>
            {
                let extension = other.unwrap_or("<unknown>").into();
                Err(AppError::UnsupportedFormat { extension })
            },
        }
    }

    const fn name(self) -> &'static str
    {
        match self
        {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Ppm => "ppm",
        }
    }
}

/// Normalizes the extension of a path to lowercase.
pub(super) fn normalized_extension(path: impl AsRef<Path>) -> Option<String>
{
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Loads an image from the specified path and converts it to an RGB buffer.
///
/// Any alpha channel is dropped.
///
/// # Errors
///
/// Returns:
/// * [`AppError::Read`] when the path is a directory
/// * [`AppError::ImageOpen`] when the image cannot be loaded
pub(super) fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, AppError>
{
    if path.as_ref().is_dir()
    {
        let message = format!("{} is a directory", path.as_ref().display());
        return Err(AppError::Read {
            path: path.as_ref().into(),
            source: Error::new(ErrorKind::IsADirectory, message),
        });
    }

    image::open(path.as_ref())
        .map_err(|source| AppError::ImageOpen {
            path: path.as_ref().into(),
            source,
        })
        .map(DynamicImage::into_rgb8)
}

/// Encodes `image` in `format` and writes it to `output`.
///
/// The whole file is encoded in memory first, so a failed encode never
/// leaves a truncated file behind.
///
/// # Errors
///
/// Returns:
/// * [`AppError::ImageEncode`] when the image cannot be encoded
/// * [`AppError::Write`] when the file cannot be written
pub(super) fn write_image(
    image: &RgbImage,
    format: OutputFormat,
    output: impl AsRef<Path>,
) -> Result<(), AppError>
{
    let mut buffer = Cursor::new(Vec::new());
    let (width, height) = image.dimensions();
    let raw = image.as_raw().as_slice();

    let encoded = match format
    {
        OutputFormat::Png =>
        {
            PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Default,
                FilterType::Adaptive,
            )
            .write_image(raw, width, height, ExtendedColorType::Rgb8)
        },
        OutputFormat::Bmp =>
        {
            BmpEncoder::new(&mut buffer).encode(
                raw,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        },
        OutputFormat::Tiff =>
        {
            TiffEncoder::new(&mut buffer).write_image(
                raw,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        },
        OutputFormat::Ppm =>
        {
            PnmEncoder::new(&mut buffer)
                .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
                .encode(raw, width, height, ExtendedColorType::Rgb8)
        },
    };

    encoded.map_err(|source| AppError::ImageEncode {
        path: output.as_ref().into(),
        target_format: format.name().into(),
        source,
    })?;

    fs::write(output.as_ref(), buffer.into_inner()).map_err(|source| {
        AppError::Write {
            path: output.as_ref().into(),
            source,
        }
    })
}

#[cfg(test)]
mod tests
{
    use image::Rgb;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn extension_is_case_insensitive()
    {
        assert_eq!(
            normalized_extension(Path::new("a/b/image.PNG")),
            Some("png".into())
        );
        assert_eq!(normalized_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn resolves_supported_formats()
    {
        let cases = [
            ("out.png", OutputFormat::Png),
            ("out.BMP", OutputFormat::Bmp),
            ("out.tif", OutputFormat::Tiff),
            ("out.tiff", OutputFormat::Tiff),
            ("dir.d/out.ppm", OutputFormat::Ppm),
        ];

        for (path, expected) in cases
        {
            let format = OutputFormat::from_path(path)
                .unwrap_or_else(|err| panic!("{path} should resolve: {err}"));
            assert_eq!(format, expected);
        }
    }

    #[test]
    fn rejects_lossy_and_unknown_formats()
    {
        for path in ["out.jpg", "out.webp", "out"]
        {
            let error = OutputFormat::from_path(path)
                .expect_err("format should be rejected");
            assert!(
                matches!(error, AppError::UnsupportedFormat { .. }),
                "unexpected error for {path}: {error:?}"
            );
        }
    }

    #[test]
    fn written_images_load_back_unchanged()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let mut image = RgbImage::new(7, 5);
        for (x, y, pixel) in image.enumerate_pixels_mut()
        {
            *pixel = Rgb([x as u8 * 30, y as u8 * 40, (x + y) as u8]);
        }

        for name in ["out.png", "out.bmp", "out.tiff", "out.ppm"]
        {
            let path = dir.path().join(name);
            let format = OutputFormat::from_path(&path).expect("supported");
            write_image(&image, format, &path).expect("failed to write");

            let loaded = load_image(&path).expect("failed to load");
            assert_eq!(loaded, image, "pixels changed through {name}");
        }
    }

    #[test]
    fn loading_a_directory_fails()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let error =
            load_image(dir.path()).expect_err("directories are not images");
        assert!(matches!(error, AppError::Read { .. }));
    }

    #[test]
    fn loading_a_missing_file_fails()
    {
        let dir = TempDir::new().expect("failed to create tempdir");
        let error = load_image(dir.path().join("missing.png"))
            .expect_err("file does not exist");
        assert!(matches!(error, AppError::ImageOpen { .. }));
    }
}
