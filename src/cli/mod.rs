//! Command line interface for the application.
//!
//! Provides an entry point for the application and handles the CLI arguments.
mod image_io;

use std::path::Path;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use self::image_io::{OutputFormat, load_image, write_image};
use crate::grid::{GridError, PixelGrid};
use crate::key::{WatermarkKey, generate_key};
use crate::watermark::{WatermarkError, embed_watermark, extract_watermark};

/// Errors that can be emitted while handling the CLI
#[derive(Debug, Error)]
pub enum AppError
{
    /// The command line could not be parsed
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// An I/O error occurred
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Reading an input failed
    #[error("failed to read {}: {source}", path.display())]
    Read
    {
        path: Box<Path>,
        #[source]
        source: std::io::Error,
    },

    /// An input could not be decoded as an image
    #[error("failed to open image {}: {source}", path.display())]
    ImageOpen
    {
        path: Box<Path>,
        #[source]
        source: image::ImageError,
    },

    /// Writing the output failed
    #[error("failed to write {}: {source}", path.display())]
    Write
    {
        path: Box<Path>,
        #[source]
        source: std::io::Error,
    },

    /// The output could not be encoded
    #[error(
        "failed to encode {} as {target_format}: {source}",
        path.display()
    )]
    ImageEncode
    {
        path: Box<Path>,
        target_format: Box<str>,
        #[source]
        source: image::ImageError,
    },

    /// The output format is unsupported
    #[error(
        "unsupported output format {extension:?}, use png, bmp, tiff or ppm"
    )]
    UnsupportedFormat
    {
        extension: Box<str>
    },

    /// A watermarking error occurred
    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    /// A pixel buffer could not be converted
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The main CLI parser
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Hide and recover watermark images with Arnold's cat map",
    after_help = "encode prints the key as \"DX DY ITERATIONS\"; pass the same \
                  three values to decode."
)]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

/// The main command
#[derive(Subcommand)]
enum Command
{
    Encode(EncodingArgs),
    Decode(DecodingArgs),
}

/// Embed a watermark image into an image.
#[derive(Args)]
struct EncodingArgs
{
    /// Image that will carry the watermark.
    original: Box<Path>,
    /// Watermark image. Must not be taller or wider than the original.
    watermark: Box<Path>,
    /// Output path for the watermarked image (png, bmp, tiff or ppm).
    output: Box<Path>,
    /// Reuse a known key instead of generating one.
    #[arg(
        long,
        value_name = "DX,DY,ITERATIONS",
        allow_hyphen_values = true,
        conflicts_with = "seed"
    )]
    key: Option<WatermarkKey>,
    /// Seed for reproducible key generation.
    #[arg(long, value_name = "NUMBER")]
    seed: Option<u64>,
}

/// Recover a watermark image.
#[derive(Args)]
struct DecodingArgs
{
    /// Image the watermark was embedded into.
    original: Box<Path>,
    /// Image that contains the watermark.
    watermarked: Box<Path>,
    /// Output path for the recovered watermark (png, bmp, tiff or ppm).
    output: Box<Path>,
    /// First key value printed by encode.
    #[arg(allow_negative_numbers = true)]
    dx: i64,
    /// Second key value printed by encode.
    #[arg(allow_negative_numbers = true)]
    dy: i64,
    /// Third key value printed by encode.
    #[arg(allow_negative_numbers = true)]
    iterations: i64,
}

impl DecodingArgs
{
    const fn key(&self) -> WatermarkKey
    {
        WatermarkKey::new(self.dx, self.dy, self.iterations)
    }
}

/// Parses CLI arguments and executes the requested operation.
///
/// `--help` and `--version` are printed here and count as success.
///
/// # Errors
///
/// Returns [`AppError`] when the arguments are invalid, reading or writing
/// files fails, or the images do not fit together.
pub fn run() -> Result<(), AppError>
{
    let cli = match Cli::try_parse()
    {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() =>
        {
            err.print()?;
            return Ok(());
        },
        Err(err) => return Err(err.into()),
    };

    match cli.command
    {
        Command::Encode(args) =>
        {
            let key = handle_encode(&args)?;
            // the key is the only thing on stdout
            println!("{key}");
            Ok(())
        },
        Command::Decode(args) => handle_decode(&args),
    }
}

/// Handles the embedding of a watermark into an image.
///
/// Returns the key needed to recover the watermark.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files fails, or when the
/// watermark does not fit in the original image.
fn handle_encode(args: &EncodingArgs) -> Result<WatermarkKey, AppError>
{
    let format = OutputFormat::from_path(&args.output)?;
    let original = load_image(&args.original)?;
    let watermark = load_image(&args.watermark)?;

    let key = resolve_key(args, original.height(), original.width());
    let watermarked = embed_watermark(
        &PixelGrid::from(original),
        &PixelGrid::from(watermark),
        &key,
    )?;

    write_image(&watermarked.into_rgb_image()?, format, &args.output)?;
    info!(output = %args.output.display(), "watermark embedded");

    Ok(key)
}

/// Handles the recovery of a watermark from an image.
///
/// # Errors
///
/// Returns [`AppError`] when reading or writing files fails, or when the two
/// images differ in shape.
fn handle_decode(args: &DecodingArgs) -> Result<(), AppError>
{
    let format = OutputFormat::from_path(&args.output)?;
    let original = PixelGrid::from(load_image(&args.original)?);
    let watermarked = PixelGrid::from(load_image(&args.watermarked)?);

    let recovered = extract_watermark(&original, &watermarked, &args.key())?;

    write_image(&recovered.into_rgb_image()?, format, &args.output)?;
    info!(output = %args.output.display(), "watermark recovered");

    Ok(())
}

/// Picks the supplied key, or draws one for a `height x width` image.
fn resolve_key(args: &EncodingArgs, height: u32, width: u32) -> WatermarkKey
{
    if let Some(key) = args.key
    {
        debug!(%key, "using supplied key");
        return key;
    }

    let key = match args.seed
    {
        Some(seed) =>
        {
            generate_key(height, width, &mut ChaCha8Rng::seed_from_u64(seed))
        },
        None => generate_key(height, width, &mut rand::rng()),
    };
    info!(%key, seed = ?args.seed, "generated key");

    key
}
