use crate::config::CompressionOptions;
use crate::constants::{
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::task::{Outcome, Task};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageReader};
use oxipng::{Deflaters, Options};
use std::fs;
use std::io::{Cursor, Write};
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns one [`Task`] into one [`Outcome`].
///
/// Holds the run's encode settings so every worker shares the same
/// immutable configuration.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    options: CompressionOptions,
}

impl ImageTransformer {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Runs the full pipeline for a task. Never returns an error: anything
    /// that goes wrong is reported as [`Outcome::Failure`].
    pub fn transform(&self, task: &Task) -> Outcome {
        match process_image_pipeline(task.input_path(), task.output_path(), &self.options) {
            Ok((output_path, original_size, compressed_size)) => {
                debug!(
                    "Compressed {} ({} -> {} bytes)",
                    task.input_path().display(),
                    original_size,
                    compressed_size
                );
                Outcome::Success {
                    input_path: task.input_path().to_path_buf(),
                    output_path,
                    original_size,
                    compressed_size,
                }
            }
            Err(e) => {
                debug!("Failed to process {}: {}", task.input_path().display(), e);
                Outcome::failure(task.input_path(), e)
            }
        }
    }
}

/// Core image processing pipeline:
/// load -> resize -> flatten -> encode -> atomic write
///
/// # Returns
/// * `Ok((final_path, original_size, compressed_size))`
/// * `Err(CompressionError)` - If any step fails; no file is left at `final_path`
pub fn process_image_pipeline(
    input_path: &Path,
    output_path: &Path,
    options: &CompressionOptions,
) -> Result<(PathBuf, u64, u64)> {
    let (mut img, original_size) = load_image_with_metadata(input_path)?;

    if let Some(max_dimension) = options.max_dimension {
        resize_to_fit(&mut img, max_dimension);
    }

    let img = flatten_to_opaque(img);

    let (final_path, format) = resolve_output(output_path, options)?;
    let encoded = encode_image(&img, format, options.quality)?;
    write_atomically(&final_path, &encoded)?;

    Ok((final_path, original_size, encoded.len() as u64))
}

/// Loads an image file and returns it along with its size on disk.
///
/// The decoder is picked from the file contents, so a mislabelled
/// extension still decodes.
pub fn load_image_with_metadata(input_path: &Path) -> Result<(DynamicImage, u64)> {
    if !input_path.exists() {
        return Err(CompressionError::FileNotFound(input_path.to_path_buf()));
    }

    let file_size = fs::metadata(input_path)?.len();
    let img = ImageReader::open(input_path)?
        .with_guessed_format()?
        .decode()?;

    Ok((img, file_size))
}

/// Dimensions after bounding the longer side to `max_dimension`.
///
/// Aspect ratio is kept and the shorter side is truncated; images that
/// already fit are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dimension || max_dimension == 0 {
        return (width, height);
    }

    let scale = |side: u32| -> u32 {
        let scaled = u64::from(side) * u64::from(max_dimension) / u64::from(longer);
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_dimension, scale(height))
    } else {
        (scale(width), max_dimension)
    }
}

/// Downscales in place with Lanczos3 so the longer side is at most
/// `max_dimension`. Returns whether the image was resized.
pub fn resize_to_fit(img: &mut DynamicImage, max_dimension: u32) -> bool {
    let (width, height) = (img.width(), img.height());
    let (new_width, new_height) = fit_within(width, height, max_dimension);
    if (new_width, new_height) == (width, height) {
        return false;
    }

    debug!("Resizing {}x{} -> {}x{}", width, height, new_width, new_height);
    *img = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    true
}

/// Drops any alpha channel and brings the buffer down to 8-bit gray or RGB,
/// the layouts every encoder here accepts.
pub fn flatten_to_opaque(img: DynamicImage) -> DynamicImage {
    match img.color() {
        color if color.has_alpha() => DynamicImage::ImageRgb8(img.to_rgb8()),
        ColorType::L8 | ColorType::Rgb8 => img,
        ColorType::L16 => DynamicImage::ImageLuma8(img.to_luma8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Works out where the result is written and which encoder produces it.
///
/// With conversion enabled the extension is replaced by the target
/// format's; otherwise the path is kept and the format follows it.
pub fn resolve_output(
    output_path: &Path,
    options: &CompressionOptions,
) -> Result<(PathBuf, OutputFormat)> {
    if options.convert_to_target {
        let format = options.target_format;
        Ok((output_path.with_extension(format.extension()), format))
    } else {
        let format = OutputFormat::from_path(output_path)?;
        Ok((output_path.to_path_buf(), format))
    }
}

/// Encodes into memory using the given format and quality.
pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            img.write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Fast,
                PngFilter::Adaptive,
            );
            img.write_with_encoder(encoder)?;
            buffer = optimize_png(&buffer, quality)?;
        }
        OutputFormat::WebP => buffer = encode_webp(img, quality)?,
        other => {
            let mut cursor = Cursor::new(Vec::new());
            img.write_to(&mut cursor, other.to_image_format())?;
            buffer = cursor.into_inner();
        }
    }

    Ok(buffer)
}

/// Lossy WebP through libwebp. The encoder only takes RGB(A), so grayscale
/// buffers are expanded first.
fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let expanded;
    let source = if img.color() == ColorType::Rgb8 {
        img
    } else {
        expanded = DynamicImage::ImageRgb8(img.to_rgb8());
        &expanded
    };

    let encoder = webp::Encoder::from_image(source)
        .map_err(|e| CompressionError::WebPEncoding(e.to_string()))?;
    Ok(encoder.encode(f32::from(quality)).to_vec())
}

/// Re-deflates an encoded PNG with oxipng, spending more effort the higher
/// the requested quality.
fn optimize_png(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let mut oxipng_options = Options::from_preset(OXIPNG_PRESET);

    oxipng_options.deflate = if quality >= 90 {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= 70 {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    oxipng::optimize_from_memory(data, &oxipng_options)
        .map_err(|e| CompressionError::PngOptimization(e.to_string()))
}

/// Writes to a temp file beside `path` and renames it into place, so a
/// failed write never leaves a truncated image behind.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".img-mirror-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| CompressionError::PersistFailed(path.to_path_buf(), e.error))?;

    Ok(())
}

/// Compresses a single file outside of a batch run, creating the output's
/// parent directory if needed.
pub fn compress_image(
    input: &Path,
    output: &Path,
    options: &CompressionOptions,
) -> Result<Outcome> {
    if !input.is_file() {
        return Err(CompressionError::FileNotFound(input.to_path_buf()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CompressionError::DirectoryCreationFailed(parent.to_path_buf(), e))?;
    }

    let transformer = ImageTransformer::new(options.clone());
    Ok(transformer.transform(&Task::new(input, output)))
}
