//! Image format utilities and type-safe format handling
//!
//! Maps file extensions to the encoders the transformer knows how to drive,
//! and back again when an output path has to be rewritten for a target format.
use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Formats the transformer can encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// JPEG, lossy, honours the quality setting
    Jpeg,
    /// PNG, lossless, post-processed with oxipng
    Png,
    /// WebP, lossy via libwebp, honours the quality setting
    WebP,
    Gif,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Returns the canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Convert to the image crate's ImageFormat
    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }

    /// Look up a format from a bare extension, case-insensitively
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            "gif" => Some(OutputFormat::Gif),
            "bmp" => Some(OutputFormat::Bmp),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    /// Determine the format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                CompressionError::UnsupportedFormat(format!(
                    "{} has no file extension",
                    path.display()
                ))
            })?;

        Self::from_extension(ext)
            .ok_or_else(|| CompressionError::UnsupportedFormat(ext.to_string()))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Gif => "GIF",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Tiff => "TIFF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s).ok_or_else(|| CompressionError::UnsupportedFormat(s.to_string()))
    }
}
