//! Run configuration.
//!
//! Everything here is built once from the command line, validated, and then
//! shared read-only with every worker for the lifetime of a run.

use crate::constants::{
    default_worker_count, DEFAULT_EXTENSIONS, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Per-image encode settings used by the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionOptions {
    pub quality: u8,
    /// Longest allowed side in pixels; `None` leaves dimensions alone.
    pub max_dimension: Option<u32>,
    pub convert_to_target: bool,
    pub target_format: OutputFormat,
}

impl CompressionOptions {
    pub fn new(
        quality: Option<u8>,
        max_dimension: Option<u32>,
        convert_to_target: bool,
        target_format: Option<OutputFormat>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(
                quality,
                MIN_QUALITY,
                MAX_QUALITY,
            ));
        }

        if max_dimension == Some(0) {
            return Err(CompressionError::InvalidMaxDimension(0));
        }

        Ok(Self {
            quality,
            max_dimension,
            convert_to_target,
            target_format: target_format.unwrap_or(OutputFormat::WebP),
        })
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_dimension: None,
            convert_to_target: false,
            target_format: OutputFormat::WebP,
        }
    }
}

/// Settings for a whole directory run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub extensions: BTreeSet<String>,
    pub worker_count: usize,
    pub options: CompressionOptions,
}

impl BatchConfig {
    pub fn new(
        input_dir: PathBuf,
        output_dir: PathBuf,
        extensions: &[String],
        worker_count: Option<usize>,
        options: CompressionOptions,
    ) -> Result<Self> {
        let extensions = normalize_extensions(extensions);
        if extensions.is_empty() {
            return Err(CompressionError::NoExtensions);
        }

        let worker_count = worker_count.unwrap_or_else(default_worker_count);
        if worker_count == 0 {
            return Err(CompressionError::InvalidWorkerCount(worker_count));
        }

        Ok(Self {
            input_dir,
            output_dir,
            extensions,
            worker_count,
            options,
        })
    }

    /// Extensions matched when the user does not pass any.
    pub fn default_extensions() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    }
}

/// Lowercases extensions and strips a leading dot so `.JPG`, `jpg` and `Jpg`
/// all match the same files.
pub fn normalize_extensions(extensions: &[String]) -> BTreeSet<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_options_creation() {
        let options =
            CompressionOptions::new(Some(85), Some(1920), true, Some(OutputFormat::Jpeg)).unwrap();
        assert_eq!(options.quality, 85);
        assert_eq!(options.max_dimension, Some(1920));
        assert!(options.convert_to_target);
        assert_eq!(options.target_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_compression_options_default() {
        let options = CompressionOptions::new(None, None, false, None).unwrap();
        assert_eq!(options, CompressionOptions::default());
        assert_eq!(options.quality, DEFAULT_QUALITY);
        assert_eq!(options.target_format, OutputFormat::WebP);
    }

    #[test]
    fn test_compression_options_invalid_quality() {
        let result = CompressionOptions::new(Some(0), None, false, None);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidQuality(0, _, _))
        ));

        let result = CompressionOptions::new(Some(96), None, false, None);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidQuality(96, _, _))
        ));
    }

    #[test]
    fn test_compression_options_zero_dimension() {
        let result = CompressionOptions::new(None, Some(0), false, None);
        assert!(matches!(result, Err(CompressionError::InvalidMaxDimension(0))));
    }

    #[test]
    fn test_normalize_extensions() {
        let raw = vec![
            ".JPG".to_string(),
            "jpeg".to_string(),
            " Png ".to_string(),
            "".to_string(),
            "jpg".to_string(),
        ];
        let normalized: Vec<_> = normalize_extensions(&raw).into_iter().collect();
        assert_eq!(normalized, vec!["jpeg", "jpg", "png"]);
    }

    #[test]
    fn test_batch_config_rejects_zero_workers() {
        let result = BatchConfig::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            &BatchConfig::default_extensions(),
            Some(0),
            CompressionOptions::default(),
        );
        assert!(matches!(result, Err(CompressionError::InvalidWorkerCount(0))));
    }

    #[test]
    fn test_batch_config_rejects_empty_extensions() {
        let result = BatchConfig::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            &[".".to_string()],
            Some(2),
            CompressionOptions::default(),
        );
        assert!(matches!(result, Err(CompressionError::NoExtensions)));
    }

    #[test]
    fn test_batch_config_default_workers() {
        let config = BatchConfig::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            &BatchConfig::default_extensions(),
            None,
            CompressionOptions::default(),
        )
        .unwrap();
        assert!(config.worker_count >= 4);
        assert!(config.worker_count <= 16);
        assert_eq!(config.extensions.len(), 4);
    }
}
