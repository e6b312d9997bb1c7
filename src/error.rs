use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("WebP encoding error: {0}")]
    WebPEncoding(String),

    #[error("Invalid quality value: {0}. Must be between {1} and {2}")]
    InvalidQuality(u8, u8, u8),

    #[error("Invalid worker count: {0}. At least one worker is required")]
    InvalidWorkerCount(usize),

    #[error("Invalid maximum dimension: {0}. Must be a positive number of pixels")]
    InvalidMaxDimension(u32),

    #[error("No file extensions given to match against")]
    NoExtensions,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to create output directory {0}: {1}")]
    DirectoryCreationFailed(PathBuf, std::io::Error),

    #[error("Failed to write {0}: {1}")]
    PersistFailed(PathBuf, std::io::Error),

    #[error("Output {0} is already produced by {1}")]
    OutputConflict(PathBuf, PathBuf),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
