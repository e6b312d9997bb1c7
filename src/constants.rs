pub const DEFAULT_QUALITY: u8 = 10;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 95;

pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub const MIN_DEFAULT_WORKERS: usize = 4;
pub const MAX_DEFAULT_WORKERS: usize = 16;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";
pub const PROGRESS_BAR_CHARS: &str = "#>-";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const ERROR_PREFIX: &str = "❌";
pub const WARNING_PREFIX: &str = "⚠️";
pub const INFO_PREFIX: &str = "📋";

/// Worker count used when none is given: one per logical CPU, kept within
/// a range that suits mixed decode/encode workloads.
pub fn default_worker_count() -> usize {
    num_cpus::get().clamp(MIN_DEFAULT_WORKERS, MAX_DEFAULT_WORKERS)
}
