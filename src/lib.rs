pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod logger;
pub mod pool;
pub mod processing;
pub mod report;
pub mod task;

pub use batch::{batch_compress_images, collect_outcomes, dispatch_tasks, process_batch};
pub use config::{BatchConfig, CompressionOptions};
pub use discovery::{enumerate_tasks, is_allowed_extension, mirror_output_path};
pub use error::{CompressionError, Result};
pub use formats::OutputFormat;
pub use pool::{Outcomes, WorkerPool};
pub use processing::{
    compress_image, encode_image, fit_within, flatten_to_opaque, load_image_with_metadata,
    process_image_pipeline, resize_to_fit, ImageTransformer,
};
pub use report::{BatchSummary, Reporter};
pub use task::{Outcome, Task};
