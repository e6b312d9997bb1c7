use crate::config::{BatchConfig, CompressionOptions};
use crate::constants::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY};
use crate::error::Result;
use crate::formats::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-mirror",
    about = "Batch-compress a directory tree of images into a mirrored output tree",
    long_about = "img-mirror walks an input directory, compresses every matching image with a \
                  fixed-size pool of worker threads, and writes the results to the same relative \
                  paths under an output directory. Images can be downscaled and converted to a \
                  single target format along the way.",
    version,
    after_help = "EXAMPLES:\n  \
    img-mirror batch ./assets/photo ./assets/photo2\n  \
    img-mirror batch ./photos ./web -q 80 -m 1920 -c -f webp -j 8\n  \
    img-mirror compress input.png output.png -q 60"
)]
pub struct Args {
    #[arg(short = 'v', long, global = true, help = "Show debug logging on stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress every matching image under a directory",
        long_about = "Recursively compress all images whose extension is in the allow-list, \
                      mirroring the directory structure under the output directory. \
                      One line is printed per file as it finishes."
    )]
    Batch {
        #[arg(help = "Input directory")]
        input: PathBuf,

        #[arg(help = "Output directory (created if missing)")]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,

        #[arg(
            short = 'e',
            long,
            value_delimiter = ',',
            help = "Comma-separated extensions to process (default: jpg,jpeg,png,webp)",
            long_help = "File extensions to pick up, matched case-insensitively. \
                         A leading dot is optional."
        )]
        extensions: Option<Vec<String>>,

        #[arg(
            short = 'j',
            long,
            help = "Number of worker threads (default: CPU count, 4-16)"
        )]
        threads: Option<usize>,

        #[arg(long, help = "Disable the progress bar")]
        no_progress: bool,
    },

    #[command(
        about = "Compress a single image file",
        long_about = "Run the same resize/flatten/encode pipeline on one file."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path")]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct EncodeArgs {
    #[arg(
        short = 'q',
        long,
        default_value_t = DEFAULT_QUALITY,
        help = "Compression quality (1-95)",
        long_help = "Encoder quality from 1 (smallest) to 95 (best). Used directly by JPEG; \
                     for PNG, >=90 uses Zopfli, >=70 high libdeflate, lower standard libdeflate."
    )]
    pub quality: u8,

    #[arg(
        short = 'm',
        long,
        default_value_t = DEFAULT_MAX_DIMENSION,
        help = "Maximum length of the longer side in pixels",
        long_help = "Images whose longer side exceeds this are downscaled, keeping the aspect \
                     ratio. Smaller images are never upscaled."
    )]
    pub max_dimension: u32,

    #[arg(long, help = "Keep original dimensions", conflicts_with = "max_dimension")]
    pub no_resize: bool,

    #[arg(short = 'c', long, help = "Convert every output to the target format")]
    pub convert: bool,

    #[arg(
        short = 'f',
        long,
        default_value = "webp",
        help = "Target format used with --convert (jpeg, png, webp, gif, bmp, tiff)"
    )]
    pub format: OutputFormat,
}

impl EncodeArgs {
    pub fn to_options(&self) -> Result<CompressionOptions> {
        let max_dimension = (!self.no_resize).then_some(self.max_dimension);
        CompressionOptions::new(
            Some(self.quality),
            max_dimension,
            self.convert,
            Some(self.format),
        )
    }
}

/// Builds a validated batch configuration from the `batch` subcommand's arguments.
pub fn batch_config(
    input: PathBuf,
    output: PathBuf,
    encode: &EncodeArgs,
    extensions: Option<Vec<String>>,
    threads: Option<usize>,
) -> Result<BatchConfig> {
    let extensions = extensions.unwrap_or_else(BatchConfig::default_extensions);
    BatchConfig::new(input, output, &extensions, threads, encode.to_options()?)
}
