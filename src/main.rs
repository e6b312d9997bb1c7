use anyhow::{bail, Context, Result};
use clap::Parser;
use img_mirror::cli::{batch_config, Args, Commands};
use img_mirror::{batch_compress_images, compress_image, logger, Outcome};

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    match args.command {
        Commands::Batch {
            input,
            output,
            encode,
            extensions,
            threads,
            no_progress,
        } => {
            let config = batch_config(input, output, &encode, extensions, threads)
                .context("Invalid batch options")?;
            let summary = batch_compress_images(&config, !no_progress)
                .context("Batch compression aborted")?;
            summary.print();
        }
        Commands::Compress {
            input,
            output,
            encode,
        } => {
            let options = encode.to_options().context("Invalid compression options")?;
            println!("🗜️  Compressing image: {}", input.display());

            let outcome = compress_image(&input, &output, &options)?;
            println!("{}", outcome);

            match outcome {
                Outcome::Success {
                    original_size,
                    compressed_size,
                    ..
                } => {
                    println!("📊 Original size: {} bytes", original_size);
                    println!("📈 Compressed size: {} bytes", compressed_size);
                }
                Outcome::Failure { input_path, .. } => {
                    bail!("Failed to compress {}", input_path.display());
                }
            }
        }
    }

    Ok(())
}
