use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use img_mirror::{
    collect_outcomes, encode_image, resize_to_fit, BatchConfig, CompressionOptions,
    OutputFormat,
};
use std::path::Path;
use tempfile::TempDir;

fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }))
}

fn write_test_tree(root: &Path, count: usize) {
    for i in 0..count {
        let path = root.join(format!("dir_{}/test_{}.jpg", i % 3, i));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        test_image(800, 600).save(&path).unwrap();
    }
}

fn bench_image_resizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_resizing");

    for size in [Small, Medium, Large].iter() {
        let (width, height) = match size {
            Small => (800, 600),
            Medium => (1920, 1080),
            Large => (3840, 2160),
        };
        let img = test_image(width, height);

        group.bench_with_input(
            BenchmarkId::new("resize", format!("{}x{}", width, height)),
            &img,
            |b, img| {
                b.iter(|| {
                    let mut img = img.clone();
                    resize_to_fit(black_box(&mut img), black_box(width / 2));
                })
            },
        );
    }

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let img = test_image(1920, 1080);
    let mut group = c.benchmark_group("encoding");

    for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
        group.bench_function(format.to_string(), |b| {
            b.iter(|| encode_image(black_box(&img), format, 80))
        });
    }

    group.finish();
}

fn bench_batch_processing(c: &mut Criterion) {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_test_tree(input_dir.path(), 12);

    let mut group = c.benchmark_group("batch_processing");
    group.sample_size(10);

    for workers in [1usize, 4, 8] {
        let config = BatchConfig::new(
            input_dir.path().to_path_buf(),
            output_dir.path().to_path_buf(),
            &BatchConfig::default_extensions(),
            Some(workers),
            CompressionOptions::new(Some(80), Some(400), false, None).unwrap(),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.iter(|| collect_outcomes(black_box(config)).unwrap())
        });
    }

    group.finish();
}

enum ImageSize {
    Small,
    Medium,
    Large,
}

use ImageSize::*;

criterion_group!(
    benches,
    bench_image_resizing,
    bench_encoding,
    bench_batch_processing
);
criterion_main!(benches);
