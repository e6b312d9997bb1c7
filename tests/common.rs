#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use img_mirror::{BatchConfig, CompressionOptions};
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_rgb_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 256) as u8])
    })
    .save(path)
    .unwrap();
}

pub fn write_rgba_image(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, ((x * y) % 256) as u8])
    })
    .save(path)
    .unwrap();
}

/// An 8-bit indexed PNG whose first palette entry is fully transparent.
pub fn write_palette_png(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 16, 16);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(vec![0, 0, 0, 255, 200, 0, 30, 60, 90]);
    encoder.set_trns(vec![0, 255, 255]);
    let mut writer = encoder.write_header().unwrap();
    let indices: Vec<u8> = (0..256u32).map(|i| (i % 3) as u8).collect();
    writer.write_image_data(&indices).unwrap();
}

pub fn write_corrupt_file(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"this is not image data").unwrap();
}

/// A small mixed tree: two JPEGs, one RGBA PNG, a text file and a corrupt JPEG.
pub fn create_mixed_tree(root: &Path) {
    write_rgb_image(&root.join("a/one.jpg"), 120, 80);
    write_rgb_image(&root.join("a/nested/two.JPG"), 64, 96);
    write_rgba_image(&root.join("b/alpha.png"), 50, 40);
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("b/readme.txt"), b"not an image").unwrap();
    write_corrupt_file(&root.join("c/broken.jpg"));
}

pub fn batch_config(
    input: &Path,
    output: &Path,
    options: CompressionOptions,
    workers: usize,
) -> BatchConfig {
    BatchConfig::new(
        input.to_path_buf(),
        output.to_path_buf(),
        &BatchConfig::default_extensions(),
        Some(workers),
        options,
    )
    .unwrap()
}

/// Every regular file under `root`, relative to it, sorted.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
