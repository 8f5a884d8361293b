#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

/// Gradient image with enough detail for resampling to matter
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x ^ y) % 256) as u8])
    }))
}

pub fn encode(image: &DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).expect("encode fixture");
    bytes.into_inner()
}

pub fn sample_jpeg() -> Vec<u8> {
    encode(&gradient(800, 600), ImageOutputFormat::Jpeg(90))
}

pub fn sample_png_with_alpha() -> Vec<u8> {
    let image = RgbaImage::from_fn(64, 64, |x, y| Rgba([200, 100, 50, ((x + y) * 2) as u8]));
    encode(&DynamicImage::ImageRgba8(image), ImageOutputFormat::Png)
}

/// Temporary directory holding `sample.jpg`
pub struct Fixture {
    pub dir: TempDir,
    pub jpeg: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let jpeg = dir.path().join("sample.jpg");
        std::fs::write(&jpeg, sample_jpeg()).expect("write fixture");
        Self { dir, jpeg }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dir");
        }
        std::fs::write(&path, bytes).expect("write fixture");
        path
    }
}

pub fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory(bytes).expect("decode output");
    (image.width(), image.height())
}

pub fn dimensions_of_file(path: &Path) -> (u32, u32) {
    dimensions_of(&std::fs::read(path).expect("read output"))
}
