//! Timing harness comparing this resizer against the `image` crate baseline

use std::io::Cursor;
use std::time::{Duration, Instant};
use image::imageops::FilterType as ImageFilter;
use image::ImageOutputFormat;
use serde::Serialize;
use tracing::info;

use crate::error::{Result, BufResizeError};
use crate::processing::{Dimensions, ImageResizer};

/// Target sizes exercised when none are given
pub const DEFAULT_TARGETS: [(u32, u32); 3] = [(1024, 768), (1920, 1080), (3000, 2000)];

/// Who performed the resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Candidate {
    /// `ImageResizer` with its configured filter and format
    Bufresize,
    /// `image::DynamicImage::resize_exact` with Lanczos3, encoded as PNG
    ImageCrate,
}

impl Candidate {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bufresize => "bufresize",
            Self::ImageCrate => "image crate",
        }
    }
}

/// Timings of one candidate at one target size
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub candidate: Candidate,
    pub width: u32,
    pub height: u32,
    pub iterations: u32,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub output_bytes: usize,
}

impl BenchmarkReport {
    fn from_samples(
        candidate: Candidate,
        target: Dimensions,
        samples: &[Duration],
        output_bytes: usize,
    ) -> Self {
        let total: Duration = samples.iter().sum();
        Self {
            candidate,
            width: target.width(),
            height: target.height(),
            iterations: samples.len() as u32,
            mean: total / samples.len().max(1) as u32,
            min: samples.iter().min().copied().unwrap_or_default(),
            max: samples.iter().max().copied().unwrap_or_default(),
            output_bytes,
        }
    }

    /// Resizes per second at the mean time
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.mean.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        1.0 / secs
    }
}

/// Resize `input` to every target `iterations` times with each candidate
pub fn run(
    resizer: &ImageResizer,
    input: &[u8],
    targets: &[Dimensions],
    iterations: u32,
) -> Result<Vec<BenchmarkReport>> {
    if iterations == 0 {
        return Err(BufResizeError::config("Iterations must be greater than 0"));
    }

    let mut reports = Vec::with_capacity(targets.len() * 2);

    for &target in targets {
        info!("Benchmarking {} over {} iterations", target, iterations);

        let mut samples = Vec::with_capacity(iterations as usize);
        let mut output_bytes = 0;
        for _ in 0..iterations {
            let start = Instant::now();
            let output = resizer.resize(input, target.width(), target.height())?;
            samples.push(start.elapsed());
            output_bytes = output.len();
        }
        reports.push(BenchmarkReport::from_samples(Candidate::Bufresize, target, &samples, output_bytes));

        samples.clear();
        for _ in 0..iterations {
            let start = Instant::now();
            let output = baseline_resize(input, target)?;
            samples.push(start.elapsed());
            output_bytes = output.len();
        }
        reports.push(BenchmarkReport::from_samples(Candidate::ImageCrate, target, &samples, output_bytes));
    }

    Ok(reports)
}

/// Decode, resize, and PNG-encode using only the `image` crate
pub fn baseline_resize(input: &[u8], target: Dimensions) -> Result<Vec<u8>> {
    let image = image::load_from_memory(input)
        .map_err(|e| BufResizeError::decode(e.to_string()))?;
    let resized = image.resize_exact(target.width(), target.height(), ImageFilter::Lanczos3);

    let mut output = Cursor::new(Vec::new());
    resized
        .write_to(&mut output, ImageOutputFormat::Png)
        .map_err(|e| BufResizeError::encode(e.to_string()))?;
    Ok(output.into_inner())
}
