//! Core image processing functionality

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use image::io::{Limits, Reader as ImageReader};
use serde::Serialize;
use tracing::debug;

use crate::config::{ImageFormat, OutputFormat, ResizeLimits, ResizeSettings};
use crate::error::{Result, BufResizeError, ErrorContext};

pub mod formats;
pub mod raster;
pub mod resize;
pub mod validation;

pub use formats::*;
pub use raster::*;
pub use resize::*;
pub use validation::*;

/// Decodes, resamples, and re-encodes images.
///
/// Holds configuration only. Every call owns its decoder, resampler, and
/// buffers, so one resizer can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct ImageResizer {
    settings: ResizeSettings,
    limits: ResizeLimits,
}

/// Metadata about the decoded source of a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// Result of a resize with metadata
#[derive(Debug, Clone)]
pub struct ResizeOutput {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub source: SourceInfo,
    pub elapsed: Duration,
}

impl ResizeOutput {
    /// Get compression ratio (input size / output size)
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes.is_empty() {
            return 1.0;
        }
        self.source.byte_len as f64 / self.bytes.len() as f64
    }
}

impl ImageResizer {
    /// Create a resizer with default settings (Lanczos3, preserve format)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &ResizeSettings, limits: &ResizeLimits) -> Self {
        Self {
            settings: *settings,
            limits: *limits,
        }
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.settings.filter = filter;
        self
    }

    /// Set the output format policy
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.settings.format = format;
        self
    }

    /// Set the JPEG quality (1-100)
    pub fn quality(mut self, quality: u8) -> Self {
        self.settings.quality = quality;
        self
    }

    /// Set the decode and target limits
    pub fn limits(mut self, limits: ResizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn settings(&self) -> &ResizeSettings {
        &self.settings
    }

    pub fn resize_limits(&self) -> &ResizeLimits {
        &self.limits
    }

    /// Resize encoded `input` to exactly `width` x `height` and re-encode it
    pub fn resize(&self, input: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        self.resize_detailed(input, width, height).map(|output| output.bytes)
    }

    /// Like [`ImageResizer::resize`], also reporting source and output metadata
    pub fn resize_detailed(&self, input: &[u8], width: u32, height: u32) -> Result<ResizeOutput> {
        let start_time = Instant::now();

        let target = validate_target(width, height, &self.limits)?;
        validate_input(input, &self.limits)?;

        let (raster, source) = self.decode(input)?;
        let resized = resample(raster, target, self.settings.filter)?;

        let format = self.settings.format.resolve(source.format);
        let bytes = encode_raster(resized, format, self.settings.quality)?;

        let elapsed = start_time.elapsed();
        debug!(
            "Resized {:?} {}x{} ({} bytes) -> {:?} {} ({} bytes) in {:.2}ms",
            source.format, source.width, source.height, source.byte_len,
            format, target, bytes.len(),
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(ResizeOutput {
            bytes,
            format,
            width: target.width(),
            height: target.height(),
            source,
            elapsed,
        })
    }

    /// Read, resize, and write a single file, creating parent directories
    pub fn resize_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        target: Dimensions,
    ) -> Result<ResizeOutput> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        debug!("Processing file: {:?} -> {:?}", input_path, output_path);

        let data = std::fs::read(input_path)?;
        let output = self
            .resize_detailed(&data, target.width(), target.height())
            .with_file_context(input_path.to_path_buf())?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, &output.bytes)?;

        Ok(output)
    }

    /// Output path for `input_path` once written in the format this resizer produces
    pub fn output_path_for(&self, input_path: &Path, output_path: PathBuf) -> PathBuf {
        let mut output_path = output_path;
        if let Ok(source) = detect_format_from_path(input_path) {
            output_path.set_extension(self.settings.format.resolve(source).extension());
        }
        output_path
    }

    /// Decode `input` into an 8-bit raster
    fn decode(&self, input: &[u8]) -> Result<(RasterImage, SourceInfo)> {
        let format = detect_format_from_header(input)?;

        // Header-only pass to enforce the pixel budget before allocating
        let (width, height) = ImageReader::with_format(Cursor::new(input), format.into())
            .into_dimensions()
            .map_err(|e| BufResizeError::decode(format!("invalid {:?} header: {}", format, e)))?;
        validate_source(width, height, &self.limits)?;

        let mut decode_limits = Limits::no_limits();
        decode_limits.max_image_width = Some(width);
        decode_limits.max_image_height = Some(height);

        let mut reader = ImageReader::with_format(Cursor::new(input), format.into());
        reader.limits(decode_limits);

        let image = reader.decode().map_err(|e| match e {
            image::ImageError::Limits(_) => {
                BufResizeError::image_too_large(width, height, self.limits.max_source_pixels)
            }
            other => BufResizeError::decode(format!("corrupt {:?} data: {}", format, other)),
        })?;

        debug!(
            "Decoded {:?}: {}x{} {:?}",
            format, image.width(), image.height(), image.color()
        );

        let source = SourceInfo {
            format,
            width: image.width(),
            height: image.height(),
            byte_len: input.len(),
        };

        Ok((RasterImage::from_dynamic(image), source))
    }
}
