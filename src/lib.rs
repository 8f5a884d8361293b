//! bufresize - Buffer-to-Buffer Image Resizer
//!
//! Takes an encoded image (JPEG, PNG, WebP, GIF, TIFF, BMP) as bytes, resamples
//! it to exact target dimensions, and returns the re-encoded bytes.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let input = std::fs::read("photo.jpg")?;
//! let output = bufresize::resize(&input, 1024, 768)?;
//! assert!(!output.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Use [`ImageResizer`] to pick the filter, output format, quality, or limits:
//!
//! ```rust,no_run
//! use bufresize::{FilterType, ImageResizer, OutputFormat};
//!
//! let resizer = ImageResizer::new()
//!     .filter(FilterType::CatmullRom)
//!     .output_format(OutputFormat::Png);
//! let output = resizer.resize(&std::fs::read("photo.jpg")?, 1920, 1080)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod benchmark;
pub mod config;
pub mod error;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, ImageFormat, OutputFormat, ResizeLimits, ResizeProfile, ResizeSettings};
pub use error::{Result, BufResizeError};
pub use processing::{Dimensions, FilterType, ImageResizer, ResizeOutput};

use tracing::{info, warn};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resize encoded `input` to exactly `width` x `height` with default settings.
///
/// Fails with [`BufResizeError::InvalidDimensions`] when either side is zero and
/// with [`BufResizeError::DecodeError`] when `input` is not a readable image.
pub fn resize(input: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    ImageResizer::default().resize(input, width, height)
}

/// Initialize logging from `RUST_LOG` and report system capabilities.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish()
    ).is_ok() {
        info!("bufresize v{} initialized", VERSION);
    }

    validate_system_requirements()?;

    Ok(())
}

/// Initialize with custom configuration
pub fn init_with_config(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level)
        .map_err(|e| BufResizeError::config(
            format!("Invalid log level '{}': {}", config.logging.level, e)
        ))?;

    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.logging.json_format {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    if installed {
        info!("bufresize v{} initialized with custom config", VERSION);
    }

    validate_system_requirements()?;

    Ok(())
}

fn validate_system_requirements() -> Result<()> {
    use sysinfo::{System, SystemExt};

    let mut system = System::new();
    system.refresh_memory();

    // A 3000x2000 RGBA round trip needs a few hundred MB at most
    let available_memory = system.available_memory();
    const MIN_MEMORY_MB: u64 = 256;

    if available_memory < MIN_MEMORY_MB * 1024 * 1024 {
        warn!(
            "Low available memory: {}MB (recommended: >{}MB)",
            available_memory / (1024 * 1024),
            MIN_MEMORY_MB
        );
    }

    info!("Detected {} logical CPUs", num_cpus::get());

    info!("Image format support:");
    info!("  JPEG: {}", image::ImageFormat::Jpeg.can_read());
    info!("  PNG: {}", image::ImageFormat::Png.can_read());
    info!("  WebP: {}", image::ImageFormat::WebP.can_read());

    Ok(())
}
