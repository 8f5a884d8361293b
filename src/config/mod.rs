//! Configuration management for bufresize

use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::{Result, BufResizeError};
use crate::processing::{Dimensions, FilterType, ImageResizer};

pub mod profiles;
pub use profiles::*;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults applied to every resize
    pub resize: ResizeSettings,

    /// Decode and target size limits
    pub limits: ResizeLimits,

    /// Batch processing settings
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Named target sizes
    pub profiles: HashMap<String, ResizeProfile>,
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert("hd".to_string(), ResizeProfile::new(1920, 1080));
        profiles.insert("xga".to_string(), ResizeProfile::new(1024, 768));
        profiles.insert(
            "thumbnail".to_string(),
            ResizeProfile::new(300, 300)
                .filter(FilterType::CatmullRom)
                .format(OutputFormat::Png),
        );

        Self {
            resize: ResizeSettings::default(),
            limits: ResizeLimits::default(),
            batch: BatchConfig::default(),
            logging: LoggingConfig::default(),
            profiles,
        }
    }
}

/// Resampling and encoding settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    /// Resampling filter
    pub filter: FilterType,

    /// Output container format
    pub format: OutputFormat,

    /// JPEG quality (1-100), ignored by lossless formats
    pub quality: u8,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
            format: OutputFormat::Preserve,
            quality: 85,
        }
    }
}

/// Limits guarding a single resize call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeLimits {
    /// Maximum encoded input size in bytes
    pub max_input_bytes: u64,

    /// Maximum decoded source size (width * height)
    pub max_source_pixels: u64,

    /// Maximum target width or height
    pub max_dimension: u32,

    /// Maximum target size (width * height)
    pub max_target_pixels: u64,
}

impl Default for ResizeLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: 256 * 1024 * 1024, // 256MB
            max_source_pixels: 200_000_000,     // 200 megapixels
            max_dimension: 32768,               // 32K pixels per side
            max_target_pixels: 200_000_000,     // 200 megapixels
        }
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of worker threads (None = auto-detect)
    pub threads: Option<usize>,

    /// Descend into subdirectories
    pub recursive: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Image container formats recognized on input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }

    /// Whether bufresize can write this format
    pub fn can_encode(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::Bmp)
    }
}

/// Output format policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep the source format when it can be written, PNG otherwise
    #[default]
    Preserve,
    Jpeg,
    Png,
    Bmp,
}

impl OutputFormat {
    /// Resolve the concrete format written for a given source
    pub fn resolve(self, source: ImageFormat) -> ImageFormat {
        match self {
            Self::Preserve if source.can_encode() => source,
            Self::Preserve => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| BufResizeError::config(
                format!("Failed to read config file {:?}: {}", path.as_ref(), e)
            ))?;

        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(BufResizeError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| BufResizeError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| BufResizeError::config(format!("YAML serialization failed: {}", e)))?,
            _ => return Err(BufResizeError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        };

        std::fs::write(&path, content)
            .map_err(|e| BufResizeError::config(
                format!("Failed to write config file {:?}: {}", path.as_ref(), e)
            ))?;

        Ok(())
    }

    /// Get a profile by name
    pub fn get_profile(&self, name: &str) -> Result<&ResizeProfile> {
        self.profiles.get(name)
            .ok_or_else(|| {
                let mut available: Vec<_> = self.profiles.keys().collect();
                available.sort();
                BufResizeError::config(
                    format!("Profile '{}' not found. Available profiles: {:?}", name, available)
                )
            })
    }

    /// Profile names in sorted order
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.resize.quality)?;

        if self.limits.max_input_bytes == 0
            || self.limits.max_source_pixels == 0
            || self.limits.max_dimension == 0
            || self.limits.max_target_pixels == 0
        {
            return Err(BufResizeError::config("Limits must be greater than 0"));
        }

        for (name, profile) in &self.profiles {
            profile.validate(self.limits.max_dimension)
                .map_err(|e| BufResizeError::config(
                    format!("Invalid profile '{}': {}", name, e)
                ))?;
        }

        if let Some(threads) = self.batch.threads {
            if threads == 0 {
                return Err(BufResizeError::config(
                    "Thread count must be greater than 0"
                ));
            }
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Config) -> Self {
        self.resize = other.resize;
        self.limits = other.limits;
        self.logging = other.logging;

        // Merge profiles (other wins on conflicts)
        self.profiles.extend(other.profiles);

        if other.batch.threads.is_some() {
            self.batch.threads = other.batch.threads;
        }
        self.batch.recursive |= other.batch.recursive;

        self
    }

    /// Build a resizer from the default settings
    pub fn resizer(&self) -> ImageResizer {
        ImageResizer::from_settings(&self.resize, &self.limits)
    }

    /// Build a resizer and target dimensions for a named profile
    pub fn profile_resizer(&self, name: &str) -> Result<(ImageResizer, Dimensions)> {
        let profile = self.get_profile(name)?;
        let settings = profile.settings(&self.resize);
        let dimensions = profile.dimensions()?;
        Ok((ImageResizer::from_settings(&settings, &self.limits), dimensions))
    }
}

pub(crate) fn validate_quality(quality: u8) -> Result<()> {
    if quality == 0 || quality > 100 {
        return Err(BufResizeError::config(
            format!("Quality must be between 1-100, got {}", quality)
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.profiles.contains_key("hd"));
        assert!(config.profiles.contains_key("thumbnail"));
        assert!(config.validate().is_ok());
        assert_eq!(config.profile_names(), vec!["hd", "thumbnail", "xga"]);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.profiles.len(), parsed.profiles.len());
        assert_eq!(parsed.resize, config.resize);

        let yaml_str = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml_str).unwrap();
        assert_eq!(parsed.limits, config.limits);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [resize]
            filter = "bilinear"

            [profiles.banner]
            width = 1200
            height = 300
            "#,
        )
        .unwrap();

        assert_eq!(parsed.resize.filter, FilterType::Bilinear);
        assert_eq!(parsed.resize.quality, 85);
        assert_eq!(parsed.limits, ResizeLimits::default());
        assert!(parsed.get_profile("banner").is_ok());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_config_file_io() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();

        let toml_path = dir.path().join("bufresize.toml");
        config.to_file(&toml_path).unwrap();
        let loaded = Config::from_file(&toml_path).unwrap();
        assert!(loaded.validate().is_ok());

        let yaml_path = dir.path().join("bufresize.yaml");
        config.to_file(&yaml_path).unwrap();
        let loaded = Config::from_file(&yaml_path).unwrap();
        assert!(loaded.validate().is_ok());

        assert!(config.to_file(dir.path().join("bufresize.ini")).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.resize.quality = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.batch.threads = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.profiles.insert("bad".to_string(), ResizeProfile::new(0, 10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_format_resolution() {
        assert_eq!(OutputFormat::Preserve.resolve(ImageFormat::Jpeg), ImageFormat::Jpeg);
        assert_eq!(OutputFormat::Preserve.resolve(ImageFormat::Gif), ImageFormat::Png);
        assert_eq!(OutputFormat::Preserve.resolve(ImageFormat::WebP), ImageFormat::Png);
        assert_eq!(OutputFormat::Jpeg.resolve(ImageFormat::Png), ImageFormat::Jpeg);
        assert_eq!(OutputFormat::Bmp.resolve(ImageFormat::Tiff), ImageFormat::Bmp);
    }

    #[test]
    fn test_image_format_properties() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Tiff.extension(), "tiff");
        assert!(!ImageFormat::Gif.can_encode());
    }

    #[test]
    fn test_profile_lookup() {
        let config = Config::default();
        let (resizer, dims) = config.profile_resizer("thumbnail").unwrap();
        assert_eq!((dims.width(), dims.height()), (300, 300));
        assert_eq!(resizer.settings().format, OutputFormat::Png);
        assert!(config.get_profile("nonexistent").is_err());
    }

    #[test]
    fn test_merge() {
        let mut other = Config::default();
        other.profiles.clear();
        other.profiles.insert("square".to_string(), ResizeProfile::new(512, 512));
        other.batch.threads = Some(2);

        let merged = Config::default().merge(other);
        assert!(merged.profiles.contains_key("square"));
        assert!(merged.profiles.contains_key("hd"));
        assert_eq!(merged.batch.threads, Some(2));
    }
}
