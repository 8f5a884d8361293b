//! Named resize profiles

use serde::{Deserialize, Serialize};
use crate::config::{validate_quality, OutputFormat, ResizeSettings};
use crate::error::{Result, BufResizeError};
use crate::processing::{Dimensions, FilterType};

/// A named target size with optional overrides of the default settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeProfile {
    /// Target width in pixels
    pub width: u32,

    /// Target height in pixels
    pub height: u32,

    /// Resampling filter (None = config default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterType>,

    /// Output format (None = config default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Output quality (None = config default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl ResizeProfile {
    /// Create a profile for exact target dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: None,
            format: None,
            quality: None,
        }
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the output quality
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Target dimensions of this profile
    pub fn dimensions(&self) -> Result<Dimensions> {
        Dimensions::new(self.width, self.height)
    }

    /// Settings for this profile, falling back to `defaults`
    pub fn settings(&self, defaults: &ResizeSettings) -> ResizeSettings {
        ResizeSettings {
            filter: self.filter.unwrap_or(defaults.filter),
            format: self.format.unwrap_or(defaults.format),
            quality: self.quality.unwrap_or(defaults.quality),
        }
    }

    /// Validate the profile against a per-side limit
    pub fn validate(&self, max_dimension: u32) -> Result<()> {
        if let Some(quality) = self.quality {
            validate_quality(quality)?;
        }

        if self.width == 0 || self.width > max_dimension
            || self.height == 0 || self.height > max_dimension
        {
            return Err(BufResizeError::invalid_dimensions(
                self.width,
                self.height,
                format!("each side must be between 1-{}", max_dimension),
            ));
        }

        Ok(())
    }

    /// One-line description for listings
    pub fn describe(&self) -> String {
        let mut text = format!("{}x{}", self.width, self.height);
        if let Some(filter) = self.filter {
            text.push_str(&format!(", filter {:?}", filter));
        }
        if let Some(format) = self.format {
            text.push_str(&format!(", format {:?}", format));
        }
        if let Some(quality) = self.quality {
            text.push_str(&format!(", quality {}", quality));
        }
        text
    }
}
