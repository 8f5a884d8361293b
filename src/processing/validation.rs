//! Input and dimension validation

use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::ResizeLimits;
use crate::error::{Result, BufResizeError};

/// Target size of a resize, both sides positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Create dimensions, rejecting zero sides
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BufResizeError::invalid_dimensions(
                width,
                height,
                "width and height must be greater than 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    pub fn pixel_count(self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Check the per-side limit
    pub fn check_limit(self, max_dimension: u32) -> Result<Self> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(BufResizeError::invalid_dimensions(
                self.width,
                self.height,
                format!("each side must be at most {} pixels", max_dimension),
            ));
        }
        Ok(self)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parse dimension string (e.g., "1920x1080")
impl FromStr for Dimensions {
    type Err = BufResizeError;

    fn from_str(s: &str) -> Result<Self> {
        let (width, height) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| BufResizeError::config(
                format!("Dimensions must be in format 'WIDTHxHEIGHT' (e.g., '1920x1080'), got '{}'", s)
            ))?;

        let width = width.trim().parse::<u32>()
            .map_err(|_| BufResizeError::config(format!("Invalid width value '{}'", width)))?;
        let height = height.trim().parse::<u32>()
            .map_err(|_| BufResizeError::config(format!("Invalid height value '{}'", height)))?;

        Self::new(width, height)
    }
}

/// Validate the requested target size against the per-side and pixel limits
pub fn validate_target(width: u32, height: u32, limits: &ResizeLimits) -> Result<Dimensions> {
    let dims = Dimensions::new(width, height)?.check_limit(limits.max_dimension)?;

    if dims.pixel_count() > limits.max_target_pixels {
        return Err(BufResizeError::invalid_dimensions(
            width,
            height,
            format!("target must be at most {} pixels", limits.max_target_pixels),
        ));
    }

    Ok(dims)
}

/// Validate an encoded input buffer before decoding
pub fn validate_input(input: &[u8], limits: &ResizeLimits) -> Result<()> {
    if input.is_empty() {
        return Err(BufResizeError::decode("input buffer is empty"));
    }

    let size = input.len() as u64;
    if size > limits.max_input_bytes {
        return Err(BufResizeError::input_too_large(size, limits.max_input_bytes));
    }

    debug!("Input validated: {} bytes", size);
    Ok(())
}

/// Validate decoded source dimensions against the pixel budget
pub fn validate_source(width: u32, height: u32, limits: &ResizeLimits) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BufResizeError::decode(format!(
            "image header reports empty dimensions {}x{}",
            width, height
        )));
    }

    if u64::from(width) * u64::from(height) > limits.max_source_pixels {
        return Err(BufResizeError::image_too_large(
            width,
            height,
            limits.max_source_pixels,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_new() {
        let dims = Dimensions::new(1024, 768).unwrap();
        assert_eq!(dims.width(), 1024);
        assert_eq!(dims.height(), 768);
        assert_eq!(dims.pixel_count(), 786_432);
        assert_eq!(dims.to_string(), "1024x768");

        assert!(matches!(
            Dimensions::new(0, 768),
            Err(BufResizeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Dimensions::new(1024, 0),
            Err(BufResizeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_dimensions_parse() {
        assert_eq!("1920x1080".parse::<Dimensions>().unwrap(), Dimensions::new(1920, 1080).unwrap());
        assert_eq!("3000X2000".parse::<Dimensions>().unwrap(), Dimensions::new(3000, 2000).unwrap());
        assert!("1920".parse::<Dimensions>().is_err());
        assert!("axb".parse::<Dimensions>().is_err());
        assert!("-5x10".parse::<Dimensions>().is_err());
        assert!(matches!(
            "0x10".parse::<Dimensions>(),
            Err(BufResizeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_validate_target() {
        let limits = ResizeLimits { max_dimension: 4096, ..Default::default() };
        assert!(validate_target(4096, 4096, &limits).is_ok());
        assert!(matches!(
            validate_target(4097, 10, &limits),
            Err(BufResizeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_validate_target_pixel_budget() {
        let limits = ResizeLimits::default();
        assert!(validate_target(3000, 2000, &limits).is_ok());
        assert!(matches!(
            validate_target(32768, 32768, &limits),
            Err(BufResizeError::InvalidDimensions { width: 32768, height: 32768, .. })
        ));

        let small = ResizeLimits { max_target_pixels: 100, ..Default::default() };
        assert!(validate_target(10, 10, &small).is_ok());
        assert!(validate_target(10, 11, &small).is_err());
    }

    #[test]
    fn test_validate_input() {
        let limits = ResizeLimits { max_input_bytes: 4, ..Default::default() };
        assert!(matches!(
            validate_input(&[], &limits),
            Err(BufResizeError::DecodeError { .. })
        ));
        assert!(validate_input(&[1, 2, 3, 4], &limits).is_ok());
        assert!(matches!(
            validate_input(&[1, 2, 3, 4, 5], &limits),
            Err(BufResizeError::InputTooLarge { size: 5, limit: 4, .. })
        ));
    }

    #[test]
    fn test_validate_source() {
        let limits = ResizeLimits { max_source_pixels: 100, ..Default::default() };
        assert!(validate_source(10, 10, &limits).is_ok());
        assert!(matches!(
            validate_source(11, 10, &limits),
            Err(BufResizeError::ImageTooLarge { .. })
        ));
        assert!(validate_source(0, 10, &limits).is_err());
    }
}
