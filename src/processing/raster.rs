//! Decoded pixel buffers

use image::DynamicImage;
use fast_image_resize::PixelType;

use crate::error::{Result, BufResizeError};

/// Channel layout of a raster, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::LumaAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::LumaAlpha | Self::Rgba)
    }

    /// Same layout with the alpha channel removed
    pub fn opaque(self) -> Self {
        match self {
            Self::LumaAlpha => Self::Luma,
            Self::Rgba => Self::Rgb,
            other => other,
        }
    }

    pub fn pixel_type(self) -> PixelType {
        match self {
            Self::Luma => PixelType::U8,
            Self::LumaAlpha => PixelType::U8x2,
            Self::Rgb => PixelType::U8x3,
            Self::Rgba => PixelType::U8x4,
        }
    }

    pub fn color_type(self) -> image::ColorType {
        match self {
            Self::Luma => image::ColorType::L8,
            Self::LumaAlpha => image::ColorType::La8,
            Self::Rgb => image::ColorType::Rgb8,
            Self::Rgba => image::ColorType::Rgba8,
        }
    }
}

/// Uncompressed pixel grid, owned by a single resize call
#[derive(Debug, Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a pixel buffer, checking its length against the layout
    pub fn new(width: u32, height: u32, layout: PixelLayout, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * layout.channels();
        if pixels.len() != expected {
            return Err(BufResizeError::resample(format!(
                "pixel buffer holds {} bytes, {}x{} {:?} needs {}",
                pixels.len(), width, height, layout, expected
            )));
        }

        Ok(Self { width, height, layout, pixels })
    }

    /// Convert a decoded image to 8-bit channels, keeping gray and alpha when present
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let color = image.color();

        let (layout, pixels) = match (color.has_color(), color.has_alpha()) {
            (false, false) => (PixelLayout::Luma, image.into_luma8().into_raw()),
            (false, true) => (PixelLayout::LumaAlpha, image.into_luma_alpha8().into_raw()),
            (true, false) => (PixelLayout::Rgb, image.into_rgb8().into_raw()),
            (true, true) => (PixelLayout::Rgba, image.into_rgba8().into_raw()),
        };

        Self { width, height, layout, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Drop the alpha channel, leaving color values as stored
    pub fn without_alpha(self) -> Self {
        if !self.layout.has_alpha() {
            return self;
        }

        let channels = self.layout.channels();
        let opaque = self.layout.opaque();
        let pixels = self.pixels
            .chunks_exact(channels)
            .flat_map(|px| px[..channels - 1].iter().copied())
            .collect();

        Self {
            width: self.width,
            height: self.height,
            layout: opaque,
            pixels,
        }
    }
}
