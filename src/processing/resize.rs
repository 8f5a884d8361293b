//! Resampling of decoded rasters

use fast_image_resize as fr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, BufResizeError};
use crate::processing::raster::RasterImage;
use crate::processing::validation::Dimensions;

/// Available resize filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Box average
    Box,
    /// Bilinear (triangle) convolution
    Bilinear,
    /// Hamming windowed sinc
    Hamming,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Mitchell-Netravali cubic
    Mitchell,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for fr::ResizeAlg {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Box => fr::ResizeAlg::Convolution(fr::FilterType::Box),
            FilterType::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::Hamming => fr::ResizeAlg::Convolution(fr::FilterType::Hamming),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Mitchell => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}

/// Resample `source` to exactly `target`, consuming the source buffer.
///
/// Alpha layouts are multiplied by alpha before convolution and divided back
/// afterwards, so transparent pixels do not bleed color into their neighbors.
pub fn resample(source: RasterImage, target: Dimensions, filter: FilterType) -> Result<RasterImage> {
    let (src_width, src_height, layout) = (source.width(), source.height(), source.layout());

    debug!(
        "Resampling {}x{} -> {} ({:?}, {:?})",
        src_width, src_height, target, layout, filter
    );

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        source.into_pixels(),
        layout.pixel_type(),
    )
    .map_err(|e| BufResizeError::resample(e.to_string()))?;

    let mut dst_image = fr::images::Image::new(target.width(), target.height(), layout.pixel_type());

    let options = fr::ResizeOptions::new().resize_alg(filter.into());
    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| BufResizeError::resample(e.to_string()))?;

    RasterImage::new(target.width(), target.height(), layout, dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::raster::PixelLayout;

    fn create_test_raster(width: u32, height: u32, layout: PixelLayout) -> RasterImage {
        let channels = layout.channels();
        let mut pixels = Vec::with_capacity((width * height) as usize * channels);
        for y in 0..height {
            for x in 0..width {
                let intensity = ((x + y) % 255) as u8;
                pixels.extend(std::iter::repeat(intensity).take(channels));
            }
        }
        RasterImage::new(width, height, layout, pixels).unwrap()
    }

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    #[test]
    fn test_downscale_every_layout() {
        for layout in [PixelLayout::Luma, PixelLayout::LumaAlpha, PixelLayout::Rgb, PixelLayout::Rgba] {
            let raster = create_test_raster(200, 100, layout);
            let resized = resample(raster, dims(50, 40), FilterType::Lanczos3).unwrap();

            assert_eq!(resized.width(), 50);
            assert_eq!(resized.height(), 40);
            assert_eq!(resized.layout(), layout);
            assert_eq!(resized.pixels().len(), 50 * 40 * layout.channels());
        }
    }

    #[test]
    fn test_upscale_ignores_aspect_ratio() {
        let raster = create_test_raster(16, 16, PixelLayout::Rgb);
        let resized = resample(raster, dims(64, 8), FilterType::Bilinear).unwrap();
        assert_eq!((resized.width(), resized.height()), (64, 8));
    }

    #[test]
    fn test_uniform_color_survives() {
        let raster = RasterImage::new(32, 32, PixelLayout::Rgb, [200u8, 100, 50].repeat(32 * 32)).unwrap();
        let resized = resample(raster, dims(7, 5), FilterType::CatmullRom).unwrap();

        for px in resized.pixels().chunks_exact(3) {
            assert!(px[0].abs_diff(200) <= 1);
            assert!(px[1].abs_diff(100) <= 1);
            assert!(px[2].abs_diff(50) <= 1);
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let raster = create_test_raster(20, 10, PixelLayout::Luma);
        let original = raster.pixels().to_vec();
        let resized = resample(raster, dims(20, 10), FilterType::Nearest).unwrap();
        assert_eq!(resized.pixels(), original.as_slice());
    }

    #[test]
    fn test_filter_conversion() {
        let filters = [
            FilterType::Nearest,
            FilterType::Box,
            FilterType::Bilinear,
            FilterType::Hamming,
            FilterType::CatmullRom,
            FilterType::Mitchell,
            FilterType::Lanczos3,
        ];

        for filter in &filters {
            let _: fr::ResizeAlg = (*filter).into();
        }
        assert!(matches!(fr::ResizeAlg::from(FilterType::Nearest), fr::ResizeAlg::Nearest));
    }

    #[test]
    fn test_filter_serde_names() {
        assert_eq!(serde_json::to_string(&FilterType::CatmullRom).unwrap(), "\"catmull-rom\"");
        let parsed: FilterType = serde_json::from_str("\"lanczos3\"").unwrap();
        assert_eq!(parsed, FilterType::Lanczos3);
    }
}
