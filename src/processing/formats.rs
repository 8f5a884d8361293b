//! Image format detection and encoding

use std::path::Path;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use tracing::debug;

use crate::config::ImageFormat;
use crate::error::{Result, BufResizeError};
use crate::processing::raster::RasterImage;

/// Detect image format from file extension
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ImageFormat> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| BufResizeError::unsupported_format(
            "Unknown".to_string(),
            Some(path.to_path_buf())
        ))?;

    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::WebP),
        "gif" => Ok(ImageFormat::Gif),
        "tiff" | "tif" => Ok(ImageFormat::Tiff),
        "bmp" => Ok(ImageFormat::Bmp),
        _ => Err(BufResizeError::unsupported_format(
            extension.to_string(),
            Some(path.to_path_buf())
        )),
    }
}

/// Detect image format from the leading magic bytes
pub fn detect_format_from_header(data: &[u8]) -> Result<ImageFormat> {
    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    // TIFF: II*. (little-endian) or MM.* (big-endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Ok(ImageFormat::Tiff);
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    Err(BufResizeError::decode("unrecognized image format (magic bytes)"))
}

/// Convert our ImageFormat to image crate format
impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Get supported input formats
pub fn supported_input_formats() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "webp", "gif", "tiff", "tif", "bmp"]
}

/// Get supported output formats
pub fn supported_output_formats() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "bmp"]
}

/// Check if a file extension is supported for input
pub fn is_supported_input_format(extension: &str) -> bool {
    supported_input_formats()
        .iter()
        .any(|&fmt| fmt.eq_ignore_ascii_case(extension))
}

/// Check if a file extension is supported for output
pub fn is_supported_output_format(extension: &str) -> bool {
    supported_output_formats()
        .iter()
        .any(|&fmt| fmt.eq_ignore_ascii_case(extension))
}

/// Encode a raster into `format`.
///
/// JPEG has no alpha channel, so alpha is dropped before encoding. `quality`
/// applies to JPEG only.
pub fn encode_raster(raster: RasterImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let raster = if format == ImageFormat::Jpeg {
        raster.without_alpha()
    } else {
        raster
    };

    let (width, height) = (raster.width(), raster.height());
    let color = raster.layout().color_type();
    let pixels = raster.into_pixels();
    let mut output = Vec::with_capacity(pixels.len() / 4);

    debug!("Encoding {}x{} {:?} as {:?}", width, height, color, format);

    let written = match format {
        ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100))
            .write_image(&pixels, width, height, color),
        ImageFormat::Png => PngEncoder::new(&mut output)
            .write_image(&pixels, width, height, color),
        ImageFormat::Bmp => BmpEncoder::new(&mut output)
            .write_image(&pixels, width, height, color),
        other => {
            return Err(BufResizeError::unsupported_format(
                format!("{:?} (no encoder)", other),
                None,
            ))
        }
    };

    written.map_err(|e| BufResizeError::encode(e.to_string()))?;

    if output.is_empty() {
        return Err(BufResizeError::encode("encoder produced no output"));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::raster::PixelLayout;

    fn gradient(width: u32, height: u32, layout: PixelLayout) -> RasterImage {
        let channels = layout.channels();
        let pixels = (0..width * height)
            .flat_map(|i| std::iter::repeat((i % 251) as u8).take(channels))
            .collect();
        RasterImage::new(width, height, layout, pixels).unwrap()
    }

    #[test]
    fn test_format_detection_from_path() {
        assert_eq!(
            detect_format_from_path(Path::new("test.jpg")).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            detect_format_from_path(Path::new("test.PNG")).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            detect_format_from_path(Path::new("test.tif")).unwrap(),
            ImageFormat::Tiff
        );
        assert!(detect_format_from_path(Path::new("test")).is_err());
        assert!(detect_format_from_path(Path::new("test.xcf")).is_err());
    }

    #[test]
    fn test_format_detection_from_header() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];
        assert_eq!(
            detect_format_from_header(&jpeg_header).unwrap(),
            ImageFormat::Jpeg
        );

        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];
        assert_eq!(
            detect_format_from_header(&png_header).unwrap(),
            ImageFormat::Png
        );

        let webp_header = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(
            detect_format_from_header(webp_header).unwrap(),
            ImageFormat::WebP
        );

        // Truncated RIFF container is not enough to call it WebP
        assert!(detect_format_from_header(b"RIFF\x00\x00").is_err());
    }

    #[test]
    fn test_unknown_header_is_decode_error() {
        assert!(matches!(
            detect_format_from_header(b"definitely not an image"),
            Err(BufResizeError::DecodeError { .. })
        ));
        assert!(matches!(
            detect_format_from_header(&[]),
            Err(BufResizeError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_supported_formats() {
        assert!(is_supported_input_format("jpg"));
        assert!(is_supported_input_format("PNG"));
        assert!(!is_supported_input_format("xyz"));

        assert!(is_supported_output_format("bmp"));
        assert!(!is_supported_output_format("webp"));
    }

    #[test]
    fn test_encode_png_round_trip_dimensions() {
        let bytes = encode_raster(gradient(40, 30, PixelLayout::Rgba), ImageFormat::Png, 85).unwrap();
        assert_eq!(detect_format_from_header(&bytes).unwrap(), ImageFormat::Png);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let bytes = encode_raster(gradient(16, 16, PixelLayout::LumaAlpha), ImageFormat::Jpeg, 90).unwrap();
        assert_eq!(detect_format_from_header(&bytes).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_jpeg_quality_affects_size() {
        let low = encode_raster(gradient(64, 64, PixelLayout::Rgb), ImageFormat::Jpeg, 10).unwrap();
        let high = encode_raster(gradient(64, 64, PixelLayout::Rgb), ImageFormat::Jpeg, 100).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_encode_bmp() {
        let bytes = encode_raster(gradient(8, 4, PixelLayout::Rgb), ImageFormat::Bmp, 85).unwrap();
        assert!(bytes.starts_with(b"BM"));
    }

    #[test]
    fn test_encode_unsupported_output() {
        assert!(matches!(
            encode_raster(gradient(2, 2, PixelLayout::Rgb), ImageFormat::Gif, 85),
            Err(BufResizeError::UnsupportedFormat { .. })
        ));
    }
}
