//! Basic usage example for the bufresize library

use bufresize::{init, FilterType, ImageResizer, OutputFormat};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init()?;

    let input = std::fs::read("input.jpg")?;

    // Default settings: Lanczos3, format preserved
    let output = bufresize::resize(&input, 1024, 768)?;
    std::fs::write("output_1024x768.jpg", &output)?;

    // Custom settings with metadata
    let resizer = ImageResizer::new()
        .filter(FilterType::CatmullRom)
        .output_format(OutputFormat::Png);
    let result = resizer.resize_detailed(&input, 1920, 1080)?;
    std::fs::write("output_1920x1080.png", &result.bytes)?;

    println!("Successfully resized image:");
    println!("  Original: {}x{} {:?} ({:.2} MB)",
             result.source.width,
             result.source.height,
             result.source.format,
             result.source.byte_len as f64 / 1024.0 / 1024.0);
    println!("  Resized: {}x{} {:?} ({:.2} MB)",
             result.width,
             result.height,
             result.format,
             result.bytes.len() as f64 / 1024.0 / 1024.0);
    println!("  Processing time: {:.2}ms", result.elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
