//! Resize a directory of images in parallel

use std::path::Path;

use bufresize::parallel::{discover_files, BatchProcessor};
use bufresize::{init, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init()?;

    let config = Config::default();
    let (resizer, target) = config.profile_resizer("xga")?;

    let input = Path::new("input_images");
    let files = discover_files(input, true)?;
    println!("Found {} images", files.len());

    let processor = BatchProcessor::new(resizer, None)?.show_progress(true);
    let summary = processor.process(&files, input, Path::new("output_images"), target)?;

    println!("Processed: {}, failed: {}", summary.processed, summary.failed);
    for failure in &summary.failures {
        println!("  {}: {}", failure.path.display(), failure.error);
    }
    println!("Speed: {:.1} files/sec", summary.files_per_second());

    Ok(())
}
