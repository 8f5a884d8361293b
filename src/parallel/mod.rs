//! Parallel processing utilities for batch operations

use std::path::{Path, PathBuf};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, BufResizeError};
use crate::processing::{formats::is_supported_input_format, Dimensions, ImageResizer};

pub mod progress;

pub use progress::*;

/// Batch resizer running independent resize calls on a rayon pool
pub struct BatchProcessor {
    resizer: ImageResizer,
    pool: rayon::ThreadPool,
    threads: usize,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(resizer: ImageResizer, threads: Option<usize>) -> Result<Self> {
        let threads = threads.unwrap_or_else(|| {
            // Use number of logical CPUs, but cap at 16 to avoid excessive memory usage
            num_cpus::get().min(16)
        });

        if threads == 0 {
            return Err(BufResizeError::parallel("thread count must be greater than 0"));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("bufresize-worker-{}", index))
            .build()
            .map_err(|e| BufResizeError::parallel(format!("failed to build thread pool: {}", e)))?;

        info!("Initializing batch processor with {} workers", threads);

        Ok(Self {
            resizer,
            pool,
            threads,
            show_progress: false,
        })
    }

    /// Draw a console progress bar while processing
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Resize every file in `files` into `output_dir`, keeping paths relative to `input_root`.
    ///
    /// Per-file failures are collected in the summary. The first
    /// non-recoverable error aborts the batch.
    pub fn process(
        &self,
        files: &[PathBuf],
        input_root: &Path,
        output_dir: &Path,
        target: Dimensions,
    ) -> Result<BatchSummary> {
        info!("Starting parallel processing of {} files", files.len());

        std::fs::create_dir_all(output_dir)?;

        let tracker = if self.show_progress {
            ProgressTracker::with_progress_bar(files.len() as u64)
        } else {
            ProgressTracker::new(files.len() as u64)
        };

        let results: Vec<(PathBuf, Result<FileOutcome>)> = self.pool.install(|| {
            files
                .par_iter()
                .map(|input_path| {
                    let name = input_path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");
                    tracker.start_file(name);

                    let output_path = self.output_path(input_path, input_root, output_dir);
                    let result = self
                        .resizer
                        .resize_file(input_path, &output_path, target)
                        .map(|output| FileOutcome {
                            output_path,
                            input_bytes: output.source.byte_len as u64,
                            output_bytes: output.bytes.len() as u64,
                        });

                    match &result {
                        Ok(outcome) => tracker.complete_file(outcome.input_bytes, outcome.output_bytes),
                        Err(e) => {
                            tracker.fail_file();
                            debug!("Failed to process {:?}: {}", input_path, e);
                        }
                    }

                    (input_path.clone(), result)
                })
                .collect()
        });

        tracker.finish();

        let state = tracker.get_state();
        let (outputs, failures) = collect_outcomes(results)?;

        info!(
            "Parallel processing completed in {:.2}s ({} processed, {} failed, {})",
            state.elapsed_time.as_secs_f64(),
            state.completed_files,
            state.failed_files,
            state.speed_text()
        );

        Ok(BatchSummary {
            processed: state.completed_files,
            failed: state.failed_files,
            input_bytes: state.input_bytes,
            output_bytes: state.output_bytes,
            elapsed_ms: state.elapsed_time.as_millis() as u64,
            outputs,
            failures,
        })
    }

    /// Output path for a file, relative to the input root, with the output extension
    fn output_path(&self, input_path: &Path, input_root: &Path, output_dir: &Path) -> PathBuf {
        let relative = input_path
            .strip_prefix(input_root)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .or_else(|| input_path.file_name().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("output"));

        self.resizer.output_path_for(input_path, output_dir.join(relative))
    }
}

struct FileOutcome {
    output_path: PathBuf,
    input_bytes: u64,
    output_bytes: u64,
}

/// Split per-file results into written outputs and recoverable failures
fn collect_outcomes(
    results: Vec<(PathBuf, Result<FileOutcome>)>,
) -> Result<(Vec<PathBuf>, Vec<FileFailure>)> {
    let mut outputs = Vec::new();
    let mut failures = Vec::new();

    for (input_path, result) in results {
        match result {
            Ok(outcome) => outputs.push(outcome.output_path),
            Err(e) if e.is_recoverable() => {
                warn!("Failed to process {}: {}", input_path.display(), e);
                failures.push(FileFailure {
                    path: input_path,
                    error: e.user_message(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok((outputs, failures))
}

/// A file that could not be resized
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: u64,
    pub failed: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed_ms: u64,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    /// Get compression ratio
    pub fn compression_ratio(&self) -> f64 {
        if self.output_bytes == 0 {
            return 1.0;
        }
        self.input_bytes as f64 / self.output_bytes as f64
    }

    pub fn files_per_second(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        self.processed as f64 / (self.elapsed_ms as f64 / 1000.0)
    }
}

/// Discover supported image files under `input`.
///
/// A file path yields itself. Results are sorted for a stable processing order.
pub fn discover_files(input: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    if !input.is_dir() {
        return Err(BufResizeError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input path does not exist: {}", input.display()),
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(input).max_depth(max_depth) {
        let entry = entry.map_err(|e| BufResizeError::IoError(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(is_supported_input_format)
            .unwrap_or(false);

        if supported {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Discovered {} files under {:?}", files.len(), input);
    Ok(files)
}
