//! Progress tracking for parallel operations

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Thread-safe progress tracker shared by batch workers
pub struct ProgressTracker {
    total_files: u64,
    start_time: Instant,
    bar: Option<ProgressBar>,

    // Atomic counters for high-frequency updates
    completed: AtomicU64,
    failed: AtomicU64,
    input_bytes: AtomicU64,
    output_bytes: AtomicU64,
}

/// Snapshot of progress at one point in time
#[derive(Debug, Clone)]
pub struct ProgressState {
    pub total_files: u64,
    pub completed_files: u64,
    pub failed_files: u64,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed_time: Duration,
}

impl ProgressTracker {
    /// Create a tracker without console output
    pub fn new(total_files: u64) -> Self {
        Self {
            total_files,
            start_time: Instant::now(),
            bar: None,
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            input_bytes: AtomicU64::new(0),
            output_bytes: AtomicU64::new(0),
        }
    }

    /// Create a tracker that drives a console progress bar
    pub fn with_progress_bar(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}, {eta}) {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self {
            bar: Some(bar),
            ..Self::new(total_files)
        }
    }

    /// Mark a file as started
    pub fn start_file(&self, filename: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(filename.to_string());
        }
        debug!("Started processing file: {}", filename);
    }

    /// Record a successful file
    pub fn complete_file(&self, input_bytes: u64, output_bytes: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.input_bytes.fetch_add(input_bytes, Ordering::Relaxed);
        self.output_bytes.fetch_add(output_bytes, Ordering::Relaxed);
        self.advance();
    }

    /// Record a failed file
    pub fn fail_file(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.advance();
    }

    fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Finish the progress bar, if any
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(self.get_state().status_text());
        }
    }

    pub fn get_state(&self) -> ProgressState {
        ProgressState {
            total_files: self.total_files,
            completed_files: self.completed.load(Ordering::Relaxed),
            failed_files: self.failed.load(Ordering::Relaxed),
            input_bytes: self.input_bytes.load(Ordering::Relaxed),
            output_bytes: self.output_bytes.load(Ordering::Relaxed),
            elapsed_time: self.start_time.elapsed(),
        }
    }
}

impl ProgressState {
    pub fn processed_files(&self) -> u64 {
        self.completed_files + self.failed_files
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.processed_files() as f64 / secs
    }

    /// Get human-readable completion status
    pub fn status_text(&self) -> String {
        if self.processed_files() >= self.total_files {
            "Completed".to_string()
        } else {
            format!("{}/{} files processed", self.processed_files(), self.total_files)
        }
    }

    /// Get processing speed as human-readable string
    pub fn speed_text(&self) -> String {
        let files_per_second = self.files_per_second();
        if files_per_second >= 1.0 {
            format!("{:.1} files/sec", files_per_second)
        } else if files_per_second > 0.0 {
            format!("{:.1} sec/file", 1.0 / files_per_second)
        } else {
            "Unknown".to_string()
        }
    }
}
