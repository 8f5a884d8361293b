//! Error types and handling for bufresize

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bufresize operations
pub type Result<T> = std::result::Result<T, BufResizeError>;

/// Main error type for bufresize operations
#[derive(Debug, Error)]
pub enum BufResizeError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Input bytes are empty, unrecognized, or corrupt
    #[error("Failed to decode image: {message} (file: {file:?})")]
    DecodeError {
        message: String,
        file: Option<PathBuf>,
    },

    /// Requested target dimensions are unusable
    #[error("Invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    /// Format recognized but not supported for this operation
    #[error("Unsupported image format: {format} (file: {file:?})")]
    UnsupportedFormat {
        format: String,
        file: Option<PathBuf>,
    },

    /// Source image exceeds the pixel budget
    #[error("Image too large: {width}x{height} pixels (limit: {limit} pixels, file: {file:?})")]
    ImageTooLarge {
        width: u32,
        height: u32,
        limit: u64,
        file: Option<PathBuf>,
    },

    /// Input buffer exceeds the byte budget
    #[error("Input too large: {size} bytes (limit: {limit} bytes, file: {file:?})")]
    InputTooLarge {
        size: u64,
        limit: u64,
        file: Option<PathBuf>,
    },

    /// Resampling failed
    #[error("Resampling failed: {message}")]
    ResampleError { message: String },

    /// Encoding the resized raster failed
    #[error("Failed to encode image: {message}")]
    EncodeError { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),

    /// Parallel processing errors
    #[error("Parallel processing error: {message}")]
    ParallelError { message: String },
}

impl BufResizeError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::DecodeError {
            message: message.into(),
            file: None,
        }
    }

    /// Create a new invalid dimensions error
    pub fn invalid_dimensions<S: Into<String>>(width: u32, height: u32, reason: S) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S, file: Option<PathBuf>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            file,
        }
    }

    /// Create a new image too large error
    pub fn image_too_large(width: u32, height: u32, limit: u64) -> Self {
        Self::ImageTooLarge {
            width,
            height,
            limit,
            file: None,
        }
    }

    /// Create a new input too large error
    pub fn input_too_large(size: u64, limit: u64) -> Self {
        Self::InputTooLarge {
            size,
            limit,
            file: None,
        }
    }

    pub fn resample<S: Into<String>>(message: S) -> Self {
        Self::ResampleError {
            message: message.into(),
        }
    }

    pub fn encode<S: Into<String>>(message: S) -> Self {
        Self::EncodeError {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new parallel processing error
    pub fn parallel<S: Into<String>>(message: S) -> Self {
        Self::ParallelError {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (a batch can move on to the next file)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // These errors affect individual files but processing can continue
            Self::IoError(_)
            | Self::DecodeError { .. }
            | Self::UnsupportedFormat { .. }
            | Self::ImageTooLarge { .. }
            | Self::InputTooLarge { .. }
            | Self::ResampleError { .. }
            | Self::EncodeError { .. } => true,

            // Same dimensions apply to every file, so the whole batch is doomed
            Self::InvalidDimensions { .. }
            | Self::ConfigError { .. }
            | Self::SerdeError(_)
            | Self::ParallelError { .. } => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::DecodeError { file, .. }
            | Self::UnsupportedFormat { file, .. }
            | Self::ImageTooLarge { file, .. }
            | Self::InputTooLarge { file, .. } => file.as_ref(),

            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("File system error: {}", e),
            Self::DecodeError { message, .. } => {
                format!("Not a readable image ({}). Supported formats: JPEG, PNG, WebP, GIF, TIFF, BMP", message)
            }
            Self::InvalidDimensions { width, height, reason } => {
                format!("Cannot resize to {}x{}: {}", width, height, reason)
            }
            Self::ImageTooLarge { width, height, limit, .. } => {
                format!(
                    "Image is too large ({}x{} = {} pixels). Maximum supported: {} pixels",
                    width, height, (*width as u64) * (*height as u64), limit
                )
            }
            Self::InputTooLarge { size, limit, .. } => {
                format!(
                    "File is too large ({:.2} MB). Maximum supported: {:.2} MB",
                    *size as f64 / 1024.0 / 1024.0,
                    *limit as f64 / 1024.0 / 1024.0
                )
            }
            other => other.to_string(),
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for BufResizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for BufResizeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for adding file path information
pub trait ErrorContext<T> {
    /// Add file context to an error
    fn with_file_context(self, file: PathBuf) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<BufResizeError>,
{
    fn with_file_context(self, file: PathBuf) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();

            match &mut error {
                BufResizeError::DecodeError { file: ref mut f, .. }
                | BufResizeError::UnsupportedFormat { file: ref mut f, .. }
                | BufResizeError::ImageTooLarge { file: ref mut f, .. }
                | BufResizeError::InputTooLarge { file: ref mut f, .. } => {
                    if f.is_none() {
                        *f = Some(file);
                    }
                }
                _ => {}
            }

            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = BufResizeError::config("test message");
        assert!(matches!(err, BufResizeError::ConfigError { .. }));

        let err = BufResizeError::invalid_dimensions(0, 10, "width must be positive");
        assert!(err.to_string().contains("0x10"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(BufResizeError::decode("garbage").is_recoverable());
        assert!(BufResizeError::encode("boom").is_recoverable());
        assert!(!BufResizeError::invalid_dimensions(0, 0, "zero").is_recoverable());
        assert!(!BufResizeError::config("bad").is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = BufResizeError::decode("unrecognized image format");
        let msg = err.user_message();
        assert!(msg.contains("Not a readable image"));
        assert!(msg.contains("JPEG, PNG"));

        let err = BufResizeError::input_too_large(2 * 1024 * 1024, 1024 * 1024);
        assert!(err.user_message().contains("2.00 MB"));
    }

    #[test]
    fn test_file_context() {
        let result: Result<()> = Err(BufResizeError::decode("truncated"));
        let err = result
            .with_file_context(Path::new("photo.jpg").to_path_buf())
            .unwrap_err();
        assert_eq!(err.file_path(), Some(&PathBuf::from("photo.jpg")));

        // Errors without a file slot pass through untouched
        let result: Result<()> = Err(BufResizeError::config("test"));
        let err = result
            .with_file_context(Path::new("photo.jpg").to_path_buf())
            .unwrap_err();
        assert!(err.file_path().is_none());
    }

    #[test]
    fn test_existing_file_context_is_kept() {
        let result: Result<()> = Err(BufResizeError::UnsupportedFormat {
            format: "xcf".to_string(),
            file: Some(PathBuf::from("first.xcf")),
        });
        let err = result
            .with_file_context(PathBuf::from("second.xcf"))
            .unwrap_err();
        assert_eq!(err.file_path(), Some(&PathBuf::from("first.xcf")));
    }
}
