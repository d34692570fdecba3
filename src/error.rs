//! Error handling for Gelang
//!
//! Library errors carry an error code and, where it helps, recovery
//! suggestions for the user.

use thiserror::Error;

/// Result type alias for Gelang operations
pub type Result<T> = std::result::Result<T, GelangError>;

/// Main error type for Gelang operations
#[derive(Error, Debug)]
pub enum GelangError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Session Errors
    #[error("A classification request is already in flight")]
    SubmissionInFlight,

    // Classification Errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid response from classification server: {reason}")]
    InvalidResponse { reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GelangError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            GelangError::FileNotFound { .. } => "FILE_NOT_FOUND",
            GelangError::InvalidAudio { .. } => "INVALID_AUDIO",
            GelangError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            GelangError::SubmissionInFlight => "SUBMISSION_IN_FLIGHT",
            GelangError::Transport { .. } => "TRANSPORT_ERROR",
            GelangError::InvalidResponse { .. } => "INVALID_RESPONSE",
            GelangError::Config { .. } => "CONFIG_ERROR",
            GelangError::Io(_) => "IO_ERROR",
            GelangError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Nothing that happens inside a session is fatal to it; only broken
    /// configuration stops the program.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GelangError::Config { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            GelangError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            GelangError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "The file may be corrupted - try re-exporting from source",
            ],
            GelangError::UnsupportedFormat { .. } => vec![
                "Convert the clip to WAV for headless preview",
                "The classification server accepts WAV and MP3",
            ],
            GelangError::SubmissionInFlight => {
                vec!["Wait for the current classification to finish"]
            }
            GelangError::Transport { .. } => vec![
                "Check that the classification server is running",
                "Verify the endpoint URL (GELANG_PREDICT_URL or --endpoint)",
            ],
            GelangError::InvalidResponse { .. } => {
                vec!["Check that the endpoint points at the classification server's /predict route"]
            }
            GelangError::Config { .. } => vec![
                "Check the config file is valid JSON",
                "Remove the config file to fall back to defaults",
            ],
            _ => vec![],
        }
    }

    /// Get a user-friendly message for this error
    pub fn friendly_message(&self) -> String {
        match self {
            GelangError::FileNotFound { path, .. } => {
                format!("I couldn't find the file at '{}'.", path)
            }
            GelangError::SubmissionInFlight => {
                "Still classifying the previous selection, hang on.".to_string()
            }
            GelangError::Transport { .. } => {
                "The request to the classification server failed.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
