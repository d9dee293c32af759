//! Error types for the practice coach

use thiserror::Error;

/// Result type alias for coach operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the practice coach
#[derive(Debug, Error)]
pub enum Error {
    /// Platform has no usable audio capture device (detected once at startup)
    #[error("audio capture is not supported on this system")]
    CaptureUnsupported,

    /// Microphone access was blocked by the platform or declined by the user
    #[error("microphone access denied: {0}")]
    CapturePermissionDenied(String),

    /// Submission to the analysis service failed; carries the user-facing message
    #[error("analysis failed: {0}")]
    Submission(String),

    /// Audio device or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech synthesis or playback error
    #[error("playback error: {0}")]
    Playback(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Message shown to the user when this error ends a session.
    ///
    /// The three session failure classes each get a distinct message; a
    /// `Submission` error carries the service's detail text verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::CaptureUnsupported => {
                "This system has no usable microphone, so speech practice is unavailable."
                    .to_string()
            }
            Self::CapturePermissionDenied(_) => {
                "Microphone access was denied. Check your input device permissions and try again."
                    .to_string()
            }
            Self::Submission(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
