use thiserror::Error;

/// All possible errors that can occur while cutting audio
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to open or read the audio file from disk
    #[error("Failed to open audio file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    /// Input bytes are empty or not a container/codec the decoder understands
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    /// Trim range is unusable (negative start, non-finite end, nothing to trim)
    #[error("Invalid trim range: {0}")]
    InvalidRange(String),

    /// Buffer metadata cannot produce a well-formed WAV header
    #[error("WAV encoding failed: {0}")]
    Encode(String),

    /// A waveform was requested with zero peaks
    #[error("num_peaks must be greater than 0")]
    InvalidPeakCount,

    /// A shell line that doesn't parse
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking decode task panicked or was cancelled
    #[error("Task join error: {0}")]
    Task(String),
}

/// Convenient Result type that uses our AudioError
pub type Result<T> = std::result::Result<T, AudioError>;
