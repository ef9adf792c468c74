/// Result alias that carries the custom [`VaseError`] type.
pub type Result<T> = std::result::Result<T, VaseError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VaseError {
    /// The audio bytes could not be turned into samples. Extraction stops
    /// here; there is no partial result.
    #[error("failed to decode audio: {0}")]
    Decode(String),
    /// Zero-length audio or an empty feature sequence reached a stage that
    /// needs data.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),
    /// An argument was outside the range an operation can work with.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Malformed STL data.
    #[error("STL parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Configuration file could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON serialization errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl VaseError {
    /// Creates a decode error from anything printable.
    pub fn decode<T: std::fmt::Display>(cause: T) -> Self {
        Self::Decode(cause.to_string())
    }

    /// Creates a parse error for the given (1-based) line.
    pub fn parse<T: Into<String>>(line: usize, message: T) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<hound::Error> for VaseError {
    fn from(value: hound::Error) -> Self {
        Self::decode(value)
    }
}

impl From<toml::de::Error> for VaseError {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}
