use thiserror::Error;

/// Coarse classification of a [`ProcessingError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Decode,
    Io,
    Config,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .got.0, .got.1)]
    DimensionMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },

    #[error("Pixel data corruption: got {len} bytes, expected {expected}")]
    DataCorruption { len: usize, expected: usize },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProcessingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::DimensionMismatch { .. } | Self::DataCorruption { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) | Self::Io(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}

impl From<std::io::Error> for ProcessingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProcessingError>;
