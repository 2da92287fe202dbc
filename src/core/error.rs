//! Error types shared by the resolver, the converter and the transport layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Stable name of the error kind, as reported to transport callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::InvalidInput(_) => "InvalidInput",
            ConvertError::UnsupportedEncoding(_) => "UnsupportedEncoding",
            ConvertError::DecodeFailure(_) => "DecodeFailure",
            ConvertError::Io(_) => "Io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
