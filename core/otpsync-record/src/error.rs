//! Error types for the record codec.

use thiserror::Error;

/// Result type for codec operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while decoding or encoding an OTP record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The input is well-formed XML but not a valid OTP record.
    #[error("malformed OTP record: {0}")]
    Malformed(String),

    /// The input is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A record element or attribute name cannot be written as XML.
    #[error("invalid element name: {0:?}")]
    InvalidName(String),

    /// Reading the input stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}
