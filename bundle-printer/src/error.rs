//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// QR payload could not be encoded
    #[error("QR encode failed: {0}")]
    Qr(String),

    /// Raster encode / decode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error while reading a logo or writing a label
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer bridge unreachable
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Printer bridge answered with a non-success status
    #[error("Bridge rejected job: HTTP {0}")]
    Rejected(u16),

    /// Timeout waiting for the bridge
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Unknown label layout selector
    #[error("Invalid layout: {0}")]
    InvalidLayout(u8),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
