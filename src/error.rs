//! Error types for mailprep library.

use std::io;
use thiserror::Error;

/// Result type alias for mailprep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while transcoding markup.
///
/// The transcoding entry points never surface these to the caller; they are
/// returned by the lower-level building blocks (parser, style map, image
/// decoder, converters) and recovered from locally by the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input markup could not be turned into a document tree.
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// An inline style declaration list could not be parsed.
    #[error("Invalid style declaration: {declaration}")]
    StyleParse {
        /// The offending declaration (or the whole string when unbalanced)
        declaration: String,
    },

    /// An embedded image payload could not be decoded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// Input bytes were not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while serializing output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
