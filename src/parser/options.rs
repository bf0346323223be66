//! Parsing options and configuration.

use serde::{Deserialize, Serialize};

/// Options for building a document tree from markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep comment nodes (conditional comments pasted from Office survive)
    pub keep_comments: bool,

    /// Recognize output of a previous run and parse only its wrapped fragment
    pub detect_transcoded: bool,

    /// Maximum input size in bytes (0 = unlimited)
    pub max_input_bytes: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable comment preservation.
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Enable or disable detection of previously transcoded input.
    pub fn with_transcoded_detection(mut self, detect: bool) -> Self {
        self.detect_transcoded = detect;
        self
    }

    /// Set the maximum input size in bytes.
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
            detect_transcoded: true,
            max_input_bytes: 0,
        }
    }
}
